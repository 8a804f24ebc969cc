//! In-memory entity collections: uniquely-identified records with query,
//! add/remove, and change notification.
//!
//! Every manager in the simulation core owns exactly one
//! [`EntityCollection`]. Identity is assigned on insertion and never
//! reused; lookups for ids that are not present return `None` rather than
//! failing, so callers guard with existence checks.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Unique identifier for an entity within its owning collection. Allocated
/// from a monotonically increasing counter starting at 1.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Creates an id from a raw u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the inner u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A record that can live in an [`EntityCollection`].
///
/// `id()` returns [`EntityId(0)`](EntityId) until the entity is inserted;
/// the collection calls `assign_id` exactly once at insertion time.
pub trait Entity {
    /// Returns this entity's identity.
    fn id(&self) -> EntityId;

    /// Sets this entity's identity. Called by the owning collection on
    /// insertion; not intended for other callers.
    fn assign_id(&mut self, id: EntityId);
}

// ---------------------------------------------------------------------------
// CollectionEvent
// ---------------------------------------------------------------------------

/// Change notification recorded by a collection, drained by its owner at
/// the end of each mutating operation or tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEvent {
    /// An entity was inserted and assigned this id.
    Added(EntityId),
    /// The entity with this id was removed.
    Removed(EntityId),
    /// The entity with this id was mutated in place via [`EntityCollection::notify_updated`].
    Updated(EntityId),
}

// ---------------------------------------------------------------------------
// EntityCollection
// ---------------------------------------------------------------------------

/// A query-able set of uniquely-identified records.
///
/// Identity lookup is O(1) amortized; field-predicate scans are O(n).
/// All operations are synchronous and run to completion within the
/// caller's tick — there is no interior locking.
pub struct EntityCollection<T: Entity> {
    entries: FxHashMap<EntityId, T>,
    next_id: u64,
    pending: Vec<CollectionEvent>,
}

impl<T: Entity> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityCollection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self {
            entries: FxHashMap::default(),
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Inserts an entity, assigning it the next identity. Returns the
    /// assigned id and records a [`CollectionEvent::Added`].
    pub fn insert(&mut self, mut entity: T) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        entity.assign_id(id);
        self.entries.insert(id, entity);
        self.pending.push(CollectionEvent::Added(id));
        id
    }

    /// Removes the entity with the given id. Returns the entity if it was
    /// present and records a [`CollectionEvent::Removed`]; `None` otherwise.
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let removed = self.entries.remove(&id);
        if removed.is_some() {
            self.pending.push(CollectionEvent::Removed(id));
        }
        removed
    }

    /// Looks up an entity by id. Returns `None` for unknown ids.
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.entries.get(&id)
    }

    /// Mutably looks up an entity by id.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.entries.get_mut(&id)
    }

    /// Returns `true` if an entity with the given id exists.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Returns the first entity matching the predicate, if any.
    pub fn find_one(&self, pred: impl Fn(&T) -> bool) -> Option<&T> {
        self.entries.values().find(|e| pred(e))
    }

    /// Returns every entity matching the predicate.
    pub fn find_many(&self, pred: impl Fn(&T) -> bool) -> Vec<&T> {
        self.entries.values().filter(|e| pred(e)).collect()
    }

    /// Records a [`CollectionEvent::Updated`] for an in-place mutation made
    /// through [`get_mut`](Self::get_mut). No-op for unknown ids.
    pub fn notify_updated(&mut self, id: EntityId) {
        if self.entries.contains_key(&id) {
            self.pending.push(CollectionEvent::Updated(id));
        }
    }

    /// Iterates over all entities in the collection.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// Iterates over all entity ids in the collection.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entries.keys().copied()
    }

    /// Returns the number of entities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the collection holds no entities.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drains and returns all pending change notifications, in the order
    /// they were recorded.
    pub fn drain_events(&mut self) -> Vec<CollectionEvent> {
        std::mem::take(&mut self.pending)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker {
        id: EntityId,
        label: &'static str,
    }

    impl Marker {
        fn new(label: &'static str) -> Self {
            Self {
                id: EntityId(0),
                label,
            }
        }
    }

    impl Entity for Marker {
        fn id(&self) -> EntityId {
            self.id
        }

        fn assign_id(&mut self, id: EntityId) {
            self.id = id;
        }
    }

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut coll = EntityCollection::new();
        let a = coll.insert(Marker::new("a"));
        let b = coll.insert(Marker::new("b"));
        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
        assert_eq!(coll.get(a).unwrap().id, a);
        assert_eq!(coll.len(), 2);
    }

    #[test]
    fn test_missing_id_returns_none() {
        let coll: EntityCollection<Marker> = EntityCollection::new();
        assert!(coll.get(EntityId(99)).is_none());
        assert!(!coll.contains(EntityId(99)));
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut coll: EntityCollection<Marker> = EntityCollection::new();
        assert!(coll.remove(EntityId(7)).is_none());
        assert!(coll.drain_events().is_empty());
    }

    #[test]
    fn test_find_one_and_many() {
        let mut coll = EntityCollection::new();
        coll.insert(Marker::new("x"));
        coll.insert(Marker::new("y"));
        coll.insert(Marker::new("y"));

        assert_eq!(coll.find_one(|m| m.label == "x").unwrap().label, "x");
        assert!(coll.find_one(|m| m.label == "z").is_none());
        assert_eq!(coll.find_many(|m| m.label == "y").len(), 2);
    }

    #[test]
    fn test_change_notifications_are_drained_in_order() {
        let mut coll = EntityCollection::new();
        let a = coll.insert(Marker::new("a"));
        coll.notify_updated(a);
        coll.remove(a);

        let events = coll.drain_events();
        assert_eq!(
            events,
            vec![
                CollectionEvent::Added(a),
                CollectionEvent::Updated(a),
                CollectionEvent::Removed(a),
            ]
        );
        assert!(coll.drain_events().is_empty());
    }

    #[test]
    fn test_ids_are_not_reused_after_removal() {
        let mut coll = EntityCollection::new();
        let a = coll.insert(Marker::new("a"));
        coll.remove(a);
        let b = coll.insert(Marker::new("b"));
        assert_ne!(a, b);
        assert_eq!(b, EntityId(2));
    }
}
