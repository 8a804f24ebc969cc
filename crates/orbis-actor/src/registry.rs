//! The actor registry: owns every simulated world object and broadcasts
//! the three signals interest management depends on.

use orbis_entity::{CollectionEvent, Entity, EntityCollection, EntityId};
use orbis_land::land_pos_of;
use tracing::debug;

use crate::actor::{Actor, AttachType, Attachment};

// ---------------------------------------------------------------------------
// ActorChange
// ---------------------------------------------------------------------------

/// Change notification broadcast by the registry. Position changes are
/// edge-triggered: emitted only on an actual write, never polled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorChange {
    /// An actor was added to the registry.
    Added {
        /// The new actor's id.
        actor_id: EntityId,
    },
    /// An actor was removed from the registry.
    Removed {
        /// The removed actor's id.
        actor_id: EntityId,
    },
    /// An actor's position fields changed.
    Moved {
        /// The moved actor's id.
        actor_id: EntityId,
        /// New world X position.
        x: f64,
        /// New world Y position.
        y: f64,
    },
}

// ---------------------------------------------------------------------------
// ActorRegistry
// ---------------------------------------------------------------------------

/// Owns the collection of all simulated world objects. Mutations go
/// through the registry so notifications stay consistent with state.
pub struct ActorRegistry {
    actors: EntityCollection<Actor>,
    pending: Vec<ActorChange>,
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ActorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            actors: EntityCollection::new(),
            pending: Vec::new(),
        }
    }

    /// Inserts an actor, assigning its identity and broadcasting
    /// [`ActorChange::Added`].
    pub fn add_actor(&mut self, actor: Actor) -> EntityId {
        let id = self.actors.insert(actor);
        self.translate_collection_events();
        debug!(actor_id = id.value(), "actor added");
        id
    }

    /// Removes an actor, tearing down its attachment links on both sides
    /// and broadcasting [`ActorChange::Removed`]. Returns the actor if it
    /// was present.
    pub fn remove_actor(&mut self, id: EntityId) -> Option<Actor> {
        // Tear down links first so no other actor keeps a dangling id.
        let (attachments, attaching) = match self.actors.get(id) {
            Some(actor) => (actor.attachments.clone(), actor.attaching),
            None => return None,
        };
        for link in attachments {
            if let Some(attached) = self.actors.get_mut(link.actor_id) {
                attached.attaching = None;
            }
        }
        if let Some(link) = attaching
            && let Some(holder) = self.actors.get_mut(link.actor_id)
        {
            holder
                .attachments
                .retain(|a| a.attach_type != link.attach_type);
        }

        let removed = self.actors.remove(id);
        self.translate_collection_events();
        debug!(actor_id = id.value(), "actor removed");
        removed
    }

    /// Writes an actor's position. Edge-triggered: a write that does not
    /// change the value emits nothing. Recomputes the occupied land cell.
    /// Unknown ids are a no-op.
    pub fn set_position(&mut self, id: EntityId, x: f64, y: f64) {
        let Some(actor) = self.actors.get_mut(id) else {
            return;
        };
        if actor.pos_x == x && actor.pos_y == y {
            return;
        }
        actor.pos_x = x;
        actor.pos_y = y;
        actor.at_land = land_pos_of(x, y);
        self.pending.push(ActorChange::Moved { actor_id: id, x, y });
    }

    /// Writes an actor's motion vector. Unknown ids are a no-op.
    pub fn set_motion(&mut self, id: EntityId, motion_x: f64, motion_y: f64) {
        if let Some(actor) = self.actors.get_mut(id) {
            actor.motion_x = motion_x;
            actor.motion_y = motion_y;
        }
    }

    /// Starts or ends an actor's use interaction. The tick counter resets
    /// on every transition. Unknown ids are a no-op.
    pub fn set_using(&mut self, id: EntityId, using: bool) {
        if let Some(actor) = self.actors.get_mut(id)
            && actor.is_using != using
        {
            actor.is_using = using;
            actor.use_tick = 0;
        }
    }

    /// Advances the use-tick counter of every actor mid-interaction.
    /// Called once per simulation tick.
    pub fn tick_uses(&mut self) {
        for id in self.actor_ids() {
            if let Some(actor) = self.actors.get_mut(id)
                && actor.is_using
            {
                actor.use_tick += 1;
            }
        }
    }

    /// Links `attached_id` into `holder_id`'s slot, maintaining the mutual
    /// back-reference. A previous occupant of the slot is detached first.
    /// Returns `false` if either actor is unknown.
    pub fn attach(&mut self, holder_id: EntityId, slot: AttachType, attached_id: EntityId) -> bool {
        if !self.actors.contains(holder_id) || !self.actors.contains(attached_id) {
            return false;
        }
        self.detach(holder_id, slot);
        if let Some(holder) = self.actors.get_mut(holder_id) {
            holder.attachments.push(Attachment {
                attach_type: slot,
                actor_id: attached_id,
            });
        }
        if let Some(attached) = self.actors.get_mut(attached_id) {
            attached.attaching = Some(Attachment {
                attach_type: slot,
                actor_id: holder_id,
            });
        }
        true
    }

    /// Clears `holder_id`'s slot, resolving the other side through the
    /// registry. Returns the previously attached actor's id, if any.
    pub fn detach(&mut self, holder_id: EntityId, slot: AttachType) -> Option<EntityId> {
        let holder = self.actors.get_mut(holder_id)?;
        let idx = holder
            .attachments
            .iter()
            .position(|a| a.attach_type == slot)?;
        let link = holder.attachments.remove(idx);
        if let Some(attached) = self.actors.get_mut(link.actor_id) {
            attached.attaching = None;
        }
        Some(link.actor_id)
    }

    /// Looks up an actor by id.
    pub fn get(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(id)
    }

    /// Mutably looks up an actor by id. Position fields must not be
    /// written through this path; use [`set_position`](Self::set_position).
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    /// Returns the ids of all connected players.
    pub fn player_ids(&self) -> Vec<EntityId> {
        self.actors
            .find_many(|a| a.is_player())
            .into_iter()
            .map(|a| a.id())
            .collect()
    }

    /// Returns the ids of all actors.
    pub fn actor_ids(&self) -> Vec<EntityId> {
        self.actors.ids().collect()
    }

    /// Number of actors.
    pub fn len(&self) -> usize {
        self.actors.len()
    }

    /// Returns `true` if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Drains and returns all pending change notifications in order.
    pub fn drain_changes(&mut self) -> Vec<ActorChange> {
        self.translate_collection_events();
        std::mem::take(&mut self.pending)
    }

    fn translate_collection_events(&mut self) {
        for event in self.actors.drain_events() {
            let change = match event {
                CollectionEvent::Added(actor_id) => ActorChange::Added { actor_id },
                CollectionEvent::Removed(actor_id) => ActorChange::Removed { actor_id },
                // Position writes already pushed their Moved edge.
                CollectionEvent::Updated(_) => continue,
            };
            self.pending.push(change);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::ActorType;
    use orbis_land::LandPos;

    #[test]
    fn test_add_remove_broadcasts() {
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(Actor::new(ActorType::Arrow, 0.0, 0.0));
        registry.remove_actor(id);

        let changes = registry.drain_changes();
        assert_eq!(
            changes,
            vec![
                ActorChange::Added { actor_id: id },
                ActorChange::Removed { actor_id: id },
            ]
        );
    }

    #[test]
    fn test_position_write_is_edge_triggered() {
        let mut registry = ActorRegistry::new();
        let id = registry.add_actor(Actor::new(ActorType::Player, 1.0, 1.0));
        registry.drain_changes();

        // Identical write: no event.
        registry.set_position(id, 1.0, 1.0);
        assert!(registry.drain_changes().is_empty());

        registry.set_position(id, 64.5, 1.0);
        let changes = registry.drain_changes();
        assert_eq!(
            changes,
            vec![ActorChange::Moved {
                actor_id: id,
                x: 64.5,
                y: 1.0
            }]
        );
        // Occupied cell tracks the write.
        assert_eq!(registry.get(id).unwrap().at_land, LandPos::new(2, 0));
    }

    #[test]
    fn test_attachment_back_references_stay_consistent() {
        let mut registry = ActorRegistry::new();
        let player = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));
        let bow = registry.add_actor(Actor::new(ActorType::Bow, 0.0, 0.0));

        assert!(registry.attach(player, AttachType::RightHand, bow));
        let link = registry.get(player).unwrap().attachment(AttachType::RightHand);
        assert_eq!(link.unwrap().actor_id, bow);
        assert_eq!(registry.get(bow).unwrap().attaching.unwrap().actor_id, player);

        let detached = registry.detach(player, AttachType::RightHand);
        assert_eq!(detached, Some(bow));
        assert!(registry.get(bow).unwrap().attaching.is_none());
        assert!(registry.get(player).unwrap().attachments.is_empty());
    }

    #[test]
    fn test_removing_attached_actor_clears_holder_slot() {
        let mut registry = ActorRegistry::new();
        let player = registry.add_actor(Actor::new_player("c1", 0.0, 0.0));
        let bow = registry.add_actor(Actor::new(ActorType::Bow, 0.0, 0.0));
        registry.attach(player, AttachType::RightHand, bow);

        registry.remove_actor(bow);
        assert!(
            registry
                .get(player)
                .unwrap()
                .attachment(AttachType::RightHand)
                .is_none()
        );

        // And the other direction: removing the holder clears the
        // attached actor's back-reference.
        let arrow = registry.add_actor(Actor::new(ActorType::Arrow, 0.0, 0.0));
        registry.attach(player, AttachType::RightHand, arrow);
        registry.remove_actor(player);
        assert!(registry.get(arrow).unwrap().attaching.is_none());
    }

    #[test]
    fn test_use_interaction_ticks_while_active() {
        let mut registry = ActorRegistry::new();
        let bow = registry.add_actor(Actor::new(ActorType::Bow, 0.0, 0.0));

        registry.set_using(bow, true);
        registry.tick_uses();
        registry.tick_uses();
        assert_eq!(registry.get(bow).unwrap().use_tick, 2);

        // Redundant start keeps the counter running.
        registry.set_using(bow, true);
        registry.tick_uses();
        assert_eq!(registry.get(bow).unwrap().use_tick, 3);

        registry.set_using(bow, false);
        assert!(!registry.get(bow).unwrap().is_using);
        assert_eq!(registry.get(bow).unwrap().use_tick, 0);
        registry.tick_uses();
        assert_eq!(registry.get(bow).unwrap().use_tick, 0);
    }

    #[test]
    fn test_unknown_id_mutations_are_noops() {
        let mut registry = ActorRegistry::new();
        registry.set_position(EntityId(42), 1.0, 1.0);
        registry.set_motion(EntityId(42), 1.0, 1.0);
        assert!(!registry.attach(EntityId(1), AttachType::RightHand, EntityId(2)));
        assert!(registry.detach(EntityId(1), AttachType::RightHand).is_none());
        assert!(registry.drain_changes().is_empty());
    }
}
