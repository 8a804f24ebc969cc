//! Hashed spatial index over materialized land cells.

use orbis_entity::{EntityCollection, EntityId};
use rustc_hash::FxHashMap;

use crate::land::{BrickType, BrickUpdate, Land};
use crate::pos::{LandPos, land_pos_of, radius_land_positions};

// ---------------------------------------------------------------------------
// LandIndex
// ---------------------------------------------------------------------------

/// Mapping from cell coordinate to materialized [`Land`] record with O(1)
/// point lookup and a Chebyshev radius query.
///
/// Cells may be referenced (e.g. marked used by a player) before they are
/// materialized here; lookups for such cells simply return `None`.
pub struct LandIndex {
    lands: EntityCollection<Land>,
    by_pos: FxHashMap<LandPos, EntityId>,
}

impl Default for LandIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl LandIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            lands: EntityCollection::new(),
            by_pos: FxHashMap::default(),
        }
    }

    /// Materializes the cell at `pos`, returning its id. Idempotent: an
    /// already-materialized cell keeps its id and contents.
    pub fn create_land(&mut self, pos: LandPos) -> EntityId {
        if let Some(&id) = self.by_pos.get(&pos) {
            return id;
        }
        let id = self.lands.insert(Land::new(pos));
        self.by_pos.insert(pos, id);
        id
    }

    /// Point lookup by cell coordinate.
    pub fn get_land(&self, pos: LandPos) -> Option<&Land> {
        self.by_pos.get(&pos).and_then(|&id| self.lands.get(id))
    }

    /// Mutable point lookup by cell coordinate.
    pub fn get_land_mut(&mut self, pos: LandPos) -> Option<&mut Land> {
        let id = *self.by_pos.get(&pos)?;
        self.lands.get_mut(id)
    }

    /// Looks up a cell's id without touching the record.
    pub fn land_id(&self, pos: LandPos) -> Option<EntityId> {
        self.by_pos.get(&pos).copied()
    }

    /// Lookup by entity id.
    pub fn get_by_id(&self, id: EntityId) -> Option<&Land> {
        self.lands.get(id)
    }

    /// Returns every materialized cell whose coordinate lies within
    /// Chebyshev distance `r` of the cell containing the world position
    /// `(center_x, center_y)`.
    pub fn lands_in_radius(&self, center_x: f64, center_y: f64, r: i32) -> Vec<&Land> {
        radius_land_positions(land_pos_of(center_x, center_y), r)
            .into_iter()
            .filter_map(|pos| self.get_land(pos))
            .collect()
    }

    /// Pushes a brick layer onto the cell at `pos`. Returns the resulting
    /// [`BrickUpdate`], or `None` when the cell is absent or already at the
    /// layer cap (no event for no-ops).
    pub fn place_layer(&mut self, pos: LandPos, brick: BrickType) -> Option<BrickUpdate> {
        let land = self.get_land_mut(pos)?;
        if !land.place_layer(brick) {
            return None;
        }
        Some(BrickUpdate {
            pos_x: pos.x,
            pos_y: pos.y,
            layers: land.layers.clone(),
            placed: true,
        })
    }

    /// Pops the top brick layer from the cell at `pos`. Returns the
    /// resulting [`BrickUpdate`], or `None` when the cell is absent or
    /// already empty.
    pub fn remove_layer(&mut self, pos: LandPos) -> Option<BrickUpdate> {
        let land = self.get_land_mut(pos)?;
        if !land.remove_layer() {
            return None;
        }
        Some(BrickUpdate {
            pos_x: pos.x,
            pos_y: pos.y,
            layers: land.layers.clone(),
            placed: false,
        })
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.lands.len()
    }

    /// Returns `true` if no cell is materialized.
    pub fn is_empty(&self) -> bool {
        self.lands.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
