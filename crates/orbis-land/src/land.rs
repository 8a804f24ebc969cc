//! Land cell records: a stack of layered brick types plus anchored
//! buildings.

use orbis_entity::{Entity, EntityId};
use serde::{Deserialize, Serialize};

use crate::pos::LandPos;

/// Maximum number of brick layers a cell can hold. Placement above the cap
/// is rejected as a no-op.
pub const MAX_BRICK_LAYERS: usize = 8;

// ---------------------------------------------------------------------------
// BrickType
// ---------------------------------------------------------------------------

/// Opaque brick type tag. The set of concrete brick kinds is world content
/// and lives outside this core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BrickType(pub u16);

// ---------------------------------------------------------------------------
// Land
// ---------------------------------------------------------------------------

/// One land cell: grid coordinate, brick layer stack (bottom-to-top), and
/// the buildings anchored to it.
#[derive(Debug, Clone)]
pub struct Land {
    id: EntityId,
    /// Grid coordinate of this cell.
    pub pos: LandPos,
    /// Layered brick types, ordered bottom-to-top. Never exceeds
    /// [`MAX_BRICK_LAYERS`].
    pub layers: Vec<BrickType>,
    /// Ids of building actors anchored to this cell.
    pub buildings: Vec<EntityId>,
}

impl Land {
    /// Creates an empty cell at the given coordinate.
    pub fn new(pos: LandPos) -> Self {
        Self {
            id: EntityId(0),
            pos,
            layers: Vec::new(),
            buildings: Vec::new(),
        }
    }

    /// Pushes a brick layer on top of the stack. Returns `false` without
    /// mutating if the cell is already at [`MAX_BRICK_LAYERS`].
    pub fn place_layer(&mut self, brick: BrickType) -> bool {
        if self.layers.len() >= MAX_BRICK_LAYERS {
            return false;
        }
        self.layers.push(brick);
        true
    }

    /// Pops the top brick layer. Returns `false` without mutating if the
    /// stack is empty.
    pub fn remove_layer(&mut self) -> bool {
        self.layers.pop().is_some()
    }

    /// Anchors a building to this cell. Idempotent.
    pub fn anchor_building(&mut self, building_id: EntityId) {
        if !self.buildings.contains(&building_id) {
            self.buildings.push(building_id);
        }
    }

    /// Removes a building anchor. No-op if not anchored.
    pub fn unanchor_building(&mut self, building_id: EntityId) {
        self.buildings.retain(|&b| b != building_id);
    }
}

impl Entity for Land {
    fn id(&self) -> EntityId {
        self.id
    }

    fn assign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

// ---------------------------------------------------------------------------
// BrickUpdate
// ---------------------------------------------------------------------------

/// Notification emitted after a successful layer change, carrying the full
/// stack so observers can rebuild the cell without further queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrickUpdate {
    /// Cell X coordinate.
    pub pos_x: i32,
    /// Cell Y coordinate.
    pub pos_y: i32,
    /// The cell's layer stack after the change.
    pub layers: Vec<BrickType>,
    /// `true` for a placement, `false` for a removal.
    pub placed: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_layer_is_bounded() {
        let mut land = Land::new(LandPos::new(0, 0));
        for i in 0..MAX_BRICK_LAYERS {
            assert!(land.place_layer(BrickType(i as u16)));
        }
        assert_eq!(land.layers.len(), MAX_BRICK_LAYERS);

        // At the cap: rejected, stack unchanged.
        assert!(!land.place_layer(BrickType(99)));
        assert_eq!(land.layers.len(), MAX_BRICK_LAYERS);
        assert_eq!(land.layers.last(), Some(&BrickType(7)));
    }

    #[test]
    fn test_remove_layer_on_empty_is_noop() {
        let mut land = Land::new(LandPos::new(1, 1));
        assert!(!land.remove_layer());

        land.place_layer(BrickType(3));
        assert!(land.remove_layer());
        assert!(land.layers.is_empty());
        assert!(!land.remove_layer());
    }

    #[test]
    fn test_building_anchor_is_idempotent() {
        let mut land = Land::new(LandPos::new(2, 2));
        land.anchor_building(EntityId(10));
        land.anchor_building(EntityId(10));
        assert_eq!(land.buildings.len(), 1);

        land.unanchor_building(EntityId(10));
        assert!(land.buildings.is_empty());
        land.unanchor_building(EntityId(10));
    }
}
