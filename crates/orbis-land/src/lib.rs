//! Spatial land grid: cell coordinates, the reversible land-hash wire key,
//! layered brick cells, and the hashed index with radius queries.

mod index;
mod land;
mod pos;

pub use index::LandIndex;
pub use land::{BrickType, BrickUpdate, Land, MAX_BRICK_LAYERS};
pub use pos::{
    LAND_WIDTH, LandHash, LandHashError, LandPos, land_pos_of, radius_land_positions,
};
