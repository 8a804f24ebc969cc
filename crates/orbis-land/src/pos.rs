//! Land-cell coordinates and the bijective string hash used as the wire
//! identifier for land use/unuse events.

use serde::{Deserialize, Serialize};

/// Width of one land cell in world units.
pub const LAND_WIDTH: f64 = 32.0;

// ---------------------------------------------------------------------------
// LandPos
// ---------------------------------------------------------------------------

/// Integer grid coordinate of a land cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandPos {
    /// Cell X coordinate.
    pub x: i32,
    /// Cell Y coordinate.
    pub y: i32,
}

impl LandPos {
    /// Creates a cell coordinate.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the wire hash for this cell.
    pub fn hash(&self) -> LandHash {
        LandHash(format!("{}:{}", self.x, self.y))
    }
}

/// Returns the cell containing the given world position.
pub fn land_pos_of(pos_x: f64, pos_y: f64) -> LandPos {
    LandPos {
        x: (pos_x / LAND_WIDTH).floor() as i32,
        y: (pos_y / LAND_WIDTH).floor() as i32,
    }
}

/// Returns every cell coordinate within Chebyshev distance `r` of `center`:
/// the (2r+1)×(2r+1) block, row-major. Not a Euclidean disk — pure integer
/// arithmetic with deterministic boundaries.
pub fn radius_land_positions(center: LandPos, r: i32) -> Vec<LandPos> {
    let mut cells = Vec::with_capacity(((2 * r + 1) * (2 * r + 1)) as usize);
    for dy in -r..=r {
        for dx in -r..=r {
            cells.push(LandPos::new(center.x + dx, center.y + dy));
        }
    }
    cells
}

// ---------------------------------------------------------------------------
// LandHash
// ---------------------------------------------------------------------------

/// Reversible string encoding of a signed cell coordinate pair, `"x:y"` in
/// canonical decimal. Used as the Land Index mapping key on the wire and as
/// the member type of each player's used-lands set.
///
/// The encoding is strictly bijective: `LandHash::parse` rejects any string
/// that `LandPos::hash` would not produce (leading zeros, `-0`, stray
/// whitespace), so `hash(unhash(h)) == h` holds for every accepted input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LandHash(pub(crate) String);

impl LandHash {
    /// Parses a wire hash back into a cell coordinate.
    pub fn parse(&self) -> Result<LandPos, LandHashError> {
        let (xs, ys) = self
            .0
            .split_once(':')
            .ok_or_else(|| LandHashError::Malformed(self.0.clone()))?;
        let x: i32 = xs
            .parse()
            .map_err(|_| LandHashError::Malformed(self.0.clone()))?;
        let y: i32 = ys
            .parse()
            .map_err(|_| LandHashError::Malformed(self.0.clone()))?;
        let pos = LandPos::new(x, y);
        // Reject non-canonical spellings so the codec stays bijective.
        if pos.hash().0 != self.0 {
            return Err(LandHashError::NonCanonical(self.0.clone()));
        }
        Ok(pos)
    }

    /// Returns the hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LandHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors from decoding a [`LandHash`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LandHashError {
    /// The string is not two `:`-separated signed integers.
    #[error("malformed land hash {0:?}")]
    Malformed(String),

    /// The string parses but is not the canonical encoding of its value.
    #[error("non-canonical land hash {0:?}")]
    NonCanonical(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
