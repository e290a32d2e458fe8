//! Hex coordinate system using axial coordinates (q, r).
//!
//! Both tile centers and intersections live in the same axial coordinate
//! space: the six corner points of a tile are the tile's coordinate shifted
//! by a fixed offset set, deduplicated across neighboring tiles. Every
//! adjacency computation in the engine (tile -> intersections for board
//! generation and resource distribution, intersection -> tiles for initial
//! grants, intersection <-> intersection for roads) derives from the single
//! offset table in this module.

use serde::{Deserialize, Serialize};

/// Axial coordinate on the hex grid.
///
/// - `q` increases going east
/// - `r` increases going southeast
/// - The implicit third coordinate satisfies q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

/// The six corner offsets of a tile, in generation order.
///
/// A tile at `t` has its intersections at `t + offset` for each entry here.
/// The inverse mapping (which tiles touch an intersection) is the negated
/// set, see [`HexCoord::touching_tiles`].
pub const CORNER_OFFSETS: [HexCoord; 6] = [
    HexCoord::new(0, 0),
    HexCoord::new(1, 0),
    HexCoord::new(1, -1),
    HexCoord::new(0, -1),
    HexCoord::new(-1, 0),
    HexCoord::new(-1, 1),
];

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance to another coordinate, in hex steps
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// The six neighboring coordinates at distance 1, clockwise from East.
    ///
    /// For intersections this is the road-adjacency set: a road is valid
    /// exactly between an intersection and one of its neighbors.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        [
            HexCoord::new(self.q + 1, self.r),     // East
            HexCoord::new(self.q + 1, self.r - 1), // NorthEast
            HexCoord::new(self.q, self.r - 1),     // NorthWest
            HexCoord::new(self.q - 1, self.r),     // West
            HexCoord::new(self.q - 1, self.r + 1), // SouthWest
            HexCoord::new(self.q, self.r + 1),     // SouthEast
        ]
    }

    /// The six intersection coordinates at the corners of this tile
    pub fn corners(&self) -> [HexCoord; 6] {
        CORNER_OFFSETS.map(|o| HexCoord::new(self.q + o.q, self.r + o.r))
    }

    /// The six tile coordinates whose corner set contains this intersection.
    ///
    /// Inverse of [`HexCoord::corners`]: `t` is in `i.touching_tiles()` iff
    /// `i` is in `t.corners()`. Border intersections touch fewer actual
    /// tiles; callers filter against the board.
    pub fn touching_tiles(&self) -> [HexCoord; 6] {
        CORNER_OFFSETS.map(|o| HexCoord::new(self.q - o.q, self.r - o.r))
    }
}
