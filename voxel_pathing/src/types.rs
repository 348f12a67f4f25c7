// Core types shared across the pathing engine.
//
// Defines block positions (`BlockPos`), the closed set of block states the
// engine reasons about (`BlockState`), and the packing function that turns a
// position into a compact `u64` map key for the search's node table and the
// failure memory.
//
// See also: `world.rs` for the `WorldView` trait that serves `BlockState`s,
// `moves.rs` for the walkability predicates built on top of these
// properties, `pathfinding.rs` which keys its node map by `BlockPos::pack`.
//
// **Critical constraint: cheap copies.** `BlockPos` and `BlockState` are
// `Copy` and are created millions of times per search. Keep them small and
// free of heap data.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// An integer voxel coordinate. For the agent this is the block its feet
/// occupy; the head occupies `up()`.
///
/// The coordinate system uses right-handed conventions:
/// - X: east  (positive) / west  (negative)
/// - Y: up    (positive) / down  (negative)
/// - Z: south (positive) / north (negative)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

// Bit layout of `BlockPos::pack`: x in the top 26 bits, z in the next 26,
// y in the low 12. Each field is sign-extended on unpack.
const X_BITS: u32 = 26;
const Z_BITS: u32 = 26;
const Y_BITS: u32 = 12;
const X_SHIFT: u32 = Z_BITS + Y_BITS;
const Z_SHIFT: u32 = Y_BITS;
const X_MASK: u64 = (1 << X_BITS) - 1;
const Z_MASK: u64 = (1 << Z_BITS) - 1;
const Y_MASK: u64 = (1 << Y_BITS) - 1;

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub const fn up(self) -> Self {
        self.offset(0, 1, 0)
    }

    pub const fn up_by(self, n: i32) -> Self {
        self.offset(0, n, 0)
    }

    pub const fn down(self) -> Self {
        self.offset(0, -1, 0)
    }

    pub const fn down_by(self, n: i32) -> Self {
        self.offset(0, -n, 0)
    }

    /// Pack into a `u64` map key. Injective for `x`/`z` in
    /// `-2^25..2^25` and `y` in `-2048..2048`, which covers every world the
    /// engine is pointed at.
    pub const fn pack(self) -> u64 {
        ((self.x as u64 & X_MASK) << X_SHIFT)
            | ((self.z as u64 & Z_MASK) << Z_SHIFT)
            | (self.y as u64 & Y_MASK)
    }

    /// Inverse of `pack`.
    pub const fn unpack(packed: u64) -> Self {
        let x = (packed as i64) >> X_SHIFT;
        let z = ((packed << X_BITS) as i64) >> (X_BITS + Y_BITS);
        let y = ((packed << (X_BITS + Z_BITS)) as i64) >> (X_BITS + Z_BITS);
        Self::new(x as i32, y as i32, z as i32)
    }

    /// Manhattan distance between two positions.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        (self.x - other.x).unsigned_abs()
            + (self.y - other.y).unsigned_abs()
            + (self.z - other.z).unsigned_abs()
    }

    /// Squared euclidean distance.
    pub fn distance_sq(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        let dz = f64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Horizontal (x/z) euclidean distance between block centers.
    pub fn flat_distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dz = f64::from(self.z - other.z);
        (dx * dx + dz * dz).sqrt()
    }

    /// The six face-adjacent positions.
    pub fn face_neighbors(self) -> [Self; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The four horizontal unit offsets `(dx, dz)`, in a fixed order so that
/// candidate enumeration is deterministic.
pub const CARDINALS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// The four diagonal unit offsets `(dx, dz)`.
pub const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

// ---------------------------------------------------------------------------
// Block states
// ---------------------------------------------------------------------------

/// The material of a single block, as far as navigation cares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockState {
    #[default]
    Air,
    Water,
    Lava,
    Stone,
    Dirt,
    Sand,
    Gravel,
    Planks,
    Glass,
    Leaves,
    Bedrock,
}

impl BlockState {
    pub fn is_water(self) -> bool {
        self == Self::Water
    }

    pub fn is_lava(self) -> bool {
        self == Self::Lava
    }

    pub fn is_liquid(self) -> bool {
        matches!(self, Self::Water | Self::Lava)
    }

    /// Whether the agent's body can occupy this block without swimming.
    pub fn can_walk_through(self) -> bool {
        self == Self::Air
    }

    /// Whether the agent can stand on top of this block.
    pub fn can_walk_on(self) -> bool {
        !matches!(self, Self::Air | Self::Water | Self::Lava)
    }

    /// Gravity-affected blocks that fall when their support is removed.
    pub fn falls(self) -> bool {
        matches!(self, Self::Sand | Self::Gravel)
    }

    /// Ticks to break this block bare-handed. `None` means it cannot be
    /// broken at all.
    pub fn break_ticks(self) -> Option<f64> {
        match self {
            Self::Air => Some(0.0),
            Self::Leaves => Some(6.0),
            Self::Glass => Some(9.0),
            Self::Dirt | Self::Sand => Some(15.0),
            Self::Gravel => Some(18.0),
            Self::Planks => Some(60.0),
            Self::Stone => Some(150.0),
            Self::Water | Self::Lava | Self::Bedrock => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_preserves_signed_coordinates() {
        let cases = [
            BlockPos::new(0, 0, 0),
            BlockPos::new(-1, -1, -1),
            BlockPos::new(123_456, 255, -987_654),
            BlockPos::new(-(1 << 25), -2048, (1 << 25) - 1),
        ];
        for pos in cases {
            assert_eq!(BlockPos::unpack(pos.pack()), pos, "pos {pos}");
        }
    }

    #[test]
    fn pack_distinguishes_neighbors() {
        let origin = BlockPos::new(10, 64, -10);
        let mut keys: Vec<u64> = origin.face_neighbors().iter().map(|p| p.pack()).collect();
        keys.push(origin.pack());
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = BlockPos::new(0, 0, 0);
        let b = BlockPos::new(3, -4, 5);
        assert_eq!(a.manhattan_distance(b), 12);
        assert_eq!(b.manhattan_distance(a), 12);
    }

    #[test]
    fn walkability_predicates() {
        assert!(BlockState::Air.can_walk_through());
        assert!(!BlockState::Water.can_walk_through());
        assert!(BlockState::Stone.can_walk_on());
        assert!(!BlockState::Lava.can_walk_on());
        assert!(BlockState::Sand.falls());
        assert!(BlockState::Bedrock.break_ticks().is_none());
    }

    #[test]
    fn block_state_serializes_by_name() {
        let json = serde_json::to_string(&BlockState::Gravel).unwrap();
        assert_eq!(json, "\"Gravel\"");
    }
}
