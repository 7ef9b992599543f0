//! Discrete block and chunk coordinates.

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::constants::CHUNK_SIZE;
use crate::coords::Coords;
use crate::face::Face;

/// Integer block coordinate.
///
/// Primary key into chunk-local block arrays.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate in blocks.
    pub x: i32,
    /// Y coordinate in blocks.
    pub y: i32,
    /// Z coordinate in blocks.
    pub z: i32,
}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chunk containing this position (integer division by `CHUNK_SIZE`).
    #[inline]
    #[must_use]
    pub const fn chunk_coords(self) -> ChunkCoords {
        ChunkCoords::from_block(self.x, self.z)
    }

    /// X offset inside the owning chunk.
    #[inline]
    #[must_use]
    pub const fn local_x(self) -> i32 {
        self.x % CHUNK_SIZE
    }

    /// Z offset inside the owning chunk.
    #[inline]
    #[must_use]
    pub const fn local_z(self) -> i32 {
        self.z % CHUNK_SIZE
    }

    /// Neighbouring position across `face`.
    #[inline]
    #[must_use]
    pub const fn adjacent(self, face: Face) -> Self {
        let (dx, dy, dz) = face.offset();
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Position directly above.
    #[inline]
    #[must_use]
    pub const fn above(self) -> Self {
        Self::new(self.x, self.y + 1, self.z)
    }

    /// Position directly below.
    #[inline]
    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1, self.z)
    }

    /// True if `coords` truncates to this block.
    ///
    /// Use this to prevent building on blocks a player is standing on.
    #[inline]
    #[must_use]
    pub fn is_on_block(self, coords: &Coords) -> bool {
        self == coords.to_position()
    }

    /// True if the column sits on the min or max edge of its chunk in X or Z.
    #[inline]
    #[must_use]
    pub const fn is_on_chunk_border(self) -> bool {
        let lx = self.local_x();
        let lz = self.local_z();
        lx == 0 || lz == 0 || lx == CHUNK_SIZE - 1 || lz == CHUNK_SIZE - 1
    }
}

impl From<Coords> for Position {
    fn from(coords: Coords) -> Self {
        coords.to_position()
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(x={}, y={}, z={})", self.x, self.y, self.z)
    }
}

/// Chunk coordinate (identifies a chunk in the world grid).
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Pod, Zeroable, Serialize, Deserialize,
)]
pub struct ChunkCoords {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoords {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts block X/Z to the owning chunk by integer division.
    ///
    /// Only meaningful for in-world (non-negative) block coordinates.
    #[inline]
    #[must_use]
    pub const fn from_block(block_x: i32, block_z: i32) -> Self {
        Self {
            x: block_x / CHUNK_SIZE,
            z: block_z / CHUNK_SIZE,
        }
    }

    /// World X of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_x(self) -> i32 {
        self.x * CHUNK_SIZE
    }

    /// World Z of the chunk's origin corner.
    #[inline]
    #[must_use]
    pub const fn world_z(self) -> i32 {
        self.z * CHUNK_SIZE
    }
}

impl From<Position> for ChunkCoords {
    fn from(position: Position) -> Self {
        position.chunk_coords()
    }
}

impl std::fmt::Display for ChunkCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.x, self.z)
    }
}
