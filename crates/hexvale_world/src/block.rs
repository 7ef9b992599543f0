//! # Block Model
//!
//! A block is one 16-bit word:
//!
//! ```text
//!  15  14........10  9..........0
//! [D ][  metadata  ][ block type ]
//! ```
//!
//! Bit 15 is the dirty flag (changed since last save). It is independent of
//! the type and metadata bits.

use bytemuck::{Pod, Zeroable};

/// Block type identifiers.
///
/// The numeric ids are persisted inside every chunk buffer. Never renumber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BlockType {
    /// Empty space.
    Air = 0,
    /// Water.
    Water = 1,
    /// Dirt.
    Dirt = 2,
    /// Grass-topped dirt.
    Grass = 3,
    /// Snow-topped dirt.
    Snow = 4,
    /// Sand.
    Sand = 5,
    /// Dark sand.
    SandDark = 6,
    /// Ice.
    Ice = 7,
    /// Gravel.
    Gravel = 8,
    /// Rock.
    Rock = 9,
    /// Coal ore.
    Coal = 10,
    /// Copper ore.
    Copper = 11,
    /// Iron ore.
    Iron = 12,
    /// Gold ore.
    Gold = 13,
    /// Oil.
    Oil = 14,
    /// Tree trunk.
    Tree = 15,
    /// Elm tree trunk.
    ElmTree = 16,
    /// Leaves.
    Leaves = 17,
    /// Snow covered leaves.
    SnowLeaves = 18,
    /// Wood planks.
    Wood = 19,
    /// Bricks.
    Bricks = 20,
    /// Cobblestone.
    Cobble = 21,
    /// Lava.
    Lava = 22,
    /// Glass.
    Glass = 23,
}

impl BlockType {
    /// Highest assigned id.
    pub const MAX_ID: u16 = 23;

    /// Converts a raw id to a block type.
    #[must_use]
    pub const fn from_id(id: u16) -> Option<Self> {
        Some(match id {
            0 => Self::Air,
            1 => Self::Water,
            2 => Self::Dirt,
            3 => Self::Grass,
            4 => Self::Snow,
            5 => Self::Sand,
            6 => Self::SandDark,
            7 => Self::Ice,
            8 => Self::Gravel,
            9 => Self::Rock,
            10 => Self::Coal,
            11 => Self::Copper,
            12 => Self::Iron,
            13 => Self::Gold,
            14 => Self::Oil,
            15 => Self::Tree,
            16 => Self::ElmTree,
            17 => Self::Leaves,
            18 => Self::SnowLeaves,
            19 => Self::Wood,
            20 => Self::Bricks,
            21 => Self::Cobble,
            22 => Self::Lava,
            23 => Self::Glass,
            _ => return None,
        })
    }

    /// Raw id.
    #[inline]
    #[must_use]
    pub const fn id(self) -> u16 {
        self as u16
    }

    /// Light passes through (and the height map skips) transparent blocks.
    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        matches!(
            self,
            Self::Air | Self::Water | Self::Leaves | Self::SnowLeaves | Self::Glass
        )
    }

    /// Solid blocks stop players and items.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        !matches!(self, Self::Air | Self::Water)
    }
}

/// A single block word.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(transparent)]
pub struct Block(u16);

impl Block {
    /// Mask of the type bits.
    pub const TYPE_MASK: u16 = 0x03FF;
    /// Mask of the dirty bit.
    pub const DIRTY_BIT: u16 = 0x8000;

    /// Air block, clean, no metadata.
    pub const AIR: Self = Self(0);

    /// Creates a clean block of the given type.
    #[inline]
    #[must_use]
    pub const fn new(block_type: BlockType) -> Self {
        Self(block_type as u16)
    }

    /// Wraps a raw word without validating the type bits.
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    /// Raw word.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u16 {
        self.0
    }

    /// Type id stored in the low bits.
    #[inline]
    #[must_use]
    pub const fn type_id(self) -> u16 {
        self.0 & Self::TYPE_MASK
    }

    /// Block type. Words with an unassigned type id read as `Air`;
    /// chunk loading rejects such words before they reach a chunk.
    #[inline]
    #[must_use]
    pub const fn block_type(self) -> BlockType {
        match BlockType::from_id(self.type_id()) {
            Some(block_type) => block_type,
            None => BlockType::Air,
        }
    }

    /// Returns this block with its type replaced. Metadata and dirty bits
    /// are preserved.
    #[inline]
    #[must_use]
    pub const fn with_type(self, block_type: BlockType) -> Self {
        Self((self.0 & !Self::TYPE_MASK) | block_type as u16)
    }

    /// True if changed since the last save.
    #[inline]
    #[must_use]
    pub const fn is_dirty(self) -> bool {
        self.0 & Self::DIRTY_BIT != 0
    }

    /// Returns this block with the dirty bit set.
    #[inline]
    #[must_use]
    pub const fn mark_dirty(self) -> Self {
        Self(self.0 | Self::DIRTY_BIT)
    }

    /// Returns this block with the dirty bit cleared.
    #[inline]
    #[must_use]
    pub const fn clear_dirty(self) -> Self {
        Self(self.0 & !Self::DIRTY_BIT)
    }

    /// See [`BlockType::is_transparent`].
    #[inline]
    #[must_use]
    pub const fn is_transparent(self) -> bool {
        self.block_type().is_transparent()
    }

    /// See [`BlockType::is_solid`].
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        self.block_type().is_solid()
    }
}
