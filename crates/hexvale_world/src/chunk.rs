//! # Chunk Store
//!
//! A chunk owns a `32 x 96 x 32` block array, a `32 x 32` height map and
//! the transient per-chunk state the mutation engine writes:
//!
//! - light sources keyed by object id (concurrent map)
//! - dynamic items keyed by object id (concurrent map)
//! - `water_expanding` / `grass_growing` flags (atomic booleans)
//!
//! ## Height Map Invariant
//!
//! `height(x, z)` is ALWAYS the Y of the highest non-transparent block in
//! the column, or 0 if there is none. Every write through `ChunkBlocks::set`
//! updates it synchronously; bulk loads rebuild it before the blocks become
//! visible.
//!
//! ## Persistence Format
//!
//! `SIZE_IN_BYTES` bytes: the block words verbatim, host-endian, indexed
//! `[y][z][x]`.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use hexvale_shared::{ChunkCoords, Coords, Face, Position, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::block::{Block, BlockType};
use crate::error::{WorldError, WorldResult};

#[allow(clippy::cast_sign_loss)]
const SIZE: usize = CHUNK_SIZE as usize;
#[allow(clippy::cast_sign_loss)]
const HEIGHT: usize = CHUNK_HEIGHT as usize;

/// Total blocks per chunk.
pub const BLOCKS_PER_CHUNK: usize = SIZE * HEIGHT * SIZE;

/// Size of a persisted chunk buffer.
pub const SIZE_IN_BYTES: usize = BLOCKS_PER_CHUNK * std::mem::size_of::<Block>();

/// Globally unique id for light sources and dynamic items.
pub type ObjectId = u32;

/// Kind of block-attached light emitter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LightSourceType {
    /// Wall or floor torch.
    Torch,
    /// Lantern.
    Lantern,
}

impl LightSourceType {
    /// Emitted light level (0-15).
    #[must_use]
    pub const fn light_strength(self) -> u8 {
        match self {
            Self::Torch => 12,
            Self::Lantern => 15,
        }
    }
}

/// A light emitter attached to one face of a block.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    /// Where the light hangs.
    pub coords: Coords,
    /// Face of the supporting block it is attached to.
    pub attached_to_face: Face,
    /// Emitter kind.
    pub kind: LightSourceType,
}

/// What a dynamic item is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// A dropped block.
    Block(BlockType),
    /// A tool.
    Tool,
    /// A projectile.
    Projectile,
}

/// A physics-affected item lying in (or falling through) the world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DynamicItem {
    /// Current position.
    pub coords: Coords,
    /// Item kind.
    pub kind: ItemKind,
    /// True while the item is falling. Physics clears it on landing.
    pub is_moving: bool,
}

impl DynamicItem {
    /// Creates a resting item.
    #[must_use]
    pub const fn new(coords: Coords, kind: ItemKind) -> Self {
        Self {
            coords,
            kind,
            is_moving: false,
        }
    }
}

/// Block array and height map of one chunk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkBlocks {
    /// Indexed as `[y][z][x]`.
    blocks: Box<[Block]>,
    /// Indexed as `[z][x]`.
    height_map: Box<[u8]>,
}

impl Default for ChunkBlocks {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkBlocks {
    /// All air, height map all zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::AIR; BLOCKS_PER_CHUNK].into_boxed_slice(),
            height_map: vec![0; SIZE * SIZE].into_boxed_slice(),
        }
    }

    #[inline]
    const fn index(x: usize, y: usize, z: usize) -> usize {
        (y * SIZE + z) * SIZE + x
    }

    #[inline]
    const fn in_bounds(x: usize, y: usize, z: usize) -> bool {
        x < SIZE && y < HEIGHT && z < SIZE
    }

    /// Block at local coordinates. Out of range reads as air.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Block {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x, y, z)]
        } else {
            Block::AIR
        }
    }

    /// Writes a block and updates the column's height map. Out of range
    /// writes are ignored.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, block: Block) {
        if Self::in_bounds(x, y, z) {
            self.blocks[Self::index(x, y, z)] = block;
            self.update_height_map(x, y, z, block);
        }
    }

    /// Height map level of a local column.
    #[inline]
    #[must_use]
    pub fn height(&self, x: usize, z: usize) -> u8 {
        if x < SIZE && z < SIZE {
            self.height_map[z * SIZE + x]
        } else {
            0
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn update_height_map(&mut self, x: usize, y: usize, z: usize, block: Block) {
        let slot = z * SIZE + x;
        let current = usize::from(self.height_map[slot]);
        if block.is_transparent() {
            if y == current {
                self.height_map[slot] = self.scan_column(x, y, z) as u8;
            }
        } else if y > current {
            self.height_map[slot] = y as u8;
        }
    }

    /// Highest opaque Y strictly below `below`, or 0.
    fn scan_column(&self, x: usize, below: usize, z: usize) -> usize {
        (0..below)
            .rev()
            .find(|&y| !self.blocks[Self::index(x, y, z)].is_transparent())
            .unwrap_or(0)
    }

    /// Recomputes every column from the block array.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rebuild_height_map(&mut self) {
        for z in 0..SIZE {
            for x in 0..SIZE {
                self.height_map[z * SIZE + x] = self.scan_column(x, HEIGHT, z) as u8;
            }
        }
    }

    /// Block words as bytes, verbatim.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.blocks)
    }

    /// Parses a persisted buffer and rebuilds the height map.
    ///
    /// # Errors
    ///
    /// Fails on a wrong length or an unassigned block type. Nothing is
    /// partially populated.
    pub fn from_bytes(bytes: &[u8]) -> WorldResult<Self> {
        if bytes.len() != SIZE_IN_BYTES {
            return Err(WorldError::InvalidBufferLength {
                expected: SIZE_IN_BYTES,
                actual: bytes.len(),
            });
        }
        // Caller buffers carry no alignment guarantee, so decode word by word.
        let blocks = bytes
            .chunks_exact(std::mem::size_of::<Block>())
            .enumerate()
            .map(|(index, word)| {
                let block = Block::from_raw(u16::from_ne_bytes([word[0], word[1]]));
                match BlockType::from_id(block.type_id()) {
                    Some(_) => Ok(block),
                    None => Err(WorldError::UnknownBlockType {
                        id: block.type_id(),
                        index,
                    }),
                }
            })
            .collect::<WorldResult<Vec<_>>>()?;

        let mut parsed = Self {
            blocks: blocks.into_boxed_slice(),
            height_map: vec![0; SIZE * SIZE].into_boxed_slice(),
        };
        parsed.rebuild_height_map();
        Ok(parsed)
    }
}

/// One chunk of the world.
pub struct Chunk {
    coords: ChunkCoords,
    blocks: RwLock<ChunkBlocks>,
    light_sources: DashMap<ObjectId, LightSource>,
    items: DashMap<ObjectId, DynamicItem>,
    water_expanding: AtomicBool,
    grass_growing: AtomicBool,
}

impl Chunk {
    /// Creates an all-air chunk.
    #[must_use]
    pub fn new(coords: ChunkCoords) -> Self {
        Self::with_blocks(coords, ChunkBlocks::new())
    }

    /// Creates a chunk around existing block data.
    #[must_use]
    pub fn with_blocks(coords: ChunkCoords, blocks: ChunkBlocks) -> Self {
        Self {
            coords,
            blocks: RwLock::new(blocks),
            light_sources: DashMap::new(),
            items: DashMap::new(),
            water_expanding: AtomicBool::new(false),
            grass_growing: AtomicBool::new(false),
        }
    }

    /// Chunk position in the world.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> ChunkCoords {
        self.coords
    }

    /// Shared access to blocks and height map.
    pub fn blocks(&self) -> RwLockReadGuard<'_, ChunkBlocks> {
        self.blocks.read()
    }

    /// Exclusive access to blocks and height map.
    pub fn blocks_mut(&self) -> RwLockWriteGuard<'_, ChunkBlocks> {
        self.blocks.write()
    }

    /// Block at local coordinates.
    #[must_use]
    pub fn block(&self, x: usize, y: usize, z: usize) -> Block {
        self.blocks.read().get(x, y, z)
    }

    /// Height map level of a local column.
    #[must_use]
    pub fn height(&self, x: usize, z: usize) -> u8 {
        self.blocks.read().height(x, z)
    }

    // =========================================================================
    // PERSISTENCE
    // =========================================================================

    /// Copies the block array into a fresh `SIZE_IN_BYTES` buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.blocks.read().as_bytes().to_vec()
    }

    /// Copies the block array into `out`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBufferLength` unless `out` is exactly `SIZE_IN_BYTES`.
    pub fn write_bytes(&self, out: &mut [u8]) -> WorldResult<()> {
        if out.len() != SIZE_IN_BYTES {
            return Err(WorldError::InvalidBufferLength {
                expected: SIZE_IN_BYTES,
                actual: out.len(),
            });
        }
        out.copy_from_slice(self.blocks.read().as_bytes());
        Ok(())
    }

    /// Replaces the block array from a persisted buffer and rebuilds the
    /// height map.
    ///
    /// # Errors
    ///
    /// See [`ChunkBlocks::from_bytes`]. On error the chunk is unchanged.
    pub fn load_bytes(&self, bytes: &[u8]) -> WorldResult<()> {
        let parsed = ChunkBlocks::from_bytes(bytes)?;
        self.replace_blocks(parsed);
        Ok(())
    }

    /// Swaps in already validated block data.
    pub fn replace_blocks(&self, blocks: ChunkBlocks) {
        *self.blocks.write() = blocks;
    }

    // =========================================================================
    // SIMULATION FLAGS
    // =========================================================================

    /// True while water in this chunk may still spread.
    #[must_use]
    pub fn is_water_expanding(&self) -> bool {
        self.water_expanding.load(Ordering::Acquire)
    }

    /// Sets or clears the water flag.
    pub fn set_water_expanding(&self, value: bool) {
        self.water_expanding.store(value, Ordering::Release);
    }

    /// True while grass in this chunk may grow or die.
    #[must_use]
    pub fn is_grass_growing(&self) -> bool {
        self.grass_growing.load(Ordering::Acquire)
    }

    /// Sets or clears the grass flag.
    pub fn set_grass_growing(&self, value: bool) {
        self.grass_growing.store(value, Ordering::Release);
    }

    /// Clears the water flag, returning whether it was set. For the
    /// simulation tick.
    pub fn take_water_expanding(&self) -> bool {
        self.water_expanding.swap(false, Ordering::AcqRel)
    }

    /// Clears the grass flag, returning whether it was set.
    pub fn take_grass_growing(&self) -> bool {
        self.grass_growing.swap(false, Ordering::AcqRel)
    }

    // =========================================================================
    // LIGHT SOURCES
    // =========================================================================

    /// Registers a light source under `id`.
    pub fn insert_light_source(&self, id: ObjectId, light: LightSource) {
        self.light_sources.insert(id, light);
    }

    /// Removes a light source. `None` if another caller already removed it.
    pub fn remove_light_source(&self, id: ObjectId) -> Option<LightSource> {
        self.light_sources.remove(&id).map(|(_, light)| light)
    }

    /// Light source by id.
    #[must_use]
    pub fn light_source(&self, id: ObjectId) -> Option<LightSource> {
        self.light_sources.get(&id).map(|entry| *entry)
    }

    /// Number of light sources.
    #[must_use]
    pub fn light_source_count(&self) -> usize {
        self.light_sources.len()
    }

    /// Light sources whose coords truncate to `position`.
    #[must_use]
    pub fn light_sources_on(&self, position: Position) -> Vec<(ObjectId, LightSource)> {
        let mut found: Vec<_> = self
            .light_sources
            .iter()
            .filter(|entry| position.is_on_block(&entry.value().coords))
            .map(|entry| (*entry.key(), *entry.value()))
            .collect();
        found.sort_unstable_by_key(|(id, _)| *id);
        found
    }

    /// Removes every light source on `position`, optionally only those
    /// attached to `face`. Returns the ids this call removed.
    pub fn remove_light_sources_on(&self, position: Position, face: Option<Face>) -> Vec<ObjectId> {
        // Collect first: removing while iterating would deadlock the shard.
        self.light_sources_on(position)
            .into_iter()
            .filter(|(_, light)| face.map_or(true, |face| light.attached_to_face == face))
            .filter_map(|(id, _)| self.light_sources.remove(&id).map(|(id, _)| id))
            .collect()
    }

    // =========================================================================
    // DYNAMIC ITEMS
    // =========================================================================

    /// Registers a dynamic item under `id`.
    pub fn insert_item(&self, id: ObjectId, item: DynamicItem) {
        self.items.insert(id, item);
    }

    /// Removes a dynamic item. `None` if already removed.
    pub fn remove_item(&self, id: ObjectId) -> Option<DynamicItem> {
        self.items.remove(&id).map(|(_, item)| item)
    }

    /// Dynamic item by id.
    #[must_use]
    pub fn item(&self, id: ObjectId) -> Option<DynamicItem> {
        self.items.get(&id).map(|entry| *entry)
    }

    /// Applies `update` to an item in place. False if it is not here.
    pub fn update_item(&self, id: ObjectId, update: impl FnOnce(&mut DynamicItem)) -> bool {
        match self.items.get_mut(&id) {
            Some(mut entry) => {
                update(entry.value_mut());
                true
            }
            None => false,
        }
    }

    /// Number of dynamic items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Marks every resting item on `position` as falling. Returns how many
    /// started to fall.
    pub fn drop_items_on(&self, position: Position) -> usize {
        let mut started = 0;
        for mut entry in self.items.iter_mut() {
            let item = entry.value_mut();
            if !item.is_moving && position.is_on_block(&item.coords) {
                item.is_moving = true;
                started += 1;
            }
        }
        started
    }
}

impl std::fmt::Debug for Chunk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chunk")
            .field("coords", &self.coords)
            .field("light_sources", &self.light_sources.len())
            .field("items", &self.items.len())
            .field("water_expanding", &self.is_water_expanding())
            .field("grass_growing", &self.is_grass_growing())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid() -> Block {
        Block::new(BlockType::Rock)
    }

    #[test]
    fn test_height_map_rises_with_opaque_blocks() {
        let mut blocks = ChunkBlocks::new();
        blocks.set(3, 10, 4, solid());
        assert_eq!(blocks.height(3, 4), 10);
        blocks.set(3, 5, 4, solid());
        assert_eq!(blocks.height(3, 4), 10);
        blocks.set(3, 20, 4, solid());
        assert_eq!(blocks.height(3, 4), 20);
    }

    #[test]
    fn test_height_map_ignores_transparent_blocks() {
        let mut blocks = ChunkBlocks::new();
        blocks.set(1, 8, 1, solid());
        blocks.set(1, 30, 1, Block::new(BlockType::Water));
        blocks.set(1, 31, 1, Block::new(BlockType::Glass));
        assert_eq!(blocks.height(1, 1), 8);
    }

    #[test]
    fn test_height_map_drops_when_top_removed() {
        let mut blocks = ChunkBlocks::new();
        blocks.set(2, 4, 2, solid());
        blocks.set(2, 9, 2, solid());
        blocks.set(2, 9, 2, Block::AIR);
        assert_eq!(blocks.height(2, 2), 4);
        blocks.set(2, 4, 2, Block::new(BlockType::Leaves));
        assert_eq!(blocks.height(2, 2), 0);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut blocks = ChunkBlocks::new();
        blocks.set(SIZE, 0, 0, solid());
        blocks.set(0, HEIGHT, 0, solid());
        assert_eq!(blocks.get(SIZE, 0, 0), Block::AIR);
        assert_eq!(blocks, ChunkBlocks::new());
    }

    #[test]
    fn test_bytes_roundtrip_rebuilds_height_map() {
        let mut blocks = ChunkBlocks::new();
        blocks.set(0, 0, 0, solid());
        blocks.set(31, 40, 31, Block::new(BlockType::Dirt).mark_dirty());
        blocks.set(5, 50, 6, Block::new(BlockType::Water));

        let chunk = Chunk::with_blocks(ChunkCoords::new(1, 2), blocks.clone());
        let bytes = chunk.to_bytes();
        assert_eq!(bytes.len(), SIZE_IN_BYTES);

        let loaded = Chunk::new(ChunkCoords::new(1, 2));
        loaded.load_bytes(&bytes).unwrap();
        assert_eq!(*loaded.blocks(), blocks);
        assert_eq!(loaded.height(31, 31), 40);
        assert_eq!(loaded.height(5, 6), 0);
        assert!(loaded.block(31, 40, 31).is_dirty());
    }

    #[test]
    fn test_load_rejects_wrong_length_without_mutating() {
        let chunk = Chunk::new(ChunkCoords::new(0, 0));
        chunk.blocks_mut().set(1, 1, 1, solid());
        let err = chunk.load_bytes(&[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            WorldError::InvalidBufferLength {
                expected: SIZE_IN_BYTES,
                actual: 10
            }
        ));
        assert_eq!(chunk.block(1, 1, 1), solid());
    }

    #[test]
    fn test_load_rejects_unknown_block_type() {
        let mut bytes = vec![0u8; SIZE_IN_BYTES];
        bytes[20..22].copy_from_slice(&0x03FFu16.to_ne_bytes());
        let err = ChunkBlocks::from_bytes(&bytes).unwrap_err();
        assert!(matches!(err, WorldError::UnknownBlockType { id: 0x3FF, index: 10 }));
    }

    #[test]
    fn test_write_bytes_requires_exact_buffer() {
        let chunk = Chunk::new(ChunkCoords::new(0, 0));
        let mut short = vec![0u8; SIZE_IN_BYTES - 1];
        assert!(chunk.write_bytes(&mut short).is_err());
        let mut exact = vec![0xFFu8; SIZE_IN_BYTES];
        chunk.write_bytes(&mut exact).unwrap();
        assert!(exact.iter().all(|b| *b == 0));
    }

    #[test]
    fn test_flags_take_clears() {
        let chunk = Chunk::new(ChunkCoords::new(0, 0));
        assert!(!chunk.take_grass_growing());
        chunk.set_grass_growing(true);
        chunk.set_grass_growing(true);
        assert!(chunk.is_grass_growing());
        assert!(chunk.take_grass_growing());
        assert!(!chunk.is_grass_growing());

        chunk.set_water_expanding(true);
        assert!(chunk.take_water_expanding());
        assert!(!chunk.is_water_expanding());
    }

    #[test]
    fn test_light_source_removal_by_block_and_face() {
        let chunk = Chunk::new(ChunkCoords::new(0, 0));
        let torch = |x: f32, face| LightSource {
            coords: Coords::new(x, 5.5, 3.2),
            attached_to_face: face,
            kind: LightSourceType::Torch,
        };
        chunk.insert_light_source(1, torch(2.1, Face::Left));
        chunk.insert_light_source(2, torch(2.9, Face::Top));
        chunk.insert_light_source(3, torch(3.5, Face::Left));

        let target = Position::new(2, 5, 3);
        assert_eq!(chunk.light_sources_on(target).len(), 2);
        assert_eq!(chunk.remove_light_sources_on(target, Some(Face::Top)), vec![2]);
        assert!(chunk.light_source(2).is_none());
        assert_eq!(chunk.remove_light_sources_on(target, None), vec![1]);
        assert_eq!(chunk.light_source_count(), 1);
        assert!(chunk.light_source(3).is_some());
    }

    #[test]
    fn test_double_remove_is_not_an_error() {
        let chunk = Chunk::new(ChunkCoords::new(0, 0));
        chunk.insert_item(9, DynamicItem::new(Coords::new(1.0, 2.0, 3.0), ItemKind::Tool));
        assert!(chunk.remove_item(9).is_some());
        assert!(chunk.remove_item(9).is_none());
    }

    #[test]
    fn test_drop_items_on_skips_moving_items() {
        let chunk = Chunk::new(ChunkCoords::new(0, 0));
        chunk.insert_item(1, DynamicItem::new(Coords::new(4.5, 7.0, 4.5), ItemKind::Tool));
        let mut falling = DynamicItem::new(Coords::new(4.2, 7.9, 4.8), ItemKind::Projectile);
        falling.is_moving = true;
        chunk.insert_item(2, falling);
        chunk.insert_item(3, DynamicItem::new(Coords::new(4.5, 8.0, 4.5), ItemKind::Tool));

        assert_eq!(chunk.drop_items_on(Position::new(4, 7, 4)), 1);
        assert!(chunk.item(1).unwrap().is_moving);
        assert!(!chunk.item(3).unwrap().is_moving);
    }
}
