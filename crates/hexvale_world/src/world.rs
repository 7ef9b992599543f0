//! # World Facade
//!
//! The single authority for "what block is at this coordinate" and "who
//! wants this chunk kept loaded".
//!
//! ## Ownership
//!
//! A `World` is an explicit context object. Collaborators hold `&World` (or
//! an `Arc<World>`); there is no process-wide instance, so tests build as
//! many isolated worlds as they like.
//!
//! ## Concurrency
//!
//! | State              | Guard                                   |
//! |--------------------|-----------------------------------------|
//! | chunk grid         | `OnceCell` per slot (lazy, init once)   |
//! | blocks/height map  | `RwLock` per chunk                      |
//! | lights/items       | `DashMap` per chunk                     |
//! | chunk flags        | `AtomicBool` per chunk                  |
//! | interest table     | one `Mutex`                             |
//! | object ids         | `AtomicU32`                             |
//!
//! No operation holds two chunk locks at once.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Instant;

use crossbeam_channel::Receiver;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use hexvale_shared::{ChunkCoords, Coords, Face, Position, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::block::{Block, BlockType};
use crate::chunk::{Chunk, ChunkBlocks, DynamicItem, LightSource, ObjectId};
use crate::config::{WorldConfig, WorldType};
use crate::error::{ConfigError, WorldError, WorldResult};
use crate::events::{EventBus, WorldEvent};
use crate::generator::TerrainGenerator;
use crate::lighting::LightVolume;
use crate::noise::WorldSeed;

/// Identifies a party interested in keeping chunks loaded (usually a
/// connection).
pub type SubscriberId = u32;

/// Players above this height are never in a valid location.
pub const MAX_PLAYER_Y: f32 = 600.0;

/// The block world.
pub struct World {
    config: WorldConfig,
    size_in_chunks_x: i32,
    size_in_chunks_z: i32,
    /// Indexed `x * size_in_chunks_z + z`.
    chunks: Box<[OnceCell<Chunk>]>,
    populated: AtomicUsize,
    generator: TerrainGenerator,
    light: LightVolume,
    interest: Mutex<HashMap<ChunkCoords, HashSet<SubscriberId>>>,
    light_index: DashMap<ObjectId, ChunkCoords>,
    item_index: DashMap<ObjectId, ChunkCoords>,
    object_id_seq: AtomicU32,
    pub(crate) events: EventBus,
}

impl World {
    /// Creates a world. No chunk is generated until it is first touched or
    /// [`World::generate_all`] runs.
    ///
    /// # Errors
    ///
    /// Returns `WorldError::Config` if the config does not validate.
    #[allow(clippy::cast_sign_loss)]
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        config.validate()?;

        let invalid_size = || ConfigError::InvalidWorldSize {
            x: config.size_in_chunks_x,
            z: config.size_in_chunks_z,
        };
        let size_x = i32::try_from(config.size_in_chunks_x).map_err(|_| invalid_size())?;
        let size_z = i32::try_from(config.size_in_chunks_z).map_err(|_| invalid_size())?;
        let blocks_x = size_x.checked_mul(CHUNK_SIZE).ok_or_else(invalid_size)?;
        let blocks_z = size_z.checked_mul(CHUNK_SIZE).ok_or_else(invalid_size)?;

        let chunk_count = size_x as usize * size_z as usize;
        let generator = TerrainGenerator::new(
            WorldSeed::new(config.raw_seed),
            config.world_type,
            config.generator.clone(),
        );

        Ok(Self {
            size_in_chunks_x: size_x,
            size_in_chunks_z: size_z,
            chunks: (0..chunk_count).map(|_| OnceCell::new()).collect(),
            populated: AtomicUsize::new(0),
            generator,
            light: LightVolume::new(blocks_x as usize, blocks_z as usize),
            interest: Mutex::new(HashMap::new()),
            light_index: DashMap::new(),
            item_index: DashMap::new(),
            object_id_seq: AtomicU32::new(config.object_id_seq),
            events: EventBus::default(),
            config,
        })
    }

    // =========================================================================
    // SETTINGS AND BOUNDS
    // =========================================================================

    /// Settings this world was created with.
    #[must_use]
    pub const fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Environment type.
    #[must_use]
    pub const fn world_type(&self) -> WorldType {
        self.config.world_type
    }

    /// Seed feeding the terrain noise.
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        WorldSeed::new(self.config.raw_seed)
    }

    /// Terrain generator.
    #[must_use]
    pub const fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Chunks along X.
    #[must_use]
    pub const fn size_in_chunks_x(&self) -> i32 {
        self.size_in_chunks_x
    }

    /// Chunks along Z.
    #[must_use]
    pub const fn size_in_chunks_z(&self) -> i32 {
        self.size_in_chunks_z
    }

    /// Blocks along X.
    #[must_use]
    pub const fn size_in_blocks_x(&self) -> i32 {
        self.size_in_chunks_x * CHUNK_SIZE
    }

    /// Blocks along Z.
    #[must_use]
    pub const fn size_in_blocks_z(&self) -> i32 {
        self.size_in_chunks_z * CHUNK_SIZE
    }

    /// Total chunks in the world.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// True once every chunk has been generated or bulk loaded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.populated.load(Ordering::Acquire) == self.chunks.len()
    }

    /// `0 <= x < size_x`, `0 <= y < CHUNK_HEIGHT`, `0 <= z < size_z`.
    #[inline]
    #[must_use]
    pub const fn is_valid_block_location(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && x < self.size_in_blocks_x()
            && y >= 0
            && y < CHUNK_HEIGHT
            && z >= 0
            && z < self.size_in_blocks_z()
    }

    /// See [`World::is_valid_block_location`].
    #[inline]
    #[must_use]
    pub const fn is_valid_position(&self, position: Position) -> bool {
        self.is_valid_block_location(position.x, position.y, position.z)
    }

    /// Inside the world horizontally and not below the floor. Items may be
    /// above the chunk height.
    #[must_use]
    pub fn is_valid_item_location(&self, coords: &Coords) -> bool {
        self.is_valid_block_location(coords.x_block(), 0, coords.z_block()) && coords.y >= 0.0
    }

    /// True if a player standing at `coords` does not overlap a solid block.
    ///
    /// The player occupies the block at their feet and the two above. The
    /// third block is ignored while the feet are less than
    /// `player_headroom` into their block.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn is_valid_player_location(&self, coords: &Coords) -> bool {
        let height = CHUNK_HEIGHT as f32;
        let inside = coords.x >= 0.0
            && coords.x < self.size_in_blocks_x() as f32
            && coords.y >= 0.0
            && coords.y <= MAX_PLAYER_Y
            && coords.z >= 0.0
            && coords.z < self.size_in_blocks_z() as f32;
        if !inside {
            return false;
        }

        let feet = coords.to_position();
        let blocked = |offset: i32| {
            self.get_block(Position::new(feet.x, feet.y + offset, feet.z))
                .map_or(false, Block::is_solid)
        };
        (coords.y >= height || !blocked(0))
            && (coords.y + 1.0 >= height || !blocked(1))
            && (coords.y % 1.0 < self.config.player_headroom || coords.y + 2.0 >= height || !blocked(2))
    }

    /// True if the column is on the edge of its chunk.
    #[must_use]
    pub const fn is_on_chunk_border(x: i32, z: i32) -> bool {
        Position::new(x, 0, z).is_on_chunk_border()
    }

    /// Face-adjacent positions paired with the face they lie across, in the
    /// order left, right, front, back, top, bottom. Positions outside the
    /// world or at `y < 1` are left out.
    #[must_use]
    pub fn adjacent_position_faces(&self, position: Position) -> Vec<(Position, Face)> {
        Face::ALL
            .iter()
            .map(|&face| (position.adjacent(face), face))
            .filter(|(adjacent, _)| adjacent.y >= 1 && self.is_valid_position(*adjacent))
            .collect()
    }

    /// Positions from [`World::adjacent_position_faces`].
    #[must_use]
    pub fn adjacent_positions(&self, position: Position) -> Vec<Position> {
        self.adjacent_position_faces(position)
            .into_iter()
            .map(|(adjacent, _)| adjacent)
            .collect()
    }

    /// Chunks `position` borders: at most one per axis, none past the
    /// world edge.
    #[must_use]
    pub fn border_chunk_coords(&self, position: Position) -> Vec<ChunkCoords> {
        let mut found = Vec::with_capacity(2);
        if !self.is_valid_position(position) {
            return found;
        }
        let chunk = position.chunk_coords();
        let local_x = position.local_x();
        let local_z = position.local_z();

        if position.x > 0 && local_x == 0 {
            found.push(ChunkCoords::new(chunk.x - 1, chunk.z));
        } else if position.x < self.size_in_blocks_x() - 1 && local_x == CHUNK_SIZE - 1 {
            found.push(ChunkCoords::new(chunk.x + 1, chunk.z));
        }

        if position.z > 0 && local_z == 0 {
            found.push(ChunkCoords::new(chunk.x, chunk.z - 1));
        } else if position.z < self.size_in_blocks_z() - 1 && local_z == CHUNK_SIZE - 1 {
            found.push(ChunkCoords::new(chunk.x, chunk.z + 1));
        }
        found
    }

    /// Chunks from [`World::border_chunk_coords`].
    #[must_use]
    pub fn border_chunks(&self, position: Position) -> Vec<&Chunk> {
        self.border_chunk_coords(position)
            .into_iter()
            .filter_map(|coords| self.chunk(coords).ok())
            .collect()
    }

    // =========================================================================
    // CHUNK STORE
    // =========================================================================

    #[allow(clippy::cast_sign_loss)]
    fn chunk_slot(&self, coords: ChunkCoords) -> Option<usize> {
        let inside = coords.x >= 0
            && coords.x < self.size_in_chunks_x
            && coords.z >= 0
            && coords.z < self.size_in_chunks_z;
        inside.then(|| coords.x as usize * self.size_in_chunks_z as usize + coords.z as usize)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn slot_coords(&self, slot: usize) -> ChunkCoords {
        let depth = self.size_in_chunks_z as usize;
        ChunkCoords::new((slot / depth) as i32, (slot % depth) as i32)
    }

    fn init_slot(&self, slot: usize, make: impl FnOnce(ChunkCoords) -> Chunk) -> &Chunk {
        self.chunks[slot].get_or_init(|| {
            let chunk = make(self.slot_coords(slot));
            self.light.reset_sky_light(&chunk);
            self.populated.fetch_add(1, Ordering::AcqRel);
            chunk
        })
    }

    fn chunk_in_slot(&self, slot: usize) -> &Chunk {
        self.init_slot(slot, |coords| {
            debug!("Generating chunk {} on first access", coords);
            self.generator.generate(coords)
        })
    }

    /// The chunk at `coords`, generating it on first access.
    ///
    /// # Errors
    ///
    /// Returns `ChunkOutOfBounds` outside the world.
    pub fn chunk(&self, coords: ChunkCoords) -> WorldResult<&Chunk> {
        self.chunk_slot(coords)
            .map(|slot| self.chunk_in_slot(slot))
            .ok_or(WorldError::ChunkOutOfBounds(coords))
    }

    /// True if the chunk has been generated or loaded.
    #[must_use]
    pub fn is_chunk_loaded(&self, coords: ChunkCoords) -> bool {
        self.chunk_slot(coords)
            .map_or(false, |slot| self.chunks[slot].get().is_some())
    }

    /// Chunk owning a valid block position.
    pub(crate) fn chunk_of(&self, position: Position) -> Option<&Chunk> {
        if self.is_valid_position(position) {
            self.chunk(position.chunk_coords()).ok()
        } else {
            None
        }
    }

    /// Block type at `position`, `None` outside the world.
    pub(crate) fn block_type_at(&self, position: Position) -> Option<BlockType> {
        self.get_block(position).ok().map(Block::block_type)
    }

    /// Block at a world position.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` for positions failing
    /// [`World::is_valid_block_location`].
    #[allow(clippy::cast_sign_loss)]
    pub fn get_block(&self, position: Position) -> WorldResult<Block> {
        let chunk = self.chunk_of(position).ok_or(WorldError::OutOfBounds {
            x: position.x,
            y: position.y,
            z: position.z,
        })?;
        Ok(chunk.block(
            position.local_x() as usize,
            position.y as usize,
            position.local_z() as usize,
        ))
    }

    /// See [`World::get_block`].
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` outside the world.
    pub fn get_block_xyz(&self, x: i32, y: i32, z: i32) -> WorldResult<Block> {
        self.get_block(Position::new(x, y, z))
    }

    /// Height map level of world column `(x, z)`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` outside the world.
    #[allow(clippy::cast_sign_loss)]
    pub fn get_height_map_level(&self, x: i32, z: i32) -> WorldResult<i32> {
        let position = Position::new(x, 0, z);
        let chunk = self
            .chunk_of(position)
            .ok_or(WorldError::OutOfBounds { x, y: 0, z })?;
        Ok(i32::from(
            chunk.height(position.local_x() as usize, position.local_z() as usize),
        ))
    }

    /// True if any of the 4 horizontal neighbours of `(x, y, z)` is at or
    /// above its column's height map level.
    #[must_use]
    pub fn has_adjacent_block_receiving_direct_sunlight(&self, x: i32, y: i32, z: i32) -> bool {
        [(1, 0), (-1, 0), (0, 1), (0, -1)].iter().any(|&(dx, dz)| {
            self.get_height_map_level(x + dx, z + dz)
                .map_or(false, |level| level <= y)
        })
    }

    // =========================================================================
    // INTEREST TABLE
    // =========================================================================

    /// Returns the chunk and pins it for `subscriber`. Registering twice is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ChunkOutOfBounds` outside the world.
    pub fn get_chunk(&self, coords: ChunkCoords, subscriber: SubscriberId) -> WorldResult<&Chunk> {
        let chunk = self.chunk(coords)?;
        self.interest.lock().entry(coords).or_default().insert(subscriber);
        Ok(chunk)
    }

    /// Drops `subscriber`'s interest in a chunk. Returns true if this left
    /// the chunk with no subscribers.
    pub fn chunk_ignore(&self, coords: ChunkCoords, subscriber: SubscriberId) -> bool {
        let mut interest = self.interest.lock();
        let Some(subscribers) = interest.get_mut(&coords) else {
            return false;
        };
        if !subscribers.remove(&subscriber) {
            return false;
        }
        if subscribers.is_empty() {
            interest.remove(&coords);
            return true;
        }
        false
    }

    /// Subscribers pinning a chunk, ascending.
    #[must_use]
    pub fn subscribers(&self, coords: ChunkCoords) -> Vec<SubscriberId> {
        let mut found: Vec<_> = self
            .interest
            .lock()
            .get(&coords)
            .map(|subscribers| subscribers.iter().copied().collect())
            .unwrap_or_default();
        found.sort_unstable();
        found
    }

    /// True if at least one subscriber pins the chunk.
    #[must_use]
    pub fn is_chunk_pinned(&self, coords: ChunkCoords) -> bool {
        self.interest.lock().contains_key(&coords)
    }

    /// Loaded chunks nobody pins. Eviction candidates.
    #[must_use]
    pub fn unpinned_loaded_chunks(&self) -> Vec<ChunkCoords> {
        let interest = self.interest.lock();
        (0..self.chunks.len())
            .filter(|&slot| self.chunks[slot].get().is_some())
            .map(|slot| self.slot_coords(slot))
            .filter(|coords| !interest.contains_key(coords))
            .collect()
    }

    // =========================================================================
    // GENERATION AND PERSISTENCE
    // =========================================================================

    /// Generates every chunk not yet populated, one rayon task per chunk.
    pub fn generate_all(&self) {
        let start = Instant::now();
        (0..self.chunks.len()).into_par_iter().for_each(|slot| {
            self.chunk_in_slot(slot);
        });
        info!(
            "Generated {} chunks in {:?} (seed {})",
            self.chunks.len(),
            start.elapsed(),
            self.config.raw_seed
        );
    }

    /// Every chunk's block buffer, ordered x-major then z. Chunks never
    /// touched are generated first.
    #[must_use]
    pub fn save_chunks(&self) -> Vec<Vec<u8>> {
        let start = Instant::now();
        let buffers: Vec<Vec<u8>> = (0..self.chunks.len())
            .into_par_iter()
            .map(|slot| self.chunk_in_slot(slot).to_bytes())
            .collect();
        info!("Saved {} chunks in {:?}", buffers.len(), start.elapsed());
        buffers
    }

    /// Replaces every chunk from persisted buffers, ordered as
    /// [`World::save_chunks`] writes them.
    ///
    /// Every buffer is validated before any chunk changes.
    ///
    /// # Errors
    ///
    /// `ChunkCountMismatch`, `InvalidBufferLength` or `UnknownBlockType`.
    /// On error no chunk was modified.
    pub fn load_chunks<B>(&self, buffers: &[B]) -> WorldResult<()>
    where
        B: AsRef<[u8]> + Sync,
    {
        let start = Instant::now();
        if buffers.len() != self.chunks.len() {
            warn!(
                "Rejected chunk load: {} buffers for {} chunks",
                buffers.len(),
                self.chunks.len()
            );
            return Err(WorldError::ChunkCountMismatch {
                expected: self.chunks.len(),
                actual: buffers.len(),
            });
        }

        let parsed: Vec<ChunkBlocks> = buffers
            .par_iter()
            .map(|buffer| ChunkBlocks::from_bytes(buffer.as_ref()))
            .collect::<WorldResult<_>>()
            .map_err(|err| {
                warn!("Rejected chunk load: {}", err);
                err
            })?;

        parsed.into_par_iter().enumerate().for_each(|(slot, blocks)| {
            let chunk = self.init_slot(slot, Chunk::new);
            chunk.replace_blocks(blocks);
            self.light.reset_sky_light(chunk);
        });

        info!("Loaded {} chunks in {:?}", self.chunks.len(), start.elapsed());
        Ok(())
    }

    // =========================================================================
    // LIGHT
    // =========================================================================

    /// Sky and item light for the whole world.
    #[must_use]
    pub const fn light_volume(&self) -> &LightVolume {
        &self.light
    }

    /// Sky light at a block.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` outside the world.
    pub fn sky_light(&self, position: Position) -> WorldResult<u8> {
        self.light.sky_light(position).ok_or(WorldError::OutOfBounds {
            x: position.x,
            y: position.y,
            z: position.z,
        })
    }

    /// Item light at a block.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` outside the world.
    pub fn item_light(&self, position: Position) -> WorldResult<u8> {
        self.light.item_light(position).ok_or(WorldError::OutOfBounds {
            x: position.x,
            y: position.y,
            z: position.z,
        })
    }

    /// Reseeds sky light for one chunk from its height map.
    ///
    /// # Errors
    ///
    /// Returns `ChunkOutOfBounds` outside the world.
    pub fn reset_sky_light(&self, coords: ChunkCoords) -> WorldResult<()> {
        let chunk = self.chunk(coords)?;
        self.light.reset_sky_light(chunk);
        Ok(())
    }

    // =========================================================================
    // OBJECTS
    // =========================================================================

    /// Hands out the next object id. Ids are never reused.
    ///
    /// # Errors
    ///
    /// Returns `ObjectIdsExhausted` once the sequence reaches `u32::MAX`.
    pub fn next_object_id(&self) -> WorldResult<ObjectId> {
        self.object_id_seq
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |id| id.checked_add(1))
            .map_err(|_| WorldError::ObjectIdsExhausted)
    }

    /// The id the next call to [`World::next_object_id`] returns. Persist
    /// this as `object_id_seq`.
    #[must_use]
    pub fn object_id_seq(&self) -> ObjectId {
        self.object_id_seq.load(Ordering::Relaxed)
    }

    /// Attaches a light source to the chunk containing its coords.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if the coords are not a valid block location,
    /// `ObjectIdsExhausted` if no id is left.
    pub fn add_light_source(&self, light: LightSource) -> WorldResult<ObjectId> {
        let position = light.coords.to_position();
        let chunk = self.chunk_of(position).ok_or(WorldError::OutOfBounds {
            x: position.x,
            y: position.y,
            z: position.z,
        })?;
        let id = self.next_object_id()?;
        // Index before chunk: a placement that removes the light right after
        // insertion must find the index entry to forget.
        self.light_index.insert(id, chunk.coords());
        chunk.insert_light_source(id, light);
        Ok(id)
    }

    /// Removes a light source.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if it is gone already.
    pub fn remove_light_source(&self, id: ObjectId) -> WorldResult<LightSource> {
        let (_, coords) = self
            .light_index
            .remove(&id)
            .ok_or(WorldError::ObjectNotFound(id))?;
        self.chunk(coords)?
            .remove_light_source(id)
            .ok_or(WorldError::ObjectNotFound(id))
    }

    /// Light source by id.
    #[must_use]
    pub fn light_source(&self, id: ObjectId) -> Option<LightSource> {
        let coords = *self.light_index.get(&id)?;
        self.chunk(coords).ok()?.light_source(id)
    }

    /// Light sources whose coords truncate to `position`.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` outside the world.
    pub fn light_sources_on(&self, position: Position) -> WorldResult<Vec<(ObjectId, LightSource)>> {
        let chunk = self.chunk_of(position).ok_or(WorldError::OutOfBounds {
            x: position.x,
            y: position.y,
            z: position.z,
        })?;
        Ok(chunk.light_sources_on(position))
    }

    pub(crate) fn forget_light_sources(&self, ids: &[ObjectId]) {
        for id in ids {
            self.light_index.remove(id);
        }
    }

    /// Adds a dynamic item to the chunk containing its coords.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBounds` if [`World::is_valid_item_location`] fails,
    /// `ObjectIdsExhausted` if no id is left.
    pub fn add_dynamic_item(&self, item: DynamicItem) -> WorldResult<ObjectId> {
        let coords = self.item_chunk(&item.coords)?;
        let chunk = self.chunk(coords)?;
        let id = self.next_object_id()?;
        self.item_index.insert(id, coords);
        chunk.insert_item(id, item);
        Ok(id)
    }

    /// Removes a dynamic item.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` if it is gone already.
    pub fn remove_dynamic_item(&self, id: ObjectId) -> WorldResult<DynamicItem> {
        let (_, coords) = self
            .item_index
            .remove(&id)
            .ok_or(WorldError::ObjectNotFound(id))?;
        self.chunk(coords)?
            .remove_item(id)
            .ok_or(WorldError::ObjectNotFound(id))
    }

    /// Dynamic item by id.
    #[must_use]
    pub fn dynamic_item(&self, id: ObjectId) -> Option<DynamicItem> {
        let coords = *self.item_index.get(&id)?;
        self.chunk(coords).ok()?.item(id)
    }

    /// Moves a dynamic item, re-homing it when it crosses into another
    /// chunk.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` for an invalid destination, `ObjectNotFound` for an
    /// unknown id.
    pub fn move_dynamic_item(&self, id: ObjectId, coords: Coords) -> WorldResult<()> {
        let target = self.item_chunk(&coords)?;
        // The index entry stays locked for the whole move.
        let mut entry = self
            .item_index
            .get_mut(&id)
            .ok_or(WorldError::ObjectNotFound(id))?;
        let current = *entry;
        let source = self.chunk(current)?;

        if current == target {
            if source.update_item(id, |item| item.coords = coords) {
                return Ok(());
            }
            return Err(WorldError::ObjectNotFound(id));
        }

        let mut item = source.remove_item(id).ok_or(WorldError::ObjectNotFound(id))?;
        item.coords = coords;
        self.chunk(target)?.insert_item(id, item);
        *entry = target;
        Ok(())
    }

    /// Sets or clears an item's falling flag.
    ///
    /// # Errors
    ///
    /// Returns `ObjectNotFound` for an unknown id.
    pub fn set_dynamic_item_moving(&self, id: ObjectId, is_moving: bool) -> WorldResult<()> {
        let coords = *self
            .item_index
            .get(&id)
            .ok_or(WorldError::ObjectNotFound(id))?;
        if self.chunk(coords)?.update_item(id, |item| item.is_moving = is_moving) {
            Ok(())
        } else {
            Err(WorldError::ObjectNotFound(id))
        }
    }

    fn item_chunk(&self, coords: &Coords) -> WorldResult<ChunkCoords> {
        if self.is_valid_item_location(coords) {
            Ok(ChunkCoords::from_block(coords.x_block(), coords.z_block()))
        } else {
            Err(WorldError::OutOfBounds {
                x: coords.x_block(),
                y: coords.y_block(),
                z: coords.z_block(),
            })
        }
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    /// New receiver for every subsequent [`WorldEvent`].
    pub fn subscribe(&self) -> Receiver<WorldEvent> {
        self.events.subscribe()
    }

    /// Live event receivers, as of the last publish.
    #[must_use]
    pub fn event_subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("world_type", &self.config.world_type)
            .field("raw_seed", &self.config.raw_seed)
            .field("size_in_chunks_x", &self.size_in_chunks_x)
            .field("size_in_chunks_z", &self.size_in_chunks_z)
            .field("populated", &self.populated.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
