//! # HEXVALE World Core
//!
//! The authoritative block world: deterministic terrain, chunk storage and
//! the block mutation engine.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: same seed always produces the same world
//! 2. **Chunked**: the world is a fixed grid of `32 x 96 x 32` chunks
//! 3. **Concurrent**: every operation is safe from many threads at once
//! 4. **Safe no-ops**: invalid placements do nothing, queries return errors
//!
//! ## Core Components
//!
//! - `PerlinNoise`: seeded height noise
//! - `TerrainGenerator`: fills chunks from noise
//! - `Chunk`: blocks, height map, lights, items, simulation flags
//! - `World`: chunk grid, interest table, light volume, object ids
//! - `World::place_block` / `World::place_cuboid`: the mutation engine
//!
//! ## Example
//!
//! ```rust,ignore
//! use hexvale_world::{BlockType, Position, World, WorldConfig};
//!
//! let world = World::new(WorldConfig::default())?;
//! world.generate_all();
//!
//! let events = world.subscribe();
//! world.place_block(Position::new(100, 40, 100), BlockType::Bricks);
//! for event in events.try_iter() {
//!     println!("{event:?}");
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod block;
pub mod chunk;
pub mod config;
pub mod error;
pub mod events;
pub mod generator;
pub mod lighting;
pub mod mutation;
pub mod noise;
pub mod world;

pub use block::{Block, BlockType};
pub use chunk::{
    Chunk, ChunkBlocks, DynamicItem, ItemKind, LightSource, LightSourceType, ObjectId, BLOCKS_PER_CHUNK,
    SIZE_IN_BYTES,
};
pub use config::{GeneratorConfig, WorldConfig, WorldType, PLAYER_HEADROOM};
pub use error::{ConfigError, WorldError, WorldResult};
pub use events::WorldEvent;
pub use generator::TerrainGenerator;
pub use lighting::{LightVolume, MAX_LIGHT};
pub use mutation::{PlaceMode, Placement};
pub use noise::{NoiseMap, NoiseRegion, PerlinNoise, WorldSeed};
pub use world::{SubscriberId, World, MAX_PLAYER_Y};

pub use hexvale_shared::{ChunkCoords, Coords, Face, Facing, Position, CHUNK_HEIGHT, CHUNK_SIZE};
