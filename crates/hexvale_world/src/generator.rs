//! # Terrain Generator
//!
//! Turns the seeded height noise into chunk contents. One noise sample
//! per column; the column is then filled bottom-up:
//!
//! ```text
//! water_level ~~~~~~~~~~  Water (only over low columns)
//! surface     [top]       Grass / Snow / Sand by world type, Sand underwater
//! surface-3   [sub]       Dirt (Sand in deserts)
//! 1..         [Rock]
//! 0           [Rock]      floor
//! ```
//!
//! Same seed, same config: same chunk, always.

use tracing::debug;

use hexvale_shared::{ChunkCoords, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::block::{Block, BlockType};
use crate::chunk::{Chunk, ChunkBlocks};
use crate::config::{GeneratorConfig, WorldType};
use crate::noise::{NoiseMap, NoiseRegion, PerlinNoise, WorldSeed};

/// Depth of the sub-surface layer.
const SUBSOIL_DEPTH: i32 = 3;

/// Deterministic chunk generator.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    noise: PerlinNoise,
    world_type: WorldType,
    config: GeneratorConfig,
}

impl TerrainGenerator {
    /// Creates a generator for one world.
    #[must_use]
    pub fn new(seed: WorldSeed, world_type: WorldType, config: GeneratorConfig) -> Self {
        Self {
            noise: PerlinNoise::new(seed, config.unit_size),
            world_type,
            config,
        }
    }

    /// The underlying noise.
    #[must_use]
    pub const fn noise(&self) -> &PerlinNoise {
        &self.noise
    }

    /// Surface height for every column of a chunk, in world coordinates.
    #[must_use]
    pub fn surface_heights(&self, coords: ChunkCoords) -> NoiseMap<i32> {
        let min_x = coords.world_x();
        let min_z = coords.world_z();
        let region = NoiseRegion::new(
            min_x,
            min_x + CHUNK_SIZE,
            min_z,
            min_z + CHUNK_SIZE,
            self.config.max_surface_height - self.config.min_surface_height,
        );
        self.noise
            .get_int_map(region, self.config.octave_count, self.config.persistence)
    }

    /// Generates one chunk.
    #[must_use]
    #[allow(clippy::cast_sign_loss)]
    pub fn generate(&self, coords: ChunkCoords) -> Chunk {
        let heights = self.surface_heights(coords);
        let mut blocks = ChunkBlocks::new();

        for local_z in 0..CHUNK_SIZE {
            for local_x in 0..CHUNK_SIZE {
                let offset = heights
                    .get(coords.world_x() + local_x, coords.world_z() + local_z)
                    .unwrap_or(0);
                let surface = (self.config.min_surface_height + offset)
                    .clamp(self.config.min_surface_height, self.config.max_surface_height);
                self.fill_column(&mut blocks, local_x as usize, local_z as usize, surface);
            }
        }

        debug!("Generated chunk {}", coords);
        Chunk::with_blocks(coords, blocks)
    }

    #[allow(clippy::cast_sign_loss)]
    fn fill_column(&self, blocks: &mut ChunkBlocks, x: usize, z: usize, surface: i32) {
        let submerged = surface < self.config.water_level;
        let (top, subsoil) = match self.world_type {
            WorldType::Grass => (BlockType::Grass, BlockType::Dirt),
            WorldType::Winter => (BlockType::Snow, BlockType::Dirt),
            WorldType::Desert => (BlockType::Sand, BlockType::Sand),
        };
        let top = if submerged { BlockType::Sand } else { top };

        let water_top = self.config.water_level.min(CHUNK_HEIGHT - 1);
        let column_top = surface.max(water_top);
        for y in 0..=column_top {
            let block_type = if y == 0 || y < surface - SUBSOIL_DEPTH {
                BlockType::Rock
            } else if y < surface {
                subsoil
            } else if y == surface {
                top
            } else {
                BlockType::Water
            };
            blocks.set(x, y as usize, z, Block::new(block_type));
        }
    }
}
