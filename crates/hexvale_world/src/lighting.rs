//! # Light Volume
//!
//! Two byte grids covering every world block: sky light and item light,
//! each 0 (dark) to 15 (full). The renderer reads them; the world only
//! stores values and reseeds sky light per column from the height map.
//! Propagation beyond that seed is left to the lighting pass.
//!
//! Storage is one slab per chunk, each behind its own locks, so reseeding
//! a chunk never waits on readers or writers of another chunk.

use parking_lot::RwLock;

use hexvale_shared::{Position, CHUNK_HEIGHT, CHUNK_SIZE};

use crate::chunk::Chunk;

/// Brightest light level.
pub const MAX_LIGHT: u8 = 15;

#[allow(clippy::cast_sign_loss)]
const HEIGHT: usize = CHUNK_HEIGHT as usize;

#[allow(clippy::cast_sign_loss)]
const SIZE: usize = CHUNK_SIZE as usize;

const SLAB_LEN: usize = SIZE * HEIGHT * SIZE;

/// Light levels of one chunk, indexed `(x * HEIGHT + y) * SIZE + z`.
#[derive(Debug)]
struct LightSlab {
    sky: RwLock<Box<[u8]>>,
    item: RwLock<Box<[u8]>>,
}

impl LightSlab {
    fn dark() -> Self {
        Self {
            sky: RwLock::new(vec![0; SLAB_LEN].into_boxed_slice()),
            item: RwLock::new(vec![0; SLAB_LEN].into_boxed_slice()),
        }
    }
}

/// Sky and item light levels for the whole world.
#[derive(Debug)]
pub struct LightVolume {
    size_x: usize,
    size_z: usize,
    chunks_z: usize,
    slabs: Box<[LightSlab]>,
}

impl LightVolume {
    /// Creates an all-dark volume `size_x * CHUNK_HEIGHT * size_z` blocks
    /// large.
    #[must_use]
    pub fn new(size_x: usize, size_z: usize) -> Self {
        let chunks_x = size_x.div_ceil(SIZE);
        let chunks_z = size_z.div_ceil(SIZE);
        Self {
            size_x,
            size_z,
            chunks_z,
            slabs: (0..chunks_x * chunks_z).map(|_| LightSlab::dark()).collect(),
        }
    }

    /// Slab and offset within it.
    #[allow(clippy::cast_sign_loss)]
    fn locate(&self, position: Position) -> Option<(&LightSlab, usize)> {
        let Position { x, y, z } = position;
        if x < 0 || y < 0 || z < 0 {
            return None;
        }
        let (x, y, z) = (x as usize, y as usize, z as usize);
        if x >= self.size_x || y >= HEIGHT || z >= self.size_z {
            return None;
        }
        let slab = self.slabs.get((x / SIZE) * self.chunks_z + z / SIZE)?;
        Some((slab, ((x % SIZE) * HEIGHT + y) * SIZE + z % SIZE))
    }

    /// Sky light at a block. `None` outside the volume.
    #[must_use]
    pub fn sky_light(&self, position: Position) -> Option<u8> {
        self.locate(position).map(|(slab, i)| slab.sky.read()[i])
    }

    /// Item light at a block. `None` outside the volume.
    #[must_use]
    pub fn item_light(&self, position: Position) -> Option<u8> {
        self.locate(position).map(|(slab, i)| slab.item.read()[i])
    }

    /// Stores sky light, clamped to [`MAX_LIGHT`]. False outside the volume.
    pub fn set_sky_light(&self, position: Position, level: u8) -> bool {
        match self.locate(position) {
            Some((slab, i)) => {
                slab.sky.write()[i] = level.min(MAX_LIGHT);
                true
            }
            None => false,
        }
    }

    /// Stores item light, clamped to [`MAX_LIGHT`]. False outside the volume.
    pub fn set_item_light(&self, position: Position, level: u8) -> bool {
        match self.locate(position) {
            Some((slab, i)) => {
                slab.item.write()[i] = level.min(MAX_LIGHT);
                true
            }
            None => false,
        }
    }

    /// Reseeds sky light for a chunk's columns: full above the height map
    /// level, dark at and below it. Only that chunk's slab is locked.
    #[allow(clippy::cast_sign_loss)]
    pub fn reset_sky_light(&self, chunk: &Chunk) {
        let coords = chunk.coords();
        if coords.x < 0 || coords.z < 0 {
            return;
        }
        let (chunk_x, chunk_z) = (coords.x as usize, coords.z as usize);
        if chunk_z >= self.chunks_z {
            return;
        }
        let Some(slab) = self.slabs.get(chunk_x * self.chunks_z + chunk_z) else {
            return;
        };

        let blocks = chunk.blocks();
        let mut sky = slab.sky.write();
        for local_x in 0..SIZE {
            for local_z in 0..SIZE {
                let surface = usize::from(blocks.height(local_x, local_z));
                for y in 0..HEIGHT {
                    sky[(local_x * HEIGHT + y) * SIZE + local_z] = if y > surface { MAX_LIGHT } else { 0 };
                }
            }
        }
    }

    /// Zeroes every item light value, one slab at a time.
    pub fn clear_item_light(&self) {
        for slab in &*self.slabs {
            slab.item.write().fill(0);
        }
    }
}
