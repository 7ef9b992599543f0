//! # Block Mutation Engine
//!
//! `place_block` runs validate, mutate, cascade:
//!
//! 1. Reject positions outside the world or on the floor (`y <= 0`).
//! 2. Air under water becomes water.
//! 3. Write the type, set the dirty bit, update the height map.
//! 4. Grass or snow under a new opaque or water block turns to dirt (one
//!    level only).
//! 5. Flag water expansion.
//! 6. Flag grass growth, including bordering chunks.
//! 7. Solid placement removes lights on the block.
//! 8. Destruction removes lights hanging off the destroyed block and drops
//!    items resting on it.
//!
//! Rejections are silent. Callers that need the reason check
//! [`World::is_valid_block_location`] first.
//!
//! ## Batching
//!
//! With [`PlaceMode::Batch`] a placement publishes no `ChunksChanged`; the
//! caller publishes once for the union of every `Placement::touched`.
//! [`World::place_cuboid`] does exactly that.

use std::collections::BTreeSet;

use tracing::trace;

use hexvale_shared::{ChunkCoords, Position, CHUNK_HEIGHT};

use crate::block::BlockType;
use crate::events::WorldEvent;
use crate::world::World;

/// Whether a placement publishes its own chunk change notification.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PlaceMode {
    /// Publish `ChunksChanged` for this placement.
    #[default]
    Single,
    /// Part of a batch. The caller publishes `ChunksChanged` once.
    Batch,
}

/// Outcome of an accepted placement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Where the block was written.
    pub position: Position,
    /// Type written, after water substitution.
    pub block_type: BlockType,
    /// Type replaced.
    pub old_type: BlockType,
    /// Chunks needing a refresh: the owning chunk, chunks the position
    /// borders, and any chunk a cascade wrote into. Sorted.
    pub touched: Vec<ChunkCoords>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Cascade {
    Allowed,
    Suppressed,
}

impl World {
    /// Places one block and publishes its events. `None` if rejected.
    pub fn place_block(&self, position: Position, block_type: BlockType) -> Option<Placement> {
        self.place_block_with(position, block_type, PlaceMode::Single)
    }

    /// Places one block. `None` if rejected.
    pub fn place_block_with(&self, position: Position, block_type: BlockType, mode: PlaceMode) -> Option<Placement> {
        let placement = self.apply_placement(position, block_type, Cascade::Allowed)?;
        if mode == PlaceMode::Single {
            self.events
                .publish(&WorldEvent::ChunksChanged(placement.touched.clone()));
        }
        Some(placement)
    }

    /// Places `block_type` in every cell of the inclusive box spanned by
    /// `start` and `end` (corners in any order), then publishes a single
    /// `ChunksChanged`. Returns the distinct touched chunks, sorted.
    pub fn place_cuboid(&self, start: Position, end: Position, block_type: BlockType) -> Vec<ChunkCoords> {
        // Cells outside the world would be rejected anyway.
        let x_range = start.x.min(end.x).max(0)..=start.x.max(end.x).min(self.size_in_blocks_x() - 1);
        let y_range = start.y.min(end.y).max(1)..=start.y.max(end.y).min(CHUNK_HEIGHT - 1);
        let z_range = start.z.min(end.z).max(0)..=start.z.max(end.z).min(self.size_in_blocks_z() - 1);

        let mut touched = BTreeSet::new();
        for x in x_range {
            for y in y_range.clone() {
                for z in z_range.clone() {
                    if let Some(placement) = self.place_block_with(Position::new(x, y, z), block_type, PlaceMode::Batch) {
                        touched.extend(placement.touched);
                    }
                }
            }
        }

        let touched: Vec<ChunkCoords> = touched.into_iter().collect();
        if !touched.is_empty() {
            self.events.publish(&WorldEvent::ChunksChanged(touched.clone()));
        }
        touched
    }

    #[allow(clippy::cast_sign_loss)]
    fn apply_placement(&self, position: Position, requested: BlockType, cascade: Cascade) -> Option<Placement> {
        if position.y <= 0 {
            trace!("Rejected placement on the world floor at {}", position);
            return None;
        }
        let Some(chunk) = self.chunk_of(position) else {
            trace!("Rejected placement outside the world at {}", position);
            return None;
        };

        let block_type = if requested == BlockType::Air
            && self.block_type_at(position.above()) == Some(BlockType::Water)
        {
            BlockType::Water
        } else {
            requested
        };

        let (x, y, z) = (
            position.local_x() as usize,
            position.y as usize,
            position.local_z() as usize,
        );
        let old_type = {
            let mut blocks = chunk.blocks_mut();
            let block = blocks.get(x, y, z);
            blocks.set(x, y, z, block.with_type(block_type).mark_dirty());
            block.block_type()
        };
        trace!("Placed {:?} at {} (was {:?})", block_type, position, old_type);
        self.events.publish(&WorldEvent::BlockPlaced {
            position,
            block_type,
            old_type,
        });

        let mut touched = BTreeSet::from([chunk.coords()]);
        let is_transparent = block_type.is_transparent();

        if cascade == Cascade::Allowed && (!is_transparent || block_type == BlockType::Water) {
            let below = position.below();
            if matches!(
                self.block_type_at(below),
                Some(BlockType::Grass | BlockType::Snow)
            ) {
                if let Some(conversion) = self.apply_placement(below, BlockType::Dirt, Cascade::Suppressed) {
                    touched.extend(conversion.touched);
                }
            }
        }

        if !chunk.is_water_expanding() {
            match block_type {
                BlockType::Water => chunk.set_water_expanding(true),
                BlockType::Air => {
                    let (px, py, pz) = (position.x, position.y, position.z);
                    for neighbour in [
                        Position::new(px + 1, py, pz),
                        Position::new(px - 1, py, pz),
                        Position::new(px, py + 1, pz),
                        Position::new(px, py, pz + 1),
                        Position::new(px, py, pz - 1),
                    ] {
                        if self.block_type_at(neighbour) == Some(BlockType::Water) {
                            if let Some(neighbour_chunk) = self.chunk_of(neighbour) {
                                neighbour_chunk.set_water_expanding(true);
                            }
                        }
                    }
                }
                _ => {}
            }
        }

        let borders = self.border_chunk_coords(position);
        if !is_transparent || (block_type == BlockType::Air && !old_type.is_transparent()) {
            chunk.set_grass_growing(true);
            for coords in &borders {
                if let Ok(border) = self.chunk(*coords) {
                    border.set_grass_growing(true);
                }
            }
        }
        touched.extend(borders);

        if block_type == BlockType::Air {
            for (neighbour, face) in self.adjacent_position_faces(position) {
                if self.block_type_at(neighbour) != Some(BlockType::Air) {
                    continue;
                }
                if let Some(neighbour_chunk) = self.chunk_of(neighbour) {
                    let removed = neighbour_chunk.remove_light_sources_on(neighbour, Some(face.opposite()));
                    self.forget_light_sources(&removed);
                }
            }
            chunk.drop_items_on(position.above());
        } else {
            let removed = chunk.remove_light_sources_on(position, None);
            self.forget_light_sources(&removed);
        }

        Some(Placement {
            position,
            block_type,
            old_type,
            touched: touched.into_iter().collect(),
        })
    }
}
