//! # Layout Constants
//!
//! **CRITICAL:** Persisted worlds and the 20-byte coords wire format depend
//! on these values. Changing them breaks every saved world.

// =============================================================================
// CHUNK LAYOUT
// =============================================================================

/// Chunk width and depth in blocks.
pub const CHUNK_SIZE: i32 = 32;

/// Chunk height in blocks. Also the world height.
pub const CHUNK_HEIGHT: i32 = 96;

// =============================================================================
// COORDS
// =============================================================================

/// Encoded size of a `Coords`: five 4-byte floats.
pub const COORDS_SIZE: usize = std::mem::size_of::<f32>() * 5;

/// Pitch is clamped to `[-PITCH_LIMIT, PITCH_LIMIT]`, just inside ±π/2.
pub const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.1;
