//! # HEXVALE Shared Types
//!
//! Value types exchanged between the world core and its collaborators.
//!
//! ## Coordinate Spaces
//!
//! - `Coords`: continuous position plus facing (mobs, players, items)
//! - `Position`: integer block coordinate, the key into chunk block arrays
//! - `ChunkCoords`: integer chunk coordinate, `Position / CHUNK_SIZE`
//!
//! Converting `Coords` to `Position` TRUNCATES toward zero. It does not
//! floor. Negative coordinates depend on this.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod coords;
pub mod error;
pub mod face;
pub mod position;

pub use constants::{CHUNK_HEIGHT, CHUNK_SIZE, COORDS_SIZE, PITCH_LIMIT};
pub use coords::{Coords, Facing};
pub use error::{CoordsError, SharedResult};
pub use face::Face;
pub use position::{ChunkCoords, Position};
