//! # World Error Types
//!
//! Query failures and all-or-nothing bulk load failures. The mutation
//! engine never returns these; invalid placements are silent no-ops.

use thiserror::Error;

use hexvale_shared::ChunkCoords;

/// Errors that can occur in the world core.
#[derive(Error, Debug)]
pub enum WorldError {
    /// Block coordinate outside the world.
    #[error("block location out of bounds: ({x}, {y}, {z})")]
    OutOfBounds {
        /// X coordinate.
        x: i32,
        /// Y coordinate.
        y: i32,
        /// Z coordinate.
        z: i32,
    },

    /// Chunk coordinate outside the world.
    #[error("chunk out of bounds: {0}")]
    ChunkOutOfBounds(ChunkCoords),

    /// A persisted chunk buffer had the wrong size.
    #[error("invalid chunk buffer length: expected {expected}, got {actual}")]
    InvalidBufferLength {
        /// Required length (`SIZE_IN_BYTES`).
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A persisted chunk buffer held an unassigned block type id.
    #[error("unknown block type {id} at block index {index}")]
    UnknownBlockType {
        /// The raw type id.
        id: u16,
        /// Index of the offending block inside the chunk.
        index: usize,
    },

    /// A bulk load supplied the wrong number of chunk buffers.
    #[error("chunk count mismatch: expected {expected}, got {actual}")]
    ChunkCountMismatch {
        /// Chunks in the world.
        expected: usize,
        /// Buffers supplied.
        actual: usize,
    },

    /// No dynamic item or light source with this id.
    #[error("object not found: {0}")]
    ObjectNotFound(u32),

    /// The object id sequence reached `u32::MAX`.
    #[error("object ids exhausted")]
    ObjectIdsExhausted,

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading or validating a `WorldConfig`.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML could not be parsed.
    #[error("failed to parse world config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("failed to read world config: {0}")]
    Io(#[from] std::io::Error),

    /// World size must be at least one chunk on each axis.
    #[error("invalid world size: {x} x {z} chunks")]
    InvalidWorldSize {
        /// Chunks along X.
        x: u32,
        /// Chunks along Z.
        z: u32,
    },

    /// World type id outside 1..=3.
    #[error("invalid world type: {0}")]
    InvalidWorldType(u8),

    /// Generator parameters out of range.
    #[error("invalid generator settings: {0}")]
    InvalidGenerator(String),
}

/// Result type for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
