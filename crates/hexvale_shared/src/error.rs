//! # Shared Error Types

use thiserror::Error;

/// Errors raised while decoding shared value types.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoordsError {
    /// The byte slice ended before a full `Coords` could be read.
    #[error("truncated coords: need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required from the start index.
        needed: usize,
        /// Bytes available from the start index.
        available: usize,
    },
}

/// Result type for shared decoding.
pub type SharedResult<T> = Result<T, CoordsError>;
