//! Error types for the tile grid

use thiserror::Error;

/// Errors from tile grid operations
///
/// Out-of-bounds tile coordinates are never an error; queries return `None`
/// and mutations are skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TileGridError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, TileGridError>;
