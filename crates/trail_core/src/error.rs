//! Error types for map generation.

use thiserror::Error;

/// Result type alias using [`MapError`].
pub type Result<T> = std::result::Result<T, MapError>;

/// Top-level error type for all map generation errors.
///
/// Ordinary generation outcomes are never errors: an unreachable goal is an
/// empty path, and a map the repair loop could not connect is reported through
/// [`crate::connectivity::ConnectivityReport`].
#[derive(Debug, Error)]
pub enum MapError {
    /// Requested grid size is outside the supported range.
    #[error("Invalid map dimensions {width}x{height}: each side must be in {min}..={max}")]
    InvalidDimensions {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Smallest accepted side length.
        min: u32,
        /// Largest accepted side length.
        max: u32,
    },

    /// Generator configuration failed validation.
    #[error("Invalid generator config: {0}")]
    InvalidConfig(String),

    /// Failed to encode or decode a map or config.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Failed to read or write a file.
    #[error("IO error: {0}")]
    Io(String),

    /// Saved map was written by an incompatible format version.
    #[error("Map format version mismatch: expected {expected}, got {found}")]
    VersionMismatch {
        /// Version this build reads.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },
}
