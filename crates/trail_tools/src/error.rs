//! Error types for the tools crate.

use thiserror::Error;
use trail_core::error::MapError;

/// Result alias for tool operations.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors surfaced by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Generation or map IO failed.
    #[error(transparent)]
    Map(#[from] MapError),

    /// JSON export failed.
    #[error("JSON export failed: {0}")]
    Json(#[from] serde_json::Error),

    /// RON export failed.
    #[error("RON export failed: {0}")]
    Ron(String),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A command-line argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
