//! # Trail Tools
//!
//! Command-line tooling over `trail_core`:
//! - Map rendering and export (ASCII, JSON, RON)
//! - Parallel batch generation reports
//! - Generator config validation

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod export;
pub mod render;
pub mod validate;

pub use error::{Result, ToolError};
