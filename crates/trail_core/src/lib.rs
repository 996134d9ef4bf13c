//! # Trail Core
//!
//! Deterministic tile-map synthesis for exploration and puzzle maps.
//!
//! This crate contains **only** generation logic:
//! - No rendering
//! - No system randomness once a seed is fixed
//! - No input handling
//!
//! Given a seed string and dimensions, generation always produces the same
//! map: a random base terrain layer, rivers, mountain ranges and forests, a
//! walkable boundary ring, a start cell, and a goal cell with a verified route.
//!
//! ## Crate Structure
//!
//! - [`terrain`] - Terrain variants, movement attributes, base layer
//! - [`grid`] - Flat row-major terrain grid
//! - [`rng`] - Seed-string driven random source
//! - [`features`] - Rivers, mountain ranges, forest clusters
//! - [`connectivity`] - Boundary normalization, endpoints, route repair
//! - [`pathfinding`] - A* search and route multiplicity check
//! - [`map_generation`] - Generation facade and saved map format
//! - [`overlay`] - Per-cell flags kept outside the immutable map
//! - [`math`] - Fixed-point utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod config;
pub mod connectivity;
pub mod error;
pub mod features;
pub mod grid;
pub mod map_generation;
pub mod math;
pub mod overlay;
pub mod pathfinding;
pub mod rng;
pub mod terrain;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Difficulty, FeatureParams, GeneratorConfig, MapSize, RepairPolicy};
    pub use crate::connectivity::ConnectivityReport;
    pub use crate::error::{MapError, Result};
    pub use crate::grid::TerrainGrid;
    pub use crate::map_generation::{generate_map, MapData, MapGenerator};
    pub use crate::math::Fixed;
    pub use crate::overlay::CellFlags;
    pub use crate::pathfinding::{find_path, has_multiple_routes, Point, SearchLimits, SearchOutcome};
    pub use crate::rng::SeededRng;
    pub use crate::terrain::{terrain_config, TerrainConfig, TerrainType};
}
