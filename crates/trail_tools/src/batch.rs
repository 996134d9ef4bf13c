//! Batch map generation for connectivity statistics.
//!
//! Generates many maps in parallel using rayon and summarizes how often
//! connectivity was verified and how much repair it took.

use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use trail_core::config::GeneratorConfig;
use trail_core::map_generation::MapGenerator;

use crate::error::Result;

/// Configuration for a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Map width.
    pub width: u32,
    /// Map height.
    pub height: u32,
    /// Number of maps to generate.
    pub count: u32,
    /// Seed prefix; map `i` uses seed `{prefix}-{i}`.
    pub prefix: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            width: 16,
            height: 16,
            count: 100,
            prefix: "batch".to_string(),
        }
    }
}

impl BatchConfig {
    /// Create a batch config for `count` maps of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32, count: u32) -> Self {
        Self {
            width,
            height,
            count,
            ..Default::default()
        }
    }

    /// Set the seed prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Seed for the map at `index`.
    #[must_use]
    pub fn seed_for(&self, index: u32) -> String {
        format!("{}-{index}", self.prefix)
    }
}

/// Per-map result of a batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapStats {
    /// Seed used.
    pub seed: String,
    /// Whether a route was verified.
    pub guaranteed: bool,
    /// Repair carves performed.
    pub repair_attempts: u32,
    /// Verified path length in cells.
    pub path_length: usize,
    /// Fraction of walkable cells.
    pub walkable_ratio: f64,
}

/// Aggregated batch statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// Maps generated successfully.
    pub total_maps: u32,
    /// Maps with a verified route.
    pub guaranteed: u32,
    /// Average repair attempts per map.
    pub avg_repair_attempts: f64,
    /// Most repair attempts on a single map.
    pub max_repair_attempts: u32,
    /// Average verified path length over guaranteed maps.
    pub avg_path_length: f64,
    /// Average walkable ratio.
    pub avg_walkable_ratio: f64,
}

impl BatchSummary {
    /// Calculate a summary from per-map stats.
    #[must_use]
    pub fn from_maps(maps: &[MapStats]) -> Self {
        if maps.is_empty() {
            return Self::default();
        }

        let total = maps.len() as f64;
        let guaranteed: Vec<&MapStats> = maps.iter().filter(|m| m.guaranteed).collect();
        let repair_sum: u64 = maps.iter().map(|m| u64::from(m.repair_attempts)).sum();
        let path_sum: usize = guaranteed.iter().map(|m| m.path_length).sum();

        Self {
            total_maps: maps.len() as u32,
            guaranteed: guaranteed.len() as u32,
            avg_repair_attempts: repair_sum as f64 / total,
            max_repair_attempts: maps.iter().map(|m| m.repair_attempts).max().unwrap_or(0),
            avg_path_length: if guaranteed.is_empty() {
                0.0
            } else {
                path_sum as f64 / guaranteed.len() as f64
            },
            avg_walkable_ratio: maps.iter().map(|m| m.walkable_ratio).sum::<f64>() / total,
        }
    }

    /// Fraction of maps with a verified route.
    #[must_use]
    pub fn guaranteed_rate(&self) -> f64 {
        if self.total_maps == 0 {
            0.0
        } else {
            f64::from(self.guaranteed) / f64::from(self.total_maps)
        }
    }
}

/// Results of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResults {
    /// Configuration used.
    pub config: BatchConfig,
    /// Per-map stats, in seed order.
    pub maps: Vec<MapStats>,
    /// Aggregated statistics.
    pub summary: BatchSummary,
    /// Wall-clock duration in seconds.
    pub duration_seconds: f64,
}

/// Run a batch of generations in parallel.
///
/// # Errors
///
/// Returns an error if the generator config is invalid or any map fails to
/// generate (for example, dimensions out of range).
pub fn run_batch(config: BatchConfig, generator_config: GeneratorConfig) -> Result<BatchResults> {
    let generator = MapGenerator::new(generator_config)?;
    let start = Instant::now();

    info!(
        width = config.width,
        height = config.height,
        count = config.count,
        "Starting batch"
    );

    let maps = (0..config.count)
        .into_par_iter()
        .map(|i| -> Result<MapStats> {
            let seed = config.seed_for(i);
            let map = generator.generate(config.width, config.height, Some(&seed))?;
            let report = map.connectivity();
            if !report.guaranteed {
                warn!(seed = %seed, "Map left without a verified route");
            }
            debug!(seed = %seed, repairs = report.repair_attempts, "Map generated");
            Ok(MapStats {
                seed,
                guaranteed: report.guaranteed,
                repair_attempts: report.repair_attempts,
                path_length: report.path_length,
                walkable_ratio: map.walkable_ratio(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let summary = BatchSummary::from_maps(&maps);
    let duration_seconds = start.elapsed().as_secs_f64();

    info!(
        "Batch complete: {} maps in {:.2}s, {} guaranteed",
        summary.total_maps, duration_seconds, summary.guaranteed
    );

    Ok(BatchResults {
        config,
        maps,
        summary,
        duration_seconds,
    })
}
