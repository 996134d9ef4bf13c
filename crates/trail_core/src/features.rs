//! Feature passes layered over the base terrain.
//!
//! Passes run in a fixed order (rivers, mountain ranges, forest clusters)
//! because later passes overwrite earlier ones. Every walk is index
//! arithmetic over the flat grid with explicit clamping to the bounds.

use crate::config::FeatureParams;
use crate::grid::TerrainGrid;
use crate::rng::SeededRng;
use crate::terrain::TerrainType;

/// Rivers per map.
const RIVER_COUNT: (u32, u32) = (1, 2);
/// Chance per river step of drifting one column sideways.
const RIVER_DRIFT_CHANCE: f64 = 0.3;
/// Extra steps beyond the grid height before a river walk is cut off.
const RIVER_STEP_SLACK: u32 = 5;

/// Mountain ranges per map.
const RANGE_COUNT: (u32, u32) = (1, 2);
/// Steps taken by each range walk.
const RANGE_LENGTH: (u32, u32) = (3, 7);

/// Forest clusters per map.
const CLUSTER_COUNT: (u32, u32) = (2, 4);
/// Cluster radius in cells.
const CLUSTER_RADIUS: (u32, u32) = (2, 4);

/// Per-pass summary, mostly for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeatureSummary {
    /// Rivers carved.
    pub rivers: u32,
    /// Cells painted by rivers (water or bridge).
    pub river_cells: u32,
    /// Bridges placed.
    pub bridges: u32,
    /// Mountain ranges raised.
    pub ranges: u32,
    /// Passes placed.
    pub passes: u32,
    /// Forest clusters planted.
    pub clusters: u32,
    /// Cells converted to forest.
    pub forest_cells: u32,
}

/// Run all feature passes in order.
pub fn apply_features(
    grid: &mut TerrainGrid,
    rng: &mut SeededRng,
    params: &FeatureParams,
) -> FeatureSummary {
    let mut summary = FeatureSummary::default();
    carve_rivers(grid, rng, params, &mut summary);
    raise_mountain_ranges(grid, rng, params, &mut summary);
    plant_forest_clusters(grid, rng, params, &mut summary);

    tracing::debug!(
        rivers = summary.rivers,
        bridges = summary.bridges,
        ranges = summary.ranges,
        passes = summary.passes,
        clusters = summary.clusters,
        forest_cells = summary.forest_cells,
        "Feature passes applied"
    );
    summary
}

/// Move `value` by `delta` and clamp it into `0..len`.
#[inline]
fn clamp_step(value: u32, delta: i64, len: u32) -> u32 {
    (i64::from(value) + delta).clamp(0, i64::from(len) - 1) as u32
}

/// Rivers flow from a random column on the top row down to the bottom row,
/// drifting sideways now and then. Each painted cell may become a bridge.
pub fn carve_rivers(
    grid: &mut TerrainGrid,
    rng: &mut SeededRng,
    params: &FeatureParams,
    summary: &mut FeatureSummary,
) {
    let (width, height) = (grid.width(), grid.height());
    let count = rng.next_range_inclusive(RIVER_COUNT.0, RIVER_COUNT.1);

    for _ in 0..count {
        let mut x = rng.next_index(width as usize) as u32;
        let mut y = 0;

        for _ in 0..height + RIVER_STEP_SLACK {
            let cell = if rng.chance(params.bridge_chance) {
                summary.bridges += 1;
                TerrainType::Bridge
            } else {
                TerrainType::Water
            };
            grid.set(x, y, cell);
            summary.river_cells += 1;

            if y == height - 1 {
                break;
            }
            if rng.chance(RIVER_DRIFT_CHANCE) {
                x = clamp_step(x, rng.next_sign(), width);
            }
            y += 1;
        }
        summary.rivers += 1;
    }
}

/// Mountain ranges are short undirected random walks from a random cell.
/// Each visited cell may become a pass.
pub fn raise_mountain_ranges(
    grid: &mut TerrainGrid,
    rng: &mut SeededRng,
    params: &FeatureParams,
    summary: &mut FeatureSummary,
) {
    let (width, height) = (grid.width(), grid.height());
    let count = rng.next_range_inclusive(RANGE_COUNT.0, RANGE_COUNT.1);

    for _ in 0..count {
        let mut x = rng.next_index(width as usize) as u32;
        let mut y = rng.next_index(height as usize) as u32;
        let length = rng.next_range_inclusive(RANGE_LENGTH.0, RANGE_LENGTH.1);

        raise_cell(grid, rng, params, summary, x, y);
        for _ in 0..length {
            match rng.next_index(4) {
                0 => x = clamp_step(x, 1, width),
                1 => y = clamp_step(y, 1, height),
                2 => x = clamp_step(x, -1, width),
                _ => y = clamp_step(y, -1, height),
            }
            raise_cell(grid, rng, params, summary, x, y);
        }
        summary.ranges += 1;
    }
}

fn raise_cell(
    grid: &mut TerrainGrid,
    rng: &mut SeededRng,
    params: &FeatureParams,
    summary: &mut FeatureSummary,
    x: u32,
    y: u32,
) {
    let cell = if rng.chance(params.pass_chance) {
        summary.passes += 1;
        TerrainType::MountainPass
    } else {
        TerrainType::Mountain
    };
    grid.set(x, y, cell);
}

/// Forest clusters fill a disc around a random center. Only open ground
/// (grass or sand) is converted; water, mountains and crossings are kept.
pub fn plant_forest_clusters(
    grid: &mut TerrainGrid,
    rng: &mut SeededRng,
    params: &FeatureParams,
    summary: &mut FeatureSummary,
) {
    let (width, height) = (grid.width(), grid.height());
    let count = rng.next_range_inclusive(CLUSTER_COUNT.0, CLUSTER_COUNT.1);

    for _ in 0..count {
        let cx = i64::from(rng.next_index(width as usize) as u32);
        let cy = i64::from(rng.next_index(height as usize) as u32);
        let radius = i64::from(rng.next_range_inclusive(CLUSTER_RADIUS.0, CLUSTER_RADIUS.1));

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
                    continue;
                }
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let index = grid.index_of(x as u32, y as u32);
                if rng.chance(params.forest_fill)
                    && matches!(grid.at(index), TerrainType::Grass | TerrainType::Sand)
                {
                    grid.set_index(index, TerrainType::Forest);
                    summary.forest_cells += 1;
                }
            }
        }
        summary.clusters += 1;
    }
}
