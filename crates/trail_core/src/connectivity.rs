//! Connectivity pass: edge normalization, start/goal selection, path
//! validation and emergency repair.
//!
//! After this pass the whole boundary ring is walkable, the start sits on
//! the boundary and the goal is the walkable cell farthest from it. If no
//! path joins them, a staircase route is carved between them and the pass
//! is re-run, up to a bounded number of attempts. Running out of attempts
//! is not an error; it is recorded in the [`ConnectivityReport`].

use serde::{Deserialize, Serialize};

use crate::config::{GeneratorConfig, RepairPolicy};
use crate::grid::TerrainGrid;
use crate::pathfinding::{search, Point, SearchOutcome};
use crate::rng::SeededRng;
use crate::terrain::TerrainType;

/// Outcome of the connectivity pass, stored alongside the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ConnectivityReport {
    /// A walkable path from start to goal was verified.
    pub guaranteed: bool,
    /// Repair carves performed before the result was accepted or abandoned.
    pub repair_attempts: u32,
    /// Some search hit the expansion budget.
    pub budget_exhausted: bool,
    /// Cells on the verified path (0 when not guaranteed).
    pub path_length: usize,
}

/// Selected start and goal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoints {
    /// Start cell, always on the boundary.
    pub start: Point,
    /// Goal cell, the walkable cell farthest from start.
    pub goal: Point,
}

/// Force every non-walkable boundary cell to grass.
///
/// Returns the number of cells changed.
pub fn normalize_edges(grid: &mut TerrainGrid) -> u32 {
    let blocked: Vec<Point> = grid
        .boundary_cells()
        .filter(|&(x, y)| !grid.is_walkable(x, y))
        .collect();
    for &(x, y) in &blocked {
        grid.set(x, y, TerrainType::Grass);
    }
    blocked.len() as u32
}

/// Pick the start uniformly among walkable boundary cells.
///
/// Consumes exactly one draw. Returns `None` only if no boundary cell is
/// walkable, which cannot happen after [`normalize_edges`].
pub fn select_start(grid: &TerrainGrid, rng: &mut SeededRng) -> Option<Point> {
    let candidates: Vec<Point> = grid
        .boundary_cells()
        .filter(|&(x, y)| grid.is_walkable(x, y))
        .collect();
    let pick = rng.next_index(candidates.len());
    candidates.get(pick).copied()
}

/// The walkable cell farthest (Euclidean) from `start`.
///
/// Scans row-major; only a strictly greater distance replaces the current
/// best, so ties go to the first cell in scan order. Returns `start` if no
/// other walkable cell exists.
#[must_use]
pub fn select_goal(grid: &TerrainGrid, start: Point) -> Point {
    let mut best = start;
    let mut best_distance: u64 = 0;

    for (index, terrain) in grid.cells().iter().enumerate() {
        if !terrain.is_walkable() {
            continue;
        }
        let (x, y) = grid.coords_of(index);
        let dx = u64::from(x.abs_diff(start.0));
        let dy = u64::from(y.abs_diff(start.1));
        let distance = dx * dx + dy * dy;
        if distance > best_distance {
            best_distance = distance;
            best = (x, y);
        }
    }
    best
}

/// Carve a staircase route from `from` to `to`.
///
/// Each iteration steps x one cell toward the target, then y; every visited
/// cell that is not walkable becomes grass. The result is a 4-connected
/// walkable walk. Returns the number of cells changed.
pub fn carve_staircase(grid: &mut TerrainGrid, from: Point, to: Point) -> u32 {
    let (mut x, mut y) = from;
    let mut carved = u32::from(force_walkable(grid, x, y));

    while (x, y) != to {
        if x != to.0 {
            x = if x < to.0 { x + 1 } else { x - 1 };
            carved += u32::from(force_walkable(grid, x, y));
        }
        if y != to.1 {
            y = if y < to.1 { y + 1 } else { y - 1 };
            carved += u32::from(force_walkable(grid, x, y));
        }
    }
    carved
}

fn force_walkable(grid: &mut TerrainGrid, x: u32, y: u32) -> bool {
    if grid.is_walkable(x, y) {
        false
    } else {
        grid.set(x, y, TerrainType::Grass)
    }
}

fn select_endpoints(grid: &mut TerrainGrid, rng: &mut SeededRng) -> Endpoints {
    normalize_edges(grid);
    let start = select_start(grid, rng).unwrap_or((0, 0));
    let goal = select_goal(grid, start);
    Endpoints { start, goal }
}

/// Run the connectivity pass on a grid with features applied.
///
/// With [`RepairPolicy::Reselect`] every retry re-normalizes edges and
/// re-selects both endpoints on the repaired grid (drawing a new start from
/// `rng`). With [`RepairPolicy::FixedEndpoints`] the first pair is kept and
/// repaired by [`connect_endpoints`].
pub fn enforce_connectivity(
    grid: &mut TerrainGrid,
    rng: &mut SeededRng,
    config: &GeneratorConfig,
) -> (Endpoints, ConnectivityReport) {
    let mut endpoints = select_endpoints(grid, rng);

    let report = match config.repair_policy {
        RepairPolicy::FixedEndpoints => connect_endpoints(grid, endpoints, config),
        RepairPolicy::Reselect => {
            let mut report = ConnectivityReport::default();
            while !validate(grid, endpoints, config, &mut report) {
                if !repair(grid, endpoints, config, &mut report) {
                    break;
                }
                endpoints = select_endpoints(grid, rng);
            }
            report
        }
    };

    #[cfg(feature = "debug-validation")]
    {
        assert!(grid.boundary_cells().all(|(x, y)| grid.is_walkable(x, y)));
        assert!(grid.is_walkable(endpoints.start.0, endpoints.start.1));
        assert!(grid.is_walkable(endpoints.goal.0, endpoints.goal.1));
    }

    (endpoints, report)
}

/// Validate a fixed start/goal pair, carving staircase routes between them
/// until a path is found or the attempt limit is reached.
pub fn connect_endpoints(
    grid: &mut TerrainGrid,
    endpoints: Endpoints,
    config: &GeneratorConfig,
) -> ConnectivityReport {
    let mut report = ConnectivityReport::default();
    while !validate(grid, endpoints, config, &mut report) {
        if !repair(grid, endpoints, config, &mut report) {
            break;
        }
    }
    report
}

/// Search for a path between the endpoints and record the result.
fn validate(
    grid: &TerrainGrid,
    endpoints: Endpoints,
    config: &GeneratorConfig,
    report: &mut ConnectivityReport,
) -> bool {
    match search(grid, endpoints.start, endpoints.goal, config.search_limits()) {
        SearchOutcome::Found(path) => {
            report.guaranteed = true;
            report.path_length = path.len();
            true
        }
        SearchOutcome::BudgetExhausted { expanded } => {
            tracing::warn!(
                attempt = report.repair_attempts,
                expanded,
                "Connectivity check exceeded its search budget"
            );
            report.budget_exhausted = true;
            false
        }
        SearchOutcome::Unreachable => false,
    }
}

/// Carve one emergency route. Returns `false` once attempts are exhausted.
fn repair(
    grid: &mut TerrainGrid,
    endpoints: Endpoints,
    config: &GeneratorConfig,
    report: &mut ConnectivityReport,
) -> bool {
    if report.repair_attempts >= config.max_repair_attempts {
        tracing::warn!(
            attempts = report.repair_attempts,
            start = ?endpoints.start,
            goal = ?endpoints.goal,
            "Repair attempts exhausted; map connectivity not guaranteed"
        );
        return false;
    }

    report.repair_attempts += 1;
    let carved = carve_staircase(grid, endpoints.start, endpoints.goal);
    tracing::debug!(
        attempt = report.repair_attempts,
        carved,
        start = ?endpoints.start,
        goal = ?endpoints.goal,
        "Carved emergency route"
    );
    true
}
