//! Grid-based pathfinding using the A* algorithm.
//!
//! Movement is 4-connected with a uniform step cost; terrain movement
//! speed is deliberately not part of the cost. Generation, repair carving
//! and route checks all use the same connectivity model.
//!
//! The search is sized for 10^8-cell grids: the open set is a binary heap,
//! the closed set is a dense bit-set, and each cell remembers only the
//! direction it was entered from (one byte). The Manhattan heuristic is
//! consistent for unit-cost 4-connected moves, so a cell's first expansion
//! is already optimal and no g-score table is needed. Stale duplicates stay
//! in the heap until popped, so a flood-fill search may hold up to four
//! entries per cell.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::grid::TerrainGrid;
use crate::overlay::CellFlags;
use crate::terrain::TerrainType;

/// Grid coordinate `(x, y)`.
pub type Point = (u32, u32);

/// Direction offsets for 4-directional movement.
pub const DIRECTIONS: [(i32, i32); 4] = [
    (1, 0),  // East
    (0, 1),  // South
    (-1, 0), // West
    (0, -1), // North
];

/// Marker for "no parent" in the parent-direction table.
const NO_PARENT: u8 = u8::MAX;

/// Limits applied to a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Maximum number of node expansions before giving up. `None` is unbounded.
    pub max_expansions: Option<u64>,
}

impl SearchLimits {
    /// No expansion limit.
    pub const UNBOUNDED: Self = Self {
        max_expansions: None,
    };

    /// Limit the search to `max` expansions.
    #[must_use]
    pub const fn with_max_expansions(max: u64) -> Self {
        Self {
            max_expansions: Some(max),
        }
    }
}

/// Result of an A* search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Path from start to goal, both inclusive.
    Found(Vec<Point>),
    /// Start and goal are not connected (or an endpoint is not walkable).
    Unreachable,
    /// The expansion budget ran out before the search finished.
    BudgetExhausted {
        /// Nodes expanded before stopping.
        expanded: u64,
    },
}

impl SearchOutcome {
    /// Whether a path was found.
    #[must_use]
    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// The path, or an empty vector for any other outcome.
    #[must_use]
    pub fn into_path(self) -> Vec<Point> {
        match self {
            Self::Found(path) => path,
            Self::Unreachable | Self::BudgetExhausted { .. } => Vec::new(),
        }
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    /// Flat cell index.
    index: usize,
    /// Cost from start.
    g: u32,
    /// g + heuristic.
    f: u32,
    /// Direction index this cell was reached through.
    via: u8,
}

impl AStarNode {
    const fn h(&self) -> u32 {
        self.f - self.g
    }
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so comparisons are reversed for min-heap behavior.
        // Ties on f prefer the node closer to the goal, then the lower index.
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.h().cmp(&self.h()))
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Manhattan distance heuristic (exact lower bound for 4-directional movement).
#[inline]
fn manhattan(a: Point, b: Point) -> u32 {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Neighbor of `(x, y)` in direction `dir`, if inside the grid.
#[inline]
fn step(grid: &TerrainGrid, x: u32, y: u32, dir: usize) -> Option<Point> {
    let (dx, dy) = DIRECTIONS[dir];
    let nx = x.checked_add_signed(dx)?;
    let ny = y.checked_add_signed(dy)?;
    grid.in_bounds(nx, ny).then_some((nx, ny))
}

/// Find a path from start to goal.
///
/// Returns the ordered cells from start to goal inclusive, or an empty
/// vector if either endpoint is out of bounds or not walkable, or the goal
/// is unreachable. An empty result is the normal "no path" answer.
#[must_use]
pub fn find_path(
    grid: &TerrainGrid,
    start_x: u32,
    start_y: u32,
    goal_x: u32,
    goal_y: u32,
) -> Vec<Point> {
    search(
        grid,
        (start_x, start_y),
        (goal_x, goal_y),
        SearchLimits::UNBOUNDED,
    )
    .into_path()
}

/// Run A* with explicit limits and report how the search ended.
#[must_use]
pub fn search(grid: &TerrainGrid, start: Point, goal: Point, limits: SearchLimits) -> SearchOutcome {
    if !grid.is_walkable(start.0, start.1) || !grid.is_walkable(goal.0, goal.1) {
        return SearchOutcome::Unreachable;
    }

    // Early exit if start == goal
    if start == goal {
        return SearchOutcome::Found(vec![start]);
    }

    let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
    let mut closed = CellFlags::new(grid.width(), grid.height());
    let mut parent_dir: Vec<u8> = vec![NO_PARENT; grid.len()];
    let goal_index = grid.index_of(goal.0, goal.1);
    let mut expanded: u64 = 0;

    open_set.push(AStarNode {
        index: grid.index_of(start.0, start.1),
        g: 0,
        f: manhattan(start, goal),
        via: NO_PARENT,
    });

    while let Some(current) = open_set.pop() {
        if closed.contains(current.index) {
            continue;
        }
        closed.insert(current.index);
        parent_dir[current.index] = current.via;

        // Goal reached
        if current.index == goal_index {
            return SearchOutcome::Found(reconstruct_path(grid, &parent_dir, goal));
        }

        expanded += 1;
        if limits.max_expansions.is_some_and(|max| expanded >= max) {
            tracing::debug!(expanded, ?start, ?goal, "A* expansion budget exhausted");
            return SearchOutcome::BudgetExhausted { expanded };
        }

        let (x, y) = grid.coords_of(current.index);
        for dir in 0..DIRECTIONS.len() {
            let Some((nx, ny)) = step(grid, x, y, dir) else {
                continue;
            };
            let neighbor = grid.index_of(nx, ny);
            if closed.contains(neighbor) || !grid.at(neighbor).is_walkable() {
                continue;
            }

            let g = current.g + 1;
            open_set.push(AStarNode {
                index: neighbor,
                g,
                f: g + manhattan((nx, ny), goal),
                via: dir as u8,
            });
        }
    }

    SearchOutcome::Unreachable
}

/// Walk parent directions back from the goal.
fn reconstruct_path(grid: &TerrainGrid, parent_dir: &[u8], goal: Point) -> Vec<Point> {
    let mut path = vec![goal];
    let (mut x, mut y) = goal;

    loop {
        let via = parent_dir[grid.index_of(x, y)];
        if via == NO_PARENT {
            break;
        }
        // Step against the direction we arrived through.
        let (dx, dy) = DIRECTIONS[via as usize];
        x = x.wrapping_add_signed(-dx);
        y = y.wrapping_add_signed(-dy);
        path.push((x, y));
    }

    path.reverse();
    path
}

/// Check that `path` is a well-formed walk from `start` to `goal`: it begins
/// and ends at the queried cells, every cell is walkable, and consecutive
/// cells are 4-adjacent.
#[must_use]
pub fn is_valid_path(grid: &TerrainGrid, path: &[Point], start: Point, goal: Point) -> bool {
    if path.first() != Some(&start) || path.last() != Some(&goal) {
        return false;
    }
    if !path.iter().all(|&(x, y)| grid.is_walkable(x, y)) {
        return false;
    }
    path.windows(2).all(|w| manhattan(w[0], w[1]) == 1)
}

/// Check whether start and goal are joined by more than one route.
///
/// Finds a path, blocks its midpoint in a private copy of the grid and
/// searches again. Returns `false` if there is no path at all, if the
/// midpoint lies on the map boundary, or if blocking it disconnects the
/// endpoints. The caller's grid is never modified.
#[must_use]
pub fn has_multiple_routes(
    grid: &TerrainGrid,
    start_x: u32,
    start_y: u32,
    goal_x: u32,
    goal_y: u32,
) -> bool {
    let path = find_path(grid, start_x, start_y, goal_x, goal_y);
    if path.is_empty() {
        return false;
    }

    let (mx, my) = path[path.len() / 2];
    if grid.is_boundary(mx, my) {
        return false;
    }

    let mut blocked = grid.clone();
    blocked.set(mx, my, TerrainType::Mountain);
    !find_path(&blocked, start_x, start_y, goal_x, goal_y).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_grid(width: u32, height: u32) -> TerrainGrid {
        TerrainGrid::new(width, height, TerrainType::Grass)
    }

    #[test]
    fn test_simple_path() {
        let grid = open_grid(10, 10);
        let path = find_path(&grid, 0, 0, 5, 5);

        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(5, 5)));
        // 4-connected shortest path visits manhattan + 1 cells
        assert_eq!(path.len(), 11);
        assert!(is_valid_path(&grid, &path, (0, 0), (5, 5)));
    }

    #[test]
    fn test_path_around_obstacle() {
        let mut grid = open_grid(10, 10);

        // Create a vertical wall
        for y in 2..8 {
            grid.set(5, y, TerrainType::Mountain);
        }

        let path = find_path(&grid, 2, 5, 8, 5);
        assert!(!path.is_empty());
        assert!(is_valid_path(&grid, &path, (2, 5), (8, 5)));
        for &(x, y) in &path {
            assert!(grid.is_walkable(x, y), "Path goes through blocked cell ({x}, {y})");
        }
    }

    #[test]
    fn test_no_path_exists() {
        let mut grid = open_grid(10, 10);

        // Create a complete barrier
        for y in 0..10 {
            grid.set(5, y, TerrainType::Water);
        }

        assert!(find_path(&grid, 2, 5, 8, 5).is_empty());
        assert_eq!(
            search(&grid, (2, 5), (8, 5), SearchLimits::UNBOUNDED),
            SearchOutcome::Unreachable
        );
    }

    #[test]
    fn test_walkable_features_are_crossable() {
        let mut grid = open_grid(9, 3);
        for y in 0..3 {
            grid.set(4, y, TerrainType::Water);
        }
        assert!(find_path(&grid, 0, 1, 8, 1).is_empty());

        grid.set(4, 1, TerrainType::Bridge);
        let path = find_path(&grid, 0, 1, 8, 1);
        assert!(path.contains(&(4, 1)));

        grid.set(4, 1, TerrainType::Mountain);
        grid.set(4, 2, TerrainType::MountainPass);
        assert!(find_path(&grid, 0, 1, 8, 1).contains(&(4, 2)));
    }

    #[test]
    fn test_no_diagonal_moves() {
        let mut grid = open_grid(2, 2);
        grid.set(1, 0, TerrainType::Mountain);
        grid.set(0, 1, TerrainType::Mountain);
        // Only a diagonal connects the corners.
        assert!(find_path(&grid, 0, 0, 1, 1).is_empty());
    }

    #[test]
    fn test_path_to_same_cell() {
        let grid = open_grid(10, 10);
        assert_eq!(find_path(&grid, 5, 5, 5, 5), vec![(5, 5)]);
    }

    #[test]
    fn test_blocked_or_outside_endpoints() {
        let mut grid = open_grid(10, 10);
        grid.set(0, 0, TerrainType::Mountain);
        grid.set(5, 5, TerrainType::Water);

        assert!(find_path(&grid, 0, 0, 3, 3).is_empty());
        assert!(find_path(&grid, 3, 3, 5, 5).is_empty());
        assert!(find_path(&grid, 3, 3, 10, 3).is_empty());
        assert!(find_path(&grid, 30, 3, 3, 3).is_empty());
    }

    #[test]
    fn test_budget_exhausted() {
        let grid = open_grid(50, 50);
        let outcome = search(&grid, (0, 0), (49, 49), SearchLimits::with_max_expansions(10));
        assert_eq!(outcome, SearchOutcome::BudgetExhausted { expanded: 10 });
        assert!(outcome.into_path().is_empty());

        let outcome = search(&grid, (0, 0), (49, 49), SearchLimits::with_max_expansions(100_000));
        assert!(outcome.is_found());
    }

    #[test]
    fn test_determinism() {
        let mut grid = open_grid(20, 20);
        for i in 5..15 {
            grid.set(10, i, TerrainType::Mountain);
        }

        let path1 = find_path(&grid, 5, 10, 15, 10);
        let path2 = find_path(&grid, 5, 10, 15, 10);
        let path3 = find_path(&grid, 5, 10, 15, 10);

        assert_eq!(path1, path2);
        assert_eq!(path2, path3);
    }

    #[test]
    fn test_shortest_length_through_maze() {
        // Serpentine corridor: walls with alternating gaps.
        let mut grid = open_grid(7, 7);
        for x in 0..6 {
            grid.set(x, 1, TerrainType::Mountain);
        }
        for x in 1..7 {
            grid.set(x, 3, TerrainType::Mountain);
        }
        for x in 0..6 {
            grid.set(x, 5, TerrainType::Mountain);
        }

        let path = find_path(&grid, 0, 0, 0, 6);
        assert!(is_valid_path(&grid, &path, (0, 0), (0, 6)));
        // 6 across, 2 down, 6 back, 2 down, 6 across, 2 down, 6 back.
        assert_eq!(path.len(), 6 * 4 + 6 + 1);
    }

    #[test]
    fn test_manhattan_heuristic() {
        assert_eq!(manhattan((0, 0), (5, 5)), 10);
        assert_eq!(manhattan((0, 0), (3, 7)), 10);
        assert_eq!(manhattan((5, 5), (5, 5)), 0);
    }

    #[test]
    fn test_is_valid_path_rejects_bad_paths() {
        let mut grid = open_grid(5, 5);
        grid.set(2, 0, TerrainType::Water);

        assert!(is_valid_path(&grid, &[(0, 0), (1, 0)], (0, 0), (1, 0)));
        assert!(!is_valid_path(&grid, &[(0, 0), (1, 1)], (0, 0), (1, 1)));
        assert!(!is_valid_path(&grid, &[(1, 0), (2, 0), (3, 0)], (1, 0), (3, 0)));
        assert!(!is_valid_path(&grid, &[(0, 0), (1, 0)], (0, 0), (2, 2)));
        assert!(!is_valid_path(&grid, &[], (0, 0), (0, 0)));
    }

    #[test]
    fn test_multiple_routes_open_field() {
        let grid = open_grid(9, 9);
        assert!(has_multiple_routes(&grid, 1, 4, 7, 4));
    }

    #[test]
    fn test_single_corridor_has_one_route() {
        let mut grid = TerrainGrid::new(9, 3, TerrainType::Mountain);
        for x in 0..9 {
            grid.set(x, 1, TerrainType::Grass);
        }
        // Midpoint (4, 1) is interior; blocking it severs the corridor.
        assert!(!has_multiple_routes(&grid, 0, 1, 8, 1));
    }

    #[test]
    fn test_boundary_midpoint_reports_single_route() {
        let grid = open_grid(9, 9);
        // Straight path along the top edge has its midpoint on the boundary.
        assert!(!has_multiple_routes(&grid, 0, 0, 8, 0));
    }

    #[test]
    fn test_no_path_means_no_routes() {
        let mut grid = open_grid(5, 5);
        for y in 0..5 {
            grid.set(2, y, TerrainType::Water);
        }
        assert!(!has_multiple_routes(&grid, 0, 2, 4, 2));
    }

    #[test]
    fn test_multiple_routes_does_not_mutate_grid() {
        let mut grid = open_grid(12, 12);
        grid.set(6, 6, TerrainType::Water);
        let before = grid.clone();

        let _ = has_multiple_routes(&grid, 1, 1, 10, 10);
        assert_eq!(grid, before);
    }
}
