//! Text rendering of generated maps.

use trail_core::map_generation::MapData;
use trail_core::overlay::CellFlags;
use trail_core::pathfinding::Point;

/// Glyph for the start cell.
pub const START_GLYPH: char = 'S';
/// Glyph for the goal cell.
pub const GOAL_GLYPH: char = 'G';
/// Glyph for cells on a highlighted path.
pub const PATH_GLYPH: char = '*';

/// Render a map as glyph rows, marking start and goal.
#[must_use]
pub fn render_ascii(map: &MapData) -> String {
    render_with_flags(map, None)
}

/// Render a map with a highlighted path between start and goal.
#[must_use]
pub fn render_ascii_with_path(map: &MapData, path: &[Point]) -> String {
    let mut flags = CellFlags::new(map.width(), map.height());
    for &(x, y) in path {
        flags.set(x, y);
    }
    render_with_flags(map, Some(&flags))
}

fn render_with_flags(map: &MapData, highlight: Option<&CellFlags>) -> String {
    let width = map.width() as usize;
    let mut out = String::with_capacity((width + 1) * map.height() as usize);

    for y in 0..map.height() {
        for x in 0..map.width() {
            let glyph = if (x, y) == map.start() {
                START_GLYPH
            } else if (x, y) == map.goal() {
                GOAL_GLYPH
            } else if highlight.is_some_and(|flags| flags.get(x, y)) {
                PATH_GLYPH
            } else {
                map.terrain_at(x, y).map_or(' ', |t| t.glyph())
            };
            out.push(glyph);
        }
        out.push('\n');
    }
    out
}

/// One-paragraph summary of a map for terminal output.
#[must_use]
pub fn describe(map: &MapData) -> String {
    let report = map.connectivity();
    let (sx, sy) = map.start();
    let (gx, gy) = map.goal();
    format!(
        "seed={} size={}x{} start=({sx},{sy}) goal=({gx},{gy}) guaranteed={} repairs={} walkable={:.1}%",
        map.seed(),
        map.width(),
        map.height(),
        report.guaranteed,
        report.repair_attempts,
        map.walkable_ratio() * 100.0
    )
}
