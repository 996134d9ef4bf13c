//! Test fixtures and helpers.
//!
//! Hand-drawn grids for consistent testing. Rows use the same glyphs the
//! text renderer prints:
//!
//! ```text
//! .  grass      :  sand     ~  water    ^  mountain
//! T  forest     =  bridge   n  mountain pass
//! ```

use trail_core::grid::TerrainGrid;
use trail_core::terrain::TerrainType;

/// Build a grid from glyph rows.
///
/// Leading and trailing whitespace on each line is ignored, as are blank
/// lines, so fixtures can be indented inside test bodies.
///
/// # Panics
///
/// Panics on an unknown glyph or ragged rows.
#[must_use]
pub fn grid_from_ascii(text: &str) -> TerrainGrid {
    let rows: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    assert!(!rows.is_empty(), "fixture has no rows");

    let width = rows[0].chars().count();
    let mut cells = Vec::with_capacity(width * rows.len());
    for (y, row) in rows.iter().enumerate() {
        assert_eq!(row.chars().count(), width, "row {y} has a different width");
        for glyph in row.chars() {
            let terrain = TerrainType::from_glyph(glyph)
                .unwrap_or_else(|| panic!("unknown glyph {glyph:?} in row {y}"));
            cells.push(terrain);
        }
    }

    let height = rows.len();
    TerrainGrid::from_cells(width as u32, height as u32, cells)
        .unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}

/// An all-grass grid.
#[must_use]
pub fn open_grid(width: u32, height: u32) -> TerrainGrid {
    TerrainGrid::new(width, height, TerrainType::Grass)
}

/// A grid whose column `wall_x` is mountain except for a gap at `gap_y`.
///
/// Pass `None` for a solid wall.
#[must_use]
pub fn walled_grid(width: u32, height: u32, wall_x: u32, gap_y: Option<u32>) -> TerrainGrid {
    let mut grid = open_grid(width, height);
    for y in 0..height {
        if Some(y) != gap_y {
            grid.set(wall_x, y, TerrainType::Mountain);
        }
    }
    grid
}
