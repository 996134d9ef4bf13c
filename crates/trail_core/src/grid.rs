//! Flat terrain grid.
//!
//! Cells are stored in one row-major buffer indexed `y * width + x`. At
//! 10,000 x 10,000 cells this keeps the whole map in a single 100 MB
//! allocation (one byte per cell) instead of ten thousand row vectors.

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::terrain::TerrainType;

/// Rectangular terrain grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TerrainGrid {
    /// Grid width in cells.
    width: u32,
    /// Grid height in cells.
    height: u32,
    /// Cell data stored in row-major order, serialized one byte per cell.
    #[serde(with = "cells_serde")]
    cells: Vec<TerrainType>,
}

/// Serde support for cell buffers.
///
/// Encodes cells as their `u8` discriminants so a saved 10^8-cell map is
/// one byte per cell rather than one enum tag per cell.
mod cells_serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::terrain::TerrainType;

    pub fn serialize<S>(cells: &[TerrainType], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bytes: Vec<u8> = cells.iter().map(|&c| c as u8).collect();
        bytes.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<TerrainType>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        bytes
            .into_iter()
            .map(|b| {
                TerrainType::from_u8(b)
                    .ok_or_else(|| D::Error::custom(format!("invalid terrain value {b}")))
            })
            .collect()
    }
}

impl TerrainGrid {
    /// Create a grid with every cell set to `fill`.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, fill: TerrainType) -> Self {
        assert!(width > 0, "TerrainGrid width must be positive");
        assert!(height > 0, "TerrainGrid height must be positive");

        let cell_count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            cells: vec![fill; cell_count],
        }
    }

    /// Whether the cell buffer matches the stated dimensions.
    ///
    /// Always true for grids built through the constructors; used to check
    /// grids decoded from untrusted bytes.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.width > 0
            && self.height > 0
            && self.cells.len() == (self.width as usize) * (self.height as usize)
    }

    /// Create a grid from existing row-major cells.
    ///
    /// # Errors
    ///
    /// Returns `MapError::InvalidConfig` if the cell count does not match
    /// the dimensions or a dimension is zero.
    pub fn from_cells(width: u32, height: u32, cells: Vec<TerrainType>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidConfig(format!(
                "grid dimensions must be positive, got {width}x{height}"
            )));
        }
        let expected = (width as usize) * (height as usize);
        if cells.len() != expected {
            return Err(MapError::InvalidConfig(format!(
                "expected {expected} cells for {width}x{height}, got {}",
                cells.len()
            )));
        }
        Ok(Self::from_raw(width, height, cells))
    }

    pub(crate) fn from_raw(width: u32, height: u32, cells: Vec<TerrainType>) -> Self {
        debug_assert_eq!(cells.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            cells,
        }
    }

    /// Grid width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cell slice.
    #[must_use]
    pub fn cells(&self) -> &[TerrainType] {
        &self.cells
    }

    /// Convert (x, y) coordinates to a flat index.
    #[inline]
    #[must_use]
    pub fn index_of(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Convert a flat index back to (x, y) coordinates.
    #[inline]
    #[must_use]
    pub fn coords_of(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// Check if coordinates are within grid bounds.
    #[inline]
    #[must_use]
    pub const fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Get terrain at coordinates.
    /// Returns `None` if out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> Option<TerrainType> {
        if self.in_bounds(x, y) {
            Some(self.cells[self.index_of(x, y)])
        } else {
            None
        }
    }

    /// Terrain at a flat index.
    #[inline]
    #[must_use]
    pub fn at(&self, index: usize) -> TerrainType {
        self.cells[index]
    }

    /// Set terrain at coordinates.
    /// Returns `false` if out of bounds.
    pub fn set(&mut self, x: u32, y: u32, terrain: TerrainType) -> bool {
        if self.in_bounds(x, y) {
            let index = self.index_of(x, y);
            self.cells[index] = terrain;
            true
        } else {
            false
        }
    }

    /// Check if a cell is walkable. Out-of-bounds cells are not.
    #[must_use]
    pub fn is_walkable(&self, x: u32, y: u32) -> bool {
        self.get(x, y).is_some_and(TerrainType::is_walkable)
    }

    /// Whether (x, y) lies on the outer ring of the grid.
    #[must_use]
    pub const fn is_boundary(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    /// Boundary coordinates in scan order: for each column the top then the
    /// bottom cell, then for each interior row the left then the right cell.
    ///
    /// Every boundary cell appears exactly once, including on 1-wide grids.
    pub fn boundary_cells(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let (w, h) = (self.width, self.height);
        let rows = (0..w).flat_map(move |x| {
            let bottom = (h > 1).then_some((x, h - 1));
            std::iter::once((x, 0)).chain(bottom)
        });
        let columns = (1..h.saturating_sub(1)).flat_map(move |y| {
            let right = (w > 1).then_some((w - 1, y));
            std::iter::once((0, y)).chain(right)
        });
        rows.chain(columns)
    }

    /// Number of cells of each terrain type, indexed like [`TerrainType::ALL`].
    #[must_use]
    pub fn terrain_counts(&self) -> [usize; 7] {
        let mut counts = [0usize; 7];
        for &cell in &self.cells {
            counts[cell as usize] += 1;
        }
        counts
    }

    /// Fraction of cells that are walkable.
    #[must_use]
    pub fn walkable_ratio(&self) -> f64 {
        let walkable = self.cells.iter().filter(|c| c.is_walkable()).count();
        walkable as f64 / self.cells.len() as f64
    }

    pub(crate) fn set_index(&mut self, index: usize, terrain: TerrainType) {
        self.cells[index] = terrain;
    }
}

/// Render a grid as text using [`TerrainType::glyph`], one line per row.
impl std::fmt::Display for TerrainGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.cells.chunks(self.width as usize) {
            for cell in row {
                write!(f, "{}", cell.glyph())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = TerrainGrid::new(10, 4, TerrainType::Sand);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.len(), 40);
        assert!(grid.cells().iter().all(|&c| c == TerrainType::Sand));
    }

    #[test]
    fn test_index_round_trip() {
        let grid = TerrainGrid::new(7, 5, TerrainType::Grass);
        assert_eq!(grid.index_of(3, 2), 17);
        assert_eq!(grid.coords_of(17), (3, 2));
        assert_eq!(grid.coords_of(grid.len() - 1), (6, 4));
    }

    #[test]
    fn test_set_and_get() {
        let mut grid = TerrainGrid::new(5, 5, TerrainType::Grass);
        assert!(grid.is_walkable(2, 2));

        assert!(grid.set(2, 2, TerrainType::Water));
        assert!(!grid.is_walkable(2, 2));
        assert_eq!(grid.get(2, 2), Some(TerrainType::Water));

        assert!(!grid.set(5, 0, TerrainType::Water));
        assert_eq!(grid.get(5, 0), None);
        assert!(!grid.is_walkable(0, 5));
    }

    #[test]
    fn test_from_cells_validates_length() {
        assert!(TerrainGrid::from_cells(2, 2, vec![TerrainType::Grass; 4]).is_ok());
        assert!(matches!(
            TerrainGrid::from_cells(2, 2, vec![TerrainType::Grass; 3]),
            Err(MapError::InvalidConfig(_))
        ));
        assert!(TerrainGrid::from_cells(0, 2, Vec::new()).is_err());
    }

    #[test]
    fn test_boundary_detection() {
        let grid = TerrainGrid::new(4, 3, TerrainType::Grass);
        assert!(grid.is_boundary(0, 1));
        assert!(grid.is_boundary(3, 1));
        assert!(grid.is_boundary(2, 0));
        assert!(grid.is_boundary(2, 2));
        assert!(!grid.is_boundary(1, 1));
        assert!(!grid.is_boundary(2, 1));
    }

    #[test]
    fn test_boundary_cells_order_and_count() {
        let grid = TerrainGrid::new(4, 3, TerrainType::Grass);
        let cells: Vec<_> = grid.boundary_cells().collect();
        assert_eq!(
            cells,
            vec![
                (0, 0),
                (0, 2),
                (1, 0),
                (1, 2),
                (2, 0),
                (2, 2),
                (3, 0),
                (3, 2),
                (0, 1),
                (3, 1),
            ]
        );
        assert!(cells.iter().all(|&(x, y)| grid.is_boundary(x, y)));
    }

    #[test]
    fn test_boundary_cells_degenerate_grids() {
        let row = TerrainGrid::new(3, 1, TerrainType::Grass);
        assert_eq!(row.boundary_cells().count(), 3);

        let column = TerrainGrid::new(1, 3, TerrainType::Grass);
        assert_eq!(column.boundary_cells().count(), 3);

        let big = TerrainGrid::new(10, 8, TerrainType::Grass);
        assert_eq!(big.boundary_cells().count(), 2 * 10 + 2 * 6);
    }

    #[test]
    fn test_terrain_counts() {
        let mut grid = TerrainGrid::new(3, 3, TerrainType::Grass);
        grid.set(1, 1, TerrainType::Mountain);
        grid.set(0, 1, TerrainType::Bridge);
        let counts = grid.terrain_counts();
        assert_eq!(counts[TerrainType::Grass as usize], 7);
        assert_eq!(counts[TerrainType::Mountain as usize], 1);
        assert_eq!(counts[TerrainType::Bridge as usize], 1);
        assert!((grid.walkable_ratio() - 8.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_cells_are_bytes() {
        let mut grid = TerrainGrid::new(4, 4, TerrainType::Grass);
        grid.set(3, 3, TerrainType::MountainPass);
        let bytes = bincode::serialize(&grid).unwrap();
        // width + height + length prefix + one byte per cell
        assert_eq!(bytes.len(), 4 + 4 + 8 + 16);

        let restored: TerrainGrid = bincode::deserialize(&bytes).unwrap();
        assert_eq!(restored, grid);
        assert!(restored.is_consistent());
    }

    #[test]
    fn test_invalid_cell_byte_rejected() {
        let grid = TerrainGrid::new(2, 2, TerrainType::Grass);
        let mut bytes = bincode::serialize(&grid).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = 42;
        assert!(bincode::deserialize::<TerrainGrid>(&bytes).is_err());
    }

    #[test]
    fn test_display() {
        let mut grid = TerrainGrid::new(3, 2, TerrainType::Grass);
        grid.set(1, 0, TerrainType::Water);
        grid.set(2, 1, TerrainType::Mountain);
        assert_eq!(grid.to_string(), ".~.\n..^\n");
    }
}
