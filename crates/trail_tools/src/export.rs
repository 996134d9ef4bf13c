//! Map export in text formats.

use std::collections::BTreeMap;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use trail_core::connectivity::ConnectivityReport;
use trail_core::map_generation::MapData;
use trail_core::terrain::TerrainType;

use crate::error::{Result, ToolError};
use crate::render::render_ascii;

/// Output format for the `generate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ExportFormat {
    /// Glyph rows with `S` and `G` markers.
    #[default]
    Ascii,
    /// Pretty-printed JSON document.
    Json,
    /// Pretty-printed RON document.
    Ron,
}

/// Portable view of a map for JSON and RON export.
///
/// Rows use the same glyphs as the ASCII renderer without endpoint markers,
/// so a document can be loaded back into a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapExport {
    /// Seed that reproduces the map.
    pub seed: String,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Start cell.
    pub start: (u32, u32),
    /// Goal cell.
    pub goal: (u32, u32),
    /// Connectivity outcome.
    pub connectivity: ConnectivityReport,
    /// Cell counts keyed by terrain name.
    pub terrain_counts: BTreeMap<String, usize>,
    /// Glyph rows, top to bottom.
    pub rows: Vec<String>,
}

impl MapExport {
    /// Build the export view of a map.
    #[must_use]
    pub fn from_map(map: &MapData) -> Self {
        let counts = map.terrain_counts();
        let terrain_counts = TerrainType::ALL
            .into_iter()
            .map(|t| (t.name().to_owned(), counts[t as usize]))
            .collect();
        let rows = map
            .grid()
            .cells()
            .chunks(map.width() as usize)
            .map(|row| row.iter().map(|t| t.glyph()).collect())
            .collect();

        Self {
            seed: map.seed().to_owned(),
            width: map.width(),
            height: map.height(),
            start: map.start(),
            goal: map.goal(),
            connectivity: *map.connectivity(),
            terrain_counts,
            rows,
        }
    }
}

/// Render a map in the requested format.
pub fn export_map(map: &MapData, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Ascii => Ok(render_ascii(map)),
        ExportFormat::Json => Ok(serde_json::to_string_pretty(&MapExport::from_map(map))?),
        ExportFormat::Ron => ron::ser::to_string_pretty(
            &MapExport::from_map(map),
            ron::ser::PrettyConfig::default(),
        )
        .map_err(|e| ToolError::Ron(e.to_string())),
    }
}

/// Write rendered output to a file, or to stdout when `path` is `None`.
pub fn write_output(text: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text)?;
            tracing::info!(path = %path.display(), bytes = text.len(), "Wrote output");
        }
        None => print!("{text}"),
    }
    Ok(())
}
