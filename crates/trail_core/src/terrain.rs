//! Terrain variants, their movement attributes, and base-layer synthesis.
//!
//! The base layer assigns every cell a terrain type from one random draw
//! using fixed cumulative thresholds. These thresholds are the only place
//! raw terrain frequencies are defined; feature passes overwrite parts of
//! the base layer afterwards.

use serde::{Deserialize, Serialize};

use crate::grid::TerrainGrid;
use crate::math::{fixed_serde, ratio, Fixed};
use crate::rng::SeededRng;

/// Terrain variant of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TerrainType {
    /// Open ground.
    #[default]
    Grass,
    /// Loose ground, walkable but slower.
    Sand,
    /// Impassable water.
    Water,
    /// Impassable rock.
    Mountain,
    /// Dense trees, walkable.
    Forest,
    /// Walkable crossing over a river.
    Bridge,
    /// Walkable gap through a mountain range.
    MountainPass,
}

impl TerrainType {
    /// All variants in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Grass,
        Self::Sand,
        Self::Water,
        Self::Mountain,
        Self::Forest,
        Self::Bridge,
        Self::MountainPass,
    ];

    /// Movement attributes for this variant.
    #[must_use]
    pub fn config(self) -> TerrainConfig {
        terrain_config(self)
    }

    /// Returns true if an entity may occupy or pass through this terrain.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::Water | Self::Mountain)
    }

    /// Single-character rendering used by text views.
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Grass => '.',
            Self::Sand => ':',
            Self::Water => '~',
            Self::Mountain => '^',
            Self::Forest => 'T',
            Self::Bridge => '=',
            Self::MountainPass => 'n',
        }
    }

    /// Decode the `#[repr(u8)]` discriminant.
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(value as usize).copied()
    }

    /// Inverse of [`TerrainType::glyph`].
    #[must_use]
    pub fn from_glyph(glyph: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.glyph() == glyph)
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Grass => "grass",
            Self::Sand => "sand",
            Self::Water => "water",
            Self::Mountain => "mountain",
            Self::Forest => "forest",
            Self::Bridge => "bridge",
            Self::MountainPass => "mountain_pass",
        }
    }
}

/// Movement attributes of a terrain variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainConfig {
    /// The variant these attributes describe.
    pub terrain: TerrainType,
    /// Whether a move into the cell is legal.
    pub walkable: bool,
    /// Speed multiplier in `(0, 1]`. Nominal for non-walkable terrain.
    #[serde(with = "fixed_serde")]
    pub movement_speed: Fixed,
}

impl TerrainConfig {
    /// Movement speed as a float, for consumers that animate with `f32`.
    #[must_use]
    pub fn movement_speed_f32(&self) -> f32 {
        self.movement_speed.to_num::<f32>()
    }
}

/// Pure lookup of movement attributes for a terrain variant.
#[must_use]
pub fn terrain_config(terrain: TerrainType) -> TerrainConfig {
    let movement_speed = match terrain {
        TerrainType::Grass => Fixed::ONE,
        TerrainType::Sand => ratio(7, 10),
        TerrainType::Forest => ratio(1, 2),
        TerrainType::Bridge => ratio(4, 5),
        TerrainType::MountainPass => ratio(2, 5),
        TerrainType::Water => ratio(3, 10),
        TerrainType::Mountain => ratio(1, 5),
    };
    TerrainConfig {
        terrain,
        walkable: terrain.is_walkable(),
        movement_speed,
    }
}

/// Map one uniform draw to a base terrain type.
///
/// Cumulative thresholds: grass 40%, sand 20%, forest 15%, water 10%,
/// mountain 15%.
#[must_use]
pub fn base_terrain_for(r: f64) -> TerrainType {
    if r < 0.40 {
        TerrainType::Grass
    } else if r < 0.60 {
        TerrainType::Sand
    } else if r < 0.75 {
        TerrainType::Forest
    } else if r < 0.85 {
        TerrainType::Water
    } else {
        TerrainType::Mountain
    }
}

/// Build the base terrain layer, one draw per cell in row-major order.
#[must_use]
pub fn synthesize_base(width: u32, height: u32, rng: &mut SeededRng) -> TerrainGrid {
    let cells = (0..(width as usize) * (height as usize))
        .map(|_| base_terrain_for(rng.next_f64()))
        .collect();
    TerrainGrid::from_raw(width, height, cells)
}
