//! Generator configuration.
//!
//! Configs are plain serde data so they can be written by hand in RON and
//! loaded by tools. `GeneratorConfig::default()` reproduces the baseline
//! generator exactly; presets only adjust feature probabilities.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::pathfinding::SearchLimits;

/// Smallest accepted side length. Anything smaller has no interior/boundary split.
pub const MIN_DIMENSION: u32 = 2;

/// Default largest accepted side length.
pub const DEFAULT_MAX_DIMENSION: u32 = 10_000;

/// Default number of repair attempts before giving up on connectivity.
pub const DEFAULT_MAX_REPAIR_ATTEMPTS: u32 = 10;

/// Probabilities used by the feature passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureParams {
    /// Chance that a river cell becomes a bridge instead of water.
    pub bridge_chance: f64,
    /// Chance that a mountain-range cell becomes a pass instead of mountain.
    pub pass_chance: f64,
    /// Chance that a grass or sand cell inside a forest cluster becomes forest.
    pub forest_fill: f64,
}

impl Default for FeatureParams {
    fn default() -> Self {
        Difficulty::Normal.feature_params()
    }
}

impl FeatureParams {
    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("bridge_chance", self.bridge_chance),
            ("pass_chance", self.pass_chance),
            ("forest_fill", self.forest_fill),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(MapError::InvalidConfig(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Difficulty presets for feature density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Difficulty {
    /// More crossings, sparser forests.
    Easy,
    /// Baseline generator.
    #[default]
    Normal,
    /// Fewer crossings, denser forests.
    Hard,
}

impl Difficulty {
    /// All presets, easiest first.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Normal, Self::Hard];

    /// Feature probabilities for this preset.
    #[must_use]
    pub const fn feature_params(self) -> FeatureParams {
        match self {
            Self::Easy => FeatureParams {
                bridge_chance: 0.25,
                pass_chance: 0.30,
                forest_fill: 0.6,
            },
            Self::Normal => FeatureParams {
                bridge_chance: 0.15,
                pass_chance: 0.20,
                forest_fill: 0.7,
            },
            Self::Hard => FeatureParams {
                bridge_chance: 0.10,
                pass_chance: 0.10,
                forest_fill: 0.85,
            },
        }
    }

    /// Parse a preset name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            _ => None,
        }
    }
}

/// Square map size presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapSize {
    /// 8x8 tutorial map.
    Tiny,
    /// 12x12.
    Small,
    /// 16x16.
    Medium,
    /// 20x20.
    Large,
    /// 50x50.
    Huge,
    /// 100x100.
    Massive,
    /// 200x200.
    Gigantic,
    /// 1,000x1,000.
    Custom1000,
    /// 5,000x5,000.
    Custom5000,
    /// 10,000x10,000.
    Custom10000,
}

impl MapSize {
    /// All presets, smallest first.
    pub const ALL: [Self; 10] = [
        Self::Tiny,
        Self::Small,
        Self::Medium,
        Self::Large,
        Self::Huge,
        Self::Massive,
        Self::Gigantic,
        Self::Custom1000,
        Self::Custom5000,
        Self::Custom10000,
    ];

    /// Side length in cells.
    #[must_use]
    pub const fn side(self) -> u32 {
        match self {
            Self::Tiny => 8,
            Self::Small => 12,
            Self::Medium => 16,
            Self::Large => 20,
            Self::Huge => 50,
            Self::Massive => 100,
            Self::Gigantic => 200,
            Self::Custom1000 => 1_000,
            Self::Custom5000 => 5_000,
            Self::Custom10000 => 10_000,
        }
    }

    /// `(width, height)` in cells.
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        (self.side(), self.side())
    }

    /// Stable lowercase name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Huge => "huge",
            Self::Massive => "massive",
            Self::Gigantic => "gigantic",
            Self::Custom1000 => "custom_1000",
            Self::Custom5000 => "custom_5000",
            Self::Custom10000 => "custom_10000",
        }
    }

    /// Parse a preset name (case-insensitive).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL.into_iter().find(|size| size.name() == name)
    }

    /// Maps over 50 cells a side are treated as large by consumers.
    #[must_use]
    pub const fn is_large(self) -> bool {
        self.side() > 50
    }

    /// Maps over 25 cells a side need a scrolling viewport.
    #[must_use]
    pub const fn uses_viewport(self) -> bool {
        self.side() > 25
    }
}

/// How the repair loop chooses endpoints on each retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RepairPolicy {
    /// Re-run edge normalization and start/goal selection on the repaired grid.
    #[default]
    Reselect,
    /// Keep the first start/goal pair and carve between it until connected.
    FixedEndpoints,
}

/// Configuration for [`crate::map_generation::MapGenerator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Largest accepted width or height.
    pub max_dimension: u32,
    /// Repair attempts before connectivity is reported as not guaranteed.
    pub max_repair_attempts: u32,
    /// Endpoint policy of the repair loop.
    pub repair_policy: RepairPolicy,
    /// Expansion budget for each A* search. `None` is unbounded.
    pub max_expansions: Option<u64>,
    /// Feature pass probabilities.
    pub features: FeatureParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_DIMENSION,
            max_repair_attempts: DEFAULT_MAX_REPAIR_ATTEMPTS,
            repair_policy: RepairPolicy::Reselect,
            max_expansions: None,
            features: FeatureParams::default(),
        }
    }
}

impl GeneratorConfig {
    /// Apply a difficulty preset to the feature probabilities.
    #[must_use]
    pub const fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.features = difficulty.feature_params();
        self
    }

    /// Set the repair endpoint policy.
    #[must_use]
    pub const fn with_repair_policy(mut self, policy: RepairPolicy) -> Self {
        self.repair_policy = policy;
        self
    }

    /// Set the per-search expansion budget.
    #[must_use]
    pub const fn with_max_expansions(mut self, max: u64) -> Self {
        self.max_expansions = Some(max);
        self
    }

    /// Set the number of repair attempts.
    #[must_use]
    pub const fn with_max_repair_attempts(mut self, attempts: u32) -> Self {
        self.max_repair_attempts = attempts;
        self
    }

    /// Set the largest accepted side length.
    #[must_use]
    pub const fn with_max_dimension(mut self, max: u32) -> Self {
        self.max_dimension = max;
        self
    }

    /// Search limits derived from this config.
    #[must_use]
    pub const fn search_limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.max_expansions,
        }
    }

    /// Check the config for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension < MIN_DIMENSION {
            return Err(MapError::InvalidConfig(format!(
                "max_dimension must be at least {MIN_DIMENSION}, got {}",
                self.max_dimension
            )));
        }
        if self.max_expansions == Some(0) {
            return Err(MapError::InvalidConfig(
                "max_expansions must be positive when set".into(),
            ));
        }
        self.features.validate()
    }

    /// Reject dimensions outside `MIN_DIMENSION..=max_dimension`.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        let range = MIN_DIMENSION..=self.max_dimension;
        if range.contains(&width) && range.contains(&height) {
            Ok(())
        } else {
            Err(MapError::InvalidDimensions {
                width,
                height,
                min: MIN_DIMENSION,
                max: self.max_dimension,
            })
        }
    }

    /// Clamp a custom size request into the accepted range.
    #[must_use]
    pub fn clamp_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (
            width.clamp(MIN_DIMENSION, self.max_dimension),
            height.clamp(MIN_DIMENSION, self.max_dimension),
        )
    }

    /// Parse a config from RON text and validate it.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)
            .map_err(|e| MapError::Serialization(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a RON config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            MapError::Io(format!(
                "Failed to read config '{}': {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_ron_str(&text)
    }

    /// Render the config as pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| MapError::Serialization(format!("Failed to write config: {e}")))
    }
}
