//! Procedural map generation facade.
//!
//! Generates traversable maps with:
//! - A random base terrain layer
//! - Rivers with bridges, mountain ranges with passes, forest clusters
//! - A walkable boundary ring
//! - A start on the boundary and the farthest walkable cell as goal
//! - A verified (or explicitly reported) start-to-goal route
//!
//! The same seed and dimensions always produce the same map.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::{GeneratorConfig, MapSize};
use crate::connectivity::{enforce_connectivity, ConnectivityReport};
use crate::error::{MapError, Result};
use crate::features::apply_features;
use crate::grid::TerrainGrid;
use crate::pathfinding::{find_path, has_multiple_routes, Point};
use crate::rng::{fnv1a, random_seed, SeededRng, FNV_OFFSET_BASIS};
use crate::terrain::{synthesize_base, TerrainType};

/// Saved map format version for compatibility.
pub const MAP_FORMAT_VERSION: u32 = 1;

/// A finished map. Immutable once generated.
///
/// Consumers that need per-cell state (visited, collected) keep it in a
/// separate structure such as [`crate::overlay::CellFlags`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    grid: TerrainGrid,
    width: u32,
    height: u32,
    start_x: u32,
    start_y: u32,
    goal_x: u32,
    goal_y: u32,
    seed: String,
    connectivity: ConnectivityReport,
}

/// Versioned envelope for saved maps.
#[derive(Serialize, Deserialize)]
struct SavedMap {
    version: u32,
    map: MapData,
}

impl MapData {
    /// The terrain grid.
    #[must_use]
    pub const fn grid(&self) -> &TerrainGrid {
        &self.grid
    }

    /// Map width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Map height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Start cell.
    #[must_use]
    pub const fn start(&self) -> Point {
        (self.start_x, self.start_y)
    }

    /// Goal cell.
    #[must_use]
    pub const fn goal(&self) -> Point {
        (self.goal_x, self.goal_y)
    }

    /// Seed that reproduces this map.
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Outcome of the connectivity pass.
    #[must_use]
    pub const fn connectivity(&self) -> &ConnectivityReport {
        &self.connectivity
    }

    /// Whether a start-to-goal route was verified during generation.
    #[must_use]
    pub const fn is_connectivity_guaranteed(&self) -> bool {
        self.connectivity.guaranteed
    }

    /// Terrain at grid coordinates, `None` if out of bounds.
    #[must_use]
    pub fn terrain_at(&self, x: u32, y: u32) -> Option<TerrainType> {
        self.grid.get(x, y)
    }

    /// Whether a move into (x, y) is legal.
    #[must_use]
    pub fn is_walkable(&self, x: u32, y: u32) -> bool {
        self.grid.is_walkable(x, y)
    }

    /// Shortest start-to-goal path, empty if none.
    #[must_use]
    pub fn solution(&self) -> Vec<Point> {
        find_path(&self.grid, self.start_x, self.start_y, self.goal_x, self.goal_y)
    }

    /// Whether start and goal are joined by more than one route.
    #[must_use]
    pub fn has_multiple_routes(&self) -> bool {
        has_multiple_routes(&self.grid, self.start_x, self.start_y, self.goal_x, self.goal_y)
    }

    /// Number of cells of each terrain type, indexed like [`TerrainType::ALL`].
    #[must_use]
    pub fn terrain_counts(&self) -> [usize; 7] {
        self.grid.terrain_counts()
    }

    /// Fraction of cells that are walkable.
    #[must_use]
    pub fn walkable_ratio(&self) -> f64 {
        self.grid.walkable_ratio()
    }

    /// Calculate a hash of the map contents.
    ///
    /// FNV-1a over little-endian dimensions, one byte per cell, then start
    /// and goal. The value is stable across builds and platforms, so it can
    /// be recorded and compared later.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hash = fnv1a(FNV_OFFSET_BASIS, &self.width.to_le_bytes());
        hash = fnv1a(hash, &self.height.to_le_bytes());
        for &cell in self.grid.cells() {
            hash = fnv1a(hash, &[cell as u8]);
        }
        for value in [self.start_x, self.start_y, self.goal_x, self.goal_y] {
            hash = fnv1a(hash, &value.to_le_bytes());
        }
        hash
    }

    /// Serialize the map to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let saved = SavedMap {
            version: MAP_FORMAT_VERSION,
            map: self.clone(),
        };
        bincode::serialize(&saved)
            .map_err(|e| MapError::Serialization(format!("Failed to serialize map: {e}")))
    }

    /// Deserialize a map from bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let saved: SavedMap = bincode::deserialize(bytes)
            .map_err(|e| MapError::Serialization(format!("Failed to deserialize map: {e}")))?;

        // Version check
        if saved.version != MAP_FORMAT_VERSION {
            return Err(MapError::VersionMismatch {
                expected: MAP_FORMAT_VERSION,
                found: saved.version,
            });
        }

        let map = saved.map;
        if !map.is_consistent() {
            return Err(MapError::Serialization(
                "Saved map dimensions do not match its grid".into(),
            ));
        }
        Ok(map)
    }

    /// Save the map to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| MapError::Io(format!("Failed to write map file: {e}")))
    }

    /// Load a map from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| MapError::Io(format!("Failed to read map file: {e}")))?;
        Self::from_bytes(&bytes)
    }

    fn is_consistent(&self) -> bool {
        self.grid.is_consistent()
            && self.grid.width() == self.width
            && self.grid.height() == self.height
            && self.grid.in_bounds(self.start_x, self.start_y)
            && self.grid.in_bounds(self.goal_x, self.goal_y)
    }
}

/// Map generator with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct MapGenerator {
    config: GeneratorConfig,
}

impl MapGenerator {
    /// Create a generator after validating its config.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The generator's configuration.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a map.
    ///
    /// A missing or empty `seed` is replaced by a generated one, which is
    /// stored in the result.
    ///
    /// # Errors
    ///
    /// Returns `MapError::InvalidDimensions` if either side is below 2 or
    /// above the configured maximum.
    pub fn generate(&self, width: u32, height: u32, seed: Option<&str>) -> Result<MapData> {
        self.config.check_dimensions(width, height)?;

        let seed = match seed {
            Some(seed) if !seed.is_empty() => seed.to_owned(),
            _ => random_seed(),
        };
        let mut rng = SeededRng::new(&seed);

        let mut grid = synthesize_base(width, height, &mut rng);
        apply_features(&mut grid, &mut rng, &self.config.features);
        let (endpoints, connectivity) = enforce_connectivity(&mut grid, &mut rng, &self.config);

        tracing::info!(
            width,
            height,
            seed = %seed,
            guaranteed = connectivity.guaranteed,
            repair_attempts = connectivity.repair_attempts,
            draws = rng.draws(),
            "Generated map"
        );

        Ok(MapData {
            grid,
            width,
            height,
            start_x: endpoints.start.0,
            start_y: endpoints.start.1,
            goal_x: endpoints.goal.0,
            goal_y: endpoints.goal.1,
            seed,
            connectivity,
        })
    }

    /// Generate a map from a size preset.
    pub fn generate_size(&self, size: MapSize, seed: Option<&str>) -> Result<MapData> {
        let (width, height) = size.dimensions();
        self.generate(width, height, seed)
    }
}

/// Generate a map with the default configuration.
pub fn generate_map(width: u32, height: u32, seed: Option<&str>) -> Result<MapData> {
    MapGenerator::default().generate(width, height, seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, RepairPolicy};
    use crate::pathfinding::is_valid_path;

    fn assert_map_invariants(map: &MapData) {
        let grid = map.grid();
        assert_eq!(grid.width(), map.width());
        assert_eq!(grid.height(), map.height());
        assert_eq!(grid.len(), (map.width() * map.height()) as usize);

        for (x, y) in grid.boundary_cells() {
            assert!(grid.is_walkable(x, y), "boundary cell ({x}, {y}) is blocked");
        }

        let (sx, sy) = map.start();
        let (gx, gy) = map.goal();
        assert!(map.is_walkable(sx, sy));
        assert!(map.is_walkable(gx, gy));
        assert!(grid.is_boundary(sx, sy));
        assert_ne!(map.start(), map.goal());
    }

    #[test]
    fn test_generate_small_map() {
        let map = generate_map(16, 16, Some("abc123")).unwrap();
        assert_eq!(map.seed(), "abc123");
        assert_map_invariants(&map);
        assert!(map.is_connectivity_guaranteed());
    }

    #[test]
    fn test_determinism() {
        let map1 = generate_map(16, 16, Some("abc123")).unwrap();
        let map2 = generate_map(16, 16, Some("abc123")).unwrap();

        // Same seed should produce identical maps
        assert_eq!(map1, map2);
        assert_eq!(map1.state_hash(), map2.state_hash());
    }

    #[test]
    fn test_known_map_output() {
        // Changing draw order, seeding or thresholds changes this map.
        let map = generate_map(16, 16, Some("abc123")).unwrap();

        assert_eq!(map.start(), (0, 8));
        assert_eq!(map.goal(), (15, 0));
        assert_eq!(map.terrain_counts(), [84, 44, 35, 36, 47, 5, 5]);
        assert_eq!(map.connectivity().repair_attempts, 0);
        assert_eq!(map.connectivity().path_length, 24);
        assert_eq!(
            map.grid().to_string(),
            concat!(
                "T.TT:..T:.......\n",
                "..^:T~T^::.~~TTT\n",
                "..:T~^^T^^.^~~T.\n",
                ":~.^=^..n^.~T.^.\n",
                "..:~~^::n..~^:^.\n",
                "..::=:..^.T=.T~.\n",
                "::^.~T^.T.~..^~T\n",
                ".:.T~.~:T~.=^TTT\n",
                "T..:~.::::^~^...\n",
                "T:^~.~T^TT.~T:T.\n",
                ":.T.~~:^^^nnn^TT\n",
                ":..:.~::..:~^...\n",
                ".:.::~^^^.~~:...\n",
                ":.T~.~:.^:T=T^~.\n",
                ".T^:TT~TT^^~TTT:\n",
                ":..:.T....T..T:.\n",
            )
        );
        assert_eq!(map.state_hash(), 0x9490_d63a_c600_ca7d);
    }

    #[test]
    fn test_different_seeds() {
        let map1 = generate_map(32, 32, Some("seed-one")).unwrap();
        let map2 = generate_map(32, 32, Some("seed-two")).unwrap();
        assert_ne!(map1.grid(), map2.grid());
    }

    #[test]
    fn test_generated_seed_reproduces_map() {
        let map = generate_map(20, 20, None).unwrap();
        assert!(!map.seed().is_empty());

        let again = generate_map(20, 20, Some(map.seed())).unwrap();
        assert_eq!(map, again);
    }

    #[test]
    fn test_empty_seed_is_replaced() {
        let map = generate_map(8, 8, Some("")).unwrap();
        assert!(!map.seed().is_empty());
    }

    #[test]
    fn test_rejects_degenerate_dimensions() {
        assert!(matches!(
            generate_map(1, 16, Some("x")),
            Err(MapError::InvalidDimensions { width: 1, height: 16, .. })
        ));
        assert!(generate_map(16, 1, Some("x")).is_err());
        assert!(generate_map(0, 0, Some("x")).is_err());
        assert!(generate_map(10_001, 16, Some("x")).is_err());
    }

    #[test]
    fn test_minimum_dimensions() {
        let map = generate_map(2, 2, Some("tiny")).unwrap();
        assert_map_invariants(&map);
        // Every cell of a 2x2 grid is boundary, so all are walkable.
        assert!(map.grid().cells().iter().all(|t| t.is_walkable()));
    }

    #[test]
    fn test_tutorial_map_is_connected() {
        for seed in ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"] {
            let map = MapGenerator::default()
                .generate_size(MapSize::Tiny, Some(seed))
                .unwrap();
            assert_map_invariants(&map);
            assert!(map.connectivity().repair_attempts <= 10);
            assert!(map.is_connectivity_guaranteed());

            let path = map.solution();
            assert!(is_valid_path(map.grid(), &path, map.start(), map.goal()));
            assert_eq!(path.len(), map.connectivity().path_length);
        }
    }

    #[test]
    fn test_rectangular_maps() {
        for (w, h) in [(2, 9), (9, 2), (40, 7), (7, 40)] {
            let map = generate_map(w, h, Some("rect")).unwrap();
            assert_map_invariants(&map);
        }
    }

    #[test]
    fn test_difficulty_changes_map() {
        let easy = MapGenerator::new(GeneratorConfig::default().with_difficulty(Difficulty::Easy))
            .unwrap()
            .generate(24, 24, Some("diff"))
            .unwrap();
        let normal = generate_map(24, 24, Some("diff")).unwrap();
        assert_map_invariants(&easy);
        // Same base layer, different feature probabilities.
        assert_ne!(easy.grid(), normal.grid());
    }

    #[test]
    fn test_fixed_endpoint_policy_generates_valid_maps() {
        let generator = MapGenerator::new(
            GeneratorConfig::default().with_repair_policy(RepairPolicy::FixedEndpoints),
        )
        .unwrap();
        let map = generator.generate(30, 30, Some("fixed")).unwrap();
        assert_map_invariants(&map);
        assert!(map.is_connectivity_guaranteed());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GeneratorConfig::default();
        config.features.forest_fill = -0.1;
        assert!(MapGenerator::new(config).is_err());
    }

    #[test]
    fn test_custom_max_dimension() {
        let generator =
            MapGenerator::new(GeneratorConfig::default().with_max_dimension(64)).unwrap();
        assert!(generator.generate(64, 64, Some("max")).is_ok());
        assert!(generator.generate(65, 64, Some("max")).is_err());
    }

    #[test]
    fn test_multiple_routes_query_does_not_mutate() {
        let map = generate_map(24, 24, Some("routes")).unwrap();
        let before = map.grid().clone();
        let _ = map.has_multiple_routes();
        assert_eq!(map.grid(), &before);
    }

    #[test]
    fn test_bytes_round_trip() {
        let map = generate_map(12, 10, Some("bytes")).unwrap();
        let bytes = map.to_bytes().unwrap();
        let restored = MapData::from_bytes(&bytes).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_version_mismatch() {
        let map = generate_map(8, 8, Some("version")).unwrap();
        let mut bytes = map.to_bytes().unwrap();
        // The version is the first little-endian u32 of the envelope.
        bytes[0] = 99;
        assert!(matches!(
            MapData::from_bytes(&bytes),
            Err(MapError::VersionMismatch { expected: 1, found: 99 })
        ));
    }

    #[test]
    fn test_corrupt_bytes_rejected() {
        assert!(matches!(
            MapData::from_bytes(&[1, 2, 3]),
            Err(MapError::Serialization(_))
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.bin");
        let map = generate_map(16, 16, Some("file")).unwrap();

        map.save(&path).unwrap();
        let loaded = MapData::load(&path).unwrap();
        assert_eq!(loaded, map);

        assert!(matches!(
            MapData::load(dir.path().join("missing.bin")),
            Err(MapError::Io(_))
        ));
    }

    #[test]
    fn test_terrain_statistics() {
        let map = generate_map(50, 50, Some("stats")).unwrap();
        let counts = map.terrain_counts();
        assert_eq!(counts.iter().sum::<usize>(), 2500);
        // Rivers always paint at least one row-spanning line.
        let river = counts[TerrainType::Water as usize] + counts[TerrainType::Bridge as usize];
        assert!(river > 0);
        assert!(map.walkable_ratio() > 0.0 && map.walkable_ratio() <= 1.0);
    }
}
