//! Determinism testing utilities.
//!
//! Provides a harness for verifying that map generation produces identical
//! results given identical inputs.
//!
//! # Testing Strategy
//!
//! A seed string must reproduce the same map on every run and every
//! platform. Sources of non-determinism include:
//!
//! - **Floating-point comparisons on derived values**: Only raw uniform
//!   draws are compared against thresholds. Distances use integer math.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Generation never iterates a hash map; cells are visited in row-major
//!   order.
//!
//! - **System randomness**: Only an omitted seed touches thread-local
//!   randomness, and the generated seed is stored in the map.
//!
//! - **Draw order**: Every pass consumes draws in a fixed order, so adding a
//!   draw anywhere shifts every map. Tests pin draw counts for that reason.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual pass determinism (base layer, rivers, etc.)
//! 2. **Property tests**: Random seeds and sizes still reproduce
//! 3. **Parallel tests**: Running N generations on separate threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use trail_core::config::GeneratorConfig;
use trail_core::map_generation::{MapData, MapGenerator};

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic generation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert determinism with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Generation is non-deterministic!\n\
                 Runs: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a setup function multiple times and verify the results hash equal.
///
/// # Arguments
///
/// * `runs` - Number of times to run the setup
/// * `setup` - Function that produces the state under test
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```ignore
/// use trail_test_utils::determinism::verify_determinism;
/// use trail_core::map_generation::generate_map;
///
/// let result = verify_determinism(
///     5,
///     || generate_map(32, 32, Some("seed")).unwrap(),
///     |map| map.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, HashFn>(runs: usize, setup: Setup, hash: HashFn) -> DeterminismResult
where
    Setup: Fn() -> S,
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs).map(|_| hash(&setup())).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
    }
}

/// Generate the same map twice and compare state hashes.
///
/// Returns `false` if either generation fails.
pub fn verify_generation_determinism(
    config: &GeneratorConfig,
    width: u32,
    height: u32,
    seed: &str,
) -> bool {
    let Ok(generator) = MapGenerator::new(config.clone()) else {
        return false;
    };
    let result = verify_determinism(
        2,
        || generator.generate(width, height, Some(seed)).ok(),
        |map| map.as_ref().map_or(0, MapData::state_hash),
    );
    result.is_deterministic && result.hashes[0] != 0
}

/// Result of parallel generation runs.
#[derive(Debug, Clone)]
pub struct ParallelGenResult {
    /// State hash from each generation, `None` where generation failed.
    pub hashes: Vec<Option<u64>>,
    /// Number of generations run.
    pub num_runs: usize,
}

impl ParallelGenResult {
    /// Check if all generations succeeded and produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.iter().all(Option::is_some) && self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all generations matched.
    ///
    /// # Panics
    ///
    /// Panics if generations failed or produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            panic!(
                "Parallel generations diverged!\n\
                 Runs: {}\n\
                 All hashes: {:?}",
                self.num_runs, self.hashes
            );
        }
    }
}

/// Run N generations of the same map on scoped threads and collect hashes.
///
/// This is useful for catching non-determinism that only manifests under
/// thread scheduling variations, such as shared state between generators.
pub fn run_parallel_generations_scoped(
    config: &GeneratorConfig,
    width: u32,
    height: u32,
    seed: &str,
    num_runs: usize,
) -> ParallelGenResult {
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    MapGenerator::new(config.clone())
                        .and_then(|generator| generator.generate(width, height, Some(seed)))
                        .map(|map| map.state_hash())
                        .ok()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().ok().flatten())
            .collect()
    });

    tracing::debug!(num_runs, width, height, seed, "Parallel generations finished");

    ParallelGenResult { hashes, num_runs }
}

/// Compare two maps cell by cell, finding the first divergence.
///
/// Useful for debugging non-determinism by finding exactly which pass
/// started to differ.
///
/// # Returns
///
/// `None` if the grids match, `Some((x, y))` of the first differing cell in
/// row-major order otherwise. Maps with different dimensions diverge at
/// `(0, 0)`.
#[must_use]
pub fn find_first_divergence(a: &MapData, b: &MapData) -> Option<(u32, u32)> {
    if a.width() != b.width() || a.height() != b.height() {
        return Some((0, 0));
    }
    a.grid()
        .cells()
        .iter()
        .zip(b.grid().cells())
        .position(|(x, y)| x != y)
        .map(|index| a.grid().coords_of(index))
}

/// Verify that a serialization round-trip preserves the map exactly.
#[must_use]
pub fn verify_serialization_determinism(map: &MapData) -> bool {
    let Ok(bytes) = map.to_bytes() else {
        return false;
    };
    let Ok(restored) = MapData::from_bytes(&bytes) else {
        return false;
    };
    restored.state_hash() == map.state_hash() && &restored == map
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of map generation.
pub mod strategies {
    use proptest::prelude::*;
    use trail_core::config::{Difficulty, GeneratorConfig, RepairPolicy};

    /// Generate map dimensions between the minimum side and `max_side`.
    pub fn arb_dimensions(max_side: u32) -> impl Strategy<Value = (u32, u32)> {
        (2..=max_side, 2..=max_side)
    }

    /// Generate a non-empty seed string.
    pub fn arb_seed() -> impl Strategy<Value = String> {
        "[a-z0-9]{1,12}"
    }

    /// Generate a difficulty preset.
    pub fn arb_difficulty() -> impl Strategy<Value = Difficulty> {
        prop::sample::select(Difficulty::ALL.to_vec())
    }

    /// Generate a repair policy.
    pub fn arb_repair_policy() -> impl Strategy<Value = RepairPolicy> {
        prop_oneof![
            Just(RepairPolicy::Reselect),
            Just(RepairPolicy::FixedEndpoints),
        ]
    }

    /// Generate a valid generator config.
    pub fn arb_config() -> impl Strategy<Value = GeneratorConfig> {
        (arb_difficulty(), arb_repair_policy()).prop_map(|(difficulty, policy)| {
            GeneratorConfig::default()
                .with_difficulty(difficulty)
                .with_repair_policy(policy)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trail_core::config::RepairPolicy;
    use trail_core::map_generation::generate_map;

    #[test]
    fn test_verify_determinism_detects_match() {
        let result = verify_determinism(3, || 42_u64, |v| *v);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes.len(), 3);
        assert_eq!(result.unique_hashes(), vec![42]);
        result.assert_deterministic();
    }

    #[test]
    fn test_verify_determinism_detects_divergence() {
        let counter = std::cell::Cell::new(0_u64);
        let result = verify_determinism(
            3,
            || {
                counter.set(counter.get() + 1);
                counter.get()
            },
            |v| *v,
        );
        assert!(!result.is_deterministic);
        assert_eq!(result.unique_hashes().len(), 3);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_assert_deterministic_panics() {
        let result = DeterminismResult {
            is_deterministic: false,
            hashes: vec![1, 2],
        };
        result.assert_deterministic();
    }

    #[test]
    fn test_generation_is_deterministic() {
        assert!(verify_generation_determinism(
            &GeneratorConfig::default(),
            32,
            24,
            "determinism"
        ));
    }

    #[test]
    fn test_generation_failure_is_not_deterministic() {
        assert!(!verify_generation_determinism(
            &GeneratorConfig::default(),
            1,
            24,
            "determinism"
        ));
    }

    #[test]
    fn test_parallel_generations_match() {
        let result =
            run_parallel_generations_scoped(&GeneratorConfig::default(), 48, 48, "parallel", 4);
        assert_eq!(result.hashes.len(), 4);
        result.assert_deterministic();
    }

    #[test]
    fn test_find_first_divergence() {
        let a = generate_map(16, 16, Some("left")).unwrap();
        let b = generate_map(16, 16, Some("left")).unwrap();
        assert_eq!(find_first_divergence(&a, &b), None);

        let c = generate_map(16, 16, Some("right")).unwrap();
        assert!(find_first_divergence(&a, &c).is_some());

        let d = generate_map(8, 16, Some("left")).unwrap();
        assert_eq!(find_first_divergence(&a, &d), Some((0, 0)));
    }

    #[test]
    fn test_serialization_determinism() {
        let map = generate_map(20, 12, Some("serde")).unwrap();
        assert!(verify_serialization_determinism(&map));
    }

    #[test]
    fn test_compute_hash_stable() {
        assert_eq!(compute_hash(&"abc"), compute_hash(&"abc"));
        assert_ne!(compute_hash(&"abc"), compute_hash(&"abd"));
    }

    // =========================================================================
    // Property-based tests using proptest
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Any seed and size reproduces the same map.
        #[test]
        fn prop_any_seed_is_reproducible(
            (width, height) in strategies::arb_dimensions(40),
            seed in strategies::arb_seed(),
        ) {
            let result = verify_determinism(
                2,
                || generate_map(width, height, Some(seed.as_str())).ok(),
                |map| map.as_ref().map_or(0, MapData::state_hash),
            );
            prop_assert!(result.is_deterministic);
        }

        /// Any config reproduces the same map.
        #[test]
        fn prop_any_config_is_reproducible(
            config in strategies::arb_config(),
            seed in strategies::arb_seed(),
        ) {
            prop_assert!(verify_generation_determinism(&config, 24, 24, &seed));
        }

        /// Fixed endpoints still yield a connected map with a boundary start.
        #[test]
        fn prop_fixed_policy_keeps_boundary_start(seed in strategies::arb_seed()) {
            let config = GeneratorConfig::default().with_repair_policy(RepairPolicy::FixedEndpoints);
            let map = MapGenerator::new(config).unwrap().generate(20, 20, Some(seed.as_str())).unwrap();
            let (sx, sy) = map.start();
            prop_assert!(map.grid().is_boundary(sx, sy));
            prop_assert!(map.is_connectivity_guaranteed());
        }
    }
}
