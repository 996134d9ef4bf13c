//! Seeded random stream for map generation.
//!
//! Every random decision made while building a map is drawn from one
//! [`SeededRng`], in a fixed order, so the same seed string always yields
//! the same map. The seed string is folded into 64 bits with FNV-1a, which
//! is stable across platforms and toolchains (unlike `DefaultHasher`).

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

pub(crate) const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Characters used for generated seeds (lowercase base-36).
const SEED_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of generated seeds.
pub const GENERATED_SEED_LEN: usize = 11;

/// Fold a seed string into a 64-bit PRNG seed.
#[must_use]
pub fn seed_to_u64(seed: &str) -> u64 {
    fnv1a(FNV_OFFSET_BASIS, seed.as_bytes())
}

/// Continue an FNV-1a hash over `bytes`.
#[inline]
pub(crate) fn fnv1a(hash: u64, bytes: &[u8]) -> u64 {
    bytes.iter().fold(hash, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Generate a fresh seed string for callers that did not supply one.
///
/// This is the only place entropy enters the crate; the returned string is
/// stored in the map so the result can be reproduced later.
#[must_use]
pub fn random_seed() -> String {
    let mut rng = rand::thread_rng();
    (0..GENERATED_SEED_LEN)
        .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
        .collect()
}

/// Deterministic stream of uniform draws seeded from a string.
///
/// Each helper consumes exactly one draw from the underlying stream, so the
/// draw count of a generation pass is easy to reason about.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: String,
    rng: Pcg64Mcg,
    draws: u64,
}

impl SeededRng {
    /// Create a stream for the given seed string.
    #[must_use]
    pub fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_owned(),
            rng: Pcg64Mcg::seed_from_u64(seed_to_u64(seed)),
            draws: 0,
        }
    }

    /// Reset the stream to the start of the sequence for `seed`.
    pub fn reseed(&mut self, seed: &str) {
        *self = Self::new(seed);
    }

    /// The seed string this stream was created from.
    #[must_use]
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Number of draws consumed so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }

    /// Next uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen::<f64>()
    }

    /// Uniform index in `0..len`, computed as `floor(r * len)`.
    ///
    /// Returns 0 for an empty range (the draw is still consumed).
    pub fn next_index(&mut self, len: usize) -> usize {
        let r = self.next_f64();
        if len == 0 {
            return 0;
        }
        ((r * len as f64) as usize).min(len - 1)
    }

    /// Uniform integer in `lo..=hi`.
    pub fn next_range_inclusive(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi, "empty range {lo}..={hi}");
        let span = (hi - lo) as usize + 1;
        lo + self.next_index(span) as u32
    }

    /// `true` with probability `p`.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// -1 or +1 with equal probability.
    pub fn next_sign(&mut self) -> i64 {
        if self.next_f64() < 0.5 {
            -1
        } else {
            1
        }
    }
}
