//! Per-cell flags kept beside a map instead of inside it.
//!
//! Gameplay layers track auxiliary state such as visited or collected
//! cells here, keyed by grid coordinates, so the generated grid itself is
//! never mutated. The same dense bit-set backs the pathfinder's closed set.

use serde::{Deserialize, Serialize};

use crate::error::MapError;

const WORD_BITS: usize = 64;

/// Dense bit-set over a `width x height` grid, one bit per cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCellFlags")]
pub struct CellFlags {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

/// Unchecked wire form; the word count must match the dimensions.
#[derive(Deserialize)]
struct RawCellFlags {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

impl TryFrom<RawCellFlags> for CellFlags {
    type Error = MapError;

    fn try_from(raw: RawCellFlags) -> Result<Self, Self::Error> {
        let expected = word_count(raw.width, raw.height);
        if raw.words.len() != expected {
            return Err(MapError::Serialization(format!(
                "cell flags for {}x{} need {expected} words, got {}",
                raw.width,
                raw.height,
                raw.words.len()
            )));
        }
        Ok(Self {
            width: raw.width,
            height: raw.height,
            words: raw.words,
        })
    }
}

fn word_count(width: u32, height: u32) -> usize {
    ((width as usize) * (height as usize)).div_ceil(WORD_BITS)
}

impl CellFlags {
    /// Create an all-clear flag set for a grid of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            words: vec![0; word_count(width, height)],
        }
    }

    /// Grid width the flags were sized for.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Grid height the flags were sized for.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Set the flag at (x, y). Returns `false` if out of bounds.
    pub fn set(&mut self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.insert(self.index_of(x, y));
        true
    }

    /// Clear the flag at (x, y). Returns `false` if out of bounds.
    pub fn unset(&mut self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let index = self.index_of(x, y);
        self.words[index / WORD_BITS] &= !(1 << (index % WORD_BITS));
        true
    }

    /// Whether the flag at (x, y) is set. Out-of-bounds cells are never set.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height && self.contains(self.index_of(x, y))
    }

    /// Number of set flags.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Clear every flag.
    pub fn clear(&mut self) {
        self.words.fill(0);
    }

    #[inline]
    fn index_of(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Set the bit at a flat index.
    #[inline]
    pub(crate) fn insert(&mut self, index: usize) {
        self.words[index / WORD_BITS] |= 1 << (index % WORD_BITS);
    }

    /// Test the bit at a flat index.
    #[inline]
    pub(crate) fn contains(&self, index: usize) -> bool {
        self.words[index / WORD_BITS] & (1 << (index % WORD_BITS)) != 0
    }
}
