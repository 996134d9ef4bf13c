//! Fixed-point helpers for terrain attributes.
//!
//! Movement speeds are consumed by gameplay code running on other
//! machines, so they are stored as fixed-point values that compare and
//! serialize identically everywhere.

use fixed::types::I32F32;

/// Fixed-point number type for terrain attributes.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
pub type Fixed = I32F32;

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Build a fixed-point value from a ratio of two integers.
///
/// `ratio(7, 10)` is exactly the same bit pattern on every platform, unlike
/// converting the float literal `0.7`.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}
