//! Exact amount arithmetic.
//!
//! Amounts travel from the backend as integer counts of the smallest
//! currency unit, serialized either as JSON numbers or as numeric strings
//! (large values are stringified to survive transit). Every sum and
//! difference is carried out on [`Decimal`]; conversion to display units
//! (1 display unit = 10^8 smallest units) happens once, when formatting.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub};
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{FlowscopeError, Result};

/// 10^8 smallest units per display unit.
const UNITS_PER_DISPLAY: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 0);

/// Largest integer an IEEE-754 double represents exactly (2^53).
const MAX_EXACT_F64: f64 = 9_007_199_254_740_992.0;

/// An integer count of smallest currency units.
///
/// The wrapped decimal always has scale zero. Flow amounts are
/// non-negative; differences between flows may be negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wraps a decimal that must already be a whole number.
    ///
    /// # Errors
    ///
    /// Returns [`FlowscopeError::MalformedAmount`] if `value` has a
    /// fractional part.
    pub fn from_decimal(value: Decimal) -> Result<Self> {
        if !value.fract().is_zero() {
            return Err(FlowscopeError::MalformedAmount(format!(
                "{value} is not a whole number of smallest units"
            )));
        }
        Ok(Self(value.trunc()))
    }

    /// Parses a numeric string such as `"5000000000"`.
    ///
    /// # Errors
    ///
    /// Returns [`FlowscopeError::MalformedAmount`] for empty, non-numeric,
    /// or fractional input.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(FlowscopeError::MalformedAmount("empty amount".to_string()));
        }
        let value = Decimal::from_str(trimmed)
            .map_err(|e| FlowscopeError::MalformedAmount(format!("{trimmed:?}: {e}")))?;
        Self::from_decimal(value)
    }

    /// Returns the underlying smallest-unit decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    /// Converts to display units. See [`to_display_units`].
    pub fn to_display(self) -> Decimal {
        to_display_units(self)
    }
}

/// Converts smallest units to display units by dividing by 10^8.
pub fn to_display_units(amount: Amount) -> Decimal {
    amount.0 / UNITS_PER_DISPLAY
}

/// Converts display units back to smallest units.
///
/// Digits beyond the eighth decimal place are rounded to the nearest
/// smallest unit, midpoints away from zero.
///
/// # Errors
///
/// Returns [`FlowscopeError::MalformedAmount`] if the scaled value does not
/// fit in a [`Decimal`].
pub fn to_smallest_units(display: Decimal) -> Result<Amount> {
    let scaled = display.checked_mul(UNITS_PER_DISPLAY).ok_or_else(|| {
        FlowscopeError::MalformedAmount(format!("{display} overflows smallest units"))
    })?;
    let rounded =
        scaled.round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero);
    Amount::from_decimal(rounded)
}

/// Formats a display-unit value without trailing zeros (`0.6`, `50`).
pub fn format_display(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Formats smallest units as a display-unit string.
pub fn format_amount(amount: Amount) -> String {
    format_display(amount.to_display())
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = FlowscopeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self(Decimal::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(Decimal::from(value))
    }
}

impl TryFrom<i128> for Amount {
    type Error = FlowscopeError;

    fn try_from(value: i128) -> Result<Self> {
        Decimal::try_from_i128_with_scale(value, 0)
            .map(Self)
            .map_err(|e| FlowscopeError::MalformedAmount(format!("{value}: {e}")))
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl Visitor<'_> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer amount or a numeric string")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<Amount, E> {
        Ok(Amount::from(v))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> std::result::Result<Amount, E> {
        let v = i128::try_from(v).map_err(E::custom)?;
        Amount::try_from(v).map_err(E::custom)
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> std::result::Result<Amount, E> {
        Amount::try_from(v).map_err(E::custom)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<Amount, E> {
        // Exponent notation such as `5e9` arrives as a float.
        if !v.is_finite() || v.fract() != 0.0 || v.abs() > MAX_EXACT_F64 {
            return Err(E::custom(format!("amount {v} is not an exact integer")));
        }
        Decimal::from_f64(v)
            .map(Amount)
            .ok_or_else(|| E::custom(format!("amount {v} is out of range")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }
}
