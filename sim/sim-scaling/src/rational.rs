//! Exact rational exponents.
//!
//! Dimension exponents are almost always small integers, but derived
//! quantities such as `sqrt(g / L)` need halves. Exponents are stored as
//! `num / denom` pairs normalized to lowest terms so that equality of
//! dimensions is exact.

use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use crate::{Result, ScalingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rational number `num / denom`.
///
/// # Invariants
///
/// - `denom > 0` (the sign lives in the numerator)
/// - `gcd(|num|, denom) == 1`
/// - `|num| <= i32::MAX`, so negation never overflows
///
/// Arithmetic saturates at `±i32::MAX` instead of wrapping; exponents of
/// physical dimensions never come near that range.
///
/// # Example
///
/// ```
/// use sim_scaling::Rational;
///
/// let half = Rational::new(1, 2);
/// assert_eq!(half + half, Rational::ONE);
/// assert_eq!(Rational::new(-4, -8), half);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "(i32, i32)", into = "(i32, i32)"))]
pub struct Rational {
    num: i32,
    denom: i32,
}

impl Rational {
    /// Zero (0/1).
    pub const ZERO: Self = Self { num: 0, denom: 1 };

    /// One (1/1).
    pub const ONE: Self = Self { num: 1, denom: 1 };

    /// Create a rational, normalized to lowest terms.
    ///
    /// A zero denominator is treated as `1`; use [`Rational::try_new`] to
    /// reject it instead.
    #[must_use]
    pub fn new(num: i32, denom: i32) -> Self {
        Self::from_wide(i64::from(num), i64::from(denom))
    }

    /// Create a rational, rejecting a zero denominator.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::InvalidConfig`] if `denom == 0`.
    pub fn try_new(num: i32, denom: i32) -> Result<Self> {
        if denom == 0 {
            return Err(ScalingError::invalid_config(format!(
                "exponent {num}/0 has a zero denominator"
            )));
        }
        Ok(Self::new(num, denom))
    }

    /// Create the integer `n / 1`.
    ///
    /// `i32::MIN` saturates to `-i32::MAX`.
    #[must_use]
    pub const fn integer(n: i32) -> Self {
        let num = if n == i32::MIN { -i32::MAX } else { n };
        Self { num, denom: 1 }
    }

    /// Numerator (carries the sign).
    #[must_use]
    pub const fn numer(self) -> i32 {
        self.num
    }

    /// Denominator (always positive).
    #[must_use]
    pub const fn denom(self) -> i32 {
        self.denom
    }

    /// Check if this rational is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.num == 0
    }

    /// Check if this rational is an integer.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        self.denom == 1
    }

    /// Convert to `f64`.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.denom)
    }

    fn from_wide(num: i64, denom: i64) -> Self {
        if num == 0 {
            return Self::ZERO;
        }
        let denom = if denom == 0 { 1 } else { denom };
        let sign = if denom < 0 { -1 } else { 1 };
        let g = gcd(num.unsigned_abs(), denom.unsigned_abs());
        // g divides both operands, so it fits back into i64
        let g = i64::try_from(g).unwrap_or(1);
        let num = sign * num / g;
        let denom = (sign * denom) / g;
        Self {
            num: saturate(num),
            denom: saturate(denom).max(1),
        }
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i32> for Rational {
    fn from(n: i32) -> Self {
        Self::integer(n)
    }
}

impl TryFrom<(i32, i32)> for Rational {
    type Error = ScalingError;

    fn try_from((num, denom): (i32, i32)) -> Result<Self> {
        Self::try_new(num, denom)
    }
}

impl From<Rational> for (i32, i32) {
    fn from(r: Rational) -> Self {
        (r.num, r.denom)
    }
}

/// Greatest common divisor (Euclid).
///
/// ```
/// use sim_scaling::rational::gcd;
///
/// assert_eq!(gcd(12, 8), 4);
/// assert_eq!(gcd(0, 5), 5);
/// ```
#[must_use]
pub const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a
}

fn saturate(x: i64) -> i32 {
    let bound = i64::from(i32::MAX);
    i32::try_from(x.clamp(-bound, bound)).unwrap_or(0)
}

impl Add for Rational {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::from_wide(
            i64::from(self.num) * i64::from(rhs.denom) + i64::from(rhs.num) * i64::from(self.denom),
            i64::from(self.denom) * i64::from(rhs.denom),
        )
    }
}

impl Sub for Rational {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl Mul for Rational {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::from_wide(
            i64::from(self.num) * i64::from(rhs.num),
            i64::from(self.denom) * i64::from(rhs.denom),
        )
    }
}

impl Neg for Rational {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            num: self.num.saturating_neg(),
            denom: self.denom,
        }
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.denom)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_normalization() {
        assert_eq!(Rational::new(2, 4), Rational::new(1, 2));
        assert_eq!(Rational::new(6, -9), Rational::new(-2, 3));
        assert_eq!(Rational::new(0, 7), Rational::ZERO);
        assert_eq!(Rational::new(-3, -3), Rational::ONE);
        assert_eq!(Rational::new(5, 0), Rational::integer(5));
    }

    #[test]
    fn test_arithmetic() {
        let half = Rational::new(1, 2);
        let third = Rational::new(1, 3);
        assert_eq!(half + third, Rational::new(5, 6));
        assert_eq!(half - third, Rational::new(1, 6));
        assert_eq!(half * third, Rational::new(1, 6));
        assert_eq!(Rational::new(2, 3) * Rational::new(3, 2), Rational::ONE);
        assert_eq!(-half, Rational::new(-1, 2));
    }

    #[test]
    fn test_accessors() {
        let r = Rational::new(-6, 4);
        assert_eq!(r.numer(), -3);
        assert_eq!(r.denom(), 2);
        assert!(!r.is_integer());
        assert_eq!(r.to_f64(), -1.5);
        assert!(Rational::from(4).is_integer());
    }

    #[test]
    fn test_extremes_saturate() {
        let min = Rational::integer(i32::MIN);
        assert_eq!(min.numer(), -i32::MAX);
        assert_eq!(-min, Rational::integer(i32::MAX));
        assert_eq!(Rational::new(i32::MIN, 1), min);

        let max = Rational::integer(i32::MAX);
        assert_eq!(max + Rational::ONE, max);
        assert_eq!(min - Rational::ONE, min);
    }

    #[test]
    fn test_zero_denominator() {
        assert!(matches!(
            Rational::try_new(3, 0),
            Err(ScalingError::InvalidConfig { .. })
        ));
        assert_eq!(Rational::try_new(3, -6).unwrap(), Rational::new(-1, 2));
        assert!(Rational::try_from((1, 0)).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_rejects_zero_denominator() {
        let half: Rational = serde_json::from_str("[2, 4]").unwrap();
        assert_eq!(half, Rational::new(1, 2));
        assert_eq!(serde_json::to_string(&half).unwrap(), "[1,2]");
        assert!(serde_json::from_str::<Rational>("[1, 0]").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::integer(-2).to_string(), "-2");
        assert_eq!(Rational::new(1, 2).to_string(), "1/2");
    }
}
