//! Physical dimensions as exponent vectors.
//!
//! A [`Dimension`] stores one rational exponent per base dimension. The
//! ordering of base dimensions (for example mass, length, time) is shared by
//! every dimension of a [`Context`](crate::Context); combining dimensions of
//! different lengths fails with [`ScalingError::Shape`].

use std::fmt;

use crate::{Rational, Result, ScalingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Exponents of a physical quantity over the base dimensions.
///
/// # Example
///
/// ```
/// use sim_scaling::Dimension;
///
/// let mass = Dimension::new([1, 0, 0]);
/// let length = Dimension::new([0, 1, 0]);
/// let time = Dimension::new([0, 0, 1]);
///
/// // Torque-like quantity: M L^2 / T^2
/// let torque = mass
///     .multiply(&length.power(2))
///     .and_then(|d| d.divide(&time.power(2)))
///     .unwrap();
/// assert_eq!(torque, Dimension::new([1, 2, -2]));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Dimension {
    exponents: Vec<Rational>,
}

impl Dimension {
    /// Create a dimension from integer exponents.
    #[must_use]
    pub fn new(exponents: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exponents: exponents.into_iter().map(Rational::integer).collect(),
        }
    }

    /// Create a dimension from `(numerator, denominator)` exponent pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::InvalidConfig`] if a denominator is zero.
    pub fn from_fractions(exponents: impl IntoIterator<Item = (i32, i32)>) -> Result<Self> {
        exponents
            .into_iter()
            .map(|(num, denom)| Rational::try_new(num, denom))
            .collect::<Result<Vec<_>>>()
            .map(Self::from_rationals)
    }

    /// Create a dimension from rational exponents.
    ///
    /// Every [`Rational`] already has a nonzero denominator; build them with
    /// [`Rational::try_new`] or use [`Dimension::from_fractions`] when the
    /// input is untrusted.
    #[must_use]
    pub fn from_rationals(exponents: impl IntoIterator<Item = Rational>) -> Self {
        Self {
            exponents: exponents.into_iter().collect(),
        }
    }

    /// The dimensionless quantity over `k` base dimensions.
    #[must_use]
    pub fn dimensionless(k: usize) -> Self {
        Self {
            exponents: vec![Rational::ZERO; k],
        }
    }

    /// The `index`-th base dimension out of `k` (a unit vector).
    ///
    /// An out-of-range index yields the dimensionless vector.
    #[must_use]
    pub fn base(k: usize, index: usize) -> Self {
        let mut exponents = vec![Rational::ZERO; k];
        if let Some(e) = exponents.get_mut(index) {
            *e = Rational::ONE;
        }
        Self { exponents }
    }

    /// Number of base dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.exponents.len()
    }

    /// True if the exponent vector has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exponents.is_empty()
    }

    /// The exponent vector.
    #[must_use]
    pub fn exponents(&self) -> &[Rational] {
        &self.exponents
    }

    /// The exponents as floating point numbers.
    #[must_use]
    pub fn exponents_f64(&self) -> Vec<f64> {
        self.exponents.iter().map(|e| e.to_f64()).collect()
    }

    /// True if every exponent is zero.
    #[must_use]
    pub fn is_dimensionless(&self) -> bool {
        self.exponents.iter().all(|e| e.is_zero())
    }

    /// Product of two dimensions (exponent-wise sum).
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if the exponent vectors differ in length.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    /// Quotient of two dimensions (exponent-wise difference).
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if the exponent vectors differ in length.
    pub fn divide(&self, other: &Self) -> Result<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    /// Raise to a rational power (exponent-wise scalar multiply).
    #[must_use]
    pub fn power(&self, exponent: impl Into<Rational>) -> Self {
        let p = exponent.into();
        Self {
            exponents: self.exponents.iter().map(|&e| e * p).collect(),
        }
    }

    /// The reciprocal dimension (`1 / self`).
    #[must_use]
    pub fn recip(&self) -> Self {
        Self {
            exponents: self.exponents.iter().map(|&e| -e).collect(),
        }
    }

    /// Fail with [`ScalingError::Shape`] unless this dimension has `k` exponents.
    pub(crate) fn check_len(&self, k: usize) -> Result<()> {
        if self.len() == k {
            Ok(())
        } else {
            Err(ScalingError::Shape {
                expected: k,
                actual: self.len(),
            })
        }
    }

    fn zip_with(&self, other: &Self, f: impl Fn(Rational, Rational) -> Rational) -> Result<Self> {
        other.check_len(self.len())?;
        Ok(Self {
            exponents: self
                .exponents
                .iter()
                .zip(&other.exponents)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, e) in self.exponents.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{e}")?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn mlt() -> (Dimension, Dimension, Dimension) {
        (
            Dimension::base(3, 0),
            Dimension::base(3, 1),
            Dimension::base(3, 2),
        )
    }

    #[test]
    fn test_algebra() {
        let (m, l, t) = mlt();

        let accel = l.divide(&t.power(2)).unwrap();
        assert_eq!(accel, Dimension::new([0, 1, -2]));

        let damping = m.multiply(&l.power(2)).unwrap().divide(&t).unwrap();
        assert_eq!(damping, Dimension::new([1, 2, -1]));

        assert_eq!(t.recip(), Dimension::new([0, 0, -1]));
        assert!(m.divide(&m).unwrap().is_dimensionless());
    }

    #[test]
    fn test_fractional_power() {
        let (_, l, t) = mlt();
        let g = l.divide(&t.power(2)).unwrap();

        // sqrt(g / L) is a frequency
        let freq = g.divide(&l).unwrap().power(Rational::new(1, 2));
        assert_eq!(freq, t.recip());

        let root_l = l.power(Rational::new(1, 2));
        assert_eq!(root_l.exponents()[1], Rational::new(1, 2));
        assert_eq!(root_l.to_string(), "[0, 1/2, 0]");
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Dimension::new([1, 0, 0]);
        let b = Dimension::new([1, 0]);

        let err = a.multiply(&b).unwrap_err();
        assert_eq!(
            err,
            ScalingError::Shape {
                expected: 3,
                actual: 2
            }
        );
        assert!(a.divide(&b).is_err());
    }

    #[test]
    fn test_extreme_exponents_do_not_overflow() {
        let zero = Dimension::new([0]);
        let min = Dimension::new([i32::MIN]);

        let quotient = zero.divide(&min).unwrap();
        assert_eq!(quotient, Dimension::new([i32::MAX]));
        assert_eq!(min.recip(), quotient);
    }

    #[test]
    fn test_from_fractions() {
        let d = Dimension::from_fractions([(0, 1), (1, 2), (-2, 4)]).unwrap();
        assert_eq!(
            d,
            Dimension::from_rationals([Rational::ZERO, Rational::new(1, 2), Rational::new(-1, 2)])
        );

        let err = Dimension::from_fractions([(1, 1), (1, 0)]).unwrap_err();
        assert!(matches!(err, ScalingError::InvalidConfig { .. }));
    }

    #[test]
    fn test_equality_is_exact() {
        let half = Dimension::from_rationals([Rational::new(1, 2), Rational::ZERO]);
        let also_half = Dimension::from_rationals([Rational::new(2, 4), Rational::ZERO]);
        assert_eq!(half, also_half);
        assert_ne!(half, Dimension::new([1, 0]));
    }

    #[test]
    fn test_base_out_of_range() {
        assert!(Dimension::base(3, 7).is_dimensionless());
        assert_eq!(Dimension::dimensionless(2).len(), 2);
        assert_eq!(Dimension::base(3, 1).exponents_f64(), vec![0.0, 1.0, 0.0]);
    }
}
