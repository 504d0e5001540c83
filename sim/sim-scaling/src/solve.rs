//! Basis systems and per-dimension scale factors.
//!
//! Dimensional homogeneity requires, for every basis quantity `i` with
//! exponents `e_i` and old/new values `v_i`/`v_i'`,
//!
//! ```text
//! v_i' / v_i = prod_d s_d^(e_i,d)
//! ```
//!
//! Taking logarithms gives the square linear system `E * ln(s) = ln(v' / v)`
//! where `E` stacks the basis exponent vectors as rows. The system is
//! solved once; every other quantity is rescaled by `prod_d s_d^(e_q,d)`.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use crate::{Dimension, RescaleConfig, Result, ScalingError};

/// One row of a basis system.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BasisEntry<'a> {
    pub name: &'a str,
    pub dimension: &'a Dimension,
    pub from: f64,
    pub to: f64,
}

/// Scale factor of each base dimension.
///
/// Stored as natural logarithms so that propagating a factor to an
/// arbitrary dimension is a dot product.
///
/// # Example
///
/// ```
/// use sim_scaling::{Dimension, ScaleFactors};
///
/// // Mass doubled, length and time unchanged.
/// let s = ScaleFactors::from_scales(&[2.0, 1.0, 1.0]).unwrap();
/// let stiffness = Dimension::new([1, 2, -2]);
/// assert!((s.factor(&stiffness).unwrap() - 2.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactors {
    log_scales: DVector<f64>,
}

impl ScaleFactors {
    /// All factors equal to one over `k` base dimensions.
    #[must_use]
    pub fn identity(k: usize) -> Self {
        Self {
            log_scales: DVector::zeros(k),
        }
    }

    /// Build from explicit (strictly positive) factors.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::NonPositiveValue`] for a zero, negative, or
    /// non-finite factor.
    pub fn from_scales(scales: &[f64]) -> Result<Self> {
        let mut log_scales = DVector::zeros(scales.len());
        for (i, &s) in scales.iter().enumerate() {
            if !(s.is_finite() && s > 0.0) {
                return Err(ScalingError::NonPositiveValue {
                    name: format!("scale[{i}]"),
                    value: s,
                });
            }
            log_scales[i] = s.ln();
        }
        Ok(Self { log_scales })
    }

    /// Number of base dimensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log_scales.len()
    }

    /// True if there are no base dimensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log_scales.is_empty()
    }

    /// `ln(s_d)` for each base dimension.
    #[must_use]
    pub fn log_scales(&self) -> &DVector<f64> {
        &self.log_scales
    }

    /// `s_d` for each base dimension.
    #[must_use]
    pub fn scales(&self) -> Vec<f64> {
        self.log_scales.iter().map(|l| l.exp()).collect()
    }

    /// Factor `prod_d s_d^(e_d)` for a quantity of the given dimension.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if the dimension has the wrong length.
    pub fn factor(&self, dimension: &Dimension) -> Result<f64> {
        dimension.check_len(self.len())?;
        Ok(self.log_factor_unchecked(dimension).exp())
    }

    /// Factors for a list of dimensions.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if any dimension has the wrong length.
    pub fn factors(&self, dimensions: &[Dimension]) -> Result<Vec<f64>> {
        dimensions.iter().map(|d| self.factor(d)).collect()
    }

    /// True if every factor is within `tolerance` of one (in log space).
    #[must_use]
    pub fn is_identity(&self, tolerance: f64) -> bool {
        self.log_scales.iter().all(|l| l.abs() <= tolerance)
    }

    fn log_factor_unchecked(&self, dimension: &Dimension) -> f64 {
        dimension
            .exponents()
            .iter()
            .zip(self.log_scales.iter())
            .map(|(e, l)| e.to_f64() * l)
            .sum()
    }

    /// Solve the basis system for the scale factors.
    pub(crate) fn solve(
        k: usize,
        basis: &[BasisEntry<'_>],
        config: &RescaleConfig,
    ) -> Result<Self> {
        config.validate()?;

        let names: Vec<&str> = basis.iter().map(|b| b.name).collect();
        let dimensions: Vec<&Dimension> = basis.iter().map(|b| b.dimension).collect();
        let matrix = basis_matrix(k, &dimensions)?;
        check_invertible(&matrix, &names, config.singular_tolerance)?;

        let mut rhs = DVector::zeros(k);
        for (i, entry) in basis.iter().enumerate() {
            rhs[i] = log_ratio(entry.name, entry.from, entry.to)?;
        }

        let log_scales = matrix
            .lu()
            .solve(&rhs)
            .ok_or_else(|| ScalingError::degenerate(&names, "LU factorization is singular"))?;

        for (d, l) in log_scales.iter().enumerate() {
            let too_large = config.max_log_scale.is_some_and(|limit| l.abs() > limit);
            if !l.is_finite() || too_large {
                return Err(ScalingError::InvalidValue {
                    name: format!("scale[{d}]"),
                    value: l.exp(),
                });
            }
        }

        debug!(
            basis = ?names,
            log_scales = ?log_scales.as_slice(),
            "Solved basis system"
        );

        Ok(Self { log_scales })
    }
}

/// Stack exponent vectors as the rows of a `k x k` matrix.
pub(crate) fn basis_matrix(k: usize, dimensions: &[&Dimension]) -> Result<DMatrix<f64>> {
    for d in dimensions {
        d.check_len(k)?;
    }
    if dimensions.len() != k {
        return Err(ScalingError::BasisSize {
            expected: k,
            names: dimensions.len(),
            values: dimensions.len(),
        });
    }
    Ok(DMatrix::from_fn(k, k, |r, c| {
        dimensions[r].exponents()[c].to_f64()
    }))
}

/// Reject singular or near-singular matrices.
///
/// The test uses the ratio of the extreme singular values so that it does
/// not depend on the overall magnitude of the exponents.
pub(crate) fn check_invertible<S: AsRef<str>>(
    matrix: &DMatrix<f64>,
    names: &[S],
    tolerance: f64,
) -> Result<()> {
    if matrix.is_empty() {
        return Err(ScalingError::degenerate(names, "empty basis"));
    }
    let singular_values = matrix.clone().svd(false, false).singular_values;
    let max = singular_values.iter().copied().fold(0.0_f64, f64::max);
    let min = singular_values
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    if max <= 0.0 || !(min / max).is_finite() || min / max < tolerance {
        return Err(ScalingError::degenerate(
            names,
            format!("exponent matrix is singular (singular values {min:.3e} / {max:.3e})"),
        ));
    }
    Ok(())
}

/// `ln(to / from)`, defined only for same-signed, nonzero, finite values.
pub(crate) fn log_ratio(name: &str, from: f64, to: f64) -> Result<f64> {
    for value in [from, to] {
        if !(value.is_finite() && value > 0.0) {
            return Err(ScalingError::NonPositiveValue {
                name: name.to_owned(),
                value,
            });
        }
    }
    Ok((to / from).ln())
}
