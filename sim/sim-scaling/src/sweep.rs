//! Log-spaced grids of rescaled contexts.
//!
//! Transfer experiments evaluate a policy over many target contexts obtained
//! by multiplying each basis quantity by log-spaced factors. A
//! [`ContextGrid`] enumerates the Cartesian product of those factors and
//! derives one context per grid point with [`Context::scale_to`].
//!
//! # Example
//!
//! ```
//! use sim_scaling::{Context, ContextGrid, Dimension, LogAxis};
//!
//! let context = Context::new(
//!     (0..3).map(|i| Dimension::base(3, i)).collect(),
//!     [
//!         ("m", Dimension::new([1, 0, 0]), 14.0),
//!         ("L", Dimension::new([0, 1, 0]), 0.5),
//!         ("g", Dimension::new([0, 1, -2]), 9.81),
//!     ],
//! )
//! .unwrap();
//!
//! let grid = ContextGrid::new(
//!     context,
//!     vec![
//!         LogAxis::new("m", -1.0, 1.0, 5),
//!         LogAxis::new("L", -1.0, 1.0, 5),
//!         LogAxis::fixed("g"),
//!     ],
//! )
//! .unwrap();
//!
//! assert_eq!(grid.len(), 25);
//! let contexts = grid.contexts().unwrap();
//! assert!((contexts[0].value("m").unwrap() - 1.4).abs() < 1e-12);
//! ```

use rayon::prelude::*;
use tracing::debug;

use crate::{Context, Result, ScalingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Log-spaced multipliers for one basis quantity.
///
/// Produces `num` values `radix^x` with `x` evenly spaced over
/// `[exponent_range.0, exponent_range.1]` (a single value `radix^lo` when
/// `num == 1`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LogAxis {
    /// Basis quantity this axis varies.
    pub name: String,
    /// Exponent bounds, inclusive.
    pub exponent_range: (f64, f64),
    /// Number of grid points.
    pub num: usize,
    /// Base of the exponent.
    pub radix: f64,
}

impl LogAxis {
    /// Axis over `10^lo ..= 10^hi` with `num` points.
    #[must_use]
    pub fn new(name: impl Into<String>, lo: f64, hi: f64, num: usize) -> Self {
        Self {
            name: name.into(),
            exponent_range: (lo, hi),
            num,
            radix: 10.0,
        }
    }

    /// Axis that keeps the quantity at its original value.
    #[must_use]
    pub fn fixed(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, 0.0, 1)
    }

    /// Use another base for the exponent.
    #[must_use]
    pub fn with_radix(mut self, radix: f64) -> Self {
        self.radix = radix;
        self
    }

    /// Validate the axis.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::InvalidConfig`] for zero points, a radix that
    /// is not positive, finite and different from one, or non-finite bounds.
    pub fn validate(&self) -> Result<()> {
        if self.num == 0 {
            return Err(ScalingError::invalid_config(format!(
                "axis {} has no points",
                self.name
            )));
        }
        if !(self.radix.is_finite() && self.radix > 0.0) || self.radix == 1.0 {
            return Err(ScalingError::invalid_config(format!(
                "axis {} has invalid radix {}",
                self.name, self.radix
            )));
        }
        let (lo, hi) = self.exponent_range;
        if !(lo.is_finite() && hi.is_finite()) {
            return Err(ScalingError::invalid_config(format!(
                "axis {} has non-finite range ({lo}, {hi})",
                self.name
            )));
        }
        Ok(())
    }

    /// The multipliers along this axis, in increasing exponent order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn multipliers(&self) -> Vec<f64> {
        let (lo, hi) = self.exponent_range;
        match self.num {
            0 => Vec::new(),
            1 => vec![self.radix.powf(lo)],
            n => {
                let step = (hi - lo) / (n - 1) as f64;
                (0..n)
                    .map(|i| self.radix.powf(lo + step * i as f64))
                    .collect()
            }
        }
    }
}

/// The Cartesian product of [`LogAxis`] multipliers applied to a context.
///
/// Grid points are enumerated in row-major order: the last axis varies
/// fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextGrid {
    context: Context,
    axes: Vec<LogAxis>,
    values: Vec<Vec<f64>>,
}

impl ContextGrid {
    /// Create a grid around `context`, one axis per basis quantity.
    ///
    /// # Errors
    ///
    /// - [`ScalingError::BasisSize`] unless there is one axis per base dimension
    /// - [`ScalingError::QuantityNotFound`] if an axis names an absent quantity
    /// - [`ScalingError::InvalidConfig`] if an axis is invalid
    /// - [`ScalingError::DegenerateBasis`] if the axis quantities are not a basis
    pub fn new(context: Context, axes: Vec<LogAxis>) -> Result<Self> {
        let k = context.num_base_dimensions();
        if axes.len() != k {
            return Err(ScalingError::BasisSize {
                expected: k,
                names: axes.len(),
                values: axes.len(),
            });
        }
        let mut values: Vec<Vec<f64>> = Vec::with_capacity(k);
        for axis in &axes {
            axis.validate()?;
            let original = context.value(&axis.name)?;
            values.push(axis.multipliers().into_iter().map(|m| m * original).collect());
        }

        let grid = Self {
            context,
            axes,
            values,
        };
        let names = grid.base_names();
        let current = grid.context.values_of(&names)?;
        grid.context.scale_factors(&names, &current)?;
        Ok(grid)
    }

    /// The context the grid is built around.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// The axes.
    #[must_use]
    pub fn axes(&self) -> &[LogAxis] {
        &self.axes
    }

    /// Basis quantity names, in axis order.
    #[must_use]
    pub fn base_names(&self) -> Vec<&str> {
        self.axes.iter().map(|a| a.name.as_str()).collect()
    }

    /// Number of grid points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.iter().map(Vec::len).product()
    }

    /// True if the grid has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Basis target values of the `index`-th grid point.
    #[must_use]
    pub fn point(&self, index: usize) -> Option<Vec<f64>> {
        if index >= self.len() {
            return None;
        }
        let mut rest = index;
        let mut point = vec![0.0; self.values.len()];
        for (axis, values) in self.values.iter().enumerate().rev() {
            point[axis] = values[rest % values.len()];
            rest /= values.len();
        }
        Some(point)
    }

    /// Basis target values of every grid point.
    #[must_use]
    pub fn points(&self) -> Vec<Vec<f64>> {
        (0..self.len()).filter_map(|i| self.point(i)).collect()
    }

    /// Derive one context per grid point.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Context::scale_to`] failure.
    pub fn contexts(&self) -> Result<Vec<Context>> {
        let names = self.base_names();
        self.points()
            .iter()
            .map(|p| self.context.scale_to(&names, p))
            .collect()
    }

    /// [`ContextGrid::contexts`] computed on the rayon thread pool.
    ///
    /// # Errors
    ///
    /// Propagates a [`Context::scale_to`] failure.
    pub fn contexts_par(&self) -> Result<Vec<Context>> {
        let names = self.base_names();
        let points = self.points();
        debug!(points = points.len(), "Building context grid in parallel");
        points
            .par_iter()
            .map(|p| self.context.scale_to(&names, p))
            .collect()
    }

    /// Stable identifier for a context of this grid.
    ///
    /// Formatted as `{prefix}-{name_1}-..-{name_k}_{v_1}_.._{v_k}` with each
    /// value in C-style scientific notation (`1.400e+01`), so labels line up
    /// with file names written by `printf`-style tooling.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::QuantityNotFound`] if `context` lacks a basis quantity.
    pub fn label(&self, prefix: &str, context: &Context) -> Result<String> {
        let names = self.base_names();
        let values = context.values_of(&names)?;
        let mut label = String::from(prefix);
        for name in &names {
            label.push('-');
            label.push_str(name);
        }
        for v in values {
            label.push('_');
            label.push_str(&scientific(v));
        }
        Ok(label)
    }
}

/// `v` with three mantissa decimals and a signed, two-digit exponent.
fn scientific(v: f64) -> String {
    let raw = format!("{v:.3e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return raw;
    };
    match exponent.parse::<i32>() {
        Ok(e) => {
            let sign = if e < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", e.unsigned_abs())
        }
        Err(_) => raw,
    }
}
