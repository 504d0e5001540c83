//! Solver configuration for rescaling.

use crate::{Result, ScalingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Numerical settings for solving basis systems.
///
/// # Example
///
/// ```
/// use sim_scaling::RescaleConfig;
///
/// let config = RescaleConfig::default().with_singular_tolerance(1e-8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RescaleConfig {
    /// A basis matrix is rejected when its smallest singular value divided
    /// by its largest falls below this ratio.
    pub singular_tolerance: f64,

    /// Largest accepted `|ln(scale)|` for any single base dimension.
    ///
    /// Guards against target values so far from the originals that the
    /// propagated factors overflow. `None` disables the check.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_log_scale: Option<f64>,
}

impl Default for RescaleConfig {
    fn default() -> Self {
        Self {
            singular_tolerance: 1e-10,
            max_log_scale: None,
        }
    }
}

impl RescaleConfig {
    /// Set the singular value ratio below which a basis is degenerate.
    #[must_use]
    pub const fn with_singular_tolerance(mut self, tolerance: f64) -> Self {
        self.singular_tolerance = tolerance;
        self
    }

    /// Set the largest accepted log scale factor.
    #[must_use]
    pub const fn with_max_log_scale(mut self, max_log_scale: f64) -> Self {
        self.max_log_scale = Some(max_log_scale);
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::InvalidConfig`] if the tolerance is negative,
    /// not finite, or not below one, or if the log scale limit is not positive.
    pub fn validate(&self) -> Result<()> {
        if !self.singular_tolerance.is_finite()
            || self.singular_tolerance < 0.0
            || self.singular_tolerance >= 1.0
        {
            return Err(ScalingError::invalid_config(format!(
                "singular_tolerance must be in [0, 1), got {}",
                self.singular_tolerance
            )));
        }
        if let Some(limit) = self.max_log_scale {
            if limit.is_nan() || limit <= 0.0 {
                return Err(ScalingError::invalid_config(format!(
                    "max_log_scale must be positive, got {limit}"
                )));
            }
        }
        Ok(())
    }
}
