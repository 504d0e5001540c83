//! Ready-made [`Policy`] implementations.
//!
//! - [`BoxSpace`]: per-component bounds of an observation or action vector
//! - [`FnPolicy`]: wraps an inference closure (for example a call into a
//!   trained network) with declared observation/action spaces
//! - [`LinearPolicy`]: `action = K * observation + bias`, a deterministic
//!   reference controller

use std::fmt;

use nalgebra::{DMatrix, DVector};

use crate::policy::ActionResult;
use crate::{Policy, PolicyError, Result, ScalingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ============================================================================
// Box Space
// ============================================================================

/// Axis-aligned bounds `low[i] <= x[i] <= high[i]`.
///
/// # Example
///
/// ```
/// use sim_scaling::BoxSpace;
///
/// let space = BoxSpace::symmetric(2, 1.0);
/// assert_eq!(space.clip(&[3.0, -0.5]), vec![1.0, -0.5]);
/// assert!(!space.contains(&[3.0, 0.0]));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxSpace {
    low: Vec<f64>,
    high: Vec<f64>,
}

impl BoxSpace {
    /// Create a box from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if the bound vectors differ in length and
    /// [`ScalingError::InvalidConfig`] if some `low[i] > high[i]` or a bound is `NaN`.
    pub fn new(low: Vec<f64>, high: Vec<f64>) -> Result<Self> {
        if low.len() != high.len() {
            return Err(ScalingError::Shape {
                expected: low.len(),
                actual: high.len(),
            });
        }
        for (i, (lo, hi)) in low.iter().zip(&high).enumerate() {
            if lo.is_nan() || hi.is_nan() || lo > hi {
                return Err(ScalingError::invalid_config(format!(
                    "bound {i}: [{lo}, {hi}] is empty"
                )));
            }
        }
        Ok(Self { low, high })
    }

    /// `n` unbounded components.
    #[must_use]
    pub fn unbounded(n: usize) -> Self {
        Self {
            low: vec![f64::NEG_INFINITY; n],
            high: vec![f64::INFINITY; n],
        }
    }

    /// `n` components in `[-bound, bound]`.
    #[must_use]
    pub fn symmetric(n: usize, bound: f64) -> Self {
        let bound = bound.abs();
        Self {
            low: vec![-bound; n],
            high: vec![bound; n],
        }
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.low.len()
    }

    /// True if the space has no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Lower bounds.
    #[must_use]
    pub fn low(&self) -> &[f64] {
        &self.low
    }

    /// Upper bounds.
    #[must_use]
    pub fn high(&self) -> &[f64] {
        &self.high
    }

    /// True if `x` has the right length and lies inside the bounds.
    #[must_use]
    pub fn contains(&self, x: &[f64]) -> bool {
        x.len() == self.len()
            && x
                .iter()
                .zip(self.low.iter().zip(&self.high))
                .all(|(v, (lo, hi))| lo <= v && v <= hi)
    }

    /// Clamp each component into its bounds.
    ///
    /// Extra components beyond the space's length are dropped.
    #[must_use]
    pub fn clip(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.low.iter().zip(&self.high))
            .map(|(v, (lo, hi))| v.clamp(*lo, *hi))
            .collect()
    }
}

// ============================================================================
// Closure Policy
// ============================================================================

/// A policy computed by a user closure.
///
/// Observations are length-checked against the observation space; the
/// closure's actions are length-checked and clipped to the action space.
///
/// # Example
///
/// ```
/// use sim_scaling::{BoxSpace, FnPolicy, Policy};
///
/// let policy = FnPolicy::new(
///     BoxSpace::unbounded(2),
///     BoxSpace::symmetric(1, 1.0),
///     |obs: &[f64]| Ok(vec![obs[0] - obs[1]]),
/// );
/// assert_eq!(policy.action(&[5.0, 1.0]).unwrap(), vec![1.0]);
/// ```
pub struct FnPolicy<F>
where
    F: Fn(&[f64]) -> ActionResult + Send + Sync,
{
    observation_space: BoxSpace,
    action_space: BoxSpace,
    infer: F,
}

impl<F> FnPolicy<F>
where
    F: Fn(&[f64]) -> ActionResult + Send + Sync,
{
    /// Create a closure policy.
    pub fn new(observation_space: BoxSpace, action_space: BoxSpace, infer: F) -> Self {
        Self {
            observation_space,
            action_space,
            infer,
        }
    }

    /// The observation space.
    #[must_use]
    pub fn observation_space(&self) -> &BoxSpace {
        &self.observation_space
    }

    /// The action space.
    #[must_use]
    pub fn action_space(&self) -> &BoxSpace {
        &self.action_space
    }
}

impl<F> Policy for FnPolicy<F>
where
    F: Fn(&[f64]) -> ActionResult + Send + Sync,
{
    fn observation_len(&self) -> usize {
        self.observation_space.len()
    }

    fn action_len(&self) -> usize {
        self.action_space.len()
    }

    fn action(&self, observation: &[f64]) -> ActionResult {
        if observation.len() != self.observation_space.len() {
            return Err(PolicyError::ObservationLength {
                expected: self.observation_space.len(),
                actual: observation.len(),
            });
        }
        let action = (self.infer)(observation)?;
        if action.len() != self.action_space.len() {
            return Err(PolicyError::ActionLength {
                expected: self.action_space.len(),
                actual: action.len(),
            });
        }
        Ok(self.action_space.clip(&action))
    }
}

impl<F> fmt::Debug for FnPolicy<F>
where
    F: Fn(&[f64]) -> ActionResult + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPolicy")
            .field("observation_space", &self.observation_space)
            .field("action_space", &self.action_space)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Linear Policy
// ============================================================================

/// Linear state feedback `a = K o + b`, optionally clipped.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPolicy {
    gain: DMatrix<f64>,
    bias: DVector<f64>,
    action_space: Option<BoxSpace>,
}

impl LinearPolicy {
    /// Create from a gain matrix (`actions x observations`) with zero bias.
    #[must_use]
    pub fn new(gain: DMatrix<f64>) -> Self {
        let bias = DVector::zeros(gain.nrows());
        Self {
            gain,
            bias,
            action_space: None,
        }
    }

    /// Square diagonal gain: `a_i = gains[i] * o_i`.
    #[must_use]
    pub fn diagonal(gains: &[f64]) -> Self {
        Self::new(DMatrix::from_diagonal(&DVector::from_column_slice(gains)))
    }

    /// Set the bias vector.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if its length is not the number of actions.
    pub fn with_bias(mut self, bias: &[f64]) -> Result<Self> {
        if bias.len() != self.gain.nrows() {
            return Err(ScalingError::Shape {
                expected: self.gain.nrows(),
                actual: bias.len(),
            });
        }
        self.bias = DVector::from_column_slice(bias);
        Ok(self)
    }

    /// Clip actions into `space`.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if the space length is not the number of actions.
    pub fn with_action_space(mut self, space: BoxSpace) -> Result<Self> {
        if space.len() != self.gain.nrows() {
            return Err(ScalingError::Shape {
                expected: self.gain.nrows(),
                actual: space.len(),
            });
        }
        self.action_space = Some(space);
        Ok(self)
    }

    /// The gain matrix.
    #[must_use]
    pub fn gain(&self) -> &DMatrix<f64> {
        &self.gain
    }
}

impl Policy for LinearPolicy {
    fn observation_len(&self) -> usize {
        self.gain.ncols()
    }

    fn action_len(&self) -> usize {
        self.gain.nrows()
    }

    fn action(&self, observation: &[f64]) -> ActionResult {
        if observation.len() != self.gain.ncols() {
            return Err(PolicyError::ObservationLength {
                expected: self.gain.ncols(),
                actual: observation.len(),
            });
        }
        let o = DVector::from_column_slice(observation);
        let a = &self.gain * o + &self.bias;
        Ok(match &self.action_space {
            Some(space) => space.clip(a.as_slice()),
            None => a.as_slice().to_vec(),
        })
    }
}
