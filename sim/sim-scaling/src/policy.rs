//! Policies bound to physical units.
//!
//! A [`DimensionalPolicy`] pairs an opaque controller with the [`Context`] it
//! was trained under and the [`Dimension`] of every observation and action
//! component. [`DimensionalPolicy::to_scaled`] turns it into a
//! [`ScaledPolicy`] for another context: observations are converted into the
//! units the controller was trained on, and its actions converted back.
//!
//! # Example
//!
//! ```
//! use sim_scaling::{Context, Dimension, DimensionalPolicy, LinearPolicy, Policy};
//!
//! let (m, l, t) = (Dimension::base(3, 0), Dimension::base(3, 1), Dimension::base(3, 2));
//! let context = Context::new(
//!     vec![m.clone(), l.clone(), t.clone()],
//!     [
//!         ("m", m.clone(), 1.0),
//!         ("L", l.clone(), 1.0),
//!         ("g", Dimension::new([0, 1, -2]), 9.81),
//!     ],
//! )
//! .unwrap();
//!
//! // torque = -k * angle, trained with m = 1
//! let controller = LinearPolicy::diagonal(&[-5.0]);
//! let policy = DimensionalPolicy::new(
//!     controller,
//!     context.clone(),
//!     vec![Dimension::dimensionless(3)],
//!     vec![Dimension::new([1, 2, -2])],
//! )
//! .unwrap();
//!
//! let heavy = context.scale_to(&["m", "L", "g"], &[3.0, 1.0, 9.81]).unwrap();
//! let scaled = policy.to_scaled(&heavy, &["m", "L", "g"]).unwrap();
//! let torque = scaled.action(&[0.1]).unwrap();
//! assert!((torque[0] + 1.5).abs() < 1e-12);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::{Context, Dimension, PolicyError, RescaleConfig, Result, ScalingError};

/// Result of a single policy evaluation.
pub type ActionResult = std::result::Result<Vec<f64>, PolicyError>;

/// A controller mapping observation vectors to action vectors.
///
/// Implementations must be shareable across threads; controllers with
/// internal state (recurrent networks, filters) keep it behind interior
/// mutability.
pub trait Policy: Send + Sync {
    /// Number of observation components the policy consumes.
    fn observation_len(&self) -> usize;

    /// Number of action components the policy produces.
    fn action_len(&self) -> usize;

    /// Compute the action for an observation.
    ///
    /// # Errors
    ///
    /// Implementation specific; see [`PolicyError`].
    fn action(&self, observation: &[f64]) -> ActionResult;
}

impl<P: Policy + ?Sized> Policy for Arc<P> {
    fn observation_len(&self) -> usize {
        (**self).observation_len()
    }

    fn action_len(&self) -> usize {
        (**self).action_len()
    }

    fn action(&self, observation: &[f64]) -> ActionResult {
        (**self).action(observation)
    }
}

impl<P: Policy + ?Sized> Policy for Box<P> {
    fn observation_len(&self) -> usize {
        (**self).observation_len()
    }

    fn action_len(&self) -> usize {
        (**self).action_len()
    }

    fn action(&self, observation: &[f64]) -> ActionResult {
        (**self).action(observation)
    }
}

/// A type-erased policy.
pub type BoxedPolicy = Box<dyn Policy>;

/// A policy together with the units it was trained in.
pub struct DimensionalPolicy<P: Policy + ?Sized> {
    policy: Arc<P>,
    context: Context,
    observation_dims: Vec<Dimension>,
    action_dims: Vec<Dimension>,
}

impl<P: Policy> DimensionalPolicy<P> {
    /// Bind a policy to its training context.
    ///
    /// # Errors
    ///
    /// - [`ScalingError::DimensionListLengthMismatch`] if a dimension list does
    ///   not match the policy's vector length
    /// - [`ScalingError::Shape`] if a dimension does not match the context's base
    pub fn new(
        policy: P,
        context: Context,
        observation_dims: Vec<Dimension>,
        action_dims: Vec<Dimension>,
    ) -> Result<Self> {
        Self::from_shared(Arc::new(policy), context, observation_dims, action_dims)
    }
}

impl<P: Policy + ?Sized> DimensionalPolicy<P> {
    /// Bind an already shared policy to its training context.
    ///
    /// # Errors
    ///
    /// Same as [`DimensionalPolicy::new`].
    pub fn from_shared(
        policy: Arc<P>,
        context: Context,
        observation_dims: Vec<Dimension>,
        action_dims: Vec<Dimension>,
    ) -> Result<Self> {
        let this = Self {
            policy,
            context,
            observation_dims,
            action_dims,
        };
        this.check_dimensions()?;
        Ok(this)
    }

    /// The wrapped policy.
    #[must_use]
    pub fn policy(&self) -> &Arc<P> {
        &self.policy
    }

    /// The context the policy was trained under.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Dimension of each observation component.
    #[must_use]
    pub fn observation_dimensions(&self) -> &[Dimension] {
        &self.observation_dims
    }

    /// Dimension of each action component.
    #[must_use]
    pub fn action_dimensions(&self) -> &[Dimension] {
        &self.action_dims
    }

    /// Build a policy acting in `target` units.
    ///
    /// The scale factors are solved from the original context's values of
    /// `base` to the target context's values of the same quantities.
    ///
    /// # Errors
    ///
    /// - [`ScalingError::ContextShapeMismatch`] if `target` uses other base dimensions
    /// - [`ScalingError::DimensionListLengthMismatch`] if a dimension list does not
    ///   match the policy
    /// - any error of [`Context::scale_factors`]
    pub fn to_scaled<S: AsRef<str>>(
        &self,
        target: &Context,
        base: &[S],
    ) -> Result<ScaledPolicy<P>> {
        self.to_scaled_with(target, base, &RescaleConfig::default())
    }

    /// [`DimensionalPolicy::to_scaled`] with an explicit solver configuration.
    ///
    /// # Errors
    ///
    /// See [`DimensionalPolicy::to_scaled`].
    pub fn to_scaled_with<S: AsRef<str>>(
        &self,
        target: &Context,
        base: &[S],
        config: &RescaleConfig,
    ) -> Result<ScaledPolicy<P>> {
        if target.base_dimensions() != self.context.base_dimensions() {
            return Err(ScalingError::shape_mismatch(
                "target context uses different base dimensions",
            ));
        }
        self.check_dimensions()?;

        let targets = target.values_of(base)?;
        let factors = self.context.scale_factors_with(base, &targets, config)?;
        let observation_scales = factors.factors(&self.observation_dims)?;
        let action_scales = factors.factors(&self.action_dims)?;

        debug!(
            scales = ?factors.scales(),
            observations = observation_scales.len(),
            actions = action_scales.len(),
            "Built scaled policy"
        );

        Ok(ScaledPolicy {
            policy: Arc::clone(&self.policy),
            context: target.clone(),
            observation_scales,
            action_scales,
        })
    }

    fn check_dimensions(&self) -> Result<()> {
        let checks = [
            ("observation", &self.observation_dims, self.policy.observation_len()),
            ("action", &self.action_dims, self.policy.action_len()),
        ];
        for (kind, dims, expected) in checks {
            if dims.len() != expected {
                return Err(ScalingError::DimensionListLengthMismatch {
                    kind,
                    declared: dims.len(),
                    expected,
                });
            }
            let k = self.context.num_base_dimensions();
            for d in dims {
                d.check_len(k)?;
            }
        }
        Ok(())
    }
}

impl<P: Policy + ?Sized> Clone for DimensionalPolicy<P> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            context: self.context.clone(),
            observation_dims: self.observation_dims.clone(),
            action_dims: self.action_dims.clone(),
        }
    }
}

impl<P: Policy + ?Sized> fmt::Debug for DimensionalPolicy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DimensionalPolicy")
            .field("context", &self.context)
            .field("observation_dims", &self.observation_dims)
            .field("action_dims", &self.action_dims)
            .finish_non_exhaustive()
    }
}

/// The unscaled policy, acting in its training units.
impl<P: Policy + ?Sized> Policy for DimensionalPolicy<P> {
    fn observation_len(&self) -> usize {
        self.policy.observation_len()
    }

    fn action_len(&self) -> usize {
        self.policy.action_len()
    }

    fn action(&self, observation: &[f64]) -> ActionResult {
        self.policy.action(observation)
    }
}

/// A policy converted to act in another context's units.
///
/// Created by [`DimensionalPolicy::to_scaled`]. Each call divides the
/// observation by the per-component observation scales, delegates to the
/// wrapped policy, and multiplies the result by the action scales. The
/// conversion itself is deterministic.
pub struct ScaledPolicy<P: Policy + ?Sized> {
    policy: Arc<P>,
    context: Context,
    observation_scales: Vec<f64>,
    action_scales: Vec<f64>,
}

impl<P: Policy + ?Sized> ScaledPolicy<P> {
    /// The context this policy acts in.
    #[must_use]
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Scale factor of each observation component.
    #[must_use]
    pub fn observation_scales(&self) -> &[f64] {
        &self.observation_scales
    }

    /// Scale factor of each action component.
    #[must_use]
    pub fn action_scales(&self) -> &[f64] {
        &self.action_scales
    }

    /// The wrapped policy.
    #[must_use]
    pub fn inner(&self) -> &Arc<P> {
        &self.policy
    }

    /// Convert an observation from target units into training units.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ObservationLength`] on a length mismatch.
    pub fn nondimensionalize(&self, observation: &[f64]) -> ActionResult {
        if observation.len() != self.observation_scales.len() {
            return Err(PolicyError::ObservationLength {
                expected: self.observation_scales.len(),
                actual: observation.len(),
            });
        }
        Ok(observation
            .iter()
            .zip(&self.observation_scales)
            .map(|(o, s)| o / s)
            .collect())
    }

    /// Convert an action from training units into target units.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::ActionLength`] on a length mismatch.
    pub fn redimensionalize(&self, action: &[f64]) -> ActionResult {
        if action.len() != self.action_scales.len() {
            return Err(PolicyError::ActionLength {
                expected: self.action_scales.len(),
                actual: action.len(),
            });
        }
        Ok(action
            .iter()
            .zip(&self.action_scales)
            .map(|(a, s)| a * s)
            .collect())
    }
}

impl<P: Policy + ?Sized> Policy for ScaledPolicy<P> {
    fn observation_len(&self) -> usize {
        self.observation_scales.len()
    }

    fn action_len(&self) -> usize {
        self.action_scales.len()
    }

    fn action(&self, observation: &[f64]) -> ActionResult {
        let native = self.nondimensionalize(observation)?;
        let action = self.policy.action(&native)?;
        self.redimensionalize(&action)
    }
}

impl<P: Policy + ?Sized> Clone for ScaledPolicy<P> {
    fn clone(&self) -> Self {
        Self {
            policy: Arc::clone(&self.policy),
            context: self.context.clone(),
            observation_scales: self.observation_scales.clone(),
            action_scales: self.action_scales.clone(),
        }
    }
}

impl<P: Policy + ?Sized> fmt::Debug for ScaledPolicy<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScaledPolicy")
            .field("context", &self.context)
            .field("observation_scales", &self.observation_scales)
            .field("action_scales", &self.action_scales)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Echoes the observation back, counting calls.
    #[derive(Default)]
    struct Echo {
        calls: AtomicUsize,
    }

    impl Policy for Echo {
        fn observation_len(&self) -> usize {
            2
        }

        fn action_len(&self) -> usize {
            2
        }

        fn action(&self, observation: &[f64]) -> ActionResult {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(observation.to_vec())
        }
    }

    struct Failing;

    impl Policy for Failing {
        fn observation_len(&self) -> usize {
            1
        }

        fn action_len(&self) -> usize {
            1
        }

        fn action(&self, _observation: &[f64]) -> ActionResult {
            Err(PolicyError::inference("model unavailable"))
        }
    }

    struct WrongLength;

    impl Policy for WrongLength {
        fn observation_len(&self) -> usize {
            1
        }

        fn action_len(&self) -> usize {
            2
        }

        fn action(&self, _observation: &[f64]) -> ActionResult {
            Ok(vec![0.0])
        }
    }

    const BASE: [&str; 3] = ["m", "L", "g"];

    fn context() -> Context {
        Context::new(
            (0..3).map(|i| Dimension::base(3, i)).collect(),
            [
                ("m", Dimension::new([1, 0, 0]), 1.0),
                ("L", Dimension::new([0, 1, 0]), 1.0),
                ("g", Dimension::new([0, 1, -2]), 9.81),
            ],
        )
        .unwrap()
    }

    fn length() -> Dimension {
        Dimension::new([0, 1, 0])
    }

    fn velocity() -> Dimension {
        Dimension::new([0, 1, -1])
    }

    fn echo_policy() -> DimensionalPolicy<Echo> {
        DimensionalPolicy::new(
            Echo::default(),
            context(),
            vec![length(), velocity()],
            vec![length(), velocity()],
        )
        .unwrap()
    }

    #[test]
    fn test_identity_scaling() {
        let policy = echo_policy();
        let scaled = policy.to_scaled(&context(), &BASE).unwrap();

        assert_eq!(scaled.observation_scales(), &[1.0, 1.0]);
        assert_eq!(scaled.action_scales(), &[1.0, 1.0]);
        assert_eq!(scaled.action(&[0.3, -2.0]).unwrap(), vec![0.3, -2.0]);
    }

    #[test]
    fn test_echo_round_trips_through_units() {
        let policy = echo_policy();
        // Length x4, gravity fixed => time x2, velocity x2
        let target = context().scale_to(&BASE, &[1.0, 4.0, 9.81]).unwrap();
        let scaled = policy.to_scaled(&target, &BASE).unwrap();

        assert_relative_eq!(scaled.observation_scales()[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(scaled.observation_scales()[1], 2.0, epsilon = 1e-12);

        let native = scaled.nondimensionalize(&[4.0, 2.0]).unwrap();
        assert_relative_eq!(native[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(native[1], 1.0, epsilon = 1e-12);

        // Same dimensions in and out, so the echo comes back unchanged.
        let act = scaled.action(&[4.0, 2.0]).unwrap();
        assert_relative_eq!(act[0], 4.0, epsilon = 1e-12);
        assert_relative_eq!(act[1], 2.0, epsilon = 1e-12);
        assert_eq!(policy.policy().calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_dimension_list_length_mismatch() {
        let err = DimensionalPolicy::new(
            Echo::default(),
            context(),
            vec![length()],
            vec![length(), velocity()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            ScalingError::DimensionListLengthMismatch {
                kind: "observation",
                declared: 1,
                expected: 2,
            }
        );

        let err = DimensionalPolicy::new(
            Echo::default(),
            context(),
            vec![length(), velocity()],
            vec![length(), velocity(), velocity()],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScalingError::DimensionListLengthMismatch { kind: "action", .. }
        ));
    }

    #[test]
    fn test_dimension_shape_checked() {
        let err = DimensionalPolicy::new(
            Echo::default(),
            context(),
            vec![Dimension::new([0, 1]), velocity()],
            vec![length(), velocity()],
        )
        .unwrap_err();
        assert!(matches!(err, ScalingError::Shape { .. }));
    }

    #[test]
    fn test_to_scaled_errors() {
        let policy = echo_policy();

        let err = policy.to_scaled(&context(), &["m", "L", "x"]).unwrap_err();
        assert!(err.is_not_found());

        let err = policy.to_scaled(&context(), &["L", "L", "g"]).unwrap_err();
        assert!(err.is_degenerate_basis());

        let other_base = Context::new(
            vec![Dimension::new([1, 0]), Dimension::new([0, 1])],
            [("m", Dimension::new([1, 0]), 1.0)],
        )
        .unwrap();
        let err = policy.to_scaled(&other_base, &["m"]).unwrap_err();
        assert!(matches!(err, ScalingError::ContextShapeMismatch { .. }));
    }

    #[test]
    fn test_policy_errors_propagate() {
        let policy = DimensionalPolicy::new(
            Failing,
            context(),
            vec![length()],
            vec![Dimension::new([1, 2, -2])],
        )
        .unwrap();
        let scaled = policy.to_scaled(&context(), &BASE).unwrap();

        assert_eq!(
            scaled.action(&[1.0]).unwrap_err(),
            PolicyError::inference("model unavailable")
        );
        assert_eq!(
            scaled.action(&[1.0, 2.0]).unwrap_err(),
            PolicyError::ObservationLength {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn test_wrapped_action_length_checked() {
        let policy = DimensionalPolicy::new(
            WrongLength,
            context(),
            vec![length()],
            vec![length(), length()],
        )
        .unwrap();
        let scaled = policy.to_scaled(&context(), &BASE).unwrap();
        assert!(matches!(
            scaled.action(&[1.0]),
            Err(PolicyError::ActionLength {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_scaled_policy_is_a_policy() {
        let policy = echo_policy();
        let target = context().scale_to(&BASE, &[2.0, 1.0, 9.81]).unwrap();
        let boxed: BoxedPolicy = Box::new(policy.to_scaled(&target, &BASE).unwrap());

        assert_eq!(boxed.observation_len(), 2);
        assert_eq!(boxed.action_len(), 2);
        assert!(boxed.action(&[1.0, 1.0]).is_ok());

        // the original keeps acting in training units
        assert_eq!(policy.action(&[1.0, 5.0]).unwrap(), vec![1.0, 5.0]);
    }

    #[test]
    fn test_scaled_policy_is_send_and_clone() {
        fn assert_send_sync<T: Send + Sync>(_: &T) {}

        let scaled = echo_policy().to_scaled(&context(), &BASE).unwrap();
        let copy = scaled.clone();
        assert_send_sync(&copy);
        assert!(Arc::ptr_eq(scaled.inner(), copy.inner()));
        assert!(format!("{copy:?}").contains("ScaledPolicy"));
    }
}
