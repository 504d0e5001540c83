//! Named, dimensioned physical quantities.
//!
//! A [`Context`] describes one configuration of a simulated system: its mass,
//! limb lengths, gravity, joint stiffness and damping, and so on. Each
//! quantity carries a [`Dimension`] over a fixed set of base dimensions.
//!
//! Contexts are never mutated. [`Context::scale_to`] derives a new context
//! in which a chosen basis of quantities takes target values and every other
//! quantity follows by dimensional homogeneity.
//!
//! # Example
//!
//! ```
//! use sim_scaling::{Context, Dimension};
//!
//! let (m, l, t) = (Dimension::base(3, 0), Dimension::base(3, 1), Dimension::base(3, 2));
//! let context = Context::new(
//!     vec![m.clone(), l.clone(), t.clone()],
//!     [
//!         ("m", m.clone(), 14.0),
//!         ("L", l.clone(), 0.5),
//!         ("g", Dimension::new([0, 1, -2]), 9.81),
//!         ("k0", Dimension::new([1, 2, -2]), 240.0),
//!     ],
//! )
//! .unwrap();
//!
//! let heavier = context.scale_to(&["m", "L", "g"], &[28.0, 0.5, 9.81]).unwrap();
//! assert!((heavier.value("k0").unwrap() - 480.0).abs() < 1e-9);
//! assert!((context.value("k0").unwrap() - 240.0).abs() < 1e-12);
//! ```

use hashbrown::HashMap;
use nalgebra::DVector;
use tracing::debug;

use crate::solve::{self, BasisEntry};
use crate::{Dimension, RescaleConfig, Result, ScaleFactors, ScalingError};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named physical quantity.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Quantity {
    name: String,
    dimension: Dimension,
    value: f64,
}

impl Quantity {
    /// Create a quantity.
    #[must_use]
    pub fn new(name: impl Into<String>, dimension: Dimension, value: f64) -> Self {
        Self {
            name: name.into(),
            dimension,
            value,
        }
    }

    /// Quantity name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantity dimension.
    #[must_use]
    pub fn dimension(&self) -> &Dimension {
        &self.dimension
    }

    /// Quantity value.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// Serializable description of a [`Context`].
///
/// This is the construction input for contexts loaded from configuration
/// files; [`Context::from_config`] validates it.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ContextConfig {
    /// Base dimensions, in the order shared by every quantity.
    pub base_dimensions: Vec<Dimension>,
    /// Quantities, in declaration order.
    pub quantities: Vec<Quantity>,
}

impl ContextConfig {
    /// Parse a context description from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Serialization`] on malformed JSON.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Serialization`] if serialization fails.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// An immutable set of named, dimensioned quantities.
///
/// # Invariants
///
/// - Quantity names are unique.
/// - Every dimension (base or quantity) has one exponent per base dimension.
/// - The base dimensions are linearly independent.
/// - Every value is finite.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "ContextConfig", into = "ContextConfig")
)]
pub struct Context {
    base_dimensions: Vec<Dimension>,
    quantities: Vec<Quantity>,
    index: HashMap<String, usize>,
}

impl Context {
    /// Build a context from base dimensions and `(name, dimension, value)` triples.
    ///
    /// # Errors
    ///
    /// - [`ScalingError::Shape`] if a dimension has the wrong number of exponents
    /// - [`ScalingError::DegenerateBasis`] if the base dimensions are empty or dependent
    /// - [`ScalingError::DuplicateQuantity`] if a name repeats
    /// - [`ScalingError::InvalidValue`] if a value is not finite
    pub fn new<N: Into<String>>(
        base_dimensions: Vec<Dimension>,
        quantities: impl IntoIterator<Item = (N, Dimension, f64)>,
    ) -> Result<Self> {
        let quantities = quantities
            .into_iter()
            .map(|(name, dimension, value)| Quantity::new(name, dimension, value))
            .collect();
        Self::from_parts(base_dimensions, quantities)
    }

    /// Build a context from a validated [`ContextConfig`].
    ///
    /// # Errors
    ///
    /// Same as [`Context::new`].
    pub fn from_config(config: ContextConfig) -> Result<Self> {
        Self::from_parts(config.base_dimensions, config.quantities)
    }

    /// Describe this context as a [`ContextConfig`].
    #[must_use]
    pub fn to_config(&self) -> ContextConfig {
        ContextConfig {
            base_dimensions: self.base_dimensions.clone(),
            quantities: self.quantities.clone(),
        }
    }

    fn from_parts(base_dimensions: Vec<Dimension>, quantities: Vec<Quantity>) -> Result<Self> {
        let k = base_dimensions.len();
        let base_refs: Vec<&Dimension> = base_dimensions.iter().collect();
        let base_names: Vec<String> = (0..k).map(|i| format!("base[{i}]")).collect();
        let matrix = solve::basis_matrix(k, &base_refs)?;
        solve::check_invertible(
            &matrix,
            &base_names,
            RescaleConfig::default().singular_tolerance,
        )?;

        let mut index = HashMap::with_capacity(quantities.len());
        for (i, q) in quantities.iter().enumerate() {
            q.dimension.check_len(k)?;
            if !q.value.is_finite() {
                return Err(ScalingError::InvalidValue {
                    name: q.name.clone(),
                    value: q.value,
                });
            }
            if index.insert(q.name.clone(), i).is_some() {
                return Err(ScalingError::DuplicateQuantity {
                    name: q.name.clone(),
                });
            }
        }

        Ok(Self {
            base_dimensions,
            quantities,
            index,
        })
    }

    /// The base dimensions.
    #[must_use]
    pub fn base_dimensions(&self) -> &[Dimension] {
        &self.base_dimensions
    }

    /// Number of base dimensions (`k`).
    #[must_use]
    pub fn num_base_dimensions(&self) -> usize {
        self.base_dimensions.len()
    }

    /// Number of quantities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.quantities.len()
    }

    /// True if the context holds no quantities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quantities.is_empty()
    }

    /// Iterate over quantities in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Quantity> + '_ {
        self.quantities.iter()
    }

    /// Quantity names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.quantities.iter().map(Quantity::name)
    }

    /// Quantity values in declaration order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.quantities.iter().map(Quantity::value).collect()
    }

    /// True if a quantity with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Look up a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::QuantityNotFound`] if `name` is absent.
    pub fn quantity(&self, name: &str) -> Result<&Quantity> {
        self.index
            .get(name)
            .map(|&i| &self.quantities[i])
            .ok_or_else(|| ScalingError::not_found(name))
    }

    /// Value of a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::QuantityNotFound`] if `name` is absent.
    pub fn value(&self, name: &str) -> Result<f64> {
        self.quantity(name).map(Quantity::value)
    }

    /// Dimension of a quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::QuantityNotFound`] if `name` is absent.
    pub fn dimension(&self, name: &str) -> Result<&Dimension> {
        self.quantity(name).map(Quantity::dimension)
    }

    /// Values of the named quantities, in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::QuantityNotFound`] for the first absent name.
    pub fn values_of<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<f64>> {
        names.iter().map(|n| self.value(n.as_ref())).collect()
    }

    /// Per-base-dimension scale factors that take the basis to `target_values`.
    ///
    /// # Errors
    ///
    /// See [`Context::scale_to`].
    pub fn scale_factors<S: AsRef<str>>(
        &self,
        base: &[S],
        target_values: &[f64],
    ) -> Result<ScaleFactors> {
        self.scale_factors_with(base, target_values, &RescaleConfig::default())
    }

    /// [`Context::scale_factors`] with an explicit solver configuration.
    ///
    /// # Errors
    ///
    /// See [`Context::scale_to`]; also [`ScalingError::InvalidConfig`].
    pub fn scale_factors_with<S: AsRef<str>>(
        &self,
        base: &[S],
        target_values: &[f64],
        config: &RescaleConfig,
    ) -> Result<ScaleFactors> {
        let k = self.num_base_dimensions();
        if base.len() != k || target_values.len() != k {
            return Err(ScalingError::BasisSize {
                expected: k,
                names: base.len(),
                values: target_values.len(),
            });
        }

        let entries = base
            .iter()
            .zip(target_values)
            .map(|(name, &to)| {
                let q = self.quantity(name.as_ref())?;
                Ok(BasisEntry {
                    name: q.name(),
                    dimension: q.dimension(),
                    from: q.value(),
                    to,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        ScaleFactors::solve(k, &entries, config)
    }

    /// Derive a context in which `base` takes `target_values`.
    ///
    /// Every quantity `q` is multiplied by `prod_d s_d^(e_q,d)` where `s`
    /// solves the basis system. The original context is untouched.
    ///
    /// # Errors
    ///
    /// - [`ScalingError::BasisSize`] unless exactly `k` names and `k` values are given
    /// - [`ScalingError::QuantityNotFound`] if a basis name is absent
    /// - [`ScalingError::DegenerateBasis`] if the basis dimensions do not span the space
    /// - [`ScalingError::NonPositiveValue`] if a current or target basis value is not positive
    pub fn scale_to<S: AsRef<str>>(&self, base: &[S], target_values: &[f64]) -> Result<Self> {
        self.scale_to_with(base, target_values, &RescaleConfig::default())
    }

    /// [`Context::scale_to`] with an explicit solver configuration.
    ///
    /// # Errors
    ///
    /// See [`Context::scale_to`]; also [`ScalingError::InvalidConfig`].
    pub fn scale_to_with<S: AsRef<str>>(
        &self,
        base: &[S],
        target_values: &[f64],
        config: &RescaleConfig,
    ) -> Result<Self> {
        let factors = self.scale_factors_with(base, target_values, config)?;
        let scaled = self.rescaled(&factors)?;
        debug!(
            quantities = scaled.len(),
            scales = ?factors.scales(),
            "Rescaled context"
        );
        Ok(scaled)
    }

    /// Apply precomputed scale factors to every quantity.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::Shape`] if `factors` has the wrong length.
    pub fn rescaled(&self, factors: &ScaleFactors) -> Result<Self> {
        if factors.len() != self.num_base_dimensions() {
            return Err(ScalingError::Shape {
                expected: self.num_base_dimensions(),
                actual: factors.len(),
            });
        }
        let quantities = self
            .quantities
            .iter()
            .map(|q| {
                let value = q.value * factors.factor(&q.dimension)?;
                if !value.is_finite() {
                    return Err(ScalingError::InvalidValue {
                        name: q.name.clone(),
                        value,
                    });
                }
                Ok(Quantity {
                    value,
                    ..q.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            base_dimensions: self.base_dimensions.clone(),
            quantities,
            index: self.index.clone(),
        })
    }

    /// Check that `other` declares the same base and the same quantities.
    ///
    /// Quantity order may differ; names and dimensions must match.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::ContextShapeMismatch`] describing the first difference.
    pub fn check_same_shape(&self, other: &Self) -> Result<()> {
        if self.base_dimensions != other.base_dimensions {
            return Err(ScalingError::shape_mismatch("base dimensions differ"));
        }
        if self.len() != other.len() {
            return Err(ScalingError::shape_mismatch(format!(
                "{} quantities vs {}",
                self.len(),
                other.len()
            )));
        }
        for q in &self.quantities {
            match other.quantity(&q.name) {
                Ok(o) if o.dimension == q.dimension => {}
                Ok(o) => {
                    return Err(ScalingError::shape_mismatch(format!(
                        "quantity {} has dimension {} vs {}",
                        q.name, q.dimension, o.dimension
                    )));
                }
                Err(_) => {
                    return Err(ScalingError::shape_mismatch(format!(
                        "quantity {} missing from other context",
                        q.name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Distance that remains after rescaling `other` onto this context's basis.
    ///
    /// `other` is rescaled so that its `base` quantities take this context's
    /// values, then the root-mean-square of `ln(self_q / other_q)` over all
    /// quantities is returned. Two contexts that differ only by a change of
    /// units along the basis are at distance zero.
    ///
    /// # Errors
    ///
    /// - [`ScalingError::ContextShapeMismatch`] if the quantity sets differ
    /// - any error of [`Context::scale_to`]
    /// - [`ScalingError::NonPositiveValue`] if a pair of values differs in sign or one is zero
    pub fn adimensional_distance<S: AsRef<str>>(&self, other: &Self, base: &[S]) -> Result<f64> {
        self.check_same_shape(other)?;
        let targets = self.values_of(base)?;
        let rescaled = other.scale_to(base, &targets)?;

        let mut sum_sq = 0.0;
        for q in &self.quantities {
            let theirs = rescaled.value(&q.name)?;
            if theirs == q.value {
                continue;
            }
            if q.value == 0.0 || theirs == 0.0 || q.value.signum() != theirs.signum() {
                return Err(ScalingError::NonPositiveValue {
                    name: q.name.clone(),
                    value: theirs / q.value,
                });
            }
            let log_ratio = (q.value / theirs).ln();
            sum_sq += log_ratio * log_ratio;
        }

        #[allow(clippy::cast_precision_loss)]
        let n = self.len().max(1) as f64;
        Ok((sum_sq / n).sqrt())
    }

    /// Euclidean distance between the raw value vectors.
    ///
    /// Ignores dimensions entirely; useful only as a coarse diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::ContextShapeMismatch`] if the quantity sets differ.
    pub fn euclidian_distance(&self, other: &Self) -> Result<f64> {
        let (a, b) = self.aligned_values(other)?;
        Ok((a - b).norm())
    }

    /// Cosine of the angle between the raw value vectors.
    ///
    /// Returns `0.0` if either vector is zero.
    ///
    /// # Errors
    ///
    /// Returns [`ScalingError::ContextShapeMismatch`] if the quantity sets differ.
    pub fn cosine_similarity(&self, other: &Self) -> Result<f64> {
        let (a, b) = self.aligned_values(other)?;
        let denom = a.norm() * b.norm();
        if denom == 0.0 {
            return Ok(0.0);
        }
        Ok((a.dot(&b) / denom).clamp(-1.0, 1.0))
    }

    /// Value vectors of both contexts in this context's quantity order.
    fn aligned_values(&self, other: &Self) -> Result<(DVector<f64>, DVector<f64>)> {
        self.check_same_shape(other)?;
        let theirs = self
            .quantities
            .iter()
            .map(|q| other.value(&q.name))
            .collect::<Result<Vec<_>>>()?;
        Ok((DVector::from_vec(self.values()), DVector::from_vec(theirs)))
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.base_dimensions == other.base_dimensions && self.quantities == other.quantities
    }
}

impl TryFrom<ContextConfig> for Context {
    type Error = ScalingError;

    fn try_from(config: ContextConfig) -> Result<Self> {
        Self::from_config(config)
    }
}

impl From<Context> for ContextConfig {
    fn from(context: Context) -> Self {
        Self {
            base_dimensions: context.base_dimensions,
            quantities: context.quantities,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mlt() -> Vec<Dimension> {
        (0..3).map(|i| Dimension::base(3, i)).collect()
    }

    fn pendulum() -> Context {
        Context::new(
            mlt(),
            [
                ("m", Dimension::new([1, 0, 0]), 2.0),
                ("L", Dimension::new([0, 1, 0]), 0.5),
                ("g", Dimension::new([0, 1, -2]), 9.81),
                ("k", Dimension::new([1, 2, -2]), 30.0),
                ("b", Dimension::new([1, 2, -1]), 0.8),
                ("dt", Dimension::new([0, 0, 1]), 0.01),
            ],
        )
        .unwrap()
    }

    const BASE: [&str; 3] = ["m", "L", "g"];

    #[test]
    fn test_lookup() {
        let c = pendulum();
        assert_eq!(c.len(), 6);
        assert_eq!(c.num_base_dimensions(), 3);
        assert_eq!(c.value("L").unwrap(), 0.5);
        assert_eq!(c.dimension("g").unwrap(), &Dimension::new([0, 1, -2]));
        assert!(c.contains("dt"));
        assert_eq!(c.names().collect::<Vec<_>>(), ["m", "L", "g", "k", "b", "dt"]);

        let err = c.value("l9").unwrap_err();
        assert_eq!(err, ScalingError::not_found("l9"));
    }

    #[test]
    fn test_construction_errors() {
        let dup = Context::new(
            mlt(),
            [
                ("m", Dimension::new([1, 0, 0]), 1.0),
                ("m", Dimension::new([1, 0, 0]), 2.0),
            ],
        );
        assert!(matches!(dup, Err(ScalingError::DuplicateQuantity { .. })));

        let short = Context::new(mlt(), [("m", Dimension::new([1, 0]), 1.0)]);
        assert!(matches!(short, Err(ScalingError::Shape { .. })));

        let nan = Context::new(mlt(), [("m", Dimension::new([1, 0, 0]), f64::NAN)]);
        assert!(matches!(nan, Err(ScalingError::InvalidValue { .. })));

        let dependent_base = Context::new(
            vec![Dimension::new([1, 0]), Dimension::new([2, 0])],
            [("m", Dimension::new([1, 0]), 1.0)],
        );
        assert!(dependent_base.unwrap_err().is_degenerate_basis());

        let empty_base = Context::new(Vec::new(), Vec::<(String, Dimension, f64)>::new());
        assert!(empty_base.unwrap_err().is_degenerate_basis());
    }

    #[test]
    fn test_scale_to_length() {
        let c = pendulum();
        // Length x4, mass and gravity fixed => time x2
        let scaled = c.scale_to(&BASE, &[2.0, 2.0, 9.81]).unwrap();

        assert_relative_eq!(scaled.value("L").unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(scaled.value("dt").unwrap(), 0.02, epsilon = 1e-12);
        // M L^2 T^-2 => 16 / 4 = 4
        assert_relative_eq!(scaled.value("k").unwrap(), 120.0, epsilon = 1e-9);
        // M L^2 T^-1 => 16 / 2 = 8
        assert_relative_eq!(scaled.value("b").unwrap(), 6.4, epsilon = 1e-9);

        // original untouched
        assert_eq!(c.value("L").unwrap(), 0.5);
    }

    #[test]
    fn test_scale_to_preconditions() {
        let c = pendulum();

        let err = c.scale_to(&["m", "L"], &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, ScalingError::BasisSize { expected: 3, .. }));

        let err = c.scale_to(&BASE, &[1.0, 1.0]).unwrap_err();
        assert!(matches!(err, ScalingError::BasisSize { values: 2, .. }));

        let err = c.scale_to(&["m", "L", "q"], &[1.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_not_found());

        // no basis quantity carries mass
        let err = c.scale_to(&["L", "dt", "g"], &[1.0, 1.0, 1.0]).unwrap_err();
        assert!(err.is_degenerate_basis());

        let err = c.scale_to(&BASE, &[0.0, 1.0, 1.0]).unwrap_err();
        assert!(matches!(err, ScalingError::NonPositiveValue { .. }));
    }

    #[test]
    fn test_alternative_basis() {
        let c = pendulum();
        // m, L, dt span M, L, T as well
        let scaled = c.scale_to(&["m", "L", "dt"], &[2.0, 0.5, 0.02]).unwrap();
        assert_relative_eq!(scaled.value("g").unwrap(), 9.81 / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_self_comparisons() {
        let c = pendulum();
        assert_relative_eq!(c.adimensional_distance(&c, &BASE).unwrap(), 0.0);
        assert_relative_eq!(c.euclidian_distance(&c).unwrap(), 0.0);
        assert_relative_eq!(c.cosine_similarity(&c).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_adimensional_distance_ignores_basis_scaling() {
        let c = pendulum();
        let scaled = c.scale_to(&BASE, &[7.0, 3.0, 1.62]).unwrap();

        assert_relative_eq!(
            scaled.adimensional_distance(&c, &BASE).unwrap(),
            0.0,
            epsilon = 1e-9
        );
        assert!(scaled.euclidian_distance(&c).unwrap() > 1.0);
    }

    #[test]
    fn test_adimensional_distance_detects_real_change() {
        let c = pendulum();
        let mut config = c.to_config();
        for q in &mut config.quantities {
            if q.name() == "k" {
                *q = Quantity::new("k", q.dimension().clone(), q.value() * std::f64::consts::E);
            }
        }
        let stiffer = Context::from_config(config).unwrap();

        // one of six quantities differs by ln-ratio 1
        let d = stiffer.adimensional_distance(&c, &BASE).unwrap();
        assert_relative_eq!(d, (1.0_f64 / 6.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_shape_mismatch() {
        let c = pendulum();
        let other = Context::new(mlt(), [("m", Dimension::new([1, 0, 0]), 2.0)]).unwrap();

        assert!(matches!(
            c.euclidian_distance(&other),
            Err(ScalingError::ContextShapeMismatch { .. })
        ));
        assert!(matches!(
            c.cosine_similarity(&other),
            Err(ScalingError::ContextShapeMismatch { .. })
        ));
        assert!(matches!(
            c.adimensional_distance(&other, &BASE),
            Err(ScalingError::ContextShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_comparisons_align_by_name() {
        let a = Context::new(
            mlt(),
            [
                ("m", Dimension::new([1, 0, 0]), 3.0),
                ("L", Dimension::new([0, 1, 0]), 4.0),
            ],
        )
        .unwrap();
        let b = Context::new(
            mlt(),
            [
                ("L", Dimension::new([0, 1, 0]), 4.0),
                ("m", Dimension::new([1, 0, 0]), 3.0),
            ],
        )
        .unwrap();
        assert_relative_eq!(a.euclidian_distance(&b).unwrap(), 0.0);

        let zero = Context::new(
            mlt(),
            [
                ("m", Dimension::new([1, 0, 0]), 0.0),
                ("L", Dimension::new([0, 1, 0]), 0.0),
            ],
        )
        .unwrap();
        assert_relative_eq!(a.euclidian_distance(&zero).unwrap(), 5.0);
        assert_eq!(a.cosine_similarity(&zero).unwrap(), 0.0);
    }

    #[test]
    fn test_config_round_trip() {
        let c = pendulum();
        let rebuilt = Context::from_config(c.to_config()).unwrap();
        assert_eq!(rebuilt, c);
        let rebuilt = Context::try_from(ContextConfig::from(c.clone())).unwrap();
        assert_eq!(rebuilt, c);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip() {
        let c = pendulum();
        let json = serde_json::to_string(&c).unwrap();
        let back: Context = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);

        let json = c.to_config().to_json().unwrap();
        let config = ContextConfig::from_json(&json).unwrap();
        assert_eq!(Context::from_config(config).unwrap(), c);

        assert!(ContextConfig::from_json("{").is_err());
    }
}
