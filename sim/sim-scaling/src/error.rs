//! Error types for dimensional rescaling.

use thiserror::Error;

/// Errors raised while building or rescaling contexts and policies.
///
/// All of these indicate a configuration or programming error rather than
/// a transient condition, so none of them are retried internally.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ScalingError {
    /// A quantity name is absent from the context.
    #[error("quantity not found: {name}")]
    QuantityNotFound {
        /// Name that was looked up.
        name: String,
    },

    /// The chosen dimensions do not span the dimension space.
    #[error("degenerate basis {names:?}: {reason}")]
    DegenerateBasis {
        /// Quantity (or base dimension) names making up the basis.
        names: Vec<String>,
        /// Why the basis was rejected.
        reason: String,
    },

    /// Two contexts being compared declare different quantity sets.
    #[error("context shape mismatch: {reason}")]
    ContextShapeMismatch {
        /// Description of the difference.
        reason: String,
    },

    /// A per-component dimension list disagrees with the policy's vector length.
    #[error("{kind} dimension list has {declared} entries but the policy uses {expected}")]
    DimensionListLengthMismatch {
        /// Which list (`observation` or `action`).
        kind: &'static str,
        /// Number of dimensions declared.
        declared: usize,
        /// Length of the policy's vector.
        expected: usize,
    },

    /// An exponent vector has the wrong number of entries.
    #[error("shape error: expected {expected} exponents, got {actual}")]
    Shape {
        /// Number of base dimensions.
        expected: usize,
        /// Number of exponents provided.
        actual: usize,
    },

    /// The number of basis names or target values is not the number of base dimensions.
    #[error("basis needs {expected} quantities, got {names} names and {values} values")]
    BasisSize {
        /// Number of base dimensions.
        expected: usize,
        /// Number of basis names provided.
        names: usize,
        /// Number of target values provided.
        values: usize,
    },

    /// A quantity name appears twice.
    #[error("duplicate quantity: {name}")]
    DuplicateQuantity {
        /// The repeated name.
        name: String,
    },

    /// A quantity value is `NaN` or infinite.
    #[error("quantity {name} has non-finite value {value}")]
    InvalidValue {
        /// Name of the quantity.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// A value that must go through a logarithm is zero, negative, or changes sign.
    #[error("quantity {name} has value {value}, which cannot be log-scaled")]
    NonPositiveValue {
        /// Name of the quantity.
        name: String,
        /// The offending value.
        value: f64,
    },

    /// Invalid solver configuration.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the configuration error.
        reason: String,
    },

    /// (De)serialization of a context description failed.
    #[cfg(feature = "serde")]
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ScalingError {
    /// Create a quantity-not-found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::QuantityNotFound { name: name.into() }
    }

    /// Create a degenerate basis error.
    #[must_use]
    pub fn degenerate<S: AsRef<str>>(names: &[S], reason: impl Into<String>) -> Self {
        Self::DegenerateBasis {
            names: names.iter().map(|n| n.as_ref().to_owned()).collect(),
            reason: reason.into(),
        }
    }

    /// Create a context shape mismatch error.
    #[must_use]
    pub fn shape_mismatch(reason: impl Into<String>) -> Self {
        Self::ContextShapeMismatch {
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Check if this is a degenerate basis error.
    #[must_use]
    pub fn is_degenerate_basis(&self) -> bool {
        matches!(self, Self::DegenerateBasis { .. })
    }

    /// Check if this is a missing quantity error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::QuantityNotFound { .. })
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for ScalingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Errors raised by a [`Policy`](crate::Policy) when computing an action.
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum PolicyError {
    /// The observation has the wrong number of components.
    #[error("observation has {actual} components, expected {expected}")]
    ObservationLength {
        /// Length the policy expects.
        expected: usize,
        /// Length received.
        actual: usize,
    },

    /// The wrapped policy produced an action of the wrong length.
    #[error("action has {actual} components, expected {expected}")]
    ActionLength {
        /// Length declared by the policy.
        expected: usize,
        /// Length produced.
        actual: usize,
    },

    /// The policy itself failed to produce an action.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl PolicyError {
    /// Create an inference error.
    #[must_use]
    pub fn inference(reason: impl Into<String>) -> Self {
        Self::Inference(reason.into())
    }
}

/// Result type for rescaling operations.
pub type Result<T> = std::result::Result<T, ScalingError>;
