//! Dimensional rescaling of simulation contexts and control policies.
//!
//! A policy trained in one simulated world (mass, length, gravity, motor
//! strength) usually fails in a world whose physics differ only by a change
//! of units. This crate recovers that unit change and applies it:
//!
//! - [`Dimension`] - Rational exponents over the base dimensions (M, L, T, ...)
//! - [`Context`] - An immutable set of named physical quantities
//! - [`ScaleFactors`] - The per-base-dimension scale between two contexts
//! - [`DimensionalPolicy`] - A trained controller with its context and units
//! - [`ScaledPolicy`] - The same controller transferred to another context
//! - [`ContextGrid`] - Log-spaced sweeps of target contexts
//! - [`run_batch`] - Parallel evaluation over many targets
//!
//! # Rescaling
//!
//! Pick `k` quantities whose dimensions form an invertible basis, for
//! example mass, length and gravity. Their values in the source and target
//! contexts fix one scale factor per base dimension:
//!
//! ```text
//! E · ln(s) = ln(v' / v)
//! ```
//!
//! Every other quantity with dimension `d` is then multiplied by
//! `Π s_j^(d_j)`, which keeps all dimensionless groups of the context fixed.
//!
//! # Example
//!
//! ```
//! use sim_scaling::{Context, Dimension};
//!
//! let context = Context::new(
//!     (0..3).map(|i| Dimension::base(3, i)).collect(),
//!     [
//!         ("m", Dimension::new([1, 0, 0]), 14.0),
//!         ("L", Dimension::new([0, 1, 0]), 0.5),
//!         ("g", Dimension::new([0, 1, -2]), 9.81),
//!         ("k", Dimension::new([1, 2, -2]), 240.0),
//!     ],
//! )
//! .unwrap();
//!
//! // Double the mass, keep length and gravity
//! let heavier = context.scale_to(&["m", "L", "g"], &[28.0, 0.5, 9.81]).unwrap();
//! assert!((heavier.value("k").unwrap() - 480.0).abs() < 1e-9);
//! ```
//!
//! # Layer 0
//!
//! No rendering or engine dependencies. Policies are opaque behind the
//! [`Policy`] trait, so any inference backend can be wrapped.

#![doc(html_root_url = "https://docs.rs/sim-scaling/0.7.0")]
#![deny(clippy::unwrap_used, clippy::expect_used)]
#![warn(missing_docs)]
#![allow(
    clippy::missing_const_for_fn,     // nalgebra types block const in most places
    clippy::suboptimal_flops,          // mul_add style changes aren't always clearer
    clippy::cast_precision_loss,       // usize to f64 is fine for counts
    clippy::missing_errors_doc,        // Error docs added where non-obvious
    clippy::module_name_repetitions,   // ScalingError, ScaleFactors read better in full
)]

mod adapters;
mod batch;
mod config;
mod context;
mod dimension;
mod error;
mod policy;
pub mod rational;
mod solve;
mod sweep;

pub use adapters::{BoxSpace, FnPolicy, LinearPolicy};
pub use batch::{run_batch, scale_policy_batch, BatchReport, TaskOutcome};
pub use config::RescaleConfig;
pub use context::{Context, ContextConfig, Quantity};
pub use dimension::Dimension;
pub use error::{PolicyError, Result, ScalingError};
pub use policy::{ActionResult, BoxedPolicy, DimensionalPolicy, Policy, ScaledPolicy};
pub use rational::Rational;
pub use solve::ScaleFactors;
pub use sweep::{ContextGrid, LogAxis};
