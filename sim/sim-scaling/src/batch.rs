//! Parallel batches of independent rescaling tasks.
//!
//! Experiment drivers rescale one policy to many target contexts and roll
//! each one out independently. Tasks run on the rayon thread pool; every
//! task owns its inputs, and results are returned by value. A failing task
//! is recorded in the [`BatchReport`] and never aborts its siblings.

use std::fmt;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::{Context, DimensionalPolicy, Policy, ScaledPolicy, ScalingError};

/// Result of one task of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome<T, E> {
    /// Position of the task in the input.
    pub index: usize,
    /// What the task produced.
    pub result: Result<T, E>,
}

/// Per-task results of a batch, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport<T, E> {
    outcomes: Vec<TaskOutcome<T, E>>,
}

impl<T, E> BatchReport<T, E> {
    /// Number of tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// True if the batch had no tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// All outcomes, in input order.
    #[must_use]
    pub fn outcomes(&self) -> &[TaskOutcome<T, E>] {
        &self.outcomes
    }

    /// Consume the report.
    #[must_use]
    pub fn into_outcomes(self) -> Vec<TaskOutcome<T, E>> {
        self.outcomes
    }

    /// Successful results with their task index.
    pub fn successes(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|t| (o.index, t)))
    }

    /// Failures with their task index.
    pub fn failures(&self) -> impl Iterator<Item = (usize, &E)> + '_ {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.index, e)))
    }

    /// Number of failed tasks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// True if every task succeeded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failure_count() == 0
    }
}

/// Run `task` over every input in parallel, collecting per-task results.
///
/// # Example
///
/// ```
/// use sim_scaling::run_batch;
///
/// let report = run_batch(&[1.0_f64, -1.0, 4.0], |_, x| {
///     if *x >= 0.0 { Ok(x.sqrt()) } else { Err("negative") }
/// });
/// assert_eq!(report.len(), 3);
/// assert_eq!(report.failure_count(), 1);
/// ```
pub fn run_batch<I, T, E, F>(inputs: &[I], task: F) -> BatchReport<T, E>
where
    I: Sync,
    T: Send,
    E: Send + fmt::Display,
    F: Fn(usize, &I) -> Result<T, E> + Sync + Send,
{
    info!(tasks = inputs.len(), "Starting batch");

    let outcomes: Vec<TaskOutcome<T, E>> = inputs
        .par_iter()
        .enumerate()
        .map(|(index, input)| {
            let result = task(index, input);
            if let Err(err) = &result {
                warn!(task = index, error = %err, "Batch task failed");
            }
            TaskOutcome { index, result }
        })
        .collect();

    let report = BatchReport { outcomes };
    info!(
        tasks = report.len(),
        failures = report.failure_count(),
        "Finished batch"
    );
    report
}

/// Build one [`ScaledPolicy`] per target context in parallel.
pub fn scale_policy_batch<P, S>(
    policy: &DimensionalPolicy<P>,
    targets: &[Context],
    base: &[S],
) -> BatchReport<ScaledPolicy<P>, ScalingError>
where
    P: Policy + ?Sized,
    S: AsRef<str> + Sync,
{
    run_batch(targets, |_, target| policy.to_scaled(target, base))
}
