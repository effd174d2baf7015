//! Producer side of a future
//!
//! A [`Completer`] is the write half handed to whoever computes the result. It
//! can be moved to any thread and is consumed by reporting an outcome. Dropping
//! it without reporting fails the future with [`Abandoned`], so consumers
//! blocked in `get` are released even if the producer disappears.

use crate::failure::{Abandoned, Failure};
use crate::future::{Outcome, PledgeFuture};
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Write half of a [`PledgeFuture`]
pub struct Completer<T> {
    future: PledgeFuture<T>,
    reported: bool,
}

impl<T> PledgeFuture<T> {
    /// Create a pending future together with its completer
    pub fn channel() -> (PledgeFuture<T>, Completer<T>) {
        let future = PledgeFuture::new();
        let completer = Completer::new(future.clone());
        (future, completer)
    }
}

impl<T> Completer<T> {
    /// Wrap an existing future. Other handles may still complete it first.
    pub fn new(future: PledgeFuture<T>) -> Self {
        Self {
            future,
            reported: false,
        }
    }

    /// The future this completer writes to
    pub fn future(&self) -> &PledgeFuture<T> {
        &self.future
    }

    pub fn complete(self, value: T) -> bool {
        self.report(Ok(value))
    }

    pub fn fail(self, failure: Failure) -> bool {
        self.report(Err(failure))
    }

    /// Deliver an outcome. Returns false if the future was already completed.
    pub fn report(mut self, outcome: Outcome<T>) -> bool {
        self.reported = true;
        self.future.complete_with(outcome)
    }
}

impl<T> Drop for Completer<T> {
    fn drop(&mut self) {
        if !self.reported && self.future.fail(Failure::new(Abandoned)) {
            warn!("completer dropped without reporting an outcome");
        }
    }
}

impl<T> fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Completer({:?})", self.future)
    }
}

/// Something that knows how to deliver an outcome to a completer.
///
/// Producers that finish on another thread or inside an async task hand one
/// of these back instead of completing the future directly.
pub trait ResultReporter {
    type Value;

    fn report_to(self, completer: Completer<Self::Value>);
}

impl<T> ResultReporter for Result<T, Failure> {
    type Value = T;

    fn report_to(self, completer: Completer<T>) {
        completer.report(self);
    }
}

/// Parallel inputs to [`complete_batch`] did not line up.
///
/// Nothing was reported; the inputs are handed back untouched.
#[derive(Error)]
#[error("batch length mismatch: {completer_count} completers but {outcome_count} outcomes")]
pub struct BatchError<T> {
    completer_count: usize,
    outcome_count: usize,
    completers: Vec<Completer<T>>,
    outcomes: Vec<Outcome<T>>,
}

impl<T> BatchError<T> {
    pub fn completer_count(&self) -> usize {
        self.completer_count
    }

    pub fn outcome_count(&self) -> usize {
        self.outcome_count
    }

    /// Take back the inputs
    pub fn into_parts(self) -> (Vec<Completer<T>>, Vec<Outcome<T>>) {
        (self.completers, self.outcomes)
    }
}

impl<T> fmt::Debug for BatchError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchError")
            .field("completer_count", &self.completer_count)
            .field("outcome_count", &self.outcome_count)
            .finish_non_exhaustive()
    }
}

/// Report `outcomes[i]` to `completers[i]` for every index.
///
/// The lengths are checked before anything is reported.
pub fn complete_batch<T>(
    completers: Vec<Completer<T>>,
    outcomes: Vec<Outcome<T>>,
) -> Result<(), BatchError<T>> {
    if completers.len() != outcomes.len() {
        return Err(BatchError {
            completer_count: completers.len(),
            outcome_count: outcomes.len(),
            completers,
            outcomes,
        });
    }

    for (completer, outcome) in completers.into_iter().zip(outcomes) {
        completer.report(outcome);
    }
    Ok(())
}
