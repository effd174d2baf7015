//! Single-assignment future
//!
//! A [`PledgeFuture`] starts pending and is completed exactly once, either with a
//! value or with a [`Failure`]. Any number of observers can block on it
//! (see `wait.rs`) or attach combinators that derive new futures (see
//! `combinators.rs`).
//!
//! # State Machine
//! - Pending → Succeeded (first `complete`)
//! - Pending → Failed (first `fail`)
//! - Once Succeeded or Failed, state is final; later completions are ignored
//!
//! # Lock discipline
//! The internal lock guards the stored outcome and the pending callback list
//! and nothing else. Completion drains the callback list and records the outcome
//! in one critical section, releases the lock, and only then runs the drained
//! callbacks. No user code ever runs while the lock is held.

mod combinators;
mod wait;

use crate::failure::{CallbackPanic, Failure};
use parking_lot::{Condvar, Mutex};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of a completed future
pub type Outcome<T> = Result<T, Failure>;

type Callback<T> = Box<dyn FnOnce(&Outcome<T>) + Send + 'static>;

/// Snapshot of a future's state
#[derive(Clone)]
pub enum FutureState<T> {
    /// Not completed yet
    Pending,
    /// Completed with a value
    Succeeded(T),
    /// Completed with a failure
    Failed(Failure),
}

impl<T> fmt::Debug for FutureState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FutureState::Pending => write!(f, "Pending"),
            FutureState::Succeeded(_) => write!(f, "Succeeded"),
            FutureState::Failed(failure) => write!(f, "Failed({})", failure),
        }
    }
}

struct Slot<T> {
    outcome: Option<Arc<Outcome<T>>>,
    callbacks: Vec<Callback<T>>,
}

struct Core<T> {
    slot: Mutex<Slot<T>>,
    settled: Condvar,
}

/// Handle to a single-assignment future
///
/// Cloning the handle shares the same future; combinators create new ones.
pub struct PledgeFuture<T> {
    core: Arc<Core<T>>,
}

impl<T> PledgeFuture<T> {
    /// Create a new pending future
    pub fn new() -> Self {
        Self::with_slot(Slot {
            outcome: None,
            callbacks: Vec::new(),
        })
    }

    /// Create an already succeeded future
    pub fn completed(value: T) -> Self {
        Self::settled(Ok(value))
    }

    /// Create an already failed future
    pub fn failed(failure: Failure) -> Self {
        Self::settled(Err(failure))
    }

    fn settled(outcome: Outcome<T>) -> Self {
        Self::with_slot(Slot {
            outcome: Some(Arc::new(outcome)),
            callbacks: Vec::new(),
        })
    }

    fn with_slot(slot: Slot<T>) -> Self {
        Self {
            core: Arc::new(Core {
                slot: Mutex::new(slot),
                settled: Condvar::new(),
            }),
        }
    }

    /// Complete with a value. Returns false (and changes nothing) if already completed.
    pub fn complete(&self, value: T) -> bool {
        self.complete_with(Ok(value))
    }

    /// Complete with a failure. Returns false (and changes nothing) if already completed.
    pub fn fail(&self, failure: Failure) -> bool {
        self.complete_with(Err(failure))
    }

    /// Complete with an outcome. Only the first completion wins.
    pub fn complete_with(&self, outcome: Outcome<T>) -> bool {
        let (outcome, callbacks) = {
            let mut slot = self.core.slot.lock();
            if slot.outcome.is_some() {
                debug!("ignoring completion of an already completed future");
                return false;
            }
            let outcome = Arc::new(outcome);
            slot.outcome = Some(Arc::clone(&outcome));
            let callbacks = std::mem::take(&mut slot.callbacks);
            self.core.settled.notify_all();
            (outcome, callbacks)
        };

        trace!(
            succeeded = outcome.is_ok(),
            callbacks = callbacks.len(),
            "future completed"
        );
        // One callback unwinding must not cost the rest their notification
        for callback in callbacks {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(&outcome))) {
                let panic = CallbackPanic::from_payload(payload.as_ref());
                warn!(error = %panic, "completion callback panicked");
            }
        }
        true
    }

    /// True once the future has succeeded or failed
    pub fn is_done(&self) -> bool {
        self.core.slot.lock().outcome.is_some()
    }

    /// Always false: cancellation is not supported
    pub fn is_cancelled(&self) -> bool {
        false
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self.snapshot().as_deref(), Some(Ok(_)))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.snapshot().as_deref(), Some(Err(_)))
    }

    /// Get the current state (cloned)
    pub fn state(&self) -> FutureState<T>
    where
        T: Clone,
    {
        match self.snapshot().as_deref() {
            None => FutureState::Pending,
            Some(Ok(value)) => FutureState::Succeeded(value.clone()),
            Some(Err(failure)) => FutureState::Failed(failure.clone()),
        }
    }

    fn snapshot(&self) -> Option<Arc<Outcome<T>>> {
        self.core.slot.lock().outcome.clone()
    }

    /// Run `callback` once the future completes.
    ///
    /// If it has already completed, the callback runs right away on this thread.
    /// Otherwise it runs on the completing thread, after the lock is released.
    pub(crate) fn when_settled<F>(&self, callback: F)
    where
        F: FnOnce(&Outcome<T>) + Send + 'static,
    {
        let ready = {
            let mut slot = self.core.slot.lock();
            match slot.outcome.clone() {
                Some(outcome) => outcome,
                None => {
                    slot.callbacks.push(Box::new(callback));
                    return;
                }
            }
        };
        callback(&ready);
    }
}

impl<T> Clone for PledgeFuture<T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<T> Default for PledgeFuture<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for PledgeFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.snapshot().as_deref() {
            None => write!(f, "PledgeFuture(pending)"),
            Some(Ok(_)) => write!(f, "PledgeFuture(succeeded)"),
            Some(Err(failure)) => write!(f, "PledgeFuture(failed: {})", failure),
        }
    }
}
