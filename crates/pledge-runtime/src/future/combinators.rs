//! Combinators deriving new futures from a parent's outcome
//!
//! Every combinator returns a fresh downstream future and never blocks. If the
//! parent is already complete the user function runs inline before the
//! combinator returns; otherwise it runs on the thread that completes the
//! parent, after the parent's lock has been released.
//!
//! User code "throws" by returning `Err(Failure)` or by panicking. Panics are
//! caught here and become a [`CallbackPanic`](crate::CallbackPanic) failure on the downstream future;
//! they never unwind into the completing thread. Cloning a value into a
//! downstream future runs user code too and is contained the same way.

use super::{Outcome, PledgeFuture};
use crate::failure::{catch_panic, Failure};
use crate::settings;
use tracing::warn;

impl<T> PledgeFuture<T>
where
    T: Send + Sync + 'static,
{
    /// Transform the success value.
    ///
    /// A parent failure is forwarded without calling `f`.
    pub fn map<U, F>(&self, f: F) -> PledgeFuture<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(&T) -> Result<U, Failure> + Send + 'static,
    {
        let downstream = PledgeFuture::new();
        let target = downstream.clone();
        self.when_settled(move |outcome| {
            let result = match outcome {
                Ok(value) => invoke("map", || f(value)),
                Err(failure) => Err(failure.clone()),
            };
            target.complete_with(result);
        });
        downstream
    }

    /// Chain a computation that itself produces a future.
    ///
    /// The downstream future mirrors whatever the returned future eventually
    /// does. A parent failure is forwarded without calling `f`.
    pub fn flat_map<U, F>(&self, f: F) -> PledgeFuture<U>
    where
        U: Clone + Send + Sync + 'static,
        F: FnOnce(&T) -> Result<PledgeFuture<U>, Failure> + Send + 'static,
    {
        let downstream = PledgeFuture::new();
        let target = downstream.clone();
        self.when_settled(move |outcome| {
            let inner = match outcome {
                Ok(value) => invoke("flat_map", || f(value)),
                Err(failure) => Err(failure.clone()),
            };
            match inner {
                Ok(inner) => inner.when_settled(move |inner_outcome: &Outcome<U>| {
                    target.complete_with(catch_panic(|| inner_outcome.clone()));
                }),
                Err(failure) => {
                    target.fail(failure);
                }
            }
        });
        downstream
    }

    /// Observe the outcome without changing it.
    ///
    /// On parent success the downstream future succeeds with the same value,
    /// unless `observer` fails, in which case it fails with the observer's
    /// failure. On parent failure the downstream future always fails with the
    /// parent's failure; a failing observer cannot mask it.
    pub fn on_complete<F>(&self, observer: F) -> PledgeFuture<T>
    where
        T: Clone,
        F: FnOnce(Result<&T, &Failure>) -> Result<(), Failure> + Send + 'static,
    {
        let downstream = PledgeFuture::new();
        let target = downstream.clone();
        self.when_settled(move |outcome| {
            let result = match outcome {
                Ok(value) => invoke("on_complete", || {
                    observer(Ok(value))?;
                    Ok(value.clone())
                }),
                Err(failure) => {
                    // The parent's failure takes precedence over the observer's
                    let _ = invoke("on_complete", || observer(Err(failure)));
                    Err(failure.clone())
                }
            };
            target.complete_with(result);
        });
        downstream
    }

    /// Map either outcome to a new one.
    ///
    /// `f` always runs. Whatever it returns becomes the downstream outcome, so a
    /// failing handler overrides even a parent failure.
    pub fn handle<U, F>(&self, f: F) -> PledgeFuture<U>
    where
        U: Send + Sync + 'static,
        F: FnOnce(Result<&T, &Failure>) -> Result<U, Failure> + Send + 'static,
    {
        let downstream = PledgeFuture::new();
        let target = downstream.clone();
        self.when_settled(move |outcome| {
            target.complete_with(invoke("handle", || f(outcome.as_ref())));
        });
        downstream
    }
}

/// Run user code, turning a panic into a failure.
fn invoke<R>(
    combinator: &'static str,
    f: impl FnOnce() -> Result<R, Failure>,
) -> Result<R, Failure> {
    let result = catch_panic(f);
    if let Err(failure) = &result {
        if settings::current().log_callback_failures {
            warn!(combinator, error = %failure, "callback failed");
        }
    }
    result
}
