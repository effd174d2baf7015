//! Bridging between `PledgeFuture` and Rust async code
//!
//! - [`spawn_on`] runs an async producer on a tokio runtime and returns the
//!   future it completes.
//! - [`PledgeFuture::outcome`] lets async code wait for a future without
//!   blocking a runtime thread.

use crate::completer::ResultReporter;
use crate::error::WaitError;
use crate::failure::{catch_panic, CallbackPanic, Failure};
use crate::future::PledgeFuture;
use futures_util::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::warn;

/// Run `task` on `handle` and complete the returned future with what it reports.
///
/// A panic inside the task fails the future with [`CallbackPanic`]. If the
/// runtime shuts down before the task finishes, the completer is dropped and
/// the future fails with `Abandoned`.
pub fn spawn_on<F, R>(handle: &Handle, task: F) -> PledgeFuture<R::Value>
where
    F: Future<Output = R> + Send + 'static,
    R: ResultReporter + Send + 'static,
    R::Value: Send + Sync + 'static,
{
    let (future, completer) = PledgeFuture::channel();
    handle.spawn(async move {
        match AssertUnwindSafe(task).catch_unwind().await {
            Ok(reporter) => reporter.report_to(completer),
            Err(payload) => {
                let panic = CallbackPanic::from_payload(payload.as_ref());
                warn!(error = %panic, "spawned producer panicked");
                completer.fail(Failure::new(panic));
            }
        }
    });
    future
}

impl<T> PledgeFuture<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Wait for the outcome asynchronously.
    ///
    /// Registration happens when this is called, not when the returned future
    /// is first polled.
    pub fn outcome(&self) -> impl Future<Output = Result<T, WaitError>> + Send + 'static {
        let (tx, rx) = oneshot::channel();
        self.when_settled(move |outcome| {
            // The receiver may already be gone; nobody is waiting then
            let _ = tx.send(catch_panic(|| outcome.clone()));
        });
        async move {
            match rx.await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(failure)) => Err(WaitError::Execution(failure)),
                Err(_) => Err(WaitError::Disconnected),
            }
        }
    }
}
