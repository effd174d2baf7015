//! Blocking retrieval

use super::{Outcome, PledgeFuture};
use crate::error::WaitError;
use crate::settings;
use std::sync::Arc;
use std::time::{Duration, Instant};

impl<T: Clone> PledgeFuture<T> {
    /// Block until the future completes.
    ///
    /// A failed future yields [`WaitError::Execution`] carrying the stored failure.
    pub fn get(&self) -> Result<T, WaitError> {
        unpack(&self.block())
    }

    /// Block until the future completes or `timeout` elapses.
    ///
    /// A timeout leaves the future untouched; a later `get` can still succeed.
    pub fn get_timeout(&self, timeout: Duration) -> Result<T, WaitError> {
        // A deadline too far out to represent is the same as no deadline
        let deadline = Instant::now().checked_add(timeout);
        match self.block_until(deadline) {
            Some(outcome) => unpack(&outcome),
            None => Err(WaitError::Timeout(timeout)),
        }
    }

    /// `get`, bounded by the configured default timeout when one is set
    pub fn wait(&self) -> Result<T, WaitError> {
        match settings::current().default_timeout {
            Some(timeout) => self.get_timeout(timeout),
            None => self.get(),
        }
    }
}

impl<T> PledgeFuture<T> {
    /// Park until the outcome is recorded.
    ///
    /// Returns the shared outcome so the caller can clone out of it after the
    /// lock is released.
    fn block(&self) -> Arc<Outcome<T>> {
        let mut slot = self.core.slot.lock();
        loop {
            if let Some(outcome) = &slot.outcome {
                return Arc::clone(outcome);
            }
            self.core.settled.wait(&mut slot);
        }
    }

    /// Like `block`, giving up at `deadline`. `None` means no deadline.
    fn block_until(&self, deadline: Option<Instant>) -> Option<Arc<Outcome<T>>> {
        let Some(deadline) = deadline else {
            return Some(self.block());
        };
        let mut slot = self.core.slot.lock();
        loop {
            if let Some(outcome) = &slot.outcome {
                return Some(Arc::clone(outcome));
            }
            if self.core.settled.wait_until(&mut slot, deadline).timed_out() {
                return slot.outcome.clone();
            }
        }
    }
}

fn unpack<T: Clone>(outcome: &Outcome<T>) -> Result<T, WaitError> {
    match outcome {
        Ok(value) => Ok(value.clone()),
        Err(failure) => Err(WaitError::Execution(failure.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::Failure;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_get_success() {
        let f = PledgeFuture::new();
        f.complete(42);
        assert_eq!(f.get().unwrap(), 42);
        assert_eq!(f.get_timeout(Duration::from_millis(1)).unwrap(), 42);
    }

    #[test]
    fn test_get_failure_wraps_cause() {
        let failure = Failure::msg("oh no");
        let f = PledgeFuture::<i32>::new();
        f.fail(failure.clone());

        let err = f.get().unwrap_err();
        assert!(matches!(err, WaitError::Execution(_)));
        assert!(err.cause().unwrap().ptr_eq(&failure));
    }

    #[test]
    fn test_timeout_then_success() {
        let f = PledgeFuture::new();
        let err = f.get_timeout(Duration::from_millis(1)).unwrap_err();
        assert!(err.is_timeout());
        assert!(!f.is_done());

        f.complete(7);
        assert_eq!(f.get().unwrap(), 7);
    }

    #[test]
    fn test_huge_timeout_still_returns_value() {
        let f = PledgeFuture::completed("ok");
        assert_eq!(f.get_timeout(Duration::MAX).unwrap(), "ok");
    }

    #[test]
    fn test_get_wakes_on_cross_thread_completion() {
        let f = PledgeFuture::new();
        let (started_tx, started_rx) = mpsc::channel();

        let producer = {
            let f = f.clone();
            thread::spawn(move || {
                started_rx.recv().unwrap();
                f.complete(42)
            })
        };

        started_tx.send(()).unwrap();
        assert_eq!(f.get().unwrap(), 42);
        assert!(producer.join().unwrap());
    }

    #[test]
    fn test_wait_without_configured_timeout_behaves_like_get() {
        let f = PledgeFuture::completed(3);
        assert_eq!(f.wait().unwrap(), 3);
    }
}
