//! Errors surfaced by retrieving a future's outcome

use crate::failure::Failure;
use std::time::Duration;
use thiserror::Error;

/// Error returned by blocking and async retrieval
#[derive(Debug, Clone, Error)]
pub enum WaitError {
    /// The future failed; the stored failure is the cause
    #[error("execution failed: {0}")]
    Execution(#[source] Failure),

    /// The deadline passed while the future was still pending
    #[error("timed out after {0:?} waiting for completion")]
    Timeout(Duration),

    /// Every handle to a pending future was dropped while an async waiter was registered
    #[error("future dropped before completion")]
    Disconnected,
}

impl WaitError {
    /// The stored failure, for `Execution` errors
    pub fn cause(&self) -> Option<&Failure> {
        match self {
            WaitError::Execution(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, WaitError::Timeout(_))
    }
}
