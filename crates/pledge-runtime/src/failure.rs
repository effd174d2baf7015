//! Failure values carried by futures
//!
//! A [`Failure`] is opaque to the runtime: it is stored once and handed back to
//! every observer unchanged. Cloning shares the same allocation, so identity can
//! be checked with [`Failure::ptr_eq`].

use std::any::Any;
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;

/// Shared, identity-preserving error value
#[derive(Clone)]
pub struct Failure(Arc<dyn Error + Send + Sync + 'static>);

impl Failure {
    /// Wrap an error
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Build a failure from a plain message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// True if both values are the same stored failure
    pub fn ptr_eq(&self, other: &Failure) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Borrow the wrapped error as a concrete type
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    /// True if the wrapped error is of type `E`
    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.0.is::<E>()
    }

    /// Borrow the wrapped error
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.0, f)
    }
}

impl Error for Failure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

impl From<Box<dyn Error + Send + Sync + 'static>> for Failure {
    fn from(error: Box<dyn Error + Send + Sync + 'static>) -> Self {
        Self(Arc::from(error))
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct MessageError(String);

/// A panic raised by user code and contained by the runtime
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("callback panicked: {message}")]
pub struct CallbackPanic {
    message: String,
}

impl CallbackPanic {
    /// Extract a readable message from a panic payload
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        Self { message }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Run user code, turning a panic into a [`CallbackPanic`] failure.
///
/// This covers `Clone` impls as well as callbacks: anything generic over `T`
/// may panic and must not unwind into a completing thread.
pub(crate) fn catch_panic<R>(f: impl FnOnce() -> Result<R, Failure>) -> Result<R, Failure> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(Failure::new(CallbackPanic::from_payload(payload.as_ref()))))
}

/// The producer went away without reporting an outcome
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("completer dropped without reporting an outcome")]
pub struct Abandoned;
