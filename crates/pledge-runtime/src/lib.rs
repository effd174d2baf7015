//! Pledge Runtime - single-assignment futures for threaded code
//!
//! This library provides:
//! - [`PledgeFuture`], a result cell completed exactly once with a value or a failure
//! - Blocking retrieval with optional timeouts
//! - Combinators (`map`, `flat_map`, `on_complete`, `handle`) that derive new futures
//! - [`Completer`], the producer half, and the [`ResultReporter`] contract
//! - A bridge to and from tokio-driven async code
//!
//! Callbacks run synchronously on whichever thread completes a future, or
//! inline if they are attached after completion. They never run while a
//! future's internal lock is held.

/// Pledge runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bridge;
pub mod completer;
pub mod error;
pub mod failure;
pub mod future;
pub mod logging;
pub mod settings;

pub use bridge::spawn_on;
pub use completer::{complete_batch, BatchError, Completer, ResultReporter};
pub use error::WaitError;
pub use failure::{Abandoned, CallbackPanic, Failure};
pub use future::{FutureState, Outcome, PledgeFuture};
pub use settings::RuntimeSettings;
