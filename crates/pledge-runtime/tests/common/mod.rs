#![allow(dead_code)]
//! Shared test utilities
//!
//! Import with:
//! ```ignore
//! mod common;
//! use common::*;
//! ```

use pledge_runtime::{Failure, WaitError};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, Once};
use std::thread;
use std::time::Duration;
use thiserror::Error;

static INIT_LOGGING: Once = Once::new();

/// Upper bound for anything a test waits on across threads
pub const JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Initialize test logging at trace level. Safe to call multiple times.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_thread_ids(true)
            .with_ansi(false)
            .try_init();
    });
}

/// Distinguishable error for identity checks
#[derive(Debug, Error)]
#[error("test error: {0}")]
pub struct TestError(pub &'static str);

pub fn failure(label: &'static str) -> Failure {
    Failure::new(TestError(label))
}

/// Counts invocations of a callback, guarded by its own lock
#[derive(Clone, Default)]
pub struct CallCounter {
    calls: Arc<Mutex<usize>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&self) {
        *self.calls.lock().unwrap() += 1;
    }

    pub fn get(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

/// Counts how often an observer saw success and failure
#[derive(Clone, Default)]
pub struct OutcomeCounter {
    inner: Arc<Mutex<(usize, usize)>>,
}

impl OutcomeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<T>(&self, outcome: Result<&T, &Failure>) {
        let mut counts = self.inner.lock().unwrap();
        match outcome {
            Ok(_) => counts.0 += 1,
            Err(_) => counts.1 += 1,
        }
    }

    pub fn calls(&self) -> usize {
        let counts = self.inner.lock().unwrap();
        counts.0 + counts.1
    }

    pub fn successes(&self) -> usize {
        self.inner.lock().unwrap().0
    }

    pub fn failures(&self) -> usize {
        self.inner.lock().unwrap().1
    }
}

/// Assert that a wait failed with exactly `expected` as its cause
pub fn assert_caused_by(err: WaitError, expected: &Failure) {
    match err.cause() {
        Some(cause) => assert!(
            cause.ptr_eq(expected),
            "expected cause {:?}, got {:?}",
            expected,
            cause
        ),
        None => panic!("Expected execution failure, got {:?}", err),
    }
}

/// Spawn a named thread that reports completion on `done`
pub fn spawn_reporting<F>(name: &str, done: mpsc::Sender<String>, f: F) -> thread::JoinHandle<()>
where
    F: FnOnce() + Send + 'static,
{
    let name = name.to_string();
    thread::Builder::new()
        .name(name.clone())
        .spawn(move || {
            f();
            let _ = done.send(name);
        })
        .unwrap()
}

/// Wait until `count` threads reported on `done`, or fail the test
pub fn expect_finished(done: &mpsc::Receiver<String>, count: usize) {
    for _ in 0..count {
        if done.recv_timeout(JOIN_TIMEOUT).is_err() {
            panic!("thread did not finish within {:?} (deadlock?)", JOIN_TIMEOUT);
        }
    }
}

/// A value whose `Clone` impl panics
#[derive(Debug)]
pub struct Volatile;

impl Clone for Volatile {
    fn clone(&self) -> Self {
        panic!("volatile value cloned")
    }
}
