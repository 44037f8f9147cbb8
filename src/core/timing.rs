//! Debounce and throttle wrappers.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Runs the wrapped function `wait` after the most recent call; every call
/// pushes the pending run back.
pub struct Debounced<A> {
    func: Arc<dyn Fn(A) + Send + Sync>,
    wait: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debounced<A> {
    pub fn new(wait: Duration, func: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            func: Arc::new(func),
            wait,
            pending: Mutex::new(None),
        }
    }

    /// Schedule a run with `arg`, cancelling any run not yet started.
    /// Must be called inside a tokio runtime.
    pub fn call(&self, arg: A) {
        let func = Arc::clone(&self.func);
        let wait = self.wait;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            func(arg);
        });

        let previous = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn cancel(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// Runs the wrapped function at most once per `limit`; calls inside the
/// window are dropped.
pub struct Throttled<A> {
    func: Box<dyn Fn(A) + Send + Sync>,
    limit: Duration,
    last_run: Mutex<Option<Instant>>,
}

impl<A> Throttled<A> {
    pub fn new(limit: Duration, func: impl Fn(A) + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
            limit,
            last_run: Mutex::new(None),
        }
    }

    /// Returns whether the function actually ran.
    pub fn call(&self, arg: A) -> bool {
        let now = Instant::now();
        {
            let mut last_run = self.last_run.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(*last_run, Some(at) if now.duration_since(at) < self.limit) {
                return false;
            }
            *last_run = Some(now);
        }
        (self.func)(arg);
        true
    }
}

pub fn debounce<A: Send + 'static>(
    wait: Duration,
    func: impl Fn(A) + Send + Sync + 'static,
) -> Debounced<A> {
    Debounced::new(wait, func)
}

pub fn throttle<A>(limit: Duration, func: impl Fn(A) + Send + Sync + 'static) -> Throttled<A> {
    Throttled::new(limit, func)
}
