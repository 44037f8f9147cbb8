//! Page navigation seam.

use std::sync::{Arc, Mutex, PoisonError};

/// Moves the page to another location (`window.location.href = ...`).
#[cfg_attr(test, mockall::automock)]
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &str);
}

/// Keeps visited targets in memory, for headless embedders and tests.
#[derive(Debug, Clone, Default)]
pub struct HistoryNavigator {
    visited: Arc<Mutex<Vec<String>>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn current(&self) -> Option<String> {
        self.visited().last().cloned()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, target: &str) {
        tracing::info!(to = %target, "navigating");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(target.to_string());
    }
}
