//! Logging Module
//!
//! Sets up `tracing` for the embedding host:
//! - a human-readable stdout layer (or JSON lines when configured)
//! - an optional JSON file layer with daily rotation
//! - `log` crate records forwarded into `tracing`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const LOG_FILE_NAME: &str = "placement-partner-ui.log";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines on stdout instead of pretty output
    pub json: bool,
    /// Also write JSON logs here, rotated daily
    pub log_dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

impl LogConfig {
    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }
}

/// Initialize the logging system.
///
/// Returns the file writer's `WorkerGuard` when a log directory is
/// configured; keep it alive so buffered lines are flushed on shutdown.
pub fn init(config: &LogConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match config.log_dir.as_ref().and_then(|dir| prepare_dir(dir)) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .json()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_filter(config.filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stdout_layer = if config.json {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .json()
            .with_filter(config.filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_filter(config.filter())
            .boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(file_layer)
        .with(stdout_layer)
        .try_init();

    if let Err(e) = installed {
        eprintln!("Logging already initialized: {}", e);
        return guard;
    }

    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    tracing::info!(
        version = crate::VERSION,
        file = config.log_dir.is_some(),
        "logging initialized"
    );
    guard
}

fn prepare_dir(dir: &Path) -> Option<PathBuf> {
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Failed to create logs directory {}: {}", dir.display(), e);
            return None;
        }
    }
    Some(dir.to_path_buf())
}

/// Route `tracing` output through the test harness. Safe to call from
/// every test.
pub fn init_for_tests() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
    });
}
