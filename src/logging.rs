//! Tracing subscriber setup.
//!
//! Logs go to stderr and, when enabled, to a daily-rolling file. The
//! returned [`LogGuard`] must be held until shutdown so buffered file output
//! is flushed.

use crate::config::LoggingConfig;
use crate::error::{Result, SyncError};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "mydns_sync=info,mydns_check=info";

/// File name prefix of the rolling log.
const LOG_FILE_PREFIX: &str = "mydns-sync.log";

/// Keeps the non-blocking file writer alive.
#[must_use = "dropping the guard stops file logging"]
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Directory the rolling log file is written to.
pub fn log_directory(config: &LoggingConfig) -> PathBuf {
    config
        .directory
        .clone()
        .unwrap_or_else(crate::app_dirs::logs_dir)
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns [`SyncError::Logging`] if the log directory cannot be created or a
/// global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    if !config.file_logging {
        tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init()
            .map_err(|e| SyncError::Logging(e.to_string()))?;
        return Ok(LogGuard { _file: None });
    }

    let dir = log_directory(config);
    std::fs::create_dir_all(&dir)
        .map_err(|e| SyncError::Logging(format!("cannot create {}: {e}", dir.display())))?;

    let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(writer);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SyncError::Logging(e.to_string()))?;

    Ok(LogGuard { _file: Some(guard) })
}
