//! Logging setup for phonosync.
//!
//! The core emits `tracing` events (`debug!` for alignment decisions,
//! `trace!` for per-candidate scoring). Binaries install a subscriber once
//! at startup with one of the functions here.
//!
//! # Example
//!
//! ```no_run
//! use phonosync_core::logging::{init_tracing_with_file, LogLevel};
//!
//! let _guard = init_tracing_with_file(LogLevel::Info, ".logs").unwrap();
//! tracing::info!("started");
//! ```

mod types;

pub use types::{LogLevel, ParseLogLevelError};

use std::io;
use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Prefix of the rolling log file names.
const LOG_FILE_PREFIX: &str = "phonosync";

/// Errors from subscriber setup.
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to create log directory: {0}")]
    CreateDir(#[from] io::Error),

    #[error("Failed to open log file: {0}")]
    Appender(#[from] InitError),

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(env_filter(default_level))
        .init();
}

/// Like [`init_tracing`], and also write to a daily rolling file in `log_dir`.
///
/// Keep the returned guard alive until exit; dropping it flushes the file.
pub fn init_tracing_with_file(
    default_level: LogLevel,
    log_dir: impl AsRef<Path>,
) -> Result<WorkerGuard, LoggingError> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(log_dir)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(true))
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(env_filter(default_level))
        .try_init()
        .map_err(|_| LoggingError::AlreadyInitialized)?;

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_can_be_installed_twice() {
        init_test_tracing();
        init_test_tracing();
        tracing::warn!("still fine");
    }

    #[test]
    fn file_logging_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("nested").join("logs");

        // Another test may already own the global subscriber; either way the
        // directory must exist afterwards.
        match init_tracing_with_file(LogLevel::Debug, &log_dir) {
            Ok(_guard) => {}
            Err(LoggingError::AlreadyInitialized) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
        assert!(log_dir.is_dir());
    }
}
