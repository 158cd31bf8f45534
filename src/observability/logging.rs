//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the logging sink for a run
//! - Human-readable console output for interactive runs
//! - JSON file output under `<app root>/logs` for every run
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - The resolved log level is the default filter; `RUST_LOG` directives refine it
//! - A second initialisation in the same process keeps the first subscriber

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogLevel;
use crate::error::Cause;

/// Filename prefix of the rolling JSON log.
pub const LOG_FILE_NAME: &str = "viewr.log.json";

/// Error type for logging initialisation.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to create log directory {}{cause}", .path.display())]
    LogDir { path: PathBuf, cause: Cause },
}

/// Keeps the background file writer alive. Flushes on drop.
#[derive(Debug)]
pub struct LogSink {
    _file_guard: Option<WorkerGuard>,
    installed: bool,
}

impl LogSink {
    /// Whether this call installed the global subscriber.
    pub fn installed(&self) -> bool {
        self.installed
    }
}

/// Initialize the logging sink.
///
/// `log_dir` of `None` disables the file output.
pub fn init(
    level: LogLevel,
    emit_to_console: bool,
    log_dir: Option<&Path>,
) -> Result<LogSink, LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.into()).into())
        .from_env_lossy();

    let (file_layer, file_guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| LoggingError::LogDir {
                path: dir.to_path_buf(),
                cause: Cause::from_err(e),
            })?;
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let console_layer = emit_to_console.then(tracing_subscriber::fmt::layer);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if !installed {
        tracing::debug!("Logging already initialised, keeping existing subscriber");
    }

    Ok(LogSink {
        _file_guard: file_guard,
        installed,
    })
}
