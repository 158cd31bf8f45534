//! Runs the HTTP listener to completion under a cancellation token.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

use crate::config::{check_bindable, AppConfig, BindError};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::{self, Exit, SHUTDOWN_TIMEOUT};
use crate::observability::banner;
use crate::observability::logging::{self, LoggingError};
use crate::{APP_DESCRIPTION, APP_DISPLAY_NAME, APP_NAME};

/// Error type for a run.
///
/// Only failures before serving starts, or while serving, end up here. A slow
/// shutdown is logged and the run still succeeds.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("unable to bind to {target}: {source}")]
    Unbindable {
        target: String,
        #[source]
        source: BindError,
    },

    #[error("error initializing logger: {0}")]
    Logging(#[from] LoggingError),

    #[error("failed to listen on {target}: {source}")]
    Listen {
        target: String,
        #[source]
        source: io::Error,
    },

    #[error("server encountered an error: {0}")]
    Serve(#[source] io::Error),
}

/// Runs the server for one resolved configuration.
pub struct LifecycleRunner {
    config: Arc<AppConfig>,
    provenance: String,
    emit_to_console: bool,
    log_dir: Option<PathBuf>,
    shutdown_timeout: Duration,
}

impl LifecycleRunner {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            provenance: String::from("defaults"),
            emit_to_console: false,
            log_dir: None,
            shutdown_timeout: SHUTDOWN_TIMEOUT,
        }
    }

    /// Describe where the configuration came from, for the startup log.
    pub fn provenance(mut self, provenance: impl Into<String>) -> Self {
        self.provenance = provenance.into();
        self
    }

    /// Also log to the console and print the banner (interactive runs).
    pub fn emit_to_console(mut self, emit: bool) -> Self {
        self.emit_to_console = emit;
        self
    }

    /// Directory for the JSON log file. `None` disables file output.
    pub fn log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir = dir;
        self
    }

    /// Drain window for tests; runs always use [`SHUTDOWN_TIMEOUT`].
    #[cfg(test)]
    pub(crate) fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Serve until `cancel` fires or the listener fails.
    ///
    /// The address is probed before anything else. The real bind happens later
    /// and can still fail on its own (another process may grab the port in
    /// between); both failures are reported separately.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), RunError> {
        let started = Instant::now();
        let server = &self.config.server;
        let target = server.bind_target();

        check_bindable(&server.address, i64::from(server.port)).map_err(|source| {
            RunError::Unbindable {
                target: target.clone(),
                source,
            }
        })?;

        let _sink = logging::init(server.log_level, self.emit_to_console, self.log_dir.as_deref())?;

        if self.emit_to_console {
            println!("{}", banner::render(APP_DESCRIPTION));
        }

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            "Initializing {}",
            APP_DISPLAY_NAME
        );
        tracing::info!(
            provenance = %self.provenance,
            log_level = %server.log_level,
            paths = self.config.paths.len(),
            "Configuration loaded"
        );

        let listener = TcpListener::bind((server.address.as_str(), server.port))
            .await
            .map_err(|source| RunError::Listen {
                target: target.clone(),
                source,
            })?;

        let http = HttpServer::new(Arc::clone(&self.config));
        let drain = CancellationToken::new();
        let (failure_tx, failure_rx) = oneshot::channel();

        let serving = tokio::spawn({
            let drain = drain.clone();
            async move {
                if let Err(e) = http.serve(listener, drain).await {
                    let _ = failure_tx.send(e);
                }
            }
        });

        tracing::info!(address = %target, "Server is running");

        match shutdown::wait_for_exit(&cancel, failure_rx).await {
            Exit::Cancelled => tracing::warn!("Initiating server shutdown"),
            Exit::Failed(e) => {
                tracing::error!(error = %e, "Server encountered an error");
                return Err(RunError::Serve(e));
            }
        }

        drain.cancel();
        if let Err(e) = shutdown::await_drain(serving, self.shutdown_timeout).await {
            tracing::error!(error = %e, "Error during shutdown");
        }

        tracing::info!(uptime = ?started.elapsed(), "{} server shut down", APP_NAME);
        Ok(())
    }
}
