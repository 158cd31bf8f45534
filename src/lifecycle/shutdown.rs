//! Shutdown coordination for the server.

use std::io;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

/// Time allowed for in-flight requests once shutdown starts.
pub const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Why the controlling task stopped waiting.
#[derive(Debug)]
pub enum Exit {
    /// The external token was cancelled.
    Cancelled,
    /// The serving task reported a failure first.
    Failed(io::Error),
}

/// Error type for the graceful drain.
#[derive(Debug, thiserror::Error)]
pub enum ShutdownError {
    #[error("graceful shutdown did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("serving task failed during shutdown: {0}")]
    Task(#[from] JoinError),
}

/// Wait until `cancel` fires or the serving task reports a failure.
///
/// A serving task that goes away without reporting is treated as a failure.
pub async fn wait_for_exit(
    cancel: &CancellationToken,
    failures: oneshot::Receiver<io::Error>,
) -> Exit {
    tokio::select! {
        _ = cancel.cancelled() => Exit::Cancelled,
        reported = failures => match reported {
            Ok(err) => Exit::Failed(err),
            Err(_) => Exit::Failed(io::Error::other("server stopped unexpectedly")),
        },
    }
}

/// Wait up to `timeout` for the serving task to finish, aborting it otherwise.
pub async fn await_drain(serving: JoinHandle<()>, timeout: Duration) -> Result<(), ShutdownError> {
    let abort = serving.abort_handle();
    match tokio::time::timeout(timeout, serving).await {
        Ok(joined) => joined.map_err(ShutdownError::from),
        Err(_) => {
            abort.abort();
            Err(ShutdownError::TimedOut(timeout))
        }
    }
}
