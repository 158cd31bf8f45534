//! Service control commands and their exit-code contract.
//!
//! | Command   | Running          | Stopped | anything else |
//! |-----------|------------------|---------|---------------|
//! | uninstall | stop + uninstall | uninstall | 1           |
//! | start     | no-op, 0         | start   | 1             |
//! | stop      | stop             | no-op, 0 | 1            |
//! | restart   | restart          | start   | 1             |
//! | status    | 0                | 2       | 3 (unknown / not installed), 4 (unexpected), 1 (query failed) |
//!
//! A failing OS-level call always exits 1.

use std::process::ExitCode;

use crate::service::{ServiceError, ServiceManager, ServiceStatus};
use crate::APP_DISPLAY_NAME;

/// Fragments that identify "not installed" in a status query error.
const NOT_INSTALLED_MARKERS: &[&str] = &[
    "not installed",
    "not-found",
    "could not be found",
    "does not exist",
];

/// Process exit codes of the service commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlExit {
    Success = 0,
    Failure = 1,
    /// Also clap's exit code for a flag parse error.
    Stopped = 2,
    Unknown = 3,
    Unexpected = 4,
}

impl ControlExit {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<ControlExit> for ExitCode {
    fn from(exit: ControlExit) -> Self {
        ExitCode::from(exit.code())
    }
}

/// Result of one control command: the exit code and a single line for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub exit: ControlExit,
    pub message: String,
}

impl CommandOutcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            exit: ControlExit::Success,
            message: message.into(),
        }
    }

    fn failure(exit: ControlExit, message: impl Into<String>) -> Self {
        Self {
            exit,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.exit == ControlExit::Success
    }
}

/// True when a status query error means the service is simply not registered.
pub fn is_not_installed(err: &ServiceError) -> bool {
    let text = err.to_string().to_lowercase();
    NOT_INSTALLED_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Maps service commands onto a [`ServiceManager`].
pub struct ServiceController<M> {
    manager: M,
}

impl<M: ServiceManager> ServiceController<M> {
    pub fn new(manager: M) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Current status, with not-installed errors folded into a status value.
    fn query(&self) -> Result<ServiceStatus, ServiceError> {
        match self.manager.status() {
            Err(e) if is_not_installed(&e) => Ok(ServiceStatus::NotInstalled),
            other => other,
        }
    }

    /// Query for a command that needs a precondition; failures exit 1.
    fn precondition(&self) -> Result<ServiceStatus, CommandOutcome> {
        self.query().map_err(|e| {
            CommandOutcome::failure(
                ControlExit::Failure,
                format!("Failed to fetch the {} service status: {}", APP_DISPLAY_NAME, e),
            )
        })
    }

    pub fn install(&self) -> CommandOutcome {
        match self.manager.install() {
            Ok(()) => CommandOutcome::success(format!(
                "{} installed as a system service",
                APP_DISPLAY_NAME
            )),
            Err(e) => action_failed("install", e),
        }
    }

    pub fn uninstall(&self) -> CommandOutcome {
        let status = match self.precondition() {
            Ok(status) => status,
            Err(outcome) => return outcome,
        };

        match status {
            ServiceStatus::Running => {
                if let Err(e) = self.manager.stop() {
                    return action_failed("stop", e);
                }
            }
            ServiceStatus::Stopped => {}
            other => {
                return CommandOutcome::failure(
                    ControlExit::Failure,
                    format!(
                        "{} service is neither running nor stopped ({})",
                        APP_DISPLAY_NAME, other
                    ),
                )
            }
        }

        match self.manager.uninstall() {
            Ok(()) => CommandOutcome::success(format!("{} service uninstalled", APP_DISPLAY_NAME)),
            Err(e) => action_failed("uninstall", e),
        }
    }

    pub fn start(&self) -> CommandOutcome {
        match self.precondition() {
            Ok(ServiceStatus::Running) => {
                CommandOutcome::success(format!("{} service is already running", APP_DISPLAY_NAME))
            }
            Ok(ServiceStatus::Stopped) => match self.manager.start() {
                Ok(()) => CommandOutcome::success(format!("{} service started", APP_DISPLAY_NAME)),
                Err(e) => action_failed("start", e),
            },
            Ok(other) => cannot("start", other),
            Err(outcome) => outcome,
        }
    }

    pub fn stop(&self) -> CommandOutcome {
        match self.precondition() {
            Ok(ServiceStatus::Running) => match self.manager.stop() {
                Ok(()) => CommandOutcome::success(format!("{} service stopped", APP_DISPLAY_NAME)),
                Err(e) => action_failed("stop", e),
            },
            Ok(ServiceStatus::Stopped) => {
                CommandOutcome::success(format!("{} service is already stopped", APP_DISPLAY_NAME))
            }
            Ok(other) => cannot("stop", other),
            Err(outcome) => outcome,
        }
    }

    pub fn restart(&self) -> CommandOutcome {
        match self.precondition() {
            Ok(ServiceStatus::Running) => match self.manager.restart() {
                Ok(()) => CommandOutcome::success(format!("{} service restarted", APP_DISPLAY_NAME)),
                Err(e) => action_failed("restart", e),
            },
            Ok(ServiceStatus::Stopped) => match self.manager.start() {
                Ok(()) => CommandOutcome::success(format!("{} service started", APP_DISPLAY_NAME)),
                Err(e) => action_failed("start", e),
            },
            Ok(other) => cannot("restart", other),
            Err(outcome) => outcome,
        }
    }

    pub fn status(&self) -> CommandOutcome {
        match self.query() {
            Ok(ServiceStatus::Running) => {
                CommandOutcome::success(format!("{} service is running", APP_DISPLAY_NAME))
            }
            Ok(ServiceStatus::Stopped) => CommandOutcome::failure(
                ControlExit::Stopped,
                format!("{} service is stopped", APP_DISPLAY_NAME),
            ),
            Ok(ServiceStatus::Unknown) => CommandOutcome::failure(
                ControlExit::Unknown,
                format!("{} service status is unknown", APP_DISPLAY_NAME),
            ),
            Ok(ServiceStatus::NotInstalled) => CommandOutcome::failure(
                ControlExit::Unknown,
                format!("{} service is not installed", APP_DISPLAY_NAME),
            ),
            Ok(ServiceStatus::Unexpected) => CommandOutcome::failure(
                ControlExit::Unexpected,
                format!("{} service reported an unexpected status", APP_DISPLAY_NAME),
            ),
            Err(e) => CommandOutcome::failure(
                ControlExit::Failure,
                format!("Failed to fetch the {} service status: {}", APP_DISPLAY_NAME, e),
            ),
        }
    }
}

fn action_failed(verb: &str, err: ServiceError) -> CommandOutcome {
    tracing::debug!(error = ?err, verb, "Service action failed");
    CommandOutcome::failure(
        ControlExit::Failure,
        format!("Failed to {} the {} service: {}", verb, APP_DISPLAY_NAME, err),
    )
}

fn cannot(verb: &str, status: ServiceStatus) -> CommandOutcome {
    CommandOutcome::failure(
        ControlExit::Failure,
        format!(
            "Cannot {} the {} service while it is {}",
            verb, APP_DISPLAY_NAME, status
        ),
    )
}
