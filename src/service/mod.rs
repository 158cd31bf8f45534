//! OS service subsystem.
//!
//! # Data Flow
//! ```text
//! `viewr service <command>`
//!     → controller.rs (query status, check precondition, act, map exit code)
//!     → ServiceManager (capability interface)
//!         → systemd.rs on Linux
//!         → UnsupportedManager elsewhere
//!
//! Installed unit runs `viewr serve`, which resolves configuration and hands it
//! to the same lifecycle runner as an interactive run.
//! ```
//!
//! # Design Decisions
//! - Status is queried fresh for every command, never cached
//! - Query and action are two separate calls; a change made by someone else in
//!   between is not guarded against
//! - Exit codes are part of the external contract (see [`ControlExit`])

use std::fmt;

use crate::error::Cause;

pub mod controller;
pub mod systemd;

pub use controller::{CommandOutcome, ControlExit, ServiceController};
pub use systemd::{ServiceDefinition, SystemdManager, UnsupportedManager};

/// Service manager for the current platform.
#[cfg(target_os = "linux")]
pub type PlatformManager = SystemdManager;

/// Service manager for the current platform.
#[cfg(not(target_os = "linux"))]
pub type PlatformManager = UnsupportedManager;

/// Run state reported by the OS service subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Running,
    Stopped,
    Unknown,
    NotInstalled,
    Unexpected,
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceStatus::Running => "running",
            ServiceStatus::Stopped => "stopped",
            ServiceStatus::Unknown => "unknown",
            ServiceStatus::NotInstalled => "not installed",
            ServiceStatus::Unexpected => "unexpected",
        })
    }
}

/// Operation attempted against the OS service subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    Install,
    Uninstall,
    Start,
    Stop,
    Restart,
    Status,
}

impl fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ServiceAction::Install => "install",
            ServiceAction::Uninstall => "uninstall",
            ServiceAction::Start => "start",
            ServiceAction::Stop => "stop",
            ServiceAction::Restart => "restart",
            ServiceAction::Status => "query the status of",
        })
    }
}

/// Error type for OS service calls.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("the service is not installed")]
    NotInstalled,

    #[error("the service is already installed")]
    AlreadyInstalled,

    #[error("failed to {action} the service{cause}")]
    Operation { action: ServiceAction, cause: Cause },

    #[error("service management is not supported on this platform")]
    Unsupported,
}

impl ServiceError {
    pub(crate) fn operation(action: ServiceAction, cause: impl fmt::Display) -> Self {
        ServiceError::Operation {
            action,
            cause: Cause::from_err(cause),
        }
    }
}

/// Capability interface over the platform's service manager.
pub trait ServiceManager {
    fn status(&self) -> Result<ServiceStatus, ServiceError>;
    fn install(&self) -> Result<(), ServiceError>;
    fn uninstall(&self) -> Result<(), ServiceError>;
    fn start(&self) -> Result<(), ServiceError>;
    fn stop(&self) -> Result<(), ServiceError>;
    fn restart(&self) -> Result<(), ServiceError>;
}
