//! systemd adapter for the service capability interface.
//!
//! Drives `systemctl` through `std::process::Command` and owns the unit file
//! under `/etc/systemd/system`.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::service::{ServiceAction, ServiceError, ServiceManager, ServiceStatus};
use crate::{APP_DESCRIPTION, APP_DISPLAY_NAME, APP_NAME};

/// Where system-wide units live.
pub const SYSTEM_UNIT_DIR: &str = "/etc/systemd/system";

/// What gets registered with the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub name: String,
    pub display_name: String,
    pub description: String,
    pub executable: PathBuf,
    pub arguments: Vec<String>,
}

impl ServiceDefinition {
    /// Definition for this binary, running the service-managed entry point.
    ///
    /// `config` is forwarded so the installed service reads the same document
    /// the operator pointed at during install.
    pub fn for_current_exe(config: Option<&Path>) -> io::Result<Self> {
        let executable = std::env::current_exe()?;
        let mut arguments = vec![String::from("serve")];
        if let Some(path) = config {
            arguments.push(String::from("--config"));
            arguments.push(std::path::absolute(path)?.display().to_string());
        }

        Ok(Self {
            name: APP_NAME.to_string(),
            display_name: APP_DISPLAY_NAME.to_string(),
            description: APP_DESCRIPTION.to_string(),
            executable,
            arguments,
        })
    }

    pub fn unit_name(&self) -> String {
        format!("{}.service", self.name)
    }

    /// Render the unit file.
    pub fn render_unit(&self) -> String {
        let mut exec = quote_arg(&self.executable.display().to_string());
        for arg in &self.arguments {
            exec.push(' ');
            exec.push_str(&quote_arg(arg));
        }

        format!(
            "[Unit]\n\
             Description={display}: {description}\n\
             After=network-online.target\n\
             Wants=network-online.target\n\
             \n\
             [Service]\n\
             Type=simple\n\
             ExecStart={exec}\n\
             Restart=on-failure\n\
             RestartSec=5\n\
             \n\
             [Install]\n\
             WantedBy=multi-user.target\n",
            display = self.display_name,
            description = self.description,
            exec = exec,
        )
    }
}

fn quote_arg(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\\') {
        let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{}\"", escaped)
    } else {
        arg.to_string()
    }
}

/// Map `systemctl is-active` output to a status.
pub fn parse_active_state(output: &str) -> ServiceStatus {
    match output.trim() {
        "active" => ServiceStatus::Running,
        "inactive" | "failed" => ServiceStatus::Stopped,
        "activating" | "deactivating" | "reloading" => ServiceStatus::Unknown,
        _ => ServiceStatus::Unexpected,
    }
}

/// systemd-backed service manager.
#[derive(Debug, Clone)]
pub struct SystemdManager {
    definition: ServiceDefinition,
    unit_dir: PathBuf,
    systemctl: PathBuf,
}

impl SystemdManager {
    pub fn new(definition: ServiceDefinition) -> Self {
        Self {
            definition,
            unit_dir: PathBuf::from(SYSTEM_UNIT_DIR),
            systemctl: PathBuf::from("systemctl"),
        }
    }

    /// Use a different unit directory.
    pub fn with_unit_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.unit_dir = dir.into();
        self
    }

    /// Use a different `systemctl` executable.
    pub fn with_systemctl(mut self, program: impl Into<PathBuf>) -> Self {
        self.systemctl = program.into();
        self
    }

    pub fn definition(&self) -> &ServiceDefinition {
        &self.definition
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(self.definition.unit_name())
    }

    fn systemctl(&self, action: ServiceAction, args: &[&str]) -> Result<Output, ServiceError> {
        tracing::debug!(%action, ?args, "Invoking systemctl");
        Command::new(&self.systemctl)
            .args(args)
            .output()
            .map_err(|e| ServiceError::operation(action, format!("systemctl failed to execute: {e}")))
    }

    /// Run a `systemctl` verb against the unit and require success.
    fn unit_command(&self, action: ServiceAction, verb: &str) -> Result<(), ServiceError> {
        let unit = self.definition.unit_name();
        let output = self.systemctl(action, &[verb, &unit])?;
        check_success(action, &output)
    }

    fn daemon_reload(&self, action: ServiceAction) -> Result<(), ServiceError> {
        let output = self.systemctl(action, &["daemon-reload"])?;
        check_success(action, &output)
    }

    fn require_installed(&self) -> Result<(), ServiceError> {
        if self.unit_path().is_file() {
            Ok(())
        } else {
            Err(ServiceError::NotInstalled)
        }
    }
}

fn check_success(action: ServiceAction, output: &Output) -> Result<(), ServiceError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = stderr.trim();
    let detail = if detail.is_empty() {
        output.status.to_string()
    } else {
        detail.to_string()
    };
    Err(ServiceError::operation(action, detail))
}

impl ServiceManager for SystemdManager {
    fn status(&self) -> Result<ServiceStatus, ServiceError> {
        self.require_installed()?;
        let unit = self.definition.unit_name();
        // is-active exits non-zero for anything but "active"; only stdout matters.
        let output = self.systemctl(ServiceAction::Status, &["is-active", &unit])?;
        Ok(parse_active_state(&String::from_utf8_lossy(&output.stdout)))
    }

    fn install(&self) -> Result<(), ServiceError> {
        let path = self.unit_path();
        if path.exists() {
            return Err(ServiceError::AlreadyInstalled);
        }

        std::fs::write(&path, self.definition.render_unit())
            .map_err(|e| ServiceError::operation(ServiceAction::Install, e))?;
        tracing::info!(unit = %path.display(), "Wrote service unit");

        let registered = self
            .daemon_reload(ServiceAction::Install)
            .and_then(|()| self.unit_command(ServiceAction::Install, "enable"));

        // A unit that never got registered must not block the next install.
        if let Err(e) = registered {
            match std::fs::remove_file(&path) {
                Ok(()) => tracing::info!(unit = %path.display(), "Removed unregistered service unit"),
                Err(cleanup) => tracing::warn!(
                    unit = %path.display(),
                    error = %cleanup,
                    "Failed to remove unregistered service unit"
                ),
            }
            return Err(e);
        }
        Ok(())
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        self.require_installed()?;
        self.unit_command(ServiceAction::Uninstall, "disable")?;

        let path = self.unit_path();
        std::fs::remove_file(&path)
            .map_err(|e| ServiceError::operation(ServiceAction::Uninstall, e))?;
        tracing::info!(unit = %path.display(), "Removed service unit");

        self.daemon_reload(ServiceAction::Uninstall)
    }

    fn start(&self) -> Result<(), ServiceError> {
        self.unit_command(ServiceAction::Start, "start")
    }

    fn stop(&self) -> Result<(), ServiceError> {
        self.unit_command(ServiceAction::Stop, "stop")
    }

    fn restart(&self) -> Result<(), ServiceError> {
        self.unit_command(ServiceAction::Restart, "restart")
    }
}

/// Manager for platforms without a supported service subsystem.
#[derive(Debug, Clone, Default)]
pub struct UnsupportedManager;

impl UnsupportedManager {
    pub fn new(_definition: ServiceDefinition) -> Self {
        Self
    }
}

impl ServiceManager for UnsupportedManager {
    fn status(&self) -> Result<ServiceStatus, ServiceError> {
        Err(ServiceError::Unsupported)
    }

    fn install(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Unsupported)
    }

    fn uninstall(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Unsupported)
    }

    fn start(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Unsupported)
    }

    fn stop(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Unsupported)
    }

    fn restart(&self) -> Result<(), ServiceError> {
        Err(ServiceError::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition() -> ServiceDefinition {
        ServiceDefinition {
            name: "viewr".into(),
            display_name: "Viewr".into(),
            description: "Web-based file browser".into(),
            executable: PathBuf::from("/opt/viewr tools/viewr"),
            arguments: vec!["serve".into(), "--config".into(), "/etc/viewr.yaml".into()],
        }
    }

    #[test]
    fn renders_unit_with_quoted_exec_start() {
        let unit = definition().render_unit();
        assert!(unit.contains("Description=Viewr: Web-based file browser"));
        assert!(unit.contains("ExecStart=\"/opt/viewr tools/viewr\" serve --config /etc/viewr.yaml\n"));
        assert!(unit.starts_with("[Unit]\nDescription="));
        assert!(unit.contains("\n\n[Service]\nType=simple\n"));
        assert!(unit.ends_with("\n\n[Install]\nWantedBy=multi-user.target\n"));
    }

    #[test]
    fn maps_is_active_output() {
        assert_eq!(parse_active_state("active\n"), ServiceStatus::Running);
        assert_eq!(parse_active_state("inactive\n"), ServiceStatus::Stopped);
        assert_eq!(parse_active_state("failed"), ServiceStatus::Stopped);
        assert_eq!(parse_active_state("activating"), ServiceStatus::Unknown);
        assert_eq!(parse_active_state("reloading"), ServiceStatus::Unknown);
        assert_eq!(parse_active_state("maintenance"), ServiceStatus::Unexpected);
        assert_eq!(parse_active_state(""), ServiceStatus::Unexpected);
    }

    #[test]
    fn missing_unit_reports_not_installed() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SystemdManager::new(definition()).with_unit_dir(dir.path());

        assert!(matches!(manager.status(), Err(ServiceError::NotInstalled)));
        assert!(matches!(manager.uninstall(), Err(ServiceError::NotInstalled)));
    }

    #[test]
    fn install_refuses_existing_unit() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SystemdManager::new(definition()).with_unit_dir(dir.path());
        std::fs::write(manager.unit_path(), "[Unit]\n").unwrap();

        assert!(matches!(manager.install(), Err(ServiceError::AlreadyInstalled)));
        assert_eq!(std::fs::read_to_string(manager.unit_path()).unwrap(), "[Unit]\n");
    }

    #[cfg(unix)]
    #[test]
    fn failed_registration_removes_the_unit() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SystemdManager::new(definition())
            .with_unit_dir(dir.path())
            .with_systemctl("false");

        let err = manager.install().unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Operation {
                action: ServiceAction::Install,
                ..
            }
        ));
        assert!(!manager.unit_path().exists());

        // Retrying hits the same failure, not "already installed".
        assert!(matches!(
            manager.install(),
            Err(ServiceError::Operation { .. })
        ));
    }

    #[test]
    fn missing_systemctl_fails_install_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let manager = SystemdManager::new(definition())
            .with_unit_dir(dir.path())
            .with_systemctl(dir.path().join("no-such-systemctl"));

        assert!(manager.install().is_err());
        assert!(!manager.unit_path().exists());
    }

    #[test]
    fn definition_forwards_config_path() {
        let def = ServiceDefinition::for_current_exe(Some(Path::new("/etc/viewr.yaml"))).unwrap();
        assert_eq!(def.name, "viewr");
        assert_eq!(def.arguments, ["serve", "--config", "/etc/viewr.yaml"]);

        let def = ServiceDefinition::for_current_exe(None).unwrap();
        assert_eq!(def.arguments, ["serve"]);
    }

    #[test]
    fn unsupported_manager_refuses_everything() {
        let manager = UnsupportedManager;
        assert!(matches!(manager.status(), Err(ServiceError::Unsupported)));
        assert!(matches!(manager.start(), Err(ServiceError::Unsupported)));
    }
}
