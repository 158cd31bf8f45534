//! Configuration validation.
//!
//! # Responsibilities
//! - Token checks for log levels, ports and addresses
//! - Semantic checks of a parsed document (serde handles syntactic)
//! - Bind feasibility probe before the server starts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - The bind probe opens and immediately releases a socket. A successful probe
//!   does not reserve the port: the real bind performed later can still fail and
//!   is reported separately.

use std::io;
use std::net::{IpAddr, TcpListener};

use crate::config::schema::{bind_target, AppConfig, LogLevel};
use crate::error::Cause;

/// Longest accepted hostname.
const MAX_HOSTNAME_LEN: usize = 255;

/// True iff `token` is exactly one of the recognised log levels.
pub fn valid_log_level(token: &str) -> bool {
    token.parse::<LogLevel>().is_ok()
}

/// True for unprivileged ports and the two standard web ports.
pub fn valid_port(port: i64) -> bool {
    (1024..=65535).contains(&port) || port == 80 || port == 443
}

/// True for IP literals and plausible hostnames.
///
/// Hostnames are only checked for length and absence of whitespace.
pub fn valid_address(address: &str) -> bool {
    if address.is_empty() || address.chars().any(char::is_whitespace) {
        return false;
    }
    if address.parse::<IpAddr>().is_ok() {
        return true;
    }
    address.len() <= MAX_HOSTNAME_LEN
}

/// A single semantic problem found in a configuration document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid port: {0} (must be 1024-65535, 80 or 443)")]
    Port(i64),

    #[error("invalid address: {0:?} (must be a valid IP or hostname)")]
    Address(String),

    #[error("path entry #{index} has an empty {field}")]
    EmptyPathField { index: usize, field: &'static str },
}

/// Check a parsed document for values serde cannot reject on its own.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !valid_port(i64::from(config.server.port)) {
        errors.push(ValidationError::Port(i64::from(config.server.port)));
    }
    if !valid_address(&config.server.address) {
        errors.push(ValidationError::Address(config.server.address.clone()));
    }
    for (index, entry) in config.paths.iter().enumerate() {
        if entry.name.trim().is_empty() {
            errors.push(ValidationError::EmptyPathField { index, field: "name" });
        }
        if entry.path.trim().is_empty() {
            errors.push(ValidationError::EmptyPathField { index, field: "path" });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Error type for the bind feasibility probe.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// Address and/or port failed validation. Every violation is listed.
    #[error("invalid bind parameters: {}", .0.join("; "))]
    InvalidParameters(Vec<String>),

    /// Parameters were fine but the OS refused the bind.
    #[error("failed to bind to {target}{cause}")]
    Rejected {
        target: String,
        kind: io::ErrorKind,
        cause: Cause,
    },
}

/// Verify that `address:port` can be bound right now.
pub fn check_bindable(address: &str, port: i64) -> Result<(), BindError> {
    let mut violations = Vec::new();
    if !valid_address(address) {
        violations.push(format!(
            "invalid address: {:?} (must be a valid IP or hostname)",
            address
        ));
    }
    if !valid_port(port) {
        violations.push(format!(
            "invalid port: {} (must be 1024-65535, 80 or 443)",
            port
        ));
    }
    if !violations.is_empty() {
        return Err(BindError::InvalidParameters(violations));
    }

    // valid_port guarantees the range
    let port = port as u16;
    let target = bind_target(address, port);

    let listener = TcpListener::bind((address, port)).map_err(|e| BindError::Rejected {
        target: target.clone(),
        kind: e.kind(),
        cause: Cause::from_err(&e),
    })?;
    drop(listener);

    tracing::debug!(bind = %target, "Bind probe succeeded");
    Ok(())
}
