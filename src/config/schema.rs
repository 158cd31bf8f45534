//! Configuration schema definitions.
//!
//! This module defines the on-disk document structure for the service.
//! Every struct rejects unknown keys: a typo in the document is a parse error,
//! never a silently ignored field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default log level when nothing overrides it.
pub const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 5567;

/// Default listening address (loopback only).
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";

/// Root configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Listener and logging settings.
    pub server: ServerSettings,

    /// Directories exposed by the browser, in document order.
    pub paths: Vec<PathEntry>,
}

impl AppConfig {
    /// Path entries that are not disabled, in document order.
    pub fn enabled_paths(&self) -> impl Iterator<Item = &PathEntry> {
        self.paths.iter().filter(|entry| !entry.disabled)
    }
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct ServerSettings {
    /// Minimum level of emitted log events.
    pub log_level: LogLevel,

    /// TCP port to listen on.
    pub port: u16,

    /// IP literal or hostname to bind.
    pub address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL,
            port: DEFAULT_PORT,
            address: DEFAULT_ADDRESS.to_string(),
        }
    }
}

impl ServerSettings {
    /// `address:port` as shown to operators.
    pub fn bind_target(&self) -> String {
        bind_target(&self.address, self.port)
    }
}

/// `address:port`, with IPv6 literals bracketed.
pub fn bind_target(address: &str, port: u16) -> String {
    if address.contains(':') {
        format!("[{}]:{}", address, port)
    } else {
        format!("{}:{}", address, port)
    }
}

/// A named directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathEntry {
    /// Display name.
    pub name: String,

    /// Filesystem location.
    pub path: String,

    /// Hidden from the browser when set.
    #[serde(default, rename = "disable")]
    pub disabled: bool,
}

/// Recognised log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// All levels, most verbose first.
    pub const ALL: [LogLevel; 4] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        DEFAULT_LOG_LEVEL
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a token is not one of the recognised levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level: {0}")]
pub struct UnknownLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    /// Case-sensitive: `"INFO"` is not a level.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| UnknownLogLevel(s.to_string()))
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_loopback_info() {
        let config = AppConfig::default();
        assert_eq!(config.server.log_level, LogLevel::Info);
        assert_eq!(config.server.port, 5567);
        assert_eq!(config.server.address, "127.0.0.1");
        assert!(config.paths.is_empty());
    }

    #[test]
    fn partial_document_keeps_defaults() {
        let config: AppConfig = serde_yaml::from_str("server:\n  port: 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.log_level, LogLevel::Info);
        assert_eq!(config.server.address, "127.0.0.1");
    }

    #[test]
    fn unknown_keys_are_rejected_at_every_level() {
        assert!(serde_yaml::from_str::<AppConfig>("verbose: true\n").is_err());
        assert!(serde_yaml::from_str::<AppConfig>("server:\n  host: x\n").is_err());
        assert!(serde_yaml::from_str::<AppConfig>(
            "paths:\n  - name: a\n    path: /a\n    hidden: true\n"
        )
        .is_err());
    }

    #[test]
    fn path_entries_keep_document_order() {
        let yaml = "paths:\n  - name: docs\n    path: /srv/docs\n  - name: old\n    path: /srv/old\n    disable: true\n  - name: media\n    path: /srv/media\n";
        let config: AppConfig = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<_> = config.paths.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["docs", "old", "media"]);
        let enabled: Vec<_> = config.enabled_paths().map(|p| p.name.as_str()).collect();
        assert_eq!(enabled, ["docs", "media"]);
    }

    #[test]
    fn log_level_parsing_is_case_sensitive() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("WARN".parse::<LogLevel>().is_err());
        assert!("trace".parse::<LogLevel>().is_err());
        assert!(serde_yaml::from_str::<AppConfig>("server:\n  logLevel: verbose\n").is_err());
    }

    #[test]
    fn bind_target_brackets_ipv6() {
        let mut server = ServerSettings::default();
        assert_eq!(server.bind_target(), "127.0.0.1:5567");
        server.address = "::1".into();
        assert_eq!(server.bind_target(), "[::1]:5567");
        assert_eq!(bind_target("fe80::1", 80), "[fe80::1]:80");
        assert_eq!(bind_target("files.local", 443), "files.local:443");
    }
}
