//! Layered configuration resolution.
//!
//! Layers are applied in a fixed order, each able to overwrite the previous:
//! defaults < document < environment < flags. Only valid override values are
//! applied. An unparsable environment variable or flag is skipped rather than
//! failing the whole resolution, so the server can still come up with a valid
//! (if under-configured) value. Document problems, on the other hand, abort.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::loader::{self, DocumentSource, ResolveError};
use crate::config::schema::{AppConfig, LogLevel};
use crate::config::validation::{valid_address, valid_port};

pub const ENV_LOG_LEVEL: &str = "VIEWR_LOG_LEVEL";
pub const ENV_PORT: &str = "VIEWR_PORT";
pub const ENV_ADDRESS: &str = "VIEWR_ADDRESS";

const FIELD_LOG_LEVEL: &str = "log-level";
const FIELD_PORT: &str = "port";
const FIELD_ADDRESS: &str = "address";

/// Source of environment variables.
pub trait VarSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Command-line values for the overridable fields.
///
/// `None` means the flag was not given. Values are raw: validation happens
/// during resolution.
pub trait FlagProvider {
    fn log_level(&self) -> Option<&str>;
    fn port(&self) -> Option<i64>;
    fn address(&self) -> Option<&str>;
}

/// No flags at all (service-managed runs, pre-flight checks).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFlags;

impl FlagProvider for NoFlags {
    fn log_level(&self) -> Option<&str> {
        None
    }

    fn port(&self) -> Option<i64> {
        None
    }

    fn address(&self) -> Option<&str> {
        None
    }
}

/// Where the effective configuration came from, field by field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub source: DocumentSource,
    /// Field name to origin (`env:VAR` or `flag:name`). Ordered by field name.
    pub overrides: BTreeMap<&'static str, String>,
}

impl Provenance {
    fn new(source: DocumentSource) -> Self {
        Self {
            source,
            overrides: BTreeMap::new(),
        }
    }

    /// Later calls for the same field replace earlier ones.
    fn record(&mut self, field: &'static str, origin: String) {
        self.overrides.insert(field, origin);
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)?;
        if !self.overrides.is_empty() {
            let overrides: Vec<_> = self
                .overrides
                .iter()
                .map(|(field, origin)| format!("{}={}", field, origin))
                .collect();
            write!(f, " (overrides: {})", overrides.join(", "))?;
        }
        Ok(())
    }
}

/// Outcome of a successful resolution.
#[derive(Debug)]
pub struct Resolution {
    pub config: AppConfig,
    pub provenance: Provenance,
    /// Non-fatal problem encountered on the way (the application root could
    /// not be determined, so no document was consulted).
    pub deferred: Option<ResolveError>,
}

/// Merges defaults, the on-disk document, environment and flags.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver<E = ProcessEnv> {
    env: E,
}

impl ConfigResolver<ProcessEnv> {
    pub fn new() -> Self {
        Self { env: ProcessEnv }
    }
}

impl<E: VarSource> ConfigResolver<E> {
    /// Use `env` instead of the process environment.
    pub fn with_env<F: VarSource>(self, env: F) -> ConfigResolver<F> {
        ConfigResolver { env }
    }

    /// Resolve the effective configuration.
    ///
    /// An empty `explicit_path` is treated as absent.
    pub fn resolve(
        &self,
        explicit_path: Option<&Path>,
        flags: &dyn FlagProvider,
    ) -> Result<Resolution, ResolveError> {
        let mut config = AppConfig::default();
        let mut source = DocumentSource::Defaults;
        let mut deferred = None;

        match document_path(explicit_path) {
            Ok(path) => {
                if let Some((document, path)) = loader::read_document(&path)? {
                    config = document;
                    source = DocumentSource::File(path);
                }
            }
            Err(e @ ResolveError::RootPathUnresolvable { .. }) => {
                tracing::warn!(error = %e, "Skipping configuration document");
                deferred = Some(e);
            }
            Err(e) => return Err(e),
        }

        let mut provenance = Provenance::new(source);
        self.apply_env(&mut config, &mut provenance);
        apply_flags(flags, &mut config, &mut provenance);

        Ok(Resolution {
            config,
            provenance,
            deferred,
        })
    }

    fn apply_env(&self, config: &mut AppConfig, provenance: &mut Provenance) {
        if let Some(value) = self.env.var(ENV_LOG_LEVEL) {
            match value.to_lowercase().parse::<LogLevel>() {
                Ok(level) => {
                    config.server.log_level = level;
                    provenance.record(FIELD_LOG_LEVEL, format!("env:{}", ENV_LOG_LEVEL));
                }
                Err(_) => ignored(ENV_LOG_LEVEL, &value),
            }
        }

        if let Some(value) = self.env.var(ENV_PORT) {
            match value.parse::<i64>().ok().and_then(checked_port) {
                Some(port) => {
                    config.server.port = port;
                    provenance.record(FIELD_PORT, format!("env:{}", ENV_PORT));
                }
                None => ignored(ENV_PORT, &value),
            }
        }

        if let Some(value) = self.env.var(ENV_ADDRESS) {
            if valid_address(&value) {
                config.server.address = value;
                provenance.record(FIELD_ADDRESS, format!("env:{}", ENV_ADDRESS));
            } else {
                ignored(ENV_ADDRESS, &value);
            }
        }
    }
}

fn apply_flags(flags: &dyn FlagProvider, config: &mut AppConfig, provenance: &mut Provenance) {
    if let Some(value) = flags.log_level() {
        match value.parse::<LogLevel>() {
            Ok(level) => {
                config.server.log_level = level;
                provenance.record(FIELD_LOG_LEVEL, format!("flag:{}", FIELD_LOG_LEVEL));
            }
            Err(_) => ignored("--log-level", value),
        }
    }

    if let Some(value) = flags.port() {
        match checked_port(value) {
            Some(port) => {
                config.server.port = port;
                provenance.record(FIELD_PORT, format!("flag:{}", FIELD_PORT));
            }
            None => ignored("--port", &value.to_string()),
        }
    }

    if let Some(value) = flags.address() {
        if valid_address(value) {
            config.server.address = value.to_string();
            provenance.record(FIELD_ADDRESS, format!("flag:{}", FIELD_ADDRESS));
        } else {
            ignored("--address", value);
        }
    }
}

fn document_path(explicit_path: Option<&Path>) -> Result<PathBuf, ResolveError> {
    match explicit_path {
        Some(path) if !path.as_os_str().is_empty() => Ok(path.to_path_buf()),
        _ => loader::default_document_path(),
    }
}

fn checked_port(port: i64) -> Option<u16> {
    if valid_port(port) {
        u16::try_from(port).ok()
    } else {
        None
    }
}

fn ignored(origin: &str, value: &str) {
    tracing::debug!(origin, value, "Ignoring invalid configuration override");
}
