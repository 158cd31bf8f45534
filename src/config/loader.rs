//! Configuration loading from disk.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};
use crate::error::Cause;

/// Fixed filename of the configuration document.
pub const CONFIG_FILE_NAME: &str = "viewr-config.yaml";

/// Error type for configuration resolution.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("unable to resolve the application root path{cause}")]
    RootPathUnresolvable { cause: Cause },

    #[error("invalid config path - {path}{cause}")]
    InvalidPath { path: String, cause: Cause },

    #[error("config path points to a directory: {}", .path.display())]
    DocumentIsDirectory { path: PathBuf },

    #[error("failed to read config file {}{cause}", .path.display())]
    DocumentUnreadable { path: PathBuf, cause: Cause },

    #[error("failed to parse YAML config {}{cause}", .path.display())]
    DocumentMalformed { path: PathBuf, cause: Cause },
}

/// Where the document layer of a resolution came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// No document on disk; built-in defaults were used.
    Defaults,
    /// Absolute path of the document that was read.
    File(PathBuf),
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Defaults => f.write_str("defaults"),
            DocumentSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Directory the application treats as its home.
///
/// The parent of the running executable, or the current working directory
/// when the executable lives in a Cargo build directory.
pub fn app_root() -> Result<PathBuf, ResolveError> {
    let exe = std::env::current_exe()
        .map_err(|e| ResolveError::RootPathUnresolvable { cause: Cause::from_err(e) })?;

    if is_dev_build_path(&exe) {
        return std::env::current_dir()
            .map_err(|e| ResolveError::RootPathUnresolvable { cause: Cause::from_err(e) });
    }

    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| ResolveError::RootPathUnresolvable {
            cause: Cause::from_err(format!("{} has no parent directory", exe.display())),
        })
}

/// True when `exe` sits under `target/debug` or `target/release`.
pub fn is_dev_build_path(exe: &Path) -> bool {
    let components: Vec<_> = exe
        .components()
        .filter_map(|c| match c {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .collect();

    components
        .windows(2)
        .any(|pair| pair[0] == "target" && (pair[1] == "debug" || pair[1] == "release"))
}

/// Default location of the configuration document.
pub fn default_document_path() -> Result<PathBuf, ResolveError> {
    Ok(app_root()?.join(CONFIG_FILE_NAME))
}

/// Make `path` absolute without touching the filesystem.
pub(crate) fn absolutize(path: &Path) -> Result<PathBuf, ResolveError> {
    std::path::absolute(path).map_err(|e| ResolveError::InvalidPath {
        path: path.display().to_string(),
        cause: Cause::from_err(e),
    })
}

/// Read and strictly parse the document at `path`.
///
/// A missing file yields `Ok(None)`. Only regular files are read: a directory,
/// a device or FIFO, an unreadable file, a parse failure (including unknown
/// keys) or a semantically invalid document is an error.
pub fn read_document(path: &Path) -> Result<Option<(AppConfig, PathBuf)>, ResolveError> {
    let path = absolutize(path)?;

    let metadata = match fs::metadata(&path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No configuration document, using defaults");
            return Ok(None);
        }
        Err(e) => {
            return Err(ResolveError::DocumentUnreadable {
                path,
                cause: Cause::from_err(e),
            })
        }
    };
    if metadata.is_dir() {
        return Err(ResolveError::DocumentIsDirectory { path });
    }
    if !metadata.is_file() {
        return Err(ResolveError::DocumentUnreadable {
            path,
            cause: Cause::from_err("not a regular file"),
        });
    }

    let content = fs::read_to_string(&path).map_err(|e| ResolveError::DocumentUnreadable {
        path: path.clone(),
        cause: Cause::from_err(e),
    })?;

    let config: AppConfig = serde_yaml::from_str(&content).map_err(|e| {
        ResolveError::DocumentMalformed {
            path: path.clone(),
            cause: Cause::from_err(e),
        }
    })?;

    validate_config(&config).map_err(|errors| ResolveError::DocumentMalformed {
        path: path.clone(),
        cause: Cause::from_err(join_errors(&errors)),
    })?;

    Ok(Some((config, path)))
}

/// Pre-flight check of the document without applying any override layer.
pub fn validate(explicit_path: Option<&Path>) -> Result<DocumentSource, ResolveError> {
    let path = match explicit_path {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => default_document_path()?,
    };

    Ok(match read_document(&path)? {
        Some((_, path)) => DocumentSource::File(path),
        None => DocumentSource::Defaults,
    })
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_document(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn dev_build_detection() {
        assert!(is_dev_build_path(Path::new("/work/viewr/target/debug/viewr")));
        assert!(is_dev_build_path(Path::new("/work/viewr/target/release/deps/viewr-1a2b")));
        assert!(!is_dev_build_path(Path::new("/usr/local/bin/viewr")));
        assert!(!is_dev_build_path(Path::new("/opt/target/viewr")));
    }

    #[test]
    fn missing_document_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_document(&dir.path().join("absent.yaml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(dir.path()).unwrap_err();
        assert!(matches!(err, ResolveError::DocumentIsDirectory { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn special_file_is_not_read() {
        let err = read_document(Path::new("/dev/null")).unwrap_err();
        assert!(matches!(err, ResolveError::DocumentUnreadable { .. }));
    }

    #[test]
    fn unknown_key_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(dir.path(), "server:\n  port: 8080\n  colour: blue\n");
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, ResolveError::DocumentMalformed { .. }));
    }

    #[test]
    fn out_of_range_port_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(dir.path(), "server:\n  port: 22\n");
        let err = read_document(&path).unwrap_err();
        assert!(matches!(err, ResolveError::DocumentMalformed { .. }));
        if cfg!(debug_assertions) {
            assert!(err.to_string().contains("invalid port: 22"));
        }
    }

    #[test]
    fn valid_document_is_read_with_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_document(
            dir.path(),
            "server:\n  logLevel: warn\n  port: 443\n  address: localhost\npaths:\n  - name: home\n    path: /home\n",
        );
        let (config, source) = read_document(&path).unwrap().unwrap();
        assert!(source.is_absolute());
        assert_eq!(config.server.port, 443);
        assert_eq!(config.paths.len(), 1);
    }

    #[test]
    fn validate_reports_source() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nothing.yaml");
        assert_eq!(validate(Some(missing.as_path())).unwrap(), DocumentSource::Defaults);
        assert_eq!(DocumentSource::Defaults.to_string(), "defaults");

        let path = write_document(dir.path(), "server:\n  port: 8080\n");
        match validate(Some(path.as_path())).unwrap() {
            DocumentSource::File(found) => assert_eq!(found, path),
            other => panic!("unexpected source: {other}"),
        }
    }
}
