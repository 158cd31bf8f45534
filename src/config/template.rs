//! Export of the bundled default configuration document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::loader::{self, ResolveError};
use crate::error::Cause;

/// Default filename of an exported template.
pub const TEMPLATE_FILE_NAME: &str = "viewr-config-template.yaml";

/// The bundled default document, byte for byte.
pub const DEFAULT_DOCUMENT: &[u8] = include_bytes!("../../assets/viewr-config.yaml");

/// Error type for template export.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error(transparent)]
    Root(#[from] ResolveError),

    #[error("file already exists at {} (overwrite disabled)", .path.display())]
    AlreadyExists { path: PathBuf },

    #[error("failed to create parent directories to {}{cause}", .path.display())]
    CreateDirs { path: PathBuf, cause: Cause },

    #[error("error writing to dest template file at {}{cause}", .path.display())]
    Write { path: PathBuf, cause: Cause },
}

/// Write the bundled default document to `dest`.
///
/// `dest` defaults to [`TEMPLATE_FILE_NAME`] in the application root. An
/// existing YAML file is only replaced when `overwrite` is set.
pub fn export_template(dest: Option<&Path>, overwrite: bool) -> Result<PathBuf, TemplateError> {
    let dest = match dest {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => loader::app_root()?.join(TEMPLATE_FILE_NAME),
    };

    if is_yaml_file(&dest) && !overwrite {
        return Err(TemplateError::AlreadyExists { path: dest });
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TemplateError::CreateDirs {
            path: dest.clone(),
            cause: Cause::from_err(e),
        })?;
    }

    fs::write(&dest, DEFAULT_DOCUMENT).map_err(|e| TemplateError::Write {
        path: dest.clone(),
        cause: Cause::from_err(e),
    })?;

    tracing::debug!(path = %dest.display(), "Configuration template written");
    Ok(dest)
}

/// An existing regular file with a `.yaml` or `.yml` extension.
fn is_yaml_file(path: &Path) -> bool {
    let is_file = fs::metadata(path).map(|m| m.is_file()).unwrap_or(false);
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);
    is_file && is_yaml
}
