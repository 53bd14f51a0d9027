//! Loading generation options from an answers file.
//! Supports JSON and YAML; JSON is tried first.

use crate::error::{Error, Result};
use crate::options::{sanitize_name, Options};
use crate::utils::{encloses, normalize_path};
use log::debug;
use std::path::{Path, PathBuf};

/// Parses an answers document.
///
/// Missing fields take their defaults; `directory` is left empty when absent so the
/// caller can place the project next to the current directory.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML options
pub fn parse_options(content: &str) -> Result<Options> {
    match serde_json::from_str(content) {
        Ok(options) => Ok(options),
        Err(json_err) => {
            debug!("Answers are not JSON ({}), trying YAML.", json_err);
            serde_yaml::from_str(content)
                .map_err(|e| Error::ConfigError(format!("Invalid answers format: {e}")))
        }
    }
}

/// Reads and parses an answers file.
pub fn load_options<P: AsRef<Path>>(path: P) -> Result<Options> {
    let path = path.as_ref();
    debug!("Loading answers from {}", path.display());
    let content = std::fs::read_to_string(path).map_err(Error::filesystem(path))?;
    parse_options(&content)
}

/// Resolves the destination of an answers file against `cwd`.
///
/// An empty `directory` places the project at `cwd/<name>`. The result is normalized
/// without touching the disk.
///
/// # Errors
/// * `Error::ValidationError` if the destination is `cwd` or one of its ancestors
pub fn resolve_destination(directory: &Path, name: &str, cwd: &Path) -> Result<PathBuf> {
    let joined = if directory.as_os_str().is_empty() { cwd.join(name) } else { cwd.join(directory) };
    if encloses(&joined, cwd) {
        return Err(Error::ValidationError(format!(
            "destination '{}' contains the working directory",
            directory.display()
        )));
    }
    Ok(normalize_path(joined))
}

/// Loads an answers file and prepares it for generation inside `cwd`.
///
/// The name is sanitized, the destination resolved with [`resolve_destination`]
/// and `force` approves replacing an existing destination.
pub fn options_from_file<P: AsRef<Path>>(path: P, cwd: &Path, force: bool) -> Result<Options> {
    let mut options = load_options(path)?;
    options.name = sanitize_name(&options.name);
    options.directory = resolve_destination(&options.directory, &options.name, cwd)?;
    if force {
        options.overwrite = Some(true);
    }
    Ok(options)
}
