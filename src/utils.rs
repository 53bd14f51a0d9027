//! File system helpers shared by the file processor and the generator.

use log::debug;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::constants::{MODE_EXECUTABLE, MODE_FILE, PROTECTED_DELETE_TARGETS};
use crate::error::{Error, Result};
use crate::progress::ProgressSink;

fn read_error(path: &Path, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::FileNotFound { path: path.display().to_string() }
    } else {
        Error::FilesystemError { path: path.display().to_string(), source: err }
    }
}

fn create_dir_all(path: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(MODE_EXECUTABLE);
    }
    builder.create(path).map_err(Error::filesystem(path))
}

/// Normalizes a root-relative path, rejecting anything that could leave the root.
///
/// `.` components are dropped. `..`, root and prefix components are rejected with
/// `Error::PathTraversal`. The check is lexical; symlinks are not followed.
///
/// # Returns
/// * `Result<PathBuf>` - Normalized relative path, empty for the root itself
pub fn relative_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::PathTraversal { path: path.display().to_string() });
            }
        }
    }
    Ok(normalized)
}

/// Creates `path` and all missing ancestors with mode 0755.
///
/// Reports the directory to `sink` only when it did not exist before.
///
/// # Returns
/// * `Result<bool>` - Whether the directory was created by this call
pub fn ensure_directory<P: AsRef<Path>>(path: P, sink: &dyn ProgressSink) -> Result<bool> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(false);
    }
    create_dir_all(path)?;
    debug!("Created directory '{}'.", path.display());
    sink.on_file_created(&path.join(""));
    Ok(true)
}

/// Lexically normalizes `path` without touching the disk.
///
/// `.` components are dropped and `..` removes the preceding normal component.
/// `..` directly under a root stays at the root.
pub fn normalize_path<P: AsRef<Path>>(path: P) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.as_ref().components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Whether `path`, resolved against `cwd`, is `cwd` itself or one of its ancestors.
pub fn encloses<P: AsRef<Path>, C: AsRef<Path>>(path: P, cwd: C) -> bool {
    let cwd = normalize_path(cwd);
    cwd.starts_with(normalize_path(cwd.join(path)))
}

/// Whether `path` is `cwd` or one of its ancestors, either lexically or once both
/// are resolved on disk.
pub fn contains_working_directory<P: AsRef<Path>, C: AsRef<Path>>(path: P, cwd: C) -> bool {
    let (path, cwd) = (path.as_ref(), cwd.as_ref());
    if encloses(path, cwd) {
        return true;
    }
    match (fs::canonicalize(cwd.join(path)), fs::canonicalize(cwd)) {
        (Ok(real_path), Ok(real_cwd)) => real_cwd.starts_with(real_path),
        _ => false,
    }
}

/// Checks that writing to `path` stays inside `root` once symlinks are followed.
///
/// The nearest existing ancestor of `path` is resolved on disk. `path` itself must
/// not be a symlink.
///
/// # Errors
/// * `Error::PathTraversal` if `path` would be written outside of `root`
pub fn ensure_inside<R: AsRef<Path>, P: AsRef<Path>>(root: R, path: P) -> Result<()> {
    let (root, path) = (root.as_ref(), path.as_ref());
    let traversal = || Error::PathTraversal { path: path.display().to_string() };

    if fs::symlink_metadata(path).is_ok_and(|metadata| metadata.file_type().is_symlink()) {
        return Err(traversal());
    }
    let real_root = fs::canonicalize(root).map_err(Error::filesystem(root))?;
    let existing = path.ancestors().skip(1).find(|ancestor| ancestor.exists()).unwrap_or(root);
    let real_parent = fs::canonicalize(existing).map_err(Error::filesystem(existing))?;
    if real_parent.starts_with(&real_root) {
        Ok(())
    } else {
        Err(traversal())
    }
}

/// Recursively removes `path`.
///
/// Refuses to touch `.`, `*`, the current working directory and its ancestors,
/// however they are spelled. Any other path is removed as given, so callers must
/// keep it scoped to the directory they own. A missing path is not an error.
///
/// # Returns
/// * `Result<bool>` - Whether anything was removed
pub fn delete_directory_recursive<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    let cwd = std::env::current_dir().map_err(Error::IoError)?;
    let protected =
        PROTECTED_DELETE_TARGETS.iter().any(|target| path.as_os_str() == OsStr::new(target));
    if protected || contains_working_directory(path, &cwd) {
        debug!("Refusing to delete protected target '{}'.", path.display());
        return Ok(false);
    }

    let path = normalize_path(cwd.join(path));
    match fs::symlink_metadata(&path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(Error::filesystem(&path)(err)),
        Ok(metadata) => {
            if metadata.is_dir() {
                fs::remove_dir_all(&path).map_err(Error::filesystem(&path))?;
            } else {
                fs::remove_file(&path).map_err(Error::filesystem(&path))?;
            }
            debug!("Deleted '{}'.", path.display());
            Ok(true)
        }
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
///
/// New files get mode 0666 (0755 when `executable`), both subject to the umask.
/// Existing files are overwritten.
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    contents: C,
    executable: bool,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            create_dir_all(parent)?;
        }
    }

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(if executable { MODE_EXECUTABLE } else { MODE_FILE });
    }

    let mut file = options.open(path).map_err(Error::filesystem(path))?;
    file.write_all(contents.as_ref()).map_err(Error::filesystem(path))?;

    // The open mode only applies to newly created files.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if executable {
            fs::set_permissions(path, fs::Permissions::from_mode(MODE_EXECUTABLE))
                .map_err(Error::filesystem(path))?;
        }
    }
    #[cfg(not(unix))]
    let _ = executable;

    Ok(())
}

/// Reads a text file located at `base/name`.
///
/// # Errors
/// * `Error::FileNotFound` if the file does not exist
pub fn read_file<B: AsRef<Path>, N: AsRef<Path>>(base: B, name: N) -> Result<String> {
    let path = base.as_ref().join(name);
    fs::read_to_string(&path).map_err(|err| read_error(&path, err))
}

/// Reads a file located at `base/name` as raw bytes.
pub fn read_bytes<B: AsRef<Path>, N: AsRef<Path>>(base: B, name: N) -> Result<Vec<u8>> {
    let path = base.as_ref().join(name);
    fs::read(&path).map_err(|err| read_error(&path, err))
}

/// Returns the names of the entries in `path`, non-recursive and sorted.
pub fn list_directory<P: AsRef<Path>>(path: P) -> Result<BTreeSet<String>> {
    let path = path.as_ref();
    let mut names = BTreeSet::new();
    for entry in fs::read_dir(path).map_err(|err| read_error(path, err))? {
        let entry = entry.map_err(Error::filesystem(path))?;
        names.insert(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// A missing directory counts as empty.
pub fn is_directory_empty<P: AsRef<Path>>(path: P) -> Result<bool> {
    match list_directory(path) {
        Ok(names) => Ok(names.is_empty()),
        Err(Error::FileNotFound { .. }) => Ok(true),
        Err(err) => Err(err),
    }
}
