//! Progress reporting for materialized files and directories.

use std::path::{Path, PathBuf};

/// Receives a notification for every file or directory written during generation.
///
/// Directories are reported with a trailing separator.
pub trait ProgressSink {
    fn on_file_created(&self, path: &Path);
}

/// Discards every notification.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_file_created(&self, _path: &Path) {}
}

/// Prints `created: <path>` lines to stdout when verbose output is enabled.
#[derive(Debug)]
pub struct ConsoleSink {
    verbose: bool,
    base: PathBuf,
}

impl ConsoleSink {
    /// Paths are printed relative to the current working directory when possible.
    pub fn new(verbose: bool) -> Self {
        Self { verbose, base: std::env::current_dir().unwrap_or_default() }
    }

    fn normalize<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.base).unwrap_or(path)
    }
}

impl ProgressSink for ConsoleSink {
    fn on_file_created(&self, path: &Path) {
        if self.verbose {
            println!("   created: {}", self.normalize(path).display());
        }
    }
}
