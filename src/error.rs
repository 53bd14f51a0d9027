//! Error handling for the ironmaker application.
//! Defines custom error types and results used throughout the application.

use std::io;
use thiserror::Error;

/// Custom error types for ironmaker operations.
///
/// This enum represents all possible errors that can occur while generating a project.
/// It implements the standard Error trait through thiserror's derive macro.
#[derive(Error, Debug)]
pub enum Error {
    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),

    /// File system failure tied to a specific path
    #[error("Filesystem error at '{path}': {source}.")]
    FilesystemError {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A file that was expected to exist is missing
    #[error("File '{path}' does not exist.")]
    FileNotFound { path: String },

    /// The template set has no template under the requested logical name
    #[error("Template '{name}' does not exist.")]
    TemplateNotFound { name: String },

    /// Represents errors that occur during template processing
    #[error("Template error: {0}.")]
    TemplateError(String),

    /// Errors raised by the MiniJinja engine while rendering
    #[error("Template rendering error: {0}.")]
    MinijinjaError(#[from] minijinja::Error),

    /// Rendered output is not well-formed for its target format
    #[error("Rendered output of '{template}' could not be formatted: {reason}.")]
    RenderFormatError { template: String, reason: String },

    /// A path would resolve outside of its root directory
    #[error("Path '{path}' resolves outside of its root directory.")]
    PathTraversal { path: String },

    #[error("JSON error: {0}.")]
    JsonError(#[from] serde_json::Error),

    /// Represents errors that occur during configuration parsing or processing
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// Represents validation failures in user input or data
    #[error("Validation error: {0}.")]
    ValidationError(String),

    /// Interactive prompt failures (terminal closed, not a tty, ...)
    #[error("Prompt error: {0}.")]
    PromptError(String),

    #[error("Output directory '{output_dir}' already exists and is not empty. Use --force to replace it.")]
    OutputDirectoryExistsError { output_dir: String },

    /// The user chose not to replace an existing directory. Not a failure.
    #[error("Generation cancelled: existing directory was kept.")]
    UserDeclinedOverwrite,

    /// The operation queue was already drained
    #[error("File processor has already been executed.")]
    ProcessorAlreadyExecuted,
}

impl Error {
    /// Builds a closure that wraps an `io::Error` together with the path it happened on.
    pub fn filesystem<P: AsRef<std::path::Path>>(path: P) -> impl FnOnce(io::Error) -> Error {
        let path = path.as_ref().display().to_string();
        move |source| Error::FilesystemError { path, source }
    }

    /// Returns true for the early-exit path that should not be reported as an error.
    pub fn is_user_declined(&self) -> bool {
        matches!(self, Error::UserDeclinedOverwrite)
    }
}

/// Convenience type alias for Results with Error as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// * `UserDeclinedOverwrite` exits with status code 0 and prints nothing
/// * Every other error is printed to stderr and exits with status code 1
pub fn default_error_handler(err: Error) {
    if err.is_user_declined() {
        std::process::exit(0);
    }
    eprintln!("There was an error generating your app.");
    eprintln!("{err}");
    std::process::exit(1);
}
