//! Deferred file operations and their execution against a destination root.
//!
//! Operations are queued while the generator decides what to produce and are
//! only materialized by [`FileProcessor::execute`]. Paths are validated lexically
//! when an operation is queued, and every write is checked again against the
//! resolved destination root so symlinks inside it cannot redirect output.

use globset::Glob;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::{
    data::TemplateData,
    error::{Error, Result},
    progress::ProgressSink,
    renderer::Templates,
    utils::{
        ensure_directory, ensure_inside, list_directory, read_bytes, relative_path, write_file,
    },
};

/// Default pattern for [`Operation::CopyMultiple`]
pub const MATCH_ALL: &str = "*";

/// A queued unit of file-producing work.
///
/// `from` and `template` are relative to the template root, `to` is relative to the
/// destination root.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Verbatim copy of one template file
    Copy { from: PathBuf, to: PathBuf },
    /// Copy of every file in a template directory whose name matches `name_glob`.
    /// The directory is listed when the queue executes.
    CopyMultiple { from: PathBuf, to: PathBuf, name_glob: String },
    /// Render a template with the base data plus `data`
    Render { template: String, to: PathBuf, data: TemplateData, executable: bool },
    /// Write raw contents
    Write { to: PathBuf, contents: String, executable: bool },
}

impl Operation {
    pub fn copy<F: Into<PathBuf>, T: Into<PathBuf>>(from: F, to: T) -> Self {
        Operation::Copy { from: from.into(), to: to.into() }
    }

    pub fn copy_multiple<F: Into<PathBuf>, T: Into<PathBuf>>(from: F, to: T) -> Self {
        Operation::CopyMultiple { from: from.into(), to: to.into(), name_glob: MATCH_ALL.into() }
    }

    pub fn render<S: Into<String>, T: Into<PathBuf>>(template: S, to: T) -> Self {
        Operation::Render {
            template: template.into(),
            to: to.into(),
            data: TemplateData::new(),
            executable: false,
        }
    }

    pub fn write<T: Into<PathBuf>, C: Into<String>>(to: T, contents: C) -> Self {
        Operation::Write { to: to.into(), contents: contents.into(), executable: false }
    }

    /// Restricts a `CopyMultiple` to names matching `pattern`. No effect on other kinds.
    pub fn matching<S: Into<String>>(mut self, pattern: S) -> Self {
        if let Operation::CopyMultiple { name_glob, .. } = &mut self {
            *name_glob = pattern.into();
        }
        self
    }

    /// Sets the per-operation overlay of a `Render`. No effect on other kinds.
    pub fn with_data(mut self, overlay: TemplateData) -> Self {
        if let Operation::Render { data, .. } = &mut self {
            *data = overlay;
        }
        self
    }

    /// Marks the output of a `Render` or `Write` as executable (mode 0755).
    pub fn executable(mut self) -> Self {
        match &mut self {
            Operation::Render { executable, .. } | Operation::Write { executable, .. } => {
                *executable = true
            }
            Operation::Copy { .. } | Operation::CopyMultiple { .. } => {}
        }
        self
    }

    fn destination(&self) -> &Path {
        match self {
            Operation::Copy { to, .. }
            | Operation::CopyMultiple { to, .. }
            | Operation::Render { to, .. }
            | Operation::Write { to, .. } => to,
        }
    }
}

/// Order in which queued operations run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionOrder {
    /// The operation queued last runs first.
    #[default]
    LastInFirstOut,
    /// Operations run in the order they were queued.
    FirstInFirstOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Building,
    Executing,
    Done,
}

/// Queues file operations and executes them once against a destination root.
pub struct FileProcessor<'a> {
    templates: &'a Templates,
    destination: PathBuf,
    data: TemplateData,
    sink: &'a dyn ProgressSink,
    order: ExecutionOrder,
    queue: Vec<Operation>,
    state: ProcessorState,
}

impl<'a> FileProcessor<'a> {
    /// Creates a processor in the `Building` state.
    ///
    /// # Arguments
    /// * `templates` - Template set that copies and renders read from
    /// * `destination` - Destination root every output must resolve inside
    /// * `data` - Base template data shared by every render
    /// * `sink` - Receives every created file and directory
    pub fn new<P: Into<PathBuf>>(
        templates: &'a Templates,
        destination: P,
        data: TemplateData,
        sink: &'a dyn ProgressSink,
    ) -> Self {
        Self {
            templates,
            destination: destination.into(),
            data,
            sink,
            order: ExecutionOrder::default(),
            queue: Vec::new(),
            state: ProcessorState::Building,
        }
    }

    pub fn with_order(mut self, order: ExecutionOrder) -> Self {
        self.order = order;
        self
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn queued(&self) -> &[Operation] {
        &self.queue
    }

    /// Validates and appends an operation to the queue.
    ///
    /// # Errors
    /// * `Error::PathTraversal` if a source or destination leaves its root
    /// * `Error::ValidationError` for an empty file destination or an invalid glob
    /// * `Error::ProcessorAlreadyExecuted` once `execute` has been called
    pub fn enqueue(&mut self, operation: Operation) -> Result<()> {
        if self.state != ProcessorState::Building {
            return Err(Error::ProcessorAlreadyExecuted);
        }
        let operation = validate(operation)?;
        debug!("Queued {} -> '{}'.", kind(&operation), operation.destination().display());
        self.queue.push(operation);
        Ok(())
    }

    pub fn copy<F: Into<PathBuf>, T: Into<PathBuf>>(&mut self, from: F, to: T) -> Result<()> {
        self.enqueue(Operation::copy(from, to))
    }

    /// Queues a copy of every matching file of template directory `from` into `to`.
    /// `name_glob` defaults to matching everything.
    pub fn copy_multiple<F: Into<PathBuf>, T: Into<PathBuf>>(
        &mut self,
        from: F,
        to: T,
        name_glob: Option<&str>,
    ) -> Result<()> {
        self.enqueue(Operation::copy_multiple(from, to).matching(name_glob.unwrap_or(MATCH_ALL)))
    }

    pub fn render<S: Into<String>, T: Into<PathBuf>>(
        &mut self,
        template: S,
        to: T,
        data: TemplateData,
    ) -> Result<()> {
        self.enqueue(Operation::render(template, to).with_data(data))
    }

    pub fn write<T: Into<PathBuf>, C: Into<String>>(&mut self, to: T, contents: C) -> Result<()> {
        self.enqueue(Operation::write(to, contents))
    }

    /// Drains the queue and materializes every operation.
    ///
    /// The destination root is created first. The first failing operation stops the
    /// run; files written before it stay on disk.
    ///
    /// # Returns
    /// * `Result<Vec<PathBuf>>` - Every file written, in the order it was written
    ///
    /// # Errors
    /// * `Error::ProcessorAlreadyExecuted` when called a second time
    /// * Any error raised by the failing operation
    pub fn execute(&mut self) -> Result<Vec<PathBuf>> {
        if self.state != ProcessorState::Building {
            return Err(Error::ProcessorAlreadyExecuted);
        }
        self.state = ProcessorState::Executing;

        let mut queue = std::mem::take(&mut self.queue);
        if self.order == ExecutionOrder::LastInFirstOut {
            queue.reverse();
        }
        debug!("Executing {} queued operations.", queue.len());

        let result = self.run(queue);
        self.state = ProcessorState::Done;
        result
    }

    fn run(&self, queue: Vec<Operation>) -> Result<Vec<PathBuf>> {
        ensure_directory(&self.destination, self.sink)?;
        let mut written = Vec::new();
        for operation in queue {
            self.apply(operation, &mut written)?;
        }
        Ok(written)
    }

    fn apply(&self, operation: Operation, written: &mut Vec<PathBuf>) -> Result<()> {
        match operation {
            Operation::Copy { from, to } => self.copy_file(&from, &to, written),
            Operation::CopyMultiple { from, to, name_glob } => {
                let matcher = Glob::new(&name_glob)
                    .map_err(|e| Error::ValidationError(e.to_string()))?
                    .compile_matcher();
                let source_dir = self.templates.root().join(&from);
                let names = list_directory(&source_dir).map_err(|err| match err {
                    Error::FileNotFound { .. } => {
                        Error::TemplateNotFound { name: from.display().to_string() }
                    }
                    other => other,
                })?;
                for name in names {
                    if name.starts_with('.') || !matcher.is_match(&name) {
                        continue;
                    }
                    if source_dir.join(&name).is_dir() {
                        warn!("Skipping directory '{}' in '{}'.", name, from.display());
                        continue;
                    }
                    self.copy_file(&from.join(&name), &to.join(&name), written)?;
                }
                Ok(())
            }
            Operation::Render { template, to, data, executable } => {
                let loaded = self.templates.load_with(&template, self.data.merged(&data))?;
                let contents = loaded.render()?;
                self.write_output(&to, contents.as_bytes(), executable, written)
            }
            Operation::Write { to, contents, executable } => {
                self.write_output(&to, contents.as_bytes(), executable, written)
            }
        }
    }

    fn copy_file(&self, from: &Path, to: &Path, written: &mut Vec<PathBuf>) -> Result<()> {
        let contents = read_bytes(self.templates.root(), from).map_err(|err| match err {
            Error::FileNotFound { .. } => {
                Error::TemplateNotFound { name: from.display().to_string() }
            }
            other => other,
        })?;
        self.write_output(to, &contents, false, written)
    }

    fn write_output(
        &self,
        to: &Path,
        contents: &[u8],
        executable: bool,
        written: &mut Vec<PathBuf>,
    ) -> Result<()> {
        let target = self.destination.join(to);
        ensure_inside(&self.destination, &target)?;
        if let Some(parent) = target.parent() {
            ensure_directory(parent, self.sink)?;
        }
        write_file(&target, contents, executable)?;
        self.sink.on_file_created(&target);
        written.push(target);
        Ok(())
    }
}

fn kind(operation: &Operation) -> &'static str {
    match operation {
        Operation::Copy { .. } => "copy",
        Operation::CopyMultiple { .. } => "copy-multiple",
        Operation::Render { .. } => "render",
        Operation::Write { .. } => "write",
    }
}

fn file_destination(to: &Path) -> Result<PathBuf> {
    let normalized = relative_path(to)?;
    if normalized.as_os_str().is_empty() {
        return Err(Error::ValidationError(format!(
            "'{}' is not a valid file destination",
            to.display()
        )));
    }
    Ok(normalized)
}

fn validate(operation: Operation) -> Result<Operation> {
    Ok(match operation {
        Operation::Copy { from, to } => Operation::Copy {
            from: file_destination(&from)?,
            to: file_destination(&to)?,
        },
        Operation::CopyMultiple { from, to, name_glob } => {
            Glob::new(&name_glob).map_err(|e| Error::ValidationError(e.to_string()))?;
            Operation::CopyMultiple { from: relative_path(&from)?, to: relative_path(&to)?, name_glob }
        }
        Operation::Render { template, to, data, executable } => {
            file_destination(Path::new(&template))?;
            Operation::Render { template, to: file_destination(&to)?, data, executable }
        }
        Operation::Write { to, contents, executable } => {
            Operation::Write { to: file_destination(&to)?, contents, executable }
        }
    })
}
