//! Template loading and rendering for ironmaker.
//! Resolves logical template names against the template set on disk and renders
//! them with MiniJinja, formatting code outputs before they are returned.
use crate::constants::{CODE_EXTENSIONS, TEMPLATE_SUFFIX};
use crate::data::TemplateData;
use crate::error::{Error, Result};
use crate::formatter::{CodeFormatter, JsFormatter};
use crate::utils::{read_file, relative_path};
use log::debug;
use minijinja::{AutoEscape, Environment};
use std::path::{Path, PathBuf};

/// How interpolated values are written into a rendered output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// Values render as code literals: strings quoted, sequences and mappings as
    /// JSON. Raw code fragments opt out with the `safe` filter.
    Code,
    /// Values render verbatim.
    Text,
}

impl OutputKind {
    /// Picks the output kind from the extension of a logical template name.
    pub fn from_name(name: &str) -> Self {
        let is_code = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext));
        if is_code {
            OutputKind::Code
        } else {
            OutputKind::Text
        }
    }
}

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders template source with the given context.
    ///
    /// # Arguments
    /// * `name` - Logical template name, used to pick the output kind
    /// * `template` - Template source to render
    /// * `context` - Context variables for rendering
    ///
    /// # Returns
    /// * `Result<String>` - Rendered text
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
pub struct MiniJinjaRenderer {
    /// MiniJinja environment instance
    env: Environment<'static>,
}

impl MiniJinjaRenderer {
    /// Creates a new renderer whose auto-escaping follows [`OutputKind::from_name`].
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);
        env.set_auto_escape_callback(|name| match OutputKind::from_name(name) {
            OutputKind::Code => AutoEscape::Json,
            OutputKind::Text => AutoEscape::None,
        });
        Self { env }
    }
}

impl Default for MiniJinjaRenderer {
    fn default() -> Self {
        MiniJinjaRenderer::new()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// # Errors
    /// * `Error::MinijinjaError` if the template fails to parse or render
    fn render(&self, name: &str, template: &str, context: &serde_json::Value) -> Result<String> {
        self.env.render_named_str(name, template, context).map_err(Error::MinijinjaError)
    }
}

/// A template set rooted at a directory.
///
/// A logical name such as `routes/base.js` maps to the file
/// `<root>/routes/base.js.j2`.
pub struct Templates {
    root: PathBuf,
    renderer: Box<dyn TemplateRenderer>,
    formatters: Vec<(String, Box<dyn CodeFormatter>)>,
}

impl Templates {
    /// Template set rendered with MiniJinja, with `.js` outputs formatted by [`JsFormatter`].
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self::with_renderer(root, Box::new(MiniJinjaRenderer::new()))
            .with_formatter("js", Box::new(JsFormatter::new()))
    }

    /// Template set with a custom renderer and no formatters.
    pub fn with_renderer<P: Into<PathBuf>>(root: P, renderer: Box<dyn TemplateRenderer>) -> Self {
        Self { root: root.into(), renderer, formatters: Vec::new() }
    }

    /// Registers a formatter for outputs with the given extension, replacing any previous one.
    pub fn with_formatter(mut self, extension: &str, formatter: Box<dyn CodeFormatter>) -> Self {
        self.formatters.retain(|(ext, _)| ext != extension);
        self.formatters.push((extension.to_string(), formatter));
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loads a template by logical name with empty data.
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if `<root>/<name>.j2` does not exist
    /// * `Error::PathTraversal` if the name leaves the template root
    pub fn load(&self, name: &str) -> Result<LoadedTemplate<'_>> {
        self.load_with(name, TemplateData::new())
    }

    /// Loads a template by logical name, seeding its data map.
    pub fn load_with(&self, name: &str, data: TemplateData) -> Result<LoadedTemplate<'_>> {
        let relative = relative_path(name)?;
        let file_name = format!("{}{}", relative.display(), TEMPLATE_SUFFIX);
        debug!("Loading template '{}'.", file_name);
        let source = read_file(&self.root, &file_name).map_err(|err| match err {
            Error::FileNotFound { .. } => Error::TemplateNotFound { name: name.to_string() },
            other => other,
        })?;
        Ok(LoadedTemplate { templates: self, name: name.to_string(), source, data })
    }

    fn formatter_for(&self, name: &str) -> Option<&dyn CodeFormatter> {
        let extension = Path::new(name).extension()?.to_str()?;
        self.formatters
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, formatter)| formatter.as_ref())
    }
}

/// A loaded template together with the data it will be rendered with.
///
/// `data` may be changed freely between calls to [`LoadedTemplate::render`]; every call
/// renders the data as it is at call time.
pub struct LoadedTemplate<'a> {
    templates: &'a Templates,
    name: String,
    source: String,
    pub data: TemplateData,
}

impl LoadedTemplate<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the template and formats the result when a formatter is registered
    /// for its extension.
    ///
    /// # Errors
    /// * `Error::MinijinjaError` if substitution fails
    /// * `Error::RenderFormatError` if the rendered text cannot be formatted
    pub fn render(&self) -> Result<String> {
        let rendered =
            self.templates.renderer.render(&self.name, &self.source, &self.data.to_value())?;
        match self.templates.formatter_for(&self.name) {
            Some(formatter) => formatter.format(&rendered).map_err(|reason| {
                Error::RenderFormatError { template: self.name.clone(), reason }
            }),
            None => Ok(rendered),
        }
    }
}
