//! Typed generation options.
//!
//! Produced by the interactive question flow or an answers file, validated once by
//! the generator before anything touches the disk.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use crate::error::{Error, Result};

static INVALID_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9.-]+").expect("valid name regex"));
static NAME_TRIM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-_.]+|-+$|\.").expect("valid trim regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Architecture {
    #[default]
    Mvc,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewEngine {
    Hbs,
    Pug,
}

impl ViewEngine {
    /// File extension of the engine's view files
    pub fn extension(&self) -> &'static str {
        match self {
            ViewEngine::Hbs => "hbs",
            ViewEngine::Pug => "pug",
        }
    }

    pub fn version(&self) -> &'static str {
        match self {
            ViewEngine::Hbs => "^4.2.0",
            ViewEngine::Pug => "^3.0.2",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleEngine {
    Scss,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mechanism {
    Passport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Local,
    Facebook,
    Twitter,
    Github,
}

impl Strategy {
    pub const ALL: [Strategy; 4] =
        [Strategy::Local, Strategy::Facebook, Strategy::Twitter, Strategy::Github];

    /// npm package implementing the strategy and its version
    pub fn package(&self) -> (&'static str, &'static str) {
        match self {
            Strategy::Local => ("passport-local", "^1.0.0"),
            Strategy::Facebook => ("passport-facebook", "^3.0.0"),
            Strategy::Twitter => ("passport-twitter", "^1.0.4"),
            Strategy::Github => ("passport-github", "^1.1.0"),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Local => "Local",
            Strategy::Facebook => "Facebook",
            Strategy::Twitter => "Twitter",
            Strategy::Github => "GitHub",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Authentication {
    pub enabled: bool,
    /// `None` selects basic session and cookie authentication
    pub mechanism: Option<Mechanism>,
    pub strategies: Vec<Strategy>,
}

impl Authentication {
    pub fn is_basic(&self) -> bool {
        self.enabled && self.mechanism.is_none()
    }

    pub fn is_passport(&self) -> bool {
        self.enabled && self.mechanism == Some(Mechanism::Passport)
    }
}

/// Everything the generator needs to know about the project to create.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub name: String,
    /// Destination root of the generated project
    pub directory: PathBuf,
    pub architecture: Architecture,
    /// View engine for MVC projects, `None` for static HTML
    pub template: Option<ViewEngine>,
    /// Style preprocessor for MVC projects, `None` for static CSS
    pub style: Option<StyleEngine>,
    pub database: bool,
    /// The generated authentication code loads the user model, which is only
    /// created when `database` is set.
    pub authentication: Authentication,
    pub strict: bool,
    pub linting: bool,
    pub verbose: bool,
    /// Decision about replacing a non-empty destination, `None` if it was never asked
    pub overwrite: Option<bool>,
}

impl Options {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(name: S, directory: P) -> Self {
        Self { name: name.into(), directory: directory.into(), ..Default::default() }
    }

    pub fn is_mvc(&self) -> bool {
        self.architecture == Architecture::Mvc
    }

    pub fn is_api(&self) -> bool {
        self.architecture == Architecture::Api
    }

    /// Checks the invariants the generator relies on.
    ///
    /// # Errors
    /// * `Error::ValidationError` if the name is empty or not a single path segment,
    ///   or the directory is empty
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::ValidationError("generated app should have a name".into()));
        }
        let mut components = Path::new(&self.name).components();
        let single_segment = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !single_segment {
            return Err(Error::ValidationError(format!(
                "app name '{}' must be a single path segment",
                self.name
            )));
        }
        if self.directory.as_os_str().is_empty() {
            return Err(Error::ValidationError("destination directory is not set".into()));
        }
        Ok(())
    }
}

/// Turns free text into a package-safe app name.
///
/// Runs of characters outside `[A-Za-z0-9.-]` become `-`, leading `-_.`, trailing
/// `-` and every `.` are removed and the result is lowercased.
pub fn sanitize_name(raw: &str) -> String {
    let replaced = INVALID_NAME_CHARS.replace_all(raw, "-");
    NAME_TRIM.replace_all(&replaced, "").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("My App"), "my-app");
        assert_eq!(sanitize_name("--cool_app!!"), "cool-app");
        assert_eq!(sanitize_name("v1.2 beta"), "v12-beta");
        assert_eq!(sanitize_name("   "), "");
    }

    #[test]
    fn test_validate() {
        assert!(Options::new("demo", "/tmp/demo").validate().is_ok());
        assert!(Options::new("", "/tmp/demo").validate().is_err());
        assert!(Options::new("../demo", "/tmp/demo").validate().is_err());
        assert!(Options::new("a/b", "/tmp/demo").validate().is_err());
        assert!(Options::new("demo", "").validate().is_err());
    }

    #[test]
    fn test_authentication_flags() {
        let mut auth = Authentication { enabled: true, ..Default::default() };
        assert!(auth.is_basic());
        assert!(!auth.is_passport());
        auth.mechanism = Some(Mechanism::Passport);
        assert!(auth.is_passport());
        auth.enabled = false;
        assert!(!auth.is_passport());
        assert!(!auth.is_basic());
    }
}
