//! The generated `package.json`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Result;

/// Package manifest of the generated project.
///
/// Dependency maps are ordered by package name so the serialized output is
/// byte-for-byte deterministic. Any other top-level field of the base manifest is
/// kept in its original position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub metadata: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub scripts: IndexMap<String, String>,
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,
    #[serde(default)]
    pub dev_dependencies: BTreeMap<String, String>,
}

impl PackageManifest {
    /// Parses the base manifest of the template set and names it.
    ///
    /// # Errors
    /// * `Error::JsonError` if `base` is not a valid manifest
    pub fn from_base(name: &str, base: &str) -> Result<Self> {
        let mut manifest: PackageManifest = serde_json::from_str(base)?;
        manifest.name = name.to_string();
        Ok(manifest)
    }

    pub fn add_script<K: Into<String>, V: Into<String>>(&mut self, name: K, command: V) {
        self.scripts.insert(name.into(), command.into());
    }

    /// Adds or replaces a runtime dependency.
    pub fn add_dependency<K: Into<String>, V: Into<String>>(&mut self, name: K, version: V) {
        self.dependencies.insert(name.into(), version.into());
    }

    /// Adds or replaces a development dependency.
    pub fn add_dev_dependency<K: Into<String>, V: Into<String>>(&mut self, name: K, version: V) {
        self.dev_dependencies.insert(name.into(), version.into());
    }

    /// Serializes with two-space indentation and a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}
