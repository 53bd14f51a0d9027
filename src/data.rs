//! Key/value data substituted into templates.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Mapping from string keys to JSON values handed to a template at render time.
///
/// A generation run holds one base map; each render operation may carry an overlay
/// that is merged on top of it with [`TemplateData::merged`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TemplateData(Map<String, Value>);

impl TemplateData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds template data from any value that serializes to a JSON object.
    ///
    /// # Errors
    /// * `Error::TemplateError` if the value does not serialize to an object
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::TemplateError(format!(
                "template data must be an object, got {other}"
            ))),
        }
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new map with `overlay` applied on top of `self`.
    /// Top-level keys present in both take the overlay's value.
    pub fn merged(&self, overlay: &TemplateData) -> TemplateData {
        let mut merged = self.0.clone();
        for (key, value) in &overlay.0 {
            merged.insert(key.clone(), value.clone());
        }
        TemplateData(merged)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for TemplateData {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
