//! Hierarchical configuration values.
//!
//! Applications declare their settings with defaults at startup, then merge
//! one or more YAML documents on top. Values are read by dotted path:
//!
//! ```
//! use dispatch::ConfigNode;
//! use serde_json::json;
//!
//! let mut config = ConfigNode::new();
//! let defaults = json!({ "required": 2 }).as_object().cloned().unwrap_or_default();
//! config.create_config("reviews", None, defaults).unwrap();
//! config.load_yaml_str("reviews:\n  required: 3\n").unwrap();
//! assert_eq!(config.get_as::<u64>("reviews.required").unwrap(), 3);
//! ```
//!
//! Nested mappings merge key by key. Anything else (scalars, sequences)
//! replaces the previous value.

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Errors
// ============================================================================

/// Errors from configuration lookups and loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("No such config value: {path}. And there is no default value for it")]
    Missing { path: String },

    /// The path names a section where a value was expected.
    #[error("Config path '{path}' is a section, not a value")]
    NotAValue { path: String },

    /// The path names a value where a section was expected.
    #[error("Config path '{path}' is a value, not a section")]
    NotASection { path: String },

    #[error("Config value '{path}' has the wrong type: {message}")]
    InvalidType { path: String, message: String },

    #[error("Config '{name}' cannot have both a default value and default values for sub values")]
    ConflictingDefaults { name: String },

    #[error("Invalid configuration document: {message}")]
    Parse { message: String },
}

// ============================================================================
// Tree
// ============================================================================

/// A single entry in a [`ConfigNode`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Leaf(Value),
    Node(ConfigNode),
}

impl ConfigValue {
    /// Converts the entry back to JSON. Sections become objects.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(value) => value.clone(),
            Self::Node(node) => node.to_json(),
        }
    }
}

/// A section of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigNode {
    entries: BTreeMap<String, ConfigValue>,
}

impl ConfigNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys of this section in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Merge `values` into this section.
    ///
    /// A nested object merges into the existing section of the same name,
    /// creating it (or replacing a plain value) as needed. Every other value
    /// overwrites whatever was there.
    pub fn set_values(&mut self, values: Map<String, Value>) {
        for (key, value) in values {
            match value {
                Value::Object(nested) => {
                    let entry = self
                        .entries
                        .entry(key)
                        .or_insert_with(|| ConfigValue::Node(ConfigNode::new()));
                    if let ConfigValue::Leaf(_) = entry {
                        *entry = ConfigValue::Node(ConfigNode::new());
                    }
                    if let ConfigValue::Node(node) = entry {
                        node.set_values(nested);
                    }
                }
                other => {
                    self.entries.insert(key, ConfigValue::Leaf(other));
                }
            }
        }
    }

    /// Declare `name` with either a default value or a section of defaults.
    ///
    /// Any existing entry named `name` is replaced. With neither a default
    /// nor sub values, `name` becomes an empty section.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ConflictingDefaults`] if both `default` and `values`
    ///   are given
    pub fn create_config(
        &mut self,
        name: &str,
        default: Option<Value>,
        values: Map<String, Value>,
    ) -> Result<(), ConfigError> {
        if default.is_some() && !values.is_empty() {
            return Err(ConfigError::ConflictingDefaults {
                name: name.to_string(),
            });
        }

        let entry = match default {
            Some(Value::Object(nested)) => {
                let mut node = ConfigNode::new();
                node.set_values(nested);
                ConfigValue::Node(node)
            }
            Some(value) => ConfigValue::Leaf(value),
            None => {
                let mut node = ConfigNode::new();
                node.set_values(values);
                ConfigValue::Node(node)
            }
        };
        debug!(name, "Declared config value");
        self.entries.insert(name.to_string(), entry);
        Ok(())
    }

    /// Merge a YAML document into the tree.
    ///
    /// An empty document is treated as an empty mapping.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] if the text is not YAML or its top level is
    ///   not a mapping
    pub fn load_yaml_str(&mut self, text: &str) -> Result<(), ConfigError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        let document: Value = serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
            message: format!("Invalid YAML: {}", e),
        })?;

        match document {
            Value::Null => Ok(()),
            Value::Object(values) => {
                self.set_values(values);
                Ok(())
            }
            other => Err(ConfigError::Parse {
                message: format!("top level must be a mapping, found {}", kind(&other)),
            }),
        }
    }

    /// Merge a YAML file into the tree.
    ///
    /// Returns `false` without changing anything if the file does not exist;
    /// an absent configuration file leaves the defaults in place.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] if the file cannot be read or parsed
    pub fn load_yaml_file(&mut self, path: &Path) -> Result<bool, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found; keeping defaults");
            return Ok(false);
        }
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        self.load_yaml_str(&contents)?;
        Ok(true)
    }

    /// Look up an entry by dotted path.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Missing`] if any segment of the path is absent
    /// - [`ConfigError::NotASection`] if the path descends through a value
    pub fn get(&self, path: &str) -> Result<&ConfigValue, ConfigError> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.entry(first, path)?;

        for segment in segments {
            match current {
                ConfigValue::Node(node) => current = node.entry(segment, path)?,
                ConfigValue::Leaf(_) => {
                    return Err(ConfigError::NotASection {
                        path: path.to_string(),
                    })
                }
            }
        }
        Ok(current)
    }

    /// Look up a plain value by dotted path.
    pub fn value(&self, path: &str) -> Result<&Value, ConfigError> {
        match self.get(path)? {
            ConfigValue::Leaf(value) => Ok(value),
            ConfigValue::Node(_) => Err(ConfigError::NotAValue {
                path: path.to_string(),
            }),
        }
    }

    /// Look up a section by dotted path.
    pub fn section(&self, path: &str) -> Result<&ConfigNode, ConfigError> {
        match self.get(path)? {
            ConfigValue::Node(node) => Ok(node),
            ConfigValue::Leaf(_) => Err(ConfigError::NotASection {
                path: path.to_string(),
            }),
        }
    }

    /// Look up an entry and deserialize it as `T`.
    ///
    /// Sections deserialize from their object form, so a whole section can be
    /// read into a struct.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T, ConfigError> {
        let value = self.get(path)?.to_json();
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidType {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_ok()
    }

    /// The section as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.entries
                .iter()
                .map(|(key, value)| (key.clone(), value.to_json()))
                .collect(),
        )
    }

    fn entry(&self, key: &str, path: &str) -> Result<&ConfigValue, ConfigError> {
        self.entries.get(key).ok_or_else(|| ConfigError::Missing {
            path: path.to_string(),
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
