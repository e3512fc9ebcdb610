//! Declarative rules files.
//!
//! A rules file is a JSON array of entries, each replacing values that match
//! a schema with a constant:
//!
//! ```json
//! [
//!   {
//!     "description": "mask emails",
//!     "schema": { "type": "string", "format": "email" },
//!     "replace": "***@example.com"
//!   },
//!   {
//!     "schema": { "type": "object", "required": ["password"] },
//!     "replace": { "password": "[redacted]" },
//!     "abort": true
//!   }
//! ]
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::error::LoadError;
use crate::registry::Registry;
use crate::schema::Schema;
use crate::types::{BoxError, Outcome, Transform};

/// One entry of a rules file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    /// JSON Schema selecting the values to replace.
    pub schema: Value,
    /// Replacement value.
    pub replace: Value,
    /// Stop rule matching and recursion once replaced.
    #[serde(default)]
    pub abort: bool,
    #[serde(default)]
    pub description: Option<String>,
}

impl RuleSpec {
    /// Short label for diagnostics: the description, or the rule's position.
    pub fn label(&self, index: usize) -> String {
        match &self.description {
            Some(d) => format!("#{} ({})", index, d),
            None => format!("#{}", index),
        }
    }
}

/// Transform that replaces every matched value with a constant.
#[derive(Debug, Clone)]
pub struct Replace {
    value: Value,
    abort: bool,
}

impl Replace {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            abort: false,
        }
    }

    /// Signal abort alongside the replacement.
    pub fn abort(mut self, abort: bool) -> Self {
        self.abort = abort;
        self
    }
}

impl Transform for Replace {
    fn transform(&self, _value: Value) -> Result<Outcome, BoxError> {
        let value = self.value.clone();
        Ok(if self.abort {
            Outcome::Abort(value)
        } else {
            Outcome::Continue(value)
        })
    }
}

/// Load a rules file.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist,
/// `LoadError::InvalidJson` if it isn't valid JSON, or
/// `LoadError::InvalidRule` if an entry doesn't have the expected shape.
pub fn load_rules(path: &Path) -> Result<Vec<RuleSpec>, LoadError> {
    load_rules_str(&read_file(path)?)
}

/// Load rules from a JSON string.
pub fn load_rules_str(content: &str) -> Result<Vec<RuleSpec>, LoadError> {
    let entries: Vec<Value> =
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|e| LoadError::InvalidRule {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}

/// Load a JSON document from a file path.
pub fn load_document(path: &Path) -> Result<Value, LoadError> {
    serde_json::from_str(&read_file(path)?).map_err(|source| LoadError::InvalidJson { source })
}

/// Build a registry holding `rules` in file order.
pub fn build_registry(rules: &[RuleSpec]) -> Registry {
    let registry = Registry::new();
    for rule in rules {
        let transform = Replace::new(rule.replace.clone()).abort(rule.abort);
        registry.register_schema(Schema::from_value(rule.schema.clone()), Arc::new(transform));
    }
    registry
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })
}
