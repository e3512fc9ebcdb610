//! Schema definitions and the match oracle backed by `jsonschema`.

use std::fmt;

use jsonschema::Validator;
use once_cell::sync::OnceCell;
use serde_json::Value;

use crate::error::{RegisterError, RewriteError};

/// A JSON Schema used to decide whether a value is rewritten by a rule.
///
/// The text is checked for JSON well-formedness when the schema is created.
/// Compilation is deferred until the schema is first evaluated, so a
/// structurally invalid schema is only reported by the rewrite that uses it.
pub struct Schema {
    text: String,
    value: Value,
    compiled: OnceCell<Result<Validator, String>>,
}

impl Schema {
    /// Parse a schema from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::InvalidSchema` if the text isn't valid JSON.
    pub fn parse(text: &str) -> Result<Self, RegisterError> {
        let value =
            serde_json::from_str(text).map_err(|source| RegisterError::InvalidSchema { source })?;
        Ok(Self {
            text: text.to_string(),
            value,
            compiled: OnceCell::new(),
        })
    }

    /// Build a schema from an already parsed JSON value.
    pub fn from_value(value: Value) -> Self {
        Self {
            text: value.to_string(),
            value,
            compiled: OnceCell::new(),
        }
    }

    /// The schema text as given at registration.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The parsed schema document.
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Compile the schema now instead of on first use.
    ///
    /// # Errors
    ///
    /// Returns `RewriteError::Oracle` if the validator rejects the schema.
    pub fn compile(&self) -> Result<(), RewriteError> {
        self.validator("").map(|_| ())
    }

    /// Check whether `value` validates against this schema.
    ///
    /// # Errors
    ///
    /// Returns `RewriteError::Oracle` if the schema cannot be compiled.
    pub fn is_match(&self, value: &Value) -> Result<bool, RewriteError> {
        self.is_match_at(value, "")
    }

    pub(crate) fn is_match_at(&self, value: &Value, path: &str) -> Result<bool, RewriteError> {
        Ok(self.validator(path)?.is_valid(value))
    }

    fn validator(&self, path: &str) -> Result<&Validator, RewriteError> {
        let compiled = self.compiled.get_or_init(|| {
            // Formats are assertions here: "format": "email" must reject non-emails.
            jsonschema::options()
                .should_validate_formats(true)
                .build(&self.value)
                .map_err(|e| e.to_string())
        });
        compiled.as_ref().map_err(|message| RewriteError::Oracle {
            path: path.to_string(),
            message: message.clone(),
        })
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("text", &self.text).finish()
    }
}
