//! Core types shared by rules and the rewrite engine.

use serde_json::Value;

/// Error type a transform returns for an ordinary failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Returns the JSON type name for log fields and error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Result of a transform that succeeded.
///
/// Determines what the engine does with the node after the replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Adopt the value and keep testing it against the remaining rules.
    Continue(Value),
    /// Adopt the value as final for this node.
    ///
    /// Remaining rules are skipped and the engine does not descend into the
    /// value, even if it is an object or array.
    Abort(Value),
}

impl Outcome {
    /// The replacement value.
    pub fn value(&self) -> &Value {
        match self {
            Outcome::Continue(v) | Outcome::Abort(v) => v,
        }
    }

    /// Consume the outcome, returning the replacement value.
    pub fn into_value(self) -> Value {
        match self {
            Outcome::Continue(v) | Outcome::Abort(v) => v,
        }
    }

    /// Whether the transform asked to stop rewriting this node.
    pub fn is_abort(&self) -> bool {
        matches!(self, Outcome::Abort(_))
    }
}

/// Rewrites a value that matched a rule's schema.
///
/// Implemented for plain functions and closures with the signature
/// `Fn(Value) -> Result<Outcome, BoxError>`, and for
/// [`Registry`](crate::Registry) so a rule set can be nested inside a rule.
pub trait Transform: Send + Sync {
    fn transform(&self, value: Value) -> Result<Outcome, BoxError>;
}

impl<F> Transform for F
where
    F: Fn(Value) -> Result<Outcome, BoxError> + Send + Sync,
{
    fn transform(&self, value: Value) -> Result<Outcome, BoxError> {
        self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_accessors() {
        let cont = Outcome::Continue(json!("a"));
        assert!(!cont.is_abort());
        assert_eq!(cont.value(), &json!("a"));

        let stop = Outcome::Abort(json!({"k": 1}));
        assert!(stop.is_abort());
        assert_eq!(stop.into_value(), json!({"k": 1}));
    }

    #[test]
    fn closures_are_transforms() {
        fn upper(value: Value) -> Result<Outcome, BoxError> {
            match value {
                Value::String(s) => Ok(Outcome::Continue(Value::String(s.to_uppercase()))),
                other => Err(format!("expected string, got {}", json_type_name(&other)).into()),
            }
        }

        assert_eq!(
            upper.transform(json!("ok")).unwrap(),
            Outcome::Continue(json!("OK"))
        );
        let err = upper.transform(json!(1)).unwrap_err();
        assert_eq!(err.to_string(), "expected string, got number");
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(true)), "boolean");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!("s")), "string");
        assert_eq!(json_type_name(&json!([])), "array");
        assert_eq!(json_type_name(&json!({})), "object");
    }
}
