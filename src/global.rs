//! The process-wide default registry.
//!
//! Created empty with recursive descent enabled on first use and never torn
//! down. Encoders and decoders that are not given an explicit registry use it.

use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::{RegisterError, RewriteError};
use crate::registry::Registry;
use crate::types::{BoxError, Outcome, Transform};

static DEFAULT_REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// The process-wide default registry.
pub fn default_registry() -> &'static Registry {
    &DEFAULT_REGISTRY
}

/// Append a rule to the default registry.
///
/// See [`Registry::register`].
pub fn register<T>(schema: &str, transform: T) -> Result<(), RegisterError>
where
    T: Transform + 'static,
{
    DEFAULT_REGISTRY.register(schema, transform)
}

/// Append a closure rule to the default registry.
pub fn register_fn<F>(schema: &str, f: F) -> Result<(), RegisterError>
where
    F: Fn(Value) -> Result<Outcome, BoxError> + Send + Sync + 'static,
{
    DEFAULT_REGISTRY.register_fn(schema, f)
}

/// Toggle recursive descent on the default registry.
pub fn set_recursive_descent(enabled: bool) {
    DEFAULT_REGISTRY.set_recursive_descent(enabled);
}

/// Rewrite `value` with the default registry.
pub fn rewrite(value: Value) -> Result<Value, RewriteError> {
    DEFAULT_REGISTRY.rewrite(value)
}
