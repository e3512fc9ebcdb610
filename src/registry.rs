//! Rule registry and the recursive rewrite engine.
//!
//! Rules are tested in registration order against each node. A matching
//! rule's transform replaces the node and the replacement is what later rules
//! see. Once the rule loop finishes, the engine descends into object members
//! and array elements and applies the whole rule list to each of them.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{RegisterError, RewriteError};
use crate::schema::Schema;
use crate::types::{json_type_name, BoxError, Outcome, Transform};

/// A schema paired with the transform applied to values matching it.
pub struct Rule {
    schema: Schema,
    transform: Arc<dyn Transform>,
}

impl Rule {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("schema", &self.schema).finish()
    }
}

#[derive(Clone)]
struct RuleSet {
    rules: Vec<Arc<Rule>>,
    recursive: bool,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            recursive: true,
        }
    }
}

/// An ordered, thread-safe collection of rewrite rules.
///
/// Registration and [`set_recursive_descent`](Self::set_recursive_descent)
/// take the write lock. [`rewrite`](Self::rewrite) and `clone` take the read
/// lock for their whole duration, so any number of rewrites run concurrently
/// but a registration waits for in-flight rewrites to finish.
///
/// A transform must not register rules on the registry that is running it;
/// that call would wait on the rewrite holding the read lock. Register on a
/// clone instead.
///
/// # Example
///
/// ```
/// use schema_rewrite::{Outcome, Registry};
/// use serde_json::json;
///
/// let registry = Registry::new();
/// registry
///     .register_fn(r#"{"type":"string","format":"email"}"#, |_| {
///         Ok(Outcome::Continue(json!("***@example.com")))
///     })
///     .unwrap();
///
/// let doc = json!({"email": "baz@example.com", "foo": "bar"});
/// let rewritten = registry.rewrite(doc).unwrap();
/// assert_eq!(rewritten, json!({"email": "***@example.com", "foo": "bar"}));
/// ```
#[derive(Default)]
pub struct Registry {
    inner: RwLock<RuleSet>,
}

impl Registry {
    /// Create an empty registry with recursive descent enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule matching `schema` to the end of the rule list.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::InvalidSchema` if `schema` isn't valid JSON.
    pub fn register<T>(&self, schema: &str, transform: T) -> Result<(), RegisterError>
    where
        T: Transform + 'static,
    {
        self.register_shared(schema, Some(Arc::new(transform)))
    }

    /// Append a rule whose transform is a closure.
    pub fn register_fn<F>(&self, schema: &str, f: F) -> Result<(), RegisterError>
    where
        F: Fn(Value) -> Result<Outcome, BoxError> + Send + Sync + 'static,
    {
        self.register(schema, f)
    }

    /// Append a rule with a shared transform.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::InvalidSchema` if `schema` isn't valid JSON,
    /// then `RegisterError::NilTransform` if `transform` is `None`. Either
    /// way the rule list is unchanged.
    pub fn register_shared(
        &self,
        schema: &str,
        transform: Option<Arc<dyn Transform>>,
    ) -> Result<(), RegisterError> {
        let mut set = self.inner.write();
        let schema = Schema::parse(schema)?;
        let transform = transform.ok_or(RegisterError::NilTransform)?;
        set.rules.push(Arc::new(Rule { schema, transform }));
        debug!(rules = set.rules.len(), schema = schema_of(&set), "registered rule");
        Ok(())
    }

    /// Append a rule for an already parsed schema.
    pub fn register_schema(&self, schema: Schema, transform: Arc<dyn Transform>) {
        let mut set = self.inner.write();
        set.rules.push(Arc::new(Rule { schema, transform }));
        debug!(rules = set.rules.len(), schema = schema_of(&set), "registered rule");
    }

    /// Toggle descent into object members and array elements.
    ///
    /// When disabled only the value passed to [`rewrite`](Self::rewrite) is
    /// tested against the rules.
    pub fn set_recursive_descent(&self, enabled: bool) {
        self.inner.write().recursive = enabled;
    }

    pub fn recursive_descent(&self) -> bool {
        self.inner.read().recursive
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.inner.read().rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().rules.is_empty()
    }

    /// Rewrite `value` with the registered rules.
    ///
    /// # Errors
    ///
    /// Returns the first schema evaluation or transform failure encountered,
    /// depth-first. No partial result is returned.
    pub fn rewrite(&self, value: Value) -> Result<Value, RewriteError> {
        let set = self.inner.read();
        let mut path = String::new();
        set.rewrite_node(value, &mut path)
    }

    /// Rewrite a raw JSON document.
    ///
    /// An empty input is returned as is.
    ///
    /// # Errors
    ///
    /// Returns `RewriteError::Parse` if `raw` isn't valid JSON and
    /// `RewriteError::Serialize` if the result can't be encoded, in addition
    /// to the errors of [`rewrite`](Self::rewrite).
    pub fn rewrite_slice(&self, raw: &[u8]) -> Result<Vec<u8>, RewriteError> {
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        let value = serde_json::from_slice(raw).map_err(|source| RewriteError::Parse { source })?;
        let rewritten = self.rewrite(value)?;
        serde_json::to_vec(&rewritten).map_err(|source| RewriteError::Serialize { source })
    }
}

impl Clone for Registry {
    /// Copy the rule list and recursion flag into an independent registry.
    ///
    /// Rules themselves are shared; registering on either copy afterwards
    /// does not affect the other.
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.inner.read().clone()),
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.inner.read();
        f.debug_struct("Registry")
            .field("rules", &set.rules)
            .field("recursive", &set.recursive)
            .finish()
    }
}

/// A registry nested as a rule's transform rewrites the matched subtree with
/// its own rules; the outer engine then carries on with the result.
impl Transform for Registry {
    fn transform(&self, value: Value) -> Result<Outcome, BoxError> {
        Ok(Outcome::Continue(self.rewrite(value)?))
    }
}

fn schema_of(set: &RuleSet) -> &str {
    set.rules.last().map(|r| r.schema.as_str()).unwrap_or_default()
}

impl RuleSet {
    fn rewrite_node(&self, mut value: Value, path: &mut String) -> Result<Value, RewriteError> {
        for (index, rule) in self.rules.iter().enumerate() {
            if !rule.schema.is_match_at(&value, path)? {
                continue;
            }
            trace!(rule = index, path = %path, kind = json_type_name(&value), "rule matched");

            let outcome = rule
                .transform
                .transform(value)
                .map_err(|source| RewriteError::Transform {
                    path: path.clone(),
                    source,
                })?;
            match outcome {
                Outcome::Continue(next) => value = next,
                Outcome::Abort(last) => {
                    debug!(rule = index, path = %path, "transform aborted further rewriting");
                    return Ok(last);
                }
            }
        }

        if !self.recursive {
            return Ok(value);
        }

        match value {
            Value::Object(map) => {
                let mut rewritten = Map::with_capacity(map.len());
                for (key, child) in map {
                    let len = path.len();
                    push_token(path, &key);
                    let child = self.rewrite_node(child, path)?;
                    path.truncate(len);
                    rewritten.insert(key, child);
                }
                Ok(Value::Object(rewritten))
            }
            Value::Array(items) => {
                let mut rewritten = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    let len = path.len();
                    path.push('/');
                    path.push_str(&index.to_string());
                    rewritten.push(self.rewrite_node(item, path)?);
                    path.truncate(len);
                }
                Ok(Value::Array(rewritten))
            }
            // Scalars have no children.
            other => Ok(other),
        }
    }
}

/// Append a JSON Pointer reference token (~ and / escaped per RFC 6901).
fn push_token(path: &mut String, key: &str) {
    path.push('/');
    for c in key.chars() {
        match c {
            '~' => path.push_str("~0"),
            '/' => path.push_str("~1"),
            c => path.push(c),
        }
    }
}
