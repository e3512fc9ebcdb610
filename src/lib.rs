//! Schema-driven JSON rewriting.
//!
//! A [`Registry`] holds an ordered list of rules, each pairing a JSON Schema
//! with a [`Transform`]. Rewriting a document replaces every value that
//! validates against a rule's schema with that rule's transform output,
//! wherever the value sits in the document.
//!
//! # Example
//!
//! ```
//! use schema_rewrite::{Outcome, Registry};
//! use serde_json::json;
//!
//! let registry = Registry::new();
//! registry
//!     .register_fn(r#"{"type":"string"}"#, |v| {
//!         let s = v.as_str().unwrap_or_default().to_uppercase();
//!         Ok(Outcome::Continue(json!(s)))
//!     })
//!     .unwrap();
//! registry
//!     .register_fn(r#"{"type":"string","pattern":"^[A-Z]+$"}"#, |v| {
//!         Ok(Outcome::Continue(json!(format!("{}!", v.as_str().unwrap_or_default()))))
//!     })
//!     .unwrap();
//!
//! // The second rule sees the first rule's output.
//! assert_eq!(registry.rewrite(json!("ok")).unwrap(), json!("OK!"));
//! ```
//!
//! # Matching rules
//!
//! | Step | Behavior |
//! |------|----------|
//! | Rule loop | Rules are tested in registration order against the current value |
//! | [`Outcome::Continue`] | The replacement becomes the current value for later rules |
//! | [`Outcome::Abort`] | The replacement is final: later rules and descent are skipped |
//! | Descent | Object members and array elements are rewritten independently |
//!
//! Descent can be turned off with [`Registry::set_recursive_descent`].
//!
//! # Encoding and decoding
//!
//! The [`to_vec`], [`from_slice`], [`Encoder`] and [`Decoder`] adapters run
//! serde values through a registry chosen by [`Rules`]: the process-wide
//! [`default_registry`], an explicit registry, or [`Rules::Void`] to bypass
//! rewriting.

mod codec;
mod error;
mod global;
mod loader;
mod registry;
mod schema;
mod types;

pub use codec::{
    from_slice, from_str, to_string, to_vec, to_vec_pretty, Decoder, Encoder, Rules,
};
pub use error::{CodecError, LoadError, RegisterError, RewriteError};
pub use global::{default_registry, register, register_fn, rewrite, set_recursive_descent};
pub use loader::{build_registry, load_document, load_rules, load_rules_str, Replace, RuleSpec};
pub use registry::{Registry, Rule};
pub use schema::Schema;
pub use types::{json_type_name, BoxError, Outcome, Transform};
