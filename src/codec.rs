//! Encode and decode adapters that run values through a registry.
//!
//! Every entry point takes a [`Rules`] choosing what rewrites the value: the
//! default registry, an explicit one, a single transform, or [`Rules::Void`]
//! to skip rewriting entirely.

use std::fmt;
use std::io::{Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::de::IoRead;
use serde_json::{StreamDeserializer, Value};

use crate::error::{CodecError, RewriteError};
use crate::global::default_registry;
use crate::registry::Registry;
use crate::types::{Outcome, Transform};

/// Which rule set an adapter rewrites with.
#[derive(Clone, Copy, Default)]
pub enum Rules<'a> {
    /// The process-wide default registry.
    #[default]
    Default,
    /// An explicit registry.
    Registry(&'a Registry),
    /// A single transform applied once to the whole value.
    ///
    /// Both [`Outcome::Continue`] and [`Outcome::Abort`] yield the
    /// transform's value; no schema matching or descent takes place.
    Transform(&'a dyn Transform),
    /// No rewriting; values pass through without touching the engine.
    Void,
}

impl<'a> Rules<'a> {
    fn is_void(self) -> bool {
        matches!(self, Rules::Void)
    }

    fn apply(self, value: Value) -> Result<Value, RewriteError> {
        match self {
            Rules::Default => default_registry().rewrite(value),
            Rules::Registry(registry) => registry.rewrite(value),
            Rules::Transform(transform) => transform
                .transform(value)
                .map(Outcome::into_value)
                .map_err(|source| RewriteError::Transform {
                    path: String::new(),
                    source,
                }),
            Rules::Void => Ok(value),
        }
    }
}

impl fmt::Debug for Rules<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rules::Default => f.write_str("Default"),
            Rules::Registry(registry) => f.debug_tuple("Registry").field(registry).finish(),
            Rules::Transform(_) => f.write_str("Transform(..)"),
            Rules::Void => f.write_str("Void"),
        }
    }
}

impl<'a> From<&'a Registry> for Rules<'a> {
    fn from(registry: &'a Registry) -> Self {
        Rules::Registry(registry)
    }
}

fn rewrite_serialized<T>(value: &T, rules: Rules<'_>) -> Result<Value, CodecError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)?;
    Ok(rules.apply(value)?)
}

/// Serialize `value` to JSON bytes, rewriting the result with `rules`.
pub fn to_vec<T>(value: &T, rules: Rules<'_>) -> Result<Vec<u8>, CodecError>
where
    T: Serialize + ?Sized,
{
    if rules.is_void() {
        return Ok(serde_json::to_vec(value)?);
    }
    Ok(serde_json::to_vec(&rewrite_serialized(value, rules)?)?)
}

/// Like [`to_vec`] but pretty-printed.
pub fn to_vec_pretty<T>(value: &T, rules: Rules<'_>) -> Result<Vec<u8>, CodecError>
where
    T: Serialize + ?Sized,
{
    if rules.is_void() {
        return Ok(serde_json::to_vec_pretty(value)?);
    }
    Ok(serde_json::to_vec_pretty(&rewrite_serialized(value, rules)?)?)
}

/// Like [`to_vec`] but returns a `String`.
pub fn to_string<T>(value: &T, rules: Rules<'_>) -> Result<String, CodecError>
where
    T: Serialize + ?Sized,
{
    if rules.is_void() {
        return Ok(serde_json::to_string(value)?);
    }
    Ok(serde_json::to_string(&rewrite_serialized(value, rules)?)?)
}

/// Parse JSON bytes, rewrite them with `rules`, then deserialize into `T`.
pub fn from_slice<T>(bytes: &[u8], rules: Rules<'_>) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    if rules.is_void() {
        return Ok(serde_json::from_slice(bytes)?);
    }
    let value = rules.apply(serde_json::from_slice(bytes)?)?;
    Ok(serde_json::from_value(value)?)
}

pub fn from_str<T>(s: &str, rules: Rules<'_>) -> Result<T, CodecError>
where
    T: DeserializeOwned,
{
    from_slice(s.as_bytes(), rules)
}

/// Writes one rewritten JSON value per [`encode`](Self::encode) call,
/// each followed by a newline.
pub struct Encoder<'a, W: Write> {
    writer: W,
    rules: Rules<'a>,
    pretty: bool,
}

impl<'a, W: Write> Encoder<'a, W> {
    /// Create an encoder using the default registry.
    pub fn new(writer: W) -> Self {
        Self::with_rules(writer, Rules::Default)
    }

    pub fn with_rules(writer: W, rules: Rules<'a>) -> Self {
        Self {
            writer,
            rules,
            pretty: false,
        }
    }

    pub fn set_rules(&mut self, rules: Rules<'a>) {
        self.rules = rules;
    }

    pub fn set_pretty(&mut self, pretty: bool) {
        self.pretty = pretty;
    }

    /// Serialize, rewrite and write `value`.
    ///
    /// Nothing is written if rewriting fails.
    pub fn encode<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        if self.rules.is_void() {
            self.write_value(value)?;
        } else {
            let rewritten = rewrite_serialized(value, self.rules)?;
            self.write_value(&rewritten)?;
        }
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn write_value<T>(&mut self, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, value)?;
        } else {
            serde_json::to_writer(&mut self.writer, value)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), CodecError> {
        Ok(self.writer.flush()?)
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Reads a stream of JSON values, rewriting each before deserializing it.
///
/// Values may be separated by whitespace or simply concatenated.
pub struct Decoder<'a, R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, Value>,
    rules: Rules<'a>,
}

impl<'a, R: Read> Decoder<'a, R> {
    /// Create a decoder using the default registry.
    pub fn new(reader: R) -> Self {
        Self::with_rules(reader, Rules::Default)
    }

    pub fn with_rules(reader: R, rules: Rules<'a>) -> Self {
        Self {
            stream: serde_json::Deserializer::from_reader(reader).into_iter(),
            rules,
        }
    }

    pub fn set_rules(&mut self, rules: Rules<'a>) {
        self.rules = rules;
    }

    /// Decode the next value.
    ///
    /// Returns `Ok(None)` once the input is exhausted.
    pub fn decode<T>(&mut self) -> Result<Option<T>, CodecError>
    where
        T: DeserializeOwned,
    {
        let Some(next) = self.stream.next() else {
            return Ok(None);
        };
        let value = self.rules.apply(next?)?;
        Ok(Some(serde_json::from_value(value)?))
    }

    /// Byte offset just past the last decoded value.
    pub fn byte_offset(&self) -> usize {
        self.stream.byte_offset()
    }
}
