//! Error types for rule registration, rewriting and the codec adapters.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::BoxError;

/// Errors returned when a rule cannot be registered.
///
/// A failed registration leaves the registry untouched.
#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("invalid schema: {source}")]
    InvalidSchema {
        #[source]
        source: serde_json::Error,
    },

    #[error("no transform given for rule")]
    NilTransform,
}

/// Errors that abort a rewrite.
///
/// Every variant is fatal for the whole top-level call: no partially
/// rewritten value is ever returned alongside one of these.
#[derive(Debug, Error)]
pub enum RewriteError {
    #[error("schema evaluation failed at {}: {message}", display_path(path))]
    Oracle { path: String, message: String },

    #[error("transform failed at {}: {source}", display_path(path))]
    Transform {
        path: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid JSON input: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize rewritten JSON: {source}")]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

/// Root pointer is the empty string; spell it out in messages.
fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "(root)"
    } else {
        path
    }
}

impl RewriteError {
    /// JSON Pointer (RFC 6901) of the node being processed, if known.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Oracle { path, .. } | Self::Transform { path, .. } => Some(path),
            Self::Parse { .. } | Self::Serialize { .. } => None,
        }
    }

    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

/// Errors from the encode/decode adapters.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),
}

impl CodecError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            CodecError::Io(_) => 3,
            CodecError::Json(e) if e.is_io() => 3,
            CodecError::Json(_) => 2,
            CodecError::Rewrite(e) => e.exit_code(),
        }
    }
}

/// Errors loading rules files and input documents.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid rule #{index}: {message}")]
    InvalidRule { index: usize, message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}
