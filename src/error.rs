//! Structured errors for collection operations.
//!
//! Every user-visible failure carries an HTTP status code and serializes to
//! the `{"errors": [...]}` wire document: one object per field, each holding
//! an ordered list of messages. Failures that are not tied to a specific
//! field are reported under the `_all` pseudo-field.

use serde::{Serialize, Serializer};
use serde_json::{Value, json};
use std::fmt;

/// A plain error tagged with an HTTP status code.
///
/// Built either from a fresh message (`new`) or by wrapping an underlying
/// error while preserving its message verbatim (`wraps`).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RequestError {
    message: String,
    status: u16,
}

impl RequestError {
    /// Build an error carrying a message and status code.
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Wrap an underlying error, preserving its message unaltered.
    pub fn wraps(err: impl fmt::Display, status: u16) -> Self {
        Self::new(err.to_string(), status)
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    fn errors_json(&self) -> Value {
        json!({ "errors": [ { "_all": [self.message] } ] })
    }
}

impl Serialize for RequestError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.errors_json().serialize(serializer)
    }
}

/// Accumulator for field-scoped validation failures.
///
/// Collects every violated rule before being returned, so a client can fix
/// all fields in one round trip. Field order and per-field message order are
/// insertion order. Always reports HTTP 422.
///
/// The `Display` form surfaces only the first field's first message (empty
/// when no fields are present); the JSON form carries every entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationError {
    entries: Vec<(String, Vec<String>)>,
}

impl ValidationError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message under `field`, creating the field entry on first use.
    pub fn put(&mut self, field: impl Into<String>, message: impl Into<String>) {
        let field = field.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some((_, messages)) => messages.push(message.into()),
            None => self.entries.push((field, vec![message.into()])),
        }
    }

    /// Number of distinct fields with at least one message.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Messages recorded for `field`, in insertion order.
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, messages)| messages.as_slice())
    }

    pub fn status_code(&self) -> u16 {
        422
    }

    fn errors_json(&self) -> Value {
        let errors: Vec<Value> = self
            .entries
            .iter()
            .map(|(field, messages)| {
                let mut entry = serde_json::Map::new();
                entry.insert(field.clone(), json!(messages));
                Value::Object(entry)
            })
            .collect();
        json!({ "errors": errors })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.entries.first() {
            Some((field, messages)) => write!(f, "{}: {}", field, messages[0]),
            None => Ok(()),
        }
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.errors_json().serialize(serializer)
    }
}

/// Unified error type for collection operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CollectionError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl CollectionError {
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self::Request(RequestError::new(message, status))
    }

    /// Wrap an underlying failure's message without altering it.
    pub fn wraps(err: impl fmt::Display, status: u16) -> Self {
        Self::Request(RequestError::wraps(err, status))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(message, 400)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(message, 401)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(message, 404)
    }

    /// Storage or other internal failure, surfaced as 500.
    pub fn internal(err: impl fmt::Display) -> Self {
        Self::wraps(err, 500)
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Request(err) => err.status_code(),
            Self::Validation(err) => err.status_code(),
        }
    }
}

impl Serialize for CollectionError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Request(err) => err.serialize(serializer),
            Self::Validation(err) => err.serialize(serializer),
        }
    }
}

pub type CollectionResult<T> = Result<T, CollectionError>;
