//! Per-request context.
//!
//! A `Transaction` is built once the collection's schema has been resolved
//! and is handed to the handler for that operation. It is request-local:
//! constructed, used, and dropped within one request.

use crate::error::{CollectionError, CollectionResult};
use crate::schema::ItemSchema;
use serde_json::{Map, Value};

/// Context for one collection-scoped request.
#[derive(Debug, Clone)]
pub struct Transaction {
    /// Identifier for logging and tracing.
    pub request_id: String,
    pub collection_name: String,
    /// The schema governing the collection, resolved from storage.
    pub item_schema: ItemSchema,
    /// Base URL hypermedia links are rewritten against.
    pub api_base: String,
}

impl Transaction {
    pub fn new(
        request_id: impl Into<String>,
        collection_name: impl Into<String>,
        item_schema: ItemSchema,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            collection_name: collection_name.into(),
            item_schema,
            api_base: api_base.into(),
        }
    }
}

/// Structural checks applied to a request body ahead of any schema-driven
/// validation: the body must be present, parse as JSON, and have an object
/// root.
pub(crate) fn decode_object_body(body: Option<&str>) -> CollectionResult<Map<String, Value>> {
    let raw = body.unwrap_or("");
    if raw.trim().is_empty() {
        return Err(CollectionError::bad_request("Empty resource"));
    }

    let value: Value = serde_json::from_str(raw)
        .map_err(|err| CollectionError::bad_request(format!("Invalid json: {}", err)))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CollectionError::bad_request("Json root not is an object")),
    }
}
