//! Storage capability consumed by the collection server.
//!
//! The [`Database`] trait is the seam between the schema/dispatch core and
//! whatever actually persists documents. It exposes find/create/update/
//! delete-by-key operations for item schemas (keyed by collection name, the
//! unique primary key) and for collection items (keyed by item id). Every
//! operation returns either a document payload or a structured error; the
//! core writes those errors through unchanged.
//!
//! Implementations must be `Send + Sync`: one database instance is shared
//! across all requests.

pub mod in_memory;

pub use in_memory::InMemoryDatabase;

use crate::error::CollectionResult;
use crate::schema::ItemSchema;
use serde_json::{Map, Value};
use std::future::Future;

/// Document storage for item schemas and collection items.
pub trait Database: Send + Sync {
    /// Persist a new item schema. The schema's collection name is the
    /// primary key; storing a duplicate is an error.
    fn create_item_schema(
        &self,
        schema: &ItemSchema,
    ) -> impl Future<Output = CollectionResult<()>> + Send;

    /// Look up the schema governing `collection_name`.
    fn find_item_schema_by_collection_name(
        &self,
        collection_name: &str,
    ) -> impl Future<Output = CollectionResult<ItemSchema>> + Send;

    /// All stored schemas, ordered by collection name.
    fn find_item_schemas(&self) -> impl Future<Output = CollectionResult<Vec<ItemSchema>>> + Send;

    /// Replace a stored schema, keyed by its collection name.
    fn update_item_schema(
        &self,
        schema: &ItemSchema,
    ) -> impl Future<Output = CollectionResult<()>> + Send;

    /// Delete a stored schema by collection name.
    fn delete_item_schema(
        &self,
        collection_name: &str,
    ) -> impl Future<Output = CollectionResult<()>> + Send;

    /// Store a new item in a collection, assigning an id when the document
    /// carries none. Returns the stored document.
    fn create_item(
        &self,
        collection_name: &str,
        item: Map<String, Value>,
    ) -> impl Future<Output = CollectionResult<Value>> + Send;

    /// All items of a collection, in stable id order.
    fn find_items(
        &self,
        collection_name: &str,
    ) -> impl Future<Output = CollectionResult<Vec<Value>>> + Send;

    /// One item by id.
    fn find_item_by_id(
        &self,
        collection_name: &str,
        id: &str,
    ) -> impl Future<Output = CollectionResult<Value>> + Send;

    /// Replace an existing item by id. Returns the stored document.
    fn update_item(
        &self,
        collection_name: &str,
        id: &str,
        item: Map<String, Value>,
    ) -> impl Future<Output = CollectionResult<Value>> + Send;

    /// Delete one item by id.
    fn delete_item_by_id(
        &self,
        collection_name: &str,
        id: &str,
    ) -> impl Future<Output = CollectionResult<()>> + Send;
}
