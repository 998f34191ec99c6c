//! Generic item handlers.
//!
//! Every write runs the structural body checks first, then schema-driven
//! validation, and only then touches storage. Successful responses carry
//! the collection's hypermedia link set.

use crate::auth::Authable;
use crate::error::{CollectionError, CollectionResult};
use crate::server::core::{CollectionRequest, CollectionResponse, CollectionServer};
use crate::server::transaction::{Transaction, decode_object_body};
use crate::storage::Database;
use serde_json::{Map, Value, json};
use std::collections::HashMap;

impl<D: Database, A: Authable> CollectionServer<D, A> {
    pub(super) async fn create_item(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let item = decode_object_body(request.body.as_deref())?;
        transaction.item_schema.validate_item(&item)?;

        let stored = self
            .db
            .create_item(&transaction.collection_name, item)
            .await?;

        Ok(CollectionResponse::new(
            201,
            with_item_links(stored, transaction)?,
        ))
    }

    pub(super) async fn find_items(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let items: Vec<Value> = self
            .db
            .find_items(&transaction.collection_name)
            .await?
            .into_iter()
            .filter(|item| matches_query(item, &request.query))
            .collect();

        let links = transaction
            .item_schema
            .collection_view_links(&transaction.api_base);

        Ok(CollectionResponse::new(
            200,
            json!({
                "items": items,
                "itemCount": items.len(),
                "links": links,
            }),
        ))
    }

    pub(super) async fn find_one_item(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let first = self
            .db
            .find_items(&transaction.collection_name)
            .await?
            .into_iter()
            .find(|item| matches_query(item, &request.query))
            .ok_or_else(|| CollectionError::not_found("item not found"))?;

        Ok(CollectionResponse::new(
            200,
            with_item_links(first, transaction)?,
        ))
    }

    pub(super) async fn find_item_by_id(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let id = Self::resource_id(request)?;
        let item = self
            .db
            .find_item_by_id(&transaction.collection_name, id)
            .await?;

        Ok(CollectionResponse::new(
            200,
            with_item_links(item, transaction)?,
        ))
    }

    pub(super) async fn update_item(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let id = Self::resource_id(request)?;
        let patch = decode_object_body(request.body.as_deref())?;

        // decode-in-place: only fields present in the payload overwrite
        let existing = self
            .db
            .find_item_by_id(&transaction.collection_name, id)
            .await?;
        let mut item = match existing {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (field, value) in patch {
            item.insert(field, value);
        }

        transaction.item_schema.validate_item(&item)?;

        let stored = self
            .db
            .update_item(&transaction.collection_name, id, item)
            .await?;

        Ok(CollectionResponse::new(
            200,
            with_item_links(stored, transaction)?,
        ))
    }

    pub(super) async fn delete_item_by_id(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let id = Self::resource_id(request)?;
        self.db
            .delete_item_by_id(&transaction.collection_name, id)
            .await?;
        Ok(CollectionResponse::no_content())
    }
}

/// Embed the collection's item-level link set into an item document.
fn with_item_links(item: Value, transaction: &Transaction) -> CollectionResult<Value> {
    let mut schema = transaction.item_schema.clone();
    schema.attach_default_links(&transaction.api_base);
    let links = serde_json::to_value(&schema.links).map_err(|err| CollectionError::internal(err))?;

    let mut item = match item {
        Value::Object(map) => map,
        other => return Ok(other),
    };
    item.insert("links".to_string(), links);
    Ok(Value::Object(item))
}

/// Equality filters: every queried field must be present and render to the
/// queried string.
fn matches_query(item: &Value, query: &HashMap<String, String>) -> bool {
    query.iter().all(|(field, expected)| {
        item.get(field).is_some_and(|value| match value {
            Value::String(s) => s == expected,
            Value::Number(n) => n.to_string() == *expected,
            Value::Bool(b) => b.to_string() == *expected,
            _ => false,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_matches_on_rendered_values() {
        let item = json!({ "name": "ok", "age": 3, "active": true });

        let mut query = HashMap::new();
        query.insert("name".to_string(), "ok".to_string());
        query.insert("age".to_string(), "3".to_string());
        query.insert("active".to_string(), "true".to_string());
        assert!(matches_query(&item, &query));

        let mut query = HashMap::new();
        query.insert("name".to_string(), "other".to_string());
        assert!(!matches_query(&item, &query));

        let mut query = HashMap::new();
        query.insert("missing".to_string(), "x".to_string());
        assert!(!matches_query(&item, &query));
    }
}
