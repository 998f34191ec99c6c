//! In-memory [`Database`] implementation.
//!
//! Thread-safe storage over async `RwLock`-guarded maps, intended for tests
//! and development setups. Schemas are keyed by collection name, items by a
//! generated uuid; both maps are ordered so listings are stable. Items are
//! stamped with `createdAt`/`updatedAt` in RFC 3339.

use crate::error::{CollectionError, CollectionResult, ValidationError};
use crate::schema::ItemSchema;
use crate::storage::Database;
use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

type ItemMap = BTreeMap<String, Map<String, Value>>;

/// Thread-safe in-memory document store.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    schemas: Arc<RwLock<BTreeMap<String, ItemSchema>>>,
    // collection name -> item id -> document
    items: Arc<RwLock<BTreeMap<String, ItemMap>>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored schemas and items.
    pub async fn clear(&self) {
        self.schemas.write().await.clear();
        self.items.write().await.clear();
    }

    fn schema_not_found(collection_name: &str) -> CollectionError {
        CollectionError::not_found(format!("item-schema \"{}\" not found", collection_name))
    }

    fn item_not_found(collection_name: &str, id: &str) -> CollectionError {
        CollectionError::not_found(format!("item \"{}/{}\" not found", collection_name, id))
    }
}

impl Database for InMemoryDatabase {
    async fn create_item_schema(&self, schema: &ItemSchema) -> CollectionResult<()> {
        let mut schemas = self.schemas.write().await;
        if schemas.contains_key(&schema.collection_name) {
            let mut errors = ValidationError::new();
            errors.put("collectionName", "already exists.");
            return Err(errors.into());
        }
        schemas.insert(schema.collection_name.clone(), schema.clone());
        Ok(())
    }

    async fn find_item_schema_by_collection_name(
        &self,
        collection_name: &str,
    ) -> CollectionResult<ItemSchema> {
        let schemas = self.schemas.read().await;
        schemas
            .get(collection_name)
            .cloned()
            .ok_or_else(|| Self::schema_not_found(collection_name))
    }

    async fn find_item_schemas(&self) -> CollectionResult<Vec<ItemSchema>> {
        let schemas = self.schemas.read().await;
        Ok(schemas.values().cloned().collect())
    }

    async fn update_item_schema(&self, schema: &ItemSchema) -> CollectionResult<()> {
        let mut schemas = self.schemas.write().await;
        if !schemas.contains_key(&schema.collection_name) {
            return Err(Self::schema_not_found(&schema.collection_name));
        }
        schemas.insert(schema.collection_name.clone(), schema.clone());
        Ok(())
    }

    async fn delete_item_schema(&self, collection_name: &str) -> CollectionResult<()> {
        let mut schemas = self.schemas.write().await;
        if schemas.remove(collection_name).is_none() {
            return Err(Self::schema_not_found(collection_name));
        }
        // items of the collection stay; deleting a schema does not migrate
        // or drop data
        Ok(())
    }

    async fn create_item(
        &self,
        collection_name: &str,
        mut item: Map<String, Value>,
    ) -> CollectionResult<Value> {
        let id = match item.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                item.insert("id".to_string(), Value::String(id.clone()));
                id
            }
        };

        let now = Utc::now().to_rfc3339();
        item.insert("createdAt".to_string(), Value::String(now.clone()));
        item.insert("updatedAt".to_string(), Value::String(now));

        let mut items = self.items.write().await;
        items
            .entry(collection_name.to_string())
            .or_default()
            .insert(id, item.clone());

        Ok(Value::Object(item))
    }

    async fn find_items(&self, collection_name: &str) -> CollectionResult<Vec<Value>> {
        let items = self.items.read().await;
        Ok(items
            .get(collection_name)
            .map(|collection| {
                collection
                    .values()
                    .map(|item| Value::Object(item.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_item_by_id(&self, collection_name: &str, id: &str) -> CollectionResult<Value> {
        let items = self.items.read().await;
        items
            .get(collection_name)
            .and_then(|collection| collection.get(id))
            .map(|item| Value::Object(item.clone()))
            .ok_or_else(|| Self::item_not_found(collection_name, id))
    }

    async fn update_item(
        &self,
        collection_name: &str,
        id: &str,
        mut item: Map<String, Value>,
    ) -> CollectionResult<Value> {
        let mut items = self.items.write().await;
        let collection = items
            .get_mut(collection_name)
            .ok_or_else(|| Self::item_not_found(collection_name, id))?;
        if !collection.contains_key(id) {
            return Err(Self::item_not_found(collection_name, id));
        }

        item.insert("id".to_string(), Value::String(id.to_string()));
        item.insert(
            "updatedAt".to_string(),
            Value::String(Utc::now().to_rfc3339()),
        );
        collection.insert(id.to_string(), item.clone());

        Ok(Value::Object(item))
    }

    async fn delete_item_by_id(&self, collection_name: &str, id: &str) -> CollectionResult<()> {
        let mut items = self.items.write().await;
        let removed = items
            .get_mut(collection_name)
            .and_then(|collection| collection.remove(id));
        if removed.is_none() {
            return Err(Self::item_not_found(collection_name, id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[tokio::test]
    async fn schema_round_trip() {
        let db = InMemoryDatabase::new();
        let schema = ItemSchema::new("acme-users");

        db.create_item_schema(&schema).await.unwrap();
        let found = db
            .find_item_schema_by_collection_name("acme-users")
            .await
            .unwrap();
        assert_eq!(found, schema);
    }

    #[tokio::test]
    async fn duplicate_collection_name_is_a_validation_error() {
        let db = InMemoryDatabase::new();
        let schema = ItemSchema::new("acme-users");

        db.create_item_schema(&schema).await.unwrap();
        let err = db.create_item_schema(&schema).await.unwrap_err();
        assert_eq!(err.status_code(), 422);
        assert_eq!(err.to_string(), "collectionName: already exists.");
    }

    #[tokio::test]
    async fn missing_schema_is_not_found() {
        let db = InMemoryDatabase::new();
        let err = db
            .find_item_schema_by_collection_name("acme-users")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = db.delete_item_schema("acme-users").await.unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = db
            .update_item_schema(&ItemSchema::new("acme-users"))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn schemas_list_in_name_order() {
        let db = InMemoryDatabase::new();
        db.create_item_schema(&ItemSchema::new("ns-b")).await.unwrap();
        db.create_item_schema(&ItemSchema::new("ns-a")).await.unwrap();

        let names: Vec<String> = db
            .find_item_schemas()
            .await
            .unwrap()
            .into_iter()
            .map(|schema| schema.collection_name)
            .collect();
        assert_eq!(names, vec!["ns-a", "ns-b"]);
    }

    #[tokio::test]
    async fn create_item_assigns_id_and_stamps() {
        let db = InMemoryDatabase::new();
        let stored = db
            .create_item("acme-users", object(json!({ "name": "ok" })))
            .await
            .unwrap();

        assert_eq!(stored["name"], "ok");
        assert!(stored["id"].is_string());
        assert!(stored["createdAt"].is_string());
        assert_eq!(stored["createdAt"], stored["updatedAt"]);

        let id = stored["id"].as_str().unwrap();
        let found = db.find_item_by_id("acme-users", id).await.unwrap();
        assert_eq!(found, stored);
    }

    #[tokio::test]
    async fn update_item_replaces_and_restamps() {
        let db = InMemoryDatabase::new();
        let stored = db
            .create_item("acme-users", object(json!({ "name": "ok" })))
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        let updated = db
            .update_item(
                "acme-users",
                id,
                object(json!({ "name": "changed", "createdAt": stored["createdAt"] })),
            )
            .await
            .unwrap();

        assert_eq!(updated["name"], "changed");
        assert_eq!(updated["id"], stored["id"]);
        assert_eq!(updated["createdAt"], stored["createdAt"]);
    }

    #[tokio::test]
    async fn delete_item_removes_it() {
        let db = InMemoryDatabase::new();
        let stored = db
            .create_item("acme-users", object(json!({ "name": "ok" })))
            .await
            .unwrap();
        let id = stored["id"].as_str().unwrap();

        db.delete_item_by_id("acme-users", id).await.unwrap();

        let err = db
            .find_item_by_id("acme-users", id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);

        let err = db
            .delete_item_by_id("acme-users", id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn find_items_on_unknown_collection_is_empty() {
        let db = InMemoryDatabase::new();
        assert!(db.find_items("acme-users").await.unwrap().is_empty());
    }
}
