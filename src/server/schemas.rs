//! Item-schema handlers.
//!
//! Schema writes follow decode, default-fill, validate, persist; validation
//! failure aborts the write and the stored document is untouched. Outbound
//! schema documents carry their default link set, rewritten against the
//! configured base URL.

use crate::auth::Authable;
use crate::error::{CollectionError, CollectionResult};
use crate::schema::ItemSchema;
use crate::server::core::{CollectionRequest, CollectionResponse, CollectionServer};
use crate::server::transaction::{Transaction, decode_object_body};
use crate::storage::Database;
use serde_json::{Value, json};

impl<D: Database, A: Authable> CollectionServer<D, A> {
    pub(super) async fn create_item_schema(
        &self,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let document = decode_object_body(request.body.as_deref())?;
        let schema = ItemSchema::from_object(document)?;
        schema.validate()?;

        self.db.create_item_schema(&schema).await?;

        Ok(CollectionResponse::new(
            201,
            render_schema(schema, &self.config().api_base())?,
        ))
    }

    pub(super) async fn list_item_schemas(&self) -> CollectionResult<CollectionResponse> {
        let api_base = self.config().api_base();
        let schemas = self.db.find_item_schemas().await?;

        let items = schemas
            .into_iter()
            .map(|schema| render_schema(schema, &api_base))
            .collect::<CollectionResult<Vec<Value>>>()?;

        Ok(CollectionResponse::new(
            200,
            json!({ "items": items, "itemCount": items.len() }),
        ))
    }

    pub(super) async fn find_one_item_schema(
        &self,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let schema = self
            .db
            .find_item_schemas()
            .await?
            .into_iter()
            .find(|schema| match request.query.get("collectionName") {
                Some(name) => schema.collection_name == *name,
                None => true,
            })
            .ok_or_else(|| CollectionError::not_found("item-schema not found"))?;

        Ok(CollectionResponse::new(
            200,
            render_schema(schema, &self.config().api_base())?,
        ))
    }

    pub(super) async fn find_item_schema(
        &self,
        transaction: &Transaction,
    ) -> CollectionResult<CollectionResponse> {
        Ok(CollectionResponse::new(
            200,
            render_schema(transaction.item_schema.clone(), &transaction.api_base)?,
        ))
    }

    pub(super) async fn update_item_schema(
        &self,
        transaction: &Transaction,
        request: &CollectionRequest,
    ) -> CollectionResult<CollectionResponse> {
        let patch = decode_object_body(request.body.as_deref())?;

        let mut schema = transaction.item_schema.clone();
        schema.merge_object(patch)?;
        // the name is the primary key; the resolved collection stays
        // authoritative
        schema.collection_name = transaction.collection_name.clone();
        schema.validate()?;

        self.db.update_item_schema(&schema).await?;

        Ok(CollectionResponse::new(
            200,
            render_schema(schema, &transaction.api_base)?,
        ))
    }

    pub(super) async fn delete_item_schema(
        &self,
        transaction: &Transaction,
    ) -> CollectionResult<CollectionResponse> {
        self.db
            .delete_item_schema(&transaction.collection_name)
            .await?;
        Ok(CollectionResponse::no_content())
    }

    /// Collection-level view of the schema: display metadata plus the
    /// collection link set. Derived per response, never persisted.
    pub(super) async fn find_collection_schema(
        &self,
        transaction: &Transaction,
    ) -> CollectionResult<CollectionResponse> {
        let schema = &transaction.item_schema;
        let links = schema.collection_view_links(&transaction.api_base);

        let title = schema
            .collection_title
            .clone()
            .or_else(|| schema.title.clone());

        Ok(CollectionResponse::new(
            200,
            json!({
                "$schema": schema.schema_version,
                "collectionName": schema.collection_name,
                "title": title,
                "links": links,
            }),
        ))
    }
}

/// Serialize a schema with its default links attached.
fn render_schema(mut schema: ItemSchema, api_base: &str) -> CollectionResult<Value> {
    schema.attach_default_links(api_base);
    serde_json::to_value(&schema).map_err(|err| CollectionError::internal(err))
}
