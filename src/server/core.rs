//! Core server structure and operation dispatch.
//!
//! `CollectionServer` holds named references to the `Database` and
//! `Authable` capabilities plus the startup configuration. For
//! collection-scoped operations it resolves the governing schema before the
//! handler runs; resolution failure short-circuits with the database's
//! reported error.

use crate::auth::{Authable, User};
use crate::config::ServerConfig;
use crate::error::{CollectionError, CollectionResult};
use crate::server::transaction::Transaction;
use crate::storage::Database;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Operations the server can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    CreateItem,
    FindItems,
    FindOneItem,
    FindItemById,
    UpdateItem,
    DeleteItemById,
    CreateItemSchema,
    ListItemSchemas,
    FindOneItemSchema,
    FindItemSchema,
    UpdateItemSchema,
    DeleteItemSchema,
    FindCollectionSchema,
    HealthCheck,
}

/// One inbound request, already stripped of transport detail.
///
/// The body is carried raw so the structural checks (empty body, malformed
/// JSON, non-object root) can report their own errors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectionRequest {
    pub operation: Operation,
    pub collection_name: Option<String>,
    pub resource_id: Option<String>,
    pub body: Option<String>,
    /// Equality filters for list/find-one operations.
    pub query: HashMap<String, String>,
    pub token: Option<String>,
    pub request_id: Option<String>,
}

impl Default for Operation {
    fn default() -> Self {
        Operation::HealthCheck
    }
}

impl CollectionRequest {
    fn collection_scoped(operation: Operation, collection_name: impl Into<String>) -> Self {
        Self {
            operation,
            collection_name: Some(collection_name.into()),
            ..Self::default()
        }
    }

    pub fn create_item(collection_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::collection_scoped(Operation::CreateItem, collection_name)
        }
    }

    pub fn find_items(collection_name: impl Into<String>) -> Self {
        Self::collection_scoped(Operation::FindItems, collection_name)
    }

    pub fn find_one_item(collection_name: impl Into<String>) -> Self {
        Self::collection_scoped(Operation::FindOneItem, collection_name)
    }

    pub fn find_item_by_id(collection_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(id.into()),
            ..Self::collection_scoped(Operation::FindItemById, collection_name)
        }
    }

    pub fn update_item(
        collection_name: impl Into<String>,
        id: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            resource_id: Some(id.into()),
            body: Some(body.into()),
            ..Self::collection_scoped(Operation::UpdateItem, collection_name)
        }
    }

    pub fn delete_item_by_id(collection_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_id: Some(id.into()),
            ..Self::collection_scoped(Operation::DeleteItemById, collection_name)
        }
    }

    pub fn create_item_schema(body: impl Into<String>) -> Self {
        Self {
            operation: Operation::CreateItemSchema,
            body: Some(body.into()),
            ..Self::default()
        }
    }

    pub fn list_item_schemas() -> Self {
        Self {
            operation: Operation::ListItemSchemas,
            ..Self::default()
        }
    }

    pub fn find_one_item_schema() -> Self {
        Self {
            operation: Operation::FindOneItemSchema,
            ..Self::default()
        }
    }

    pub fn find_item_schema(collection_name: impl Into<String>) -> Self {
        Self::collection_scoped(Operation::FindItemSchema, collection_name)
    }

    pub fn update_item_schema(collection_name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::collection_scoped(Operation::UpdateItemSchema, collection_name)
        }
    }

    pub fn delete_item_schema(collection_name: impl Into<String>) -> Self {
        Self::collection_scoped(Operation::DeleteItemSchema, collection_name)
    }

    pub fn find_collection_schema(collection_name: impl Into<String>) -> Self {
        Self::collection_scoped(Operation::FindCollectionSchema, collection_name)
    }

    pub fn health_check() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(field.into(), value.into());
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// One outbound response: an HTTP status code and a JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionResponse {
    pub status: u16,
    pub body: Value,
}

impl CollectionResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn no_content() -> Self {
        Self::new(204, Value::Null)
    }

    pub fn from_error(err: &CollectionError) -> Self {
        Self::new(
            err.status_code(),
            serde_json::to_value(err).unwrap_or(Value::Null),
        )
    }
}

/// Schema-driven collection server.
///
/// # Type Parameters
///
/// * `D` - the storage capability
/// * `A` - the authentication capability
pub struct CollectionServer<D, A> {
    pub(super) db: Arc<D>,
    auth: Arc<A>,
    config: ServerConfig,
}

impl<D: Database, A: Authable> CollectionServer<D, A> {
    /// Create a server with the default configuration.
    pub fn new(db: Arc<D>, auth: Arc<A>) -> CollectionResult<Self> {
        Self::with_config(db, auth, ServerConfig::default())
    }

    /// Create a server with an explicit configuration.
    pub fn with_config(db: Arc<D>, auth: Arc<A>, config: ServerConfig) -> CollectionResult<Self> {
        config.validate()?;
        Ok(Self { db, auth, config })
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Resolve the request's credential to a user.
    ///
    /// The embedding transport decides which operations require this;
    /// dispatch itself is credential-agnostic.
    pub async fn authenticate(&self, request: &CollectionRequest) -> CollectionResult<User> {
        let token = request
            .token
            .as_deref()
            .ok_or_else(|| CollectionError::unauthorized("missing credential"))?;
        self.auth
            .get_user(token)
            .await
            .ok_or_else(|| CollectionError::unauthorized("invalid credential"))
    }

    /// Handle one request, always producing a response.
    pub async fn handle(&self, request: CollectionRequest) -> CollectionResponse {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        info!(
            "handling {:?} for collection {:?} (request '{}')",
            request.operation, request.collection_name, request_id
        );

        match self.dispatch(&request, &request_id).await {
            Ok(response) => response,
            Err(err) => {
                warn!(
                    "{:?} failed with status {}: {} (request '{}')",
                    request.operation,
                    err.status_code(),
                    err,
                    request_id
                );
                CollectionResponse::from_error(&err)
            }
        }
    }

    async fn dispatch(
        &self,
        request: &CollectionRequest,
        request_id: &str,
    ) -> CollectionResult<CollectionResponse> {
        match request.operation {
            Operation::HealthCheck => Ok(CollectionResponse::new(
                200,
                Value::String("WORKING".to_string()),
            )),

            Operation::CreateItemSchema => self.create_item_schema(request).await,
            Operation::ListItemSchemas => self.list_item_schemas().await,
            Operation::FindOneItemSchema => self.find_one_item_schema(request).await,

            Operation::CreateItem => {
                let transaction = self.begin(request, request_id).await?;
                self.create_item(&transaction, request).await
            }
            Operation::FindItems => {
                let transaction = self.begin(request, request_id).await?;
                self.find_items(&transaction, request).await
            }
            Operation::FindOneItem => {
                let transaction = self.begin(request, request_id).await?;
                self.find_one_item(&transaction, request).await
            }
            Operation::FindItemById => {
                let transaction = self.begin(request, request_id).await?;
                self.find_item_by_id(&transaction, request).await
            }
            Operation::UpdateItem => {
                let transaction = self.begin(request, request_id).await?;
                self.update_item(&transaction, request).await
            }
            Operation::DeleteItemById => {
                let transaction = self.begin(request, request_id).await?;
                self.delete_item_by_id(&transaction, request).await
            }
            Operation::FindItemSchema => {
                let transaction = self.begin(request, request_id).await?;
                self.find_item_schema(&transaction).await
            }
            Operation::UpdateItemSchema => {
                let transaction = self.begin(request, request_id).await?;
                self.update_item_schema(&transaction, request).await
            }
            Operation::DeleteItemSchema => {
                let transaction = self.begin(request, request_id).await?;
                self.delete_item_schema(&transaction).await
            }
            Operation::FindCollectionSchema => {
                let transaction = self.begin(request, request_id).await?;
                self.find_collection_schema(&transaction).await
            }
        }
    }

    /// Resolve the request's collection schema and open a transaction.
    async fn begin(
        &self,
        request: &CollectionRequest,
        request_id: &str,
    ) -> CollectionResult<Transaction> {
        let collection_name = request
            .collection_name
            .as_deref()
            .ok_or_else(|| CollectionError::bad_request("missing collection name"))?;

        let item_schema = self
            .db
            .find_item_schema_by_collection_name(collection_name)
            .await?;
        debug!("resolved {} (request '{}')", item_schema, request_id);

        Ok(Transaction::new(
            request_id,
            collection_name,
            item_schema,
            self.config.api_base(),
        ))
    }

    /// Required resource id for by-id operations.
    pub(super) fn resource_id<'a>(request: &'a CollectionRequest) -> CollectionResult<&'a str> {
        request
            .resource_id
            .as_deref()
            .ok_or_else(|| CollectionError::bad_request("missing resource id"))
    }
}
