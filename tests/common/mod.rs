//! Shared fixtures for the end-to-end dispatch tests.

use collection_server::{
    CollectionRequest, CollectionServer, InMemoryDatabase, StaticAuthentication,
};
use serde_json::Value;
use std::sync::Arc;

pub type TestServer = CollectionServer<InMemoryDatabase, StaticAuthentication>;

/// A server seeded with the global "photos" collection and one known token.
pub async fn seeded_server() -> TestServer {
    let _ = env_logger::builder().is_test(true).try_init();

    let db = Arc::new(InMemoryDatabase::new());
    let auth = Arc::new(StaticAuthentication::new().with_token("example1", "admin@example.net"));
    let server = CollectionServer::new(db, auth).expect("default config is valid");

    let response = server
        .handle(CollectionRequest::create_item_schema(
            r#"{
                "collectionName": "photos",
                "globalCollectionName": true,
                "properties": { "name": {} }
            }"#,
        ))
        .await;
    assert_eq!(response.status, 201, "seeding failed: {}", response.body);

    server
}

/// First `_all` message of a structured error body.
pub fn error_message(body: &Value) -> &str {
    body["errors"][0]["_all"][0]
        .as_str()
        .expect("error body should carry an _all message")
}

/// Relation names of a response's `links` array, in order.
pub fn link_rels(body: &Value) -> Vec<&str> {
    body["links"]
        .as_array()
        .expect("response should carry links")
        .iter()
        .map(|link| link["rel"].as_str().expect("link should carry a rel"))
        .collect()
}
