//! End-to-end item dispatch: structural checks, schema validation, CRUD,
//! and hypermedia decoration.

mod common;

use collection_server::CollectionRequest;
use common::{error_message, link_rels, seeded_server};

#[tokio::test]
async fn create_item_returns_created_document_with_links() {
    let server = seeded_server().await;

    let response = server
        .handle(CollectionRequest::create_item("photos", r#"{"name": "ok"}"#))
        .await;

    assert_eq!(response.status, 201);
    assert_eq!(response.body["name"], "ok");
    assert!(response.body["id"].is_string());

    let rels = link_rels(&response.body);
    assert_eq!(
        rels,
        vec!["self", "item", "create", "update", "delete", "parent"]
    );

    let links = response.body["links"].as_array().unwrap();
    let self_link = &links[0];
    assert_eq!(
        self_link["href"],
        "http://localhost:3000/api/photos/{id}"
    );
}

#[tokio::test]
async fn create_item_without_body_is_rejected() {
    let server = seeded_server().await;

    let response = server
        .handle(CollectionRequest::create_item("photos", ""))
        .await;

    assert_eq!(response.status, 400);
    assert_eq!(error_message(&response.body), "Empty resource");
}

#[tokio::test]
async fn create_item_with_invalid_json_is_rejected() {
    let server = seeded_server().await;

    for body in ["[\"name\"}", "{1\"adf\""] {
        let response = server
            .handle(CollectionRequest::create_item("photos", body))
            .await;

        assert_eq!(response.status, 400);
        assert!(
            error_message(&response.body).starts_with("Invalid json: "),
            "unexpected message for {body}: {}",
            response.body
        );
    }
}

#[tokio::test]
async fn create_item_with_non_object_root_is_rejected() {
    let server = seeded_server().await;

    for body in ["[{\"name\": \"fail\"}]", "\"not-valid\"", "10"] {
        let response = server
            .handle(CollectionRequest::create_item("photos", body))
            .await;

        assert_eq!(response.status, 400);
        assert_eq!(error_message(&response.body), "Json root not is an object");
    }
}

#[tokio::test]
async fn create_item_against_unknown_collection_is_not_found() {
    let server = seeded_server().await;

    let response = server
        .handle(CollectionRequest::create_item("movies", r#"{"name": "ok"}"#))
        .await;

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn schema_validation_runs_after_structural_checks() {
    let server = seeded_server().await;

    let response = server
        .handle(CollectionRequest::create_item_schema(
            r#"{
                "collectionName": "acme-users",
                "properties": { "name": {} },
                "required": ["name"]
            }"#,
        ))
        .await;
    assert_eq!(response.status, 201);

    let response = server
        .handle(CollectionRequest::create_item(
            "acme-users",
            r#"{"nickname": "x"}"#,
        ))
        .await;

    assert_eq!(response.status, 422);
    assert_eq!(response.body["errors"][0]["name"][0], "is required.");
}

#[tokio::test]
async fn find_items_lists_stored_documents() {
    let server = seeded_server().await;

    for body in [r#"{"name": "one"}"#, r#"{"name": "two"}"#] {
        let response = server
            .handle(CollectionRequest::create_item("photos", body))
            .await;
        assert_eq!(response.status, 201);
    }

    let response = server.handle(CollectionRequest::find_items("photos")).await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["itemCount"], 2);
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);
    assert!(response.body["links"].is_array());
}

#[tokio::test]
async fn find_items_applies_equality_filters() {
    let server = seeded_server().await;

    for body in [r#"{"name": "one"}"#, r#"{"name": "two"}"#] {
        server
            .handle(CollectionRequest::create_item("photos", body))
            .await;
    }

    let response = server
        .handle(CollectionRequest::find_items("photos").with_query("name", "two"))
        .await;

    assert_eq!(response.status, 200);
    assert_eq!(response.body["itemCount"], 1);
    assert_eq!(response.body["items"][0]["name"], "two");
}

#[tokio::test]
async fn find_one_item_returns_first_match() {
    let server = seeded_server().await;

    server
        .handle(CollectionRequest::create_item("photos", r#"{"name": "one"}"#))
        .await;

    let response = server
        .handle(CollectionRequest::find_one_item("photos").with_query("name", "one"))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["name"], "one");
    assert!(response.body["links"].is_array());

    let response = server
        .handle(CollectionRequest::find_one_item("photos").with_query("name", "missing"))
        .await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn find_update_and_delete_by_id() {
    let server = seeded_server().await;

    let created = server
        .handle(CollectionRequest::create_item("photos", r#"{"name": "ok"}"#))
        .await;
    let id = created.body["id"].as_str().unwrap().to_string();

    let response = server
        .handle(CollectionRequest::find_item_by_id("photos", &id))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["name"], "ok");

    let response = server
        .handle(CollectionRequest::update_item(
            "photos",
            &id,
            r#"{"name": "renamed"}"#,
        ))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body["name"], "renamed");
    assert_eq!(response.body["id"], id.as_str());

    let response = server
        .handle(CollectionRequest::delete_item_by_id("photos", &id))
        .await;
    assert_eq!(response.status, 204);

    let response = server
        .handle(CollectionRequest::find_item_by_id("photos", &id))
        .await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn health_check_reports_working() {
    let server = seeded_server().await;

    let response = server.handle(CollectionRequest::health_check()).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "WORKING");
}

#[tokio::test]
async fn known_token_authenticates_and_unknown_does_not() {
    let server = seeded_server().await;

    let request = CollectionRequest::find_items("photos").with_token("example1");
    let user = server.authenticate(&request).await.unwrap();
    assert_eq!(user.email(), "admin@example.net");

    let request = CollectionRequest::find_items("photos").with_token("wrong");
    let err = server.authenticate(&request).await.unwrap_err();
    assert_eq!(err.status_code(), 401);

    let request = CollectionRequest::find_items("photos");
    let err = server.authenticate(&request).await.unwrap_err();
    assert_eq!(err.status_code(), 401);
}
