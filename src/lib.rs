//! Schema-driven collection server library.
//!
//! Clients define named collections by posting a JSON hyper-schema document
//! (an [`ItemSchema`]); the server then exposes generic CRUD operations over
//! each collection's items, validating writes against the stored schema and
//! decorating responses with hypermedia links.
//!
//! # Core Components
//!
//! - [`CollectionServer`] - transport-agnostic dispatch over the generic
//!   handlers
//! - [`ItemSchema`] - the validated contract governing one collection
//! - [`Database`] / [`Authable`] - capability traits for storage and
//!   credential resolution
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use collection_server::{
//!     CollectionRequest, CollectionServer, InMemoryDatabase, StaticAuthentication,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Arc::new(InMemoryDatabase::new());
//! let auth = Arc::new(StaticAuthentication::new().with_token("example1", "admin@example.net"));
//! let server = CollectionServer::new(db, auth)?;
//!
//! let response = server
//!     .handle(CollectionRequest::create_item_schema(
//!         r#"{"collectionName": "acme-users"}"#,
//!     ))
//!     .await;
//! assert_eq!(response.status, 201);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod schema;
pub mod server;
pub mod storage;

// Re-export commonly used types for convenience
pub use auth::{Authable, StaticAuthentication, User};
pub use config::ServerConfig;
pub use error::{CollectionError, CollectionResult, RequestError, ValidationError};
pub use schema::{ItemSchema, Link, Links};
pub use server::{CollectionRequest, CollectionResponse, CollectionServer, Operation, Transaction};
pub use storage::{Database, InMemoryDatabase};
