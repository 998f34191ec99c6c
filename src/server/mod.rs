//! Transport-agnostic collection server.
//!
//! Binds inbound operations to their resolved [`ItemSchema`] before running
//! the generic handlers, and reports every failure through the structured
//! error model. The embedding transport only translates its native requests
//! into [`CollectionRequest`] values and writes [`CollectionResponse`]
//! values back out.
//!
//! # Module Organization
//!
//! * [`core`] - the `CollectionServer` struct, operation dispatch, and
//!   authentication
//! * [`transaction`] - per-request context and structural body checks
//! * [`items`] - generic item CRUD handlers
//! * [`schemas`] - item-schema CRUD handlers and the collection-schema view
//!
//! [`ItemSchema`]: crate::schema::ItemSchema

pub mod core;
pub mod items;
pub mod schemas;
pub mod transaction;

pub use core::{CollectionRequest, CollectionResponse, CollectionServer, Operation};
pub use transaction::Transaction;
