//! Collection schemas and their hypermedia links.
//!
//! * [`item_schema`] - the schema document governing one collection:
//!   decoding, default-filling, whole-document validation, item validation,
//!   and URL derivation
//! * [`links`] - link descriptors, base-URL rewriting, concatenation, and
//!   the default CRUD link set

pub mod item_schema;
pub mod links;

pub use item_schema::{DRAFT3_SCHEMA, DRAFT4_SCHEMA, ItemSchema, Properties, PropertyDefinition};
pub use links::{Link, Links, default_links};
