//! The collection contract: a JSON hyper-schema document governing one
//! named collection.
//!
//! An `ItemSchema` is decoded from an inbound JSON document, default-filled,
//! then validated as a whole. Validation accumulates every violated rule
//! instead of failing fast. A persisted schema always satisfies
//! [`ItemSchema::validate`].

use crate::error::{CollectionError, CollectionResult, ValidationError};
use crate::schema::links::{self, Links};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

pub const DRAFT3_SCHEMA: &str = "http://json-schema.org/draft-03/hyper-schema#";
pub const DRAFT4_SCHEMA: &str = "http://json-schema.org/draft-04/hyper-schema#";

const DEFAULT_SCHEMA: &str = DRAFT4_SCHEMA;

/// Open attribute bag for one property definition. Property definitions are
/// genuinely schema-less at this layer.
pub type PropertyDefinition = Map<String, Value>;

/// Property name to attribute bag, ordered for stable error accumulation.
pub type Properties = BTreeMap<String, PropertyDefinition>;

static COLLECTION_NAME_CHARSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").expect("charset pattern"));
static COLLECTION_NAME_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)-(.*)$").expect("shape pattern"));

/// A collection's schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSchema {
    #[serde(rename = "$schema", default)]
    pub schema_version: String,

    /// Unique key. Must match `^[a-z0-9-]+$` and, unless
    /// `global_collection_name` is set, the `{namespace}-{name}` shape.
    #[serde(rename = "collectionName", default)]
    pub collection_name: String,

    #[serde(rename = "globalCollectionName", default)]
    pub global_collection_name: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(
        rename = "collectionTitle",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_title: Option<String>,

    /// Root JSON type; only `"object"` is valid.
    #[serde(rename = "type", default)]
    pub data_type: String,

    #[serde(default, skip_serializing_if = "Properties::is_empty")]
    pub properties: Properties,

    /// Required property names; meaningful only under draft4.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,

    /// Tri-state: absent (unset), true, or false.
    #[serde(
        rename = "additionalProperties",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<bool>,

    #[serde(default, skip_serializing_if = "Links::is_empty")]
    pub links: Links,

    #[serde(
        rename = "collectionLinks",
        default,
        skip_serializing_if = "Links::is_empty"
    )]
    pub collection_links: Links,

    // Custom-only link set snapshotted by attach_default_links so a later
    // discard can restore it. Never serialized or persisted.
    #[serde(skip)]
    custom_links: Option<Links>,
}

impl ItemSchema {
    /// A minimal valid schema for the given collection name.
    pub fn new(collection_name: impl Into<String>) -> Self {
        let mut schema = Self {
            collection_name: collection_name.into(),
            ..Self::default()
        };
        schema.fill_default_values();
        schema
    }

    /// Decode a schema document from a JSON object and fill defaults.
    /// Validation is a separate step.
    pub fn from_object(object: Map<String, Value>) -> CollectionResult<Self> {
        let mut schema: ItemSchema = serde_json::from_value(Value::Object(object))
            .map_err(|err| CollectionError::bad_request(format!("Invalid json: {}", err)))?;
        schema.fill_default_values();
        Ok(schema)
    }

    /// Set `$schema` and `type` to their defaults when blank. Idempotent.
    pub fn fill_default_values(&mut self) {
        if self.schema_version.is_empty() {
            self.schema_version = DEFAULT_SCHEMA.to_string();
        }
        if self.data_type.is_empty() {
            self.data_type = "object".to_string();
        }
    }

    /// Check the document as a whole, accumulating every violated rule.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.schema_version != DRAFT3_SCHEMA && self.schema_version != DRAFT4_SCHEMA {
            errors.put("$schema", "must be draft3 or draft4 hyper-schema.");
        }

        if self.data_type != "object" {
            errors.put("type", "must be \"object\".");
        }

        if self.collection_name.is_empty() {
            errors.put("collectionName", "must not be blank.");
        } else if (!self.global_collection_name
            && !COLLECTION_NAME_SHAPE.is_match(&self.collection_name))
            || !COLLECTION_NAME_CHARSET.is_match(&self.collection_name)
        {
            errors.put(
                "collectionName",
                "must be in the format \"{namespace}-{name}\", \
                 with lowercase letters, numbers and hyphens.",
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Overlay the fields present in `patch` onto this schema, as a
    /// decode-in-place. Fields absent from the payload keep their current
    /// values. Re-validation is the caller's responsibility.
    pub fn merge_object(&mut self, patch: Map<String, Value>) -> CollectionResult<()> {
        let current =
            serde_json::to_value(&*self).map_err(|err| CollectionError::internal(err))?;
        let mut document = match current {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in patch {
            document.insert(key, value);
        }
        *self = Self::from_object(document)?;
        Ok(())
    }

    /// Validate an item document against this schema: required properties
    /// (draft4 `required` list, or draft3 per-property `required` flags)
    /// and, when `additionalProperties` is `false`, unknown properties.
    /// Accumulates all violations.
    pub fn validate_item(&self, item: &Map<String, Value>) -> Result<(), ValidationError> {
        let mut errors = ValidationError::new();

        if self.schema_version == DRAFT3_SCHEMA {
            for (name, attributes) in &self.properties {
                let required = attributes
                    .get("required")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if required && is_missing(item.get(name.as_str())) {
                    errors.put(name.clone(), "is required.");
                }
            }
        } else {
            for name in &self.required {
                if is_missing(item.get(name.as_str())) {
                    errors.put(name.clone(), "is required.");
                }
            }
        }

        if self.additional_properties == Some(false) {
            for name in item.keys() {
                if !self.properties.contains_key(name) && !is_system_property(name) {
                    errors.put(name.clone(), "is not defined in the schema.");
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// URL of the collection's items: `/{collectionName}`.
    pub fn collection_url(&self) -> String {
        format!("/{}", self.collection_name)
    }

    /// URL of this schema document: `/item-schemas/{collectionName}`.
    pub fn url(&self) -> String {
        format!("/item-schemas/{}", self.collection_name)
    }

    /// The canonical CRUD link set for this collection; the `create`
    /// affordance carries a `$ref` to this schema's own URL.
    pub fn default_links(&self) -> Links {
        let mut links = links::default_links(&self.collection_name);
        for link in links.iter_mut() {
            if link.rel == "create" {
                let mut schema_ref = Map::new();
                schema_ref.insert("$ref".to_string(), Value::String(self.url()));
                link.schema = Some(schema_ref);
            }
        }
        links
    }

    /// Attach the default link set: defaults first, pre-existing custom
    /// links appended, relative hrefs rewritten against `base_url`.
    ///
    /// Call once per response construction. A second call without an
    /// intervening [`discard_default_links`](Self::discard_default_links)
    /// re-prefixes hrefs made absolute by the first call.
    pub fn attach_default_links(&mut self, base_url: &str) {
        if self.custom_links.is_none() {
            self.custom_links = Some(self.links.clone());
        }
        let mut links = self.default_links().concatenate(&self.links);
        links.apply_base_url(base_url);
        self.links = links;
    }

    /// Restore `links` to the custom-only set captured when defaults were
    /// attached. Generated defaults are discarded, not subtracted: custom
    /// links added after the attach call are lost.
    pub fn discard_default_links(&mut self) {
        if let Some(custom) = self.custom_links.take() {
            self.links = custom;
        }
    }

    /// Link set for the collection-level view: schema defaults plus custom
    /// collection links, rewritten against `base_url`.
    pub fn collection_view_links(&self, base_url: &str) -> Links {
        let mut links = self.default_links().concatenate(&self.collection_links);
        links.apply_base_url(base_url);
        links
    }
}

impl fmt::Display for ItemSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<ItemSchema \"{}\">", self.collection_name)
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

// id and the storage stamps are assigned by the system; clients never
// declare them in properties.
fn is_system_property(name: &str) -> bool {
    matches!(name, "id" | "createdAt" | "updatedAt")
}
