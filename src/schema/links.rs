//! Hypermedia link descriptors attached to collection responses.
//!
//! A [`Link`] is one affordance: a relation name, a target href (possibly a
//! URI template containing `{id}`), and optional method/schema metadata.
//! [`Links`] is an ordered sequence rendered in response order: defaults
//! first, custom links appended.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One hypermedia affordance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "targetSchema",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub target_schema: Option<Map<String, Value>>,
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(rename = "encType", default, skip_serializing_if = "Option::is_none")]
    pub enc_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Map<String, Value>>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            ..Self::default()
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_schema_ref(mut self, url: impl Into<String>) -> Self {
        let mut schema = Map::new();
        schema.insert("$ref".to_string(), Value::String(url.into()));
        self.schema = Some(schema);
        self
    }
}

/// Ordered sequence of links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn new(links: Vec<Link>) -> Self {
        Self(links)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Link> {
        self.0.iter_mut()
    }

    pub fn push(&mut self, link: Link) {
        self.0.push(link);
    }

    /// Find the first link with the given relation name.
    pub fn by_rel(&self, rel: &str) -> Option<&Link> {
        self.0.iter().find(|link| link.rel == rel)
    }

    /// Prefix `base_url` onto every relative href.
    ///
    /// Absolute URLs and URI-template references (hrefs starting with `{`)
    /// are left untouched.
    pub fn apply_base_url(&mut self, base_url: &str) {
        for link in &mut self.0 {
            if is_relative(&link.href) {
                link.href = format!("{}{}", base_url, link.href);
            }
        }
    }

    /// New sequence with every link of `self` followed by every link of
    /// `tail`. Relative order within each input is preserved; entries with
    /// the same `rel` coexist, later ones do not override earlier ones.
    pub fn concatenate(&self, tail: &Links) -> Links {
        let mut links = Vec::with_capacity(self.0.len() + tail.0.len());
        links.extend(self.0.iter().cloned());
        links.extend(tail.0.iter().cloned());
        Links(links)
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<Link>> for Links {
    fn from(links: Vec<Link>) -> Self {
        Self(links)
    }
}

/// The canonical CRUD affordance set for a collection.
pub fn default_links(collection_name: &str) -> Links {
    let collection_url = format!("/{}", collection_name);
    let item_url = format!("/{}/{{id}}", collection_name);

    Links(vec![
        Link::new("self", item_url.as_str()),
        Link::new("item", item_url.as_str()),
        Link::new("create", collection_url.as_str()).with_method("POST"),
        Link::new("update", item_url.as_str()).with_method("PUT"),
        Link::new("delete", item_url.as_str()).with_method("DELETE"),
        Link::new("parent", collection_url),
    ])
}

/// A href is relative when it carries no scheme or host and is not a
/// URI-template reference.
fn is_relative(href: &str) -> bool {
    !href.starts_with('{') && !href.contains("://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_links_cover_crud_relations() {
        let links = default_links("people");
        assert_eq!(links.len(), 6);

        let rels: Vec<&str> = links.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(
            rels,
            vec!["self", "item", "create", "update", "delete", "parent"]
        );

        assert_eq!(links.by_rel("self").unwrap().href, "/people/{id}");
        assert_eq!(links.by_rel("parent").unwrap().href, "/people");

        let create = links.by_rel("create").unwrap();
        assert_eq!(create.href, "/people");
        assert_eq!(create.method.as_deref(), Some("POST"));
        assert_eq!(
            links.by_rel("update").unwrap().method.as_deref(),
            Some("PUT")
        );
        assert_eq!(
            links.by_rel("delete").unwrap().method.as_deref(),
            Some("DELETE")
        );
    }

    #[test]
    fn apply_base_url_prefixes_relative_hrefs() {
        let mut links = Links::new(vec![
            Link::new("self", "/people/{id}"),
            Link::new("parent", "/people"),
        ]);
        links.apply_base_url("http://h");
        assert_eq!(links.by_rel("self").unwrap().href, "http://h/people/{id}");
        assert_eq!(links.by_rel("parent").unwrap().href, "http://h/people");
    }

    #[test]
    fn apply_base_url_skips_absolute_and_template_hrefs() {
        let mut links = Links::new(vec![
            Link::new("icon", "http://cdn.example.net/icon.png"),
            Link::new("related", "{+service}/people"),
        ]);
        links.apply_base_url("http://h");
        assert_eq!(
            links.by_rel("icon").unwrap().href,
            "http://cdn.example.net/icon.png"
        );
        assert_eq!(links.by_rel("related").unwrap().href, "{+service}/people");
    }

    #[test]
    fn concatenate_preserves_length_and_order() {
        let base = Links::new(vec![Link::new("self", "/a/{id}"), Link::new("parent", "/a")]);
        let tail = Links::new(vec![
            Link::new("archive", "/a/{id}/archive").with_method("POST"),
            Link::new("self", "/a/{id}/alias"),
        ]);

        let merged = base.concatenate(&tail);
        assert_eq!(merged.len(), base.len() + tail.len());

        let rels: Vec<&str> = merged.iter().map(|l| l.rel.as_str()).collect();
        assert_eq!(rels, vec!["self", "parent", "archive", "self"]);
        // no override by rel: the first self wins lookups, the second stays
        assert_eq!(merged.by_rel("self").unwrap().href, "/a/{id}");
    }

    #[test]
    fn link_wire_shape_uses_camel_case_and_omits_blank_fields() {
        let link = Link::new("create", "/people")
            .with_method("POST")
            .with_schema_ref("/item-schemas/people");
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "rel": "create",
                "href": "/people",
                "method": "POST",
                "schema": { "$ref": "/item-schemas/people" },
            })
        );
    }
}
