//! Absolute hypermedia links.

use roster_model::{EntityKind, Record, RelationDescriptor};
use serde_json::{Map, Value, json};
use uuid::Uuid;

/// Builds absolute hrefs rooted at `{base_url}{base_path}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    root: String,
    base_path: String,
}

impl LinkBuilder {
    /// Creates a builder from the public origin and the route prefix.
    #[must_use]
    pub fn new(base_url: &str, base_path: &str) -> Self {
        let base_path = base_path.trim_end_matches('/');
        Self {
            root: format!("{}{base_path}", base_url.trim_end_matches('/')),
            base_path: base_path.to_string(),
        }
    }

    /// Entry point. Under a route prefix this is the prefix itself, which is
    /// where the nested router answers.
    #[must_use]
    pub fn root(&self) -> String {
        if self.base_path.is_empty() {
            format!("{}/", self.root)
        } else {
            self.root.clone()
        }
    }

    /// `/{collection}`
    #[must_use]
    pub fn collection(&self, kind: EntityKind) -> String {
        format!("{}/{}", self.root, kind.collection())
    }

    /// `/{collection}/{id}`
    #[must_use]
    pub fn item(&self, kind: EntityKind, id: Uuid) -> String {
        format!("{}/{id}", self.collection(kind))
    }

    /// `/{collection}/{id}/{relation}`
    #[must_use]
    pub fn relation(&self, kind: EntityKind, id: Uuid, relation: &str) -> String {
        format!("{}/{relation}", self.item(kind, id))
    }

    /// `/{collection}/search`
    #[must_use]
    pub fn search_index(&self, kind: EntityKind) -> String {
        format!("{}/search", self.collection(kind))
    }

    /// `/{collection}/search/{name}`
    #[must_use]
    pub fn search(&self, kind: EntityKind, name: &str) -> String {
        format!("{}/{name}", self.search_index(kind))
    }

    /// `_links` of an entity: `self` plus one link per relation of its kind.
    #[must_use]
    pub fn entity_links(&self, record: &Record) -> Value {
        let kind = record.kind();
        let mut links = Map::new();
        links.insert("self".into(), href(self.item(kind, record.id())));
        for relation in record.descriptor().relations {
            links.insert(
                relation.name.into(),
                href(self.relation(kind, record.id(), relation.name)),
            );
        }
        Value::Object(links)
    }

    /// Extracts the identity of a `relation` target from an href.
    ///
    /// Absolute hrefs must be rooted at this builder's origin and prefix,
    /// relative ones at the prefix. Either must end in
    /// `/{target collection}/{id}`, optionally followed by a query string.
    #[must_use]
    pub fn parse_target(&self, relation: &RelationDescriptor, href: &str) -> Option<Uuid> {
        let href = href.split(['?', '#']).next()?;
        let path = if href.contains("://") {
            href.strip_prefix(self.root.as_str())?
        } else {
            href.strip_prefix(self.base_path.as_str())?
        };
        let (collection, id) = path.strip_prefix('/')?.trim_end_matches('/').split_once('/')?;
        if collection != relation.target.collection() {
            return None;
        }
        Uuid::parse_str(id).ok()
    }
}

/// A HAL link object.
#[must_use]
pub fn href(href: impl Into<String>) -> Value {
    json!({ "href": href.into() })
}

/// A templated HAL link object.
#[must_use]
pub fn templated(href: impl Into<String>) -> Value {
    json!({ "href": href.into(), "templated": true })
}

/// Appends `pairs` as an encoded query string.
#[must_use]
pub fn with_query(base: &str, pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return base.to_string();
    }
    let query: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();
    format!("{base}?{}", query.join("&"))
}
