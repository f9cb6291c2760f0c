//! Projection rendering and HAL documents.
//!
//! One generic renderer interprets the projection definitions of the catalog.
//! Chained projections recurse through boxed futures; the catalog rejects
//! cyclic chains at build time, so recursion depth is bounded by the longest
//! chain.

use futures::future::{BoxFuture, FutureExt};
use roster_catalog::{Catalog, Expand, ProjectionDef};
use roster_model::{EntityKind, Record};
use roster_storage::{Page, PageRequest, Repository};
use serde_json::{Map, Value, json};

use crate::error::{ApiError, ApiResult};
use crate::links::{LinkBuilder, href, with_query};
use crate::params::ListParams;

/// Renders entities in default, minimal or projected representation.
pub struct Renderer<'a, S: Repository> {
    repository: &'a S,
    catalog: &'a Catalog,
    links: &'a LinkBuilder,
    expansion_limit: u32,
}

impl<'a, S: Repository> Renderer<'a, S> {
    /// Creates a renderer. `expansion_limit` bounds the related entities
    /// embedded per expanded relation.
    pub fn new(repository: &'a S, catalog: &'a Catalog, links: &'a LinkBuilder, expansion_limit: u32) -> Self {
        Self {
            repository,
            catalog,
            links,
            expansion_limit: expansion_limit.max(1),
        }
    }

    /// Looks up projection `name` of `kind`.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::UnknownProjection` if it isn't registered.
    pub fn resolve(&self, kind: EntityKind, name: &str) -> ApiResult<&'a ProjectionDef> {
        self.catalog
            .projection(kind, name)
            .ok_or_else(|| ApiError::UnknownProjection {
                kind,
                name: name.to_string(),
            })
    }

    /// Renders `record` through `projection`, or in default representation
    /// when none is requested.
    ///
    /// ## Errors
    ///
    /// Returns `ApiError::UnknownProjection` for an unregistered projection
    /// and propagates storage errors from relation expansion.
    pub async fn render(&self, record: &Record, projection: Option<&str>) -> ApiResult<Value> {
        match projection {
            None => Ok(self.default_repr(record)),
            Some(name) => {
                let def = self.resolve(record.kind(), name)?;
                self.project(record, def).await
            }
        }
    }

    /// Renders every item of `page`, keeping the paging metadata.
    ///
    /// The projection is resolved up front so an unknown name fails even on
    /// an empty page.
    ///
    /// ## Errors
    ///
    /// Same as [`Renderer::render`].
    pub async fn render_page(
        &self,
        kind: EntityKind,
        page: Page<Record>,
        projection: Option<&str>,
    ) -> ApiResult<Page<Value>> {
        let def = projection.map(|name| self.resolve(kind, name)).transpose()?;
        let mut items = Vec::with_capacity(page.items.len());
        for record in &page.items {
            let item = match def {
                Some(def) => self.project(record, def).await?,
                None => self.default_repr(record),
            };
            items.push(item);
        }
        Ok(Page {
            items,
            total_elements: page.total_elements,
            page: page.page,
            size: page.size,
        })
    }

    /// `id`, every scalar field and the entity links. Related entities are
    /// never inlined.
    #[must_use]
    pub fn default_repr(&self, record: &Record) -> Value {
        let mut doc = Map::new();
        doc.insert("id".into(), json!(record.id()));
        for (name, value) in record.fields() {
            doc.insert(name.into(), json!(value));
        }
        doc.insert("_links".into(), self.links.entity_links(record));
        Value::Object(doc)
    }

    /// `id` and `self` link, nothing else.
    #[must_use]
    pub fn minimal(&self, record: &Record) -> Value {
        json!({
            "id": record.id(),
            "_links": { "self": href(self.links.item(record.kind(), record.id())) },
        })
    }

    fn project<'b>(&'b self, record: &'b Record, def: &'b ProjectionDef) -> BoxFuture<'b, ApiResult<Value>> {
        async move {
            let mut doc = Map::new();
            doc.insert("id".into(), json!(record.id()));
            for field in &def.fields {
                doc.insert((*field).into(), json!(record.field(field)?));
            }

            if !def.relations.is_empty() {
                let request = PageRequest::first(self.expansion_limit);
                let mut embedded = Map::new();
                for expansion in &def.relations {
                    let related = self
                        .repository
                        .list_related(record.kind(), record.id(), expansion.relation, &request)
                        .await?;
                    let mut items = Vec::with_capacity(related.items.len());
                    for item in &related.items {
                        let rendered = match &expansion.expand {
                            Expand::Raw => self.minimal(item),
                            Expand::Projection(name) => {
                                let chained = self.resolve(item.kind(), name)?;
                                self.project(item, chained).await?
                            }
                        };
                        items.push(rendered);
                    }
                    embedded.insert(expansion.relation.into(), Value::Array(items));
                }
                doc.insert("_embedded".into(), Value::Object(embedded));
            }

            doc.insert("_links".into(), self.links.entity_links(record));
            Ok(Value::Object(doc))
        }
        .boxed()
    }
}

/// Builds a paged HAL collection document.
///
/// `base` is the collection href without query; navigation links keep the
/// search parameters, size, sort and projection of `params`. Extra links
/// (such as `search` on top-level collections) are appended after `last`.
#[must_use]
pub fn collection_document(
    embedded_key: &str,
    page: Page<Value>,
    base: &str,
    params: &ListParams,
    extra_links: Vec<(&'static str, Value)>,
) -> Value {
    let at = |number: u32| href(with_query(base, &params.link_query(number)));
    let last = page.total_pages().saturating_sub(1);

    let mut links = Map::new();
    links.insert("self".into(), at(page.page));
    links.insert("first".into(), at(0));
    if page.has_previous() {
        links.insert("prev".into(), at(page.page - 1));
    }
    if page.has_next() {
        links.insert("next".into(), at(page.page + 1));
    }
    links.insert("last".into(), at(last));
    for (name, link) in extra_links {
        links.insert(name.into(), link);
    }

    let meta = json!({
        "size": page.size,
        "totalElements": page.total_elements,
        "totalPages": page.total_pages(),
        "number": page.page,
    });

    let mut embedded = Map::new();
    embedded.insert(embedded_key.into(), Value::Array(page.items));

    json!({
        "_embedded": embedded,
        "_links": links,
        "page": meta,
    })
}
