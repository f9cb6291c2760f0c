//! The validated registry of searches and projections.

use std::collections::HashMap;

use roster_model::EntityKind;

use crate::projection::ProjectionDef;
use crate::search::SearchDef;
use crate::validate::{ConfigurationError, validate};

/// Collects definitions and validates them into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    searches: Vec<SearchDef>,
    projections: Vec<ProjectionDef>,
}

impl CatalogBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a search.
    #[must_use]
    pub fn search(mut self, search: SearchDef) -> Self {
        self.searches.push(search);
        self
    }

    /// Registers a projection.
    #[must_use]
    pub fn projection(mut self, projection: ProjectionDef) -> Self {
        self.projections.push(projection);
        self
    }

    /// Validates the definitions and freezes them.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigurationError` listing every problem found: duplicate
    /// names, unknown fields, relations or parameters, dangling chained
    /// projections and projection cycles.
    pub fn build(self) -> Result<Catalog, ConfigurationError> {
        let problems = validate(&self.searches, &self.projections);
        if !problems.is_empty() {
            for problem in &problems {
                tracing::error!(%problem, "invalid catalog definition");
            }
            return Err(ConfigurationError { problems });
        }

        let mut searches: HashMap<EntityKind, Vec<SearchDef>> = HashMap::new();
        for search in self.searches {
            searches.entry(search.kind).or_default().push(search);
        }
        let mut projections: HashMap<EntityKind, Vec<ProjectionDef>> = HashMap::new();
        for projection in self.projections {
            projections.entry(projection.kind).or_default().push(projection);
        }

        let catalog = Catalog {
            searches,
            projections,
        };
        tracing::debug!(
            searches = catalog.searches.values().map(Vec::len).sum::<usize>(),
            projections = catalog.projections.values().map(Vec::len).sum::<usize>(),
            "catalog built"
        );
        Ok(catalog)
    }
}

/// Searches and projections per entity kind, in registration order.
///
/// A `Catalog` only exists once validated, so lookups never meet a dangling
/// reference or a projection cycle.
#[derive(Debug)]
pub struct Catalog {
    searches: HashMap<EntityKind, Vec<SearchDef>>,
    projections: HashMap<EntityKind, Vec<ProjectionDef>>,
}

impl Catalog {
    /// Starts a new catalog.
    #[must_use]
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Looks up a search by name.
    #[must_use]
    pub fn search(&self, kind: EntityKind, name: &str) -> Option<&SearchDef> {
        self.searches(kind).iter().find(|s| s.name == name)
    }

    /// Searches registered on `kind`.
    #[must_use]
    pub fn searches(&self, kind: EntityKind) -> &[SearchDef] {
        self.searches.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Looks up a projection by name.
    #[must_use]
    pub fn projection(&self, kind: EntityKind, name: &str) -> Option<&ProjectionDef> {
        self.projections(kind).iter().find(|p| p.name == name)
    }

    /// Projections registered on `kind`.
    #[must_use]
    pub fn projections(&self, kind: EntityKind) -> &[ProjectionDef] {
        self.projections.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }
}
