//! Resource API state management.
//!
//! Defines the shared state handed to every resource handler.

use std::sync::Arc;

use roster_catalog::Catalog;
use roster_core::PagingConfig;
use roster_storage::Repository;

use crate::links::LinkBuilder;
use crate::render::Renderer;

/// Resource API application state.
///
/// Uses `Arc` for thread-safe shared ownership of the repository and catalog.
pub struct ApiState<S: Repository> {
    /// Storage engine.
    pub repository: Arc<S>,
    /// Registered searches and projections.
    pub catalog: Arc<Catalog>,
    /// Absolute link builder.
    pub links: LinkBuilder,
    /// Paging limits.
    pub paging: PagingConfig,
}

// Manual Clone implementation that doesn't require S: Clone for Arc<S>
impl<S: Repository> Clone for ApiState<S> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            catalog: Arc::clone(&self.catalog),
            links: self.links.clone(),
            paging: self.paging,
        }
    }
}

impl<S: Repository> ApiState<S> {
    /// Creates a new state.
    pub fn new(repository: Arc<S>, catalog: Arc<Catalog>, links: LinkBuilder, paging: PagingConfig) -> Self {
        Self {
            repository,
            catalog,
            links,
            paging,
        }
    }

    /// Renderer bound to this state.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_, S> {
        Renderer::new(
            self.repository.as_ref(),
            &self.catalog,
            &self.links,
            self.paging.expansion_limit,
        )
    }
}
