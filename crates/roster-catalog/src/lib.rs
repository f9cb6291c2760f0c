//! # roster-catalog
//!
//! Statically declared searches and projections, validated once at startup.
//!
//! A [`Catalog`] is assembled through [`CatalogBuilder`]; building it checks
//! every definition against the entity descriptors and rejects cyclic
//! projection chains, so a running server never meets an invalid definition.
//!
//! ## Modules
//!
//! - [`search`] - named searches and parameter binding
//! - [`projection`] - named projections
//! - [`validate`] - build-time checks and [`ConfigurationError`]
//! - [`defaults`] - the standard catalog

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod defaults;
pub mod projection;
pub mod search;
pub mod validate;

mod catalog;

pub use catalog::{Catalog, CatalogBuilder};
pub use projection::{Expand, ProjectionDef, RelationExpansion};
pub use search::{ParamType, Predicate, SearchDef, SearchError, SearchParam};
pub use validate::{CatalogError, ConfigurationError};
