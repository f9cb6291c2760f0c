//! The standard catalog served by Roster.

use roster_model::EntityKind;

use crate::catalog::{Catalog, CatalogBuilder};
use crate::projection::ProjectionDef;
use crate::search::{ParamType, SearchDef};
use crate::validate::ConfigurationError;

const ACCOUNT_FIELDS: &[&str] = &["username", "firstname", "lastname"];

/// Registers the standard searches and projections on `builder`.
#[must_use]
pub fn register(builder: CatalogBuilder) -> CatalogBuilder {
    use EntityKind::{Account, Group, Role};

    builder
        // Searches
        .search(SearchDef::by_field(Account, "by-username", "username", ParamType::Text))
        .search(SearchDef::by_field(Account, "by-lastname", "lastname", ParamType::Text))
        .search(SearchDef::by_field(Group, "by-name", "name", ParamType::Text))
        .search(SearchDef::by_field(Group, "by-code", "code", ParamType::Token))
        .search(SearchDef::by_field(Role, "by-name", "name", ParamType::Text))
        .search(SearchDef::by_field(Role, "by-code", "code", ParamType::Token))
        // Account projections
        .projection(ProjectionDef::new(Account, "summary", ACCOUNT_FIELDS))
        .projection(ProjectionDef::new(Account, "withGroups", ACCOUNT_FIELDS).raw("groups"))
        .projection(
            ProjectionDef::new(Account, "withGroupsAndRoles", ACCOUNT_FIELDS)
                .chain("groups", "withRoles"),
        )
        // Group projections
        .projection(ProjectionDef::new(Group, "summary", &["name", "code"]))
        .projection(
            ProjectionDef::new(Group, "withRoles", &["name", "code", "description"])
                .chain("roles", "summary"),
        )
        .projection(
            ProjectionDef::new(Group, "withAccounts", &["name", "code", "description"])
                .chain("accounts", "summary"),
        )
        // Role projections
        .projection(ProjectionDef::new(Role, "summary", &["name", "code"]))
        .projection(
            ProjectionDef::new(Role, "withGroups", &["name", "code", "description"])
                .chain("groups", "summary"),
        )
}

impl Catalog {
    /// Builds the standard catalog.
    ///
    /// ## Errors
    ///
    /// Returns `ConfigurationError` if the standard definitions stop matching
    /// the entity descriptors.
    pub fn standard() -> Result<Self, ConfigurationError> {
        register(Catalog::builder()).build()
    }
}
