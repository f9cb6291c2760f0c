//! Table, column and constraint naming.
//!
//! Names are derived from the static entity descriptors, which are the only
//! source of identifiers interpolated into SQL text. Values always travel as
//! bind parameters.

use roster_model::{EntityKind, RelationDescriptor};
use roster_storage::{Direction, SortKey};

/// Table holding entities of `kind`.
#[must_use]
pub fn table(kind: EntityKind) -> &'static str {
    kind.collection()
}

/// Foreign key column referencing `kind` from a join table (`account_id`).
#[must_use]
pub fn id_column(kind: EntityKind) -> String {
    format!("{}_id", kind.name().to_lowercase())
}

/// Name of the primary key constraint of `kind`'s table.
#[must_use]
pub fn primary_key(kind: EntityKind) -> String {
    format!("{}_pkey", table(kind))
}

/// Name of the unique constraint on `field`.
#[must_use]
pub fn unique_constraint(kind: EntityKind, field: &str) -> String {
    format!("{}_{field}_key", table(kind))
}

/// Comma separated `id` and scalar columns, optionally qualified by `alias`.
#[must_use]
pub fn columns(kind: EntityKind, alias: Option<&str>) -> String {
    std::iter::once("id")
        .chain(kind.descriptor().fields.iter().map(|f| f.name))
        .map(|c| qualify(alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `ORDER BY` clause for already validated sort keys, ending with identity.
///
/// Text compares bytewise and absent values sort first, matching the
/// in-memory engine.
#[must_use]
pub fn order_by(sort: &[SortKey], alias: Option<&str>) -> String {
    let mut parts: Vec<String> = sort
        .iter()
        .map(|key| {
            let nulls = match key.direction {
                Direction::Asc => "NULLS FIRST",
                Direction::Desc => "NULLS LAST",
            };
            format!(
                "{} COLLATE \"C\" {} {nulls}",
                qualify(alias, &key.field),
                key.direction.as_str().to_uppercase()
            )
        })
        .collect();
    parts.push(format!("{} ASC", qualify(alias, "id")));
    format!(" ORDER BY {}", parts.join(", "))
}

fn qualify(alias: Option<&str>, column: &str) -> String {
    match alias {
        Some(alias) => format!("{alias}.{column}"),
        None => column.to_string(),
    }
}

/// The join table backing one association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTable {
    /// Table name (`account_groups`).
    pub table: String,
    /// Column holding the navigating side's id.
    pub own: String,
    /// Column holding the related side's id.
    pub other: String,
}

impl JoinTable {
    /// Resolves the join table of `relation`.
    ///
    /// Both directions of an association resolve to the same table with the
    /// columns swapped. The table is named after the kind that sorts first.
    #[must_use]
    pub fn of(relation: &RelationDescriptor) -> Self {
        let (first, second) = if relation.source <= relation.target {
            (relation.source, relation.target)
        } else {
            (relation.target, relation.source)
        };
        Self {
            table: format!("{}_{}", first.name().to_lowercase(), second.collection()),
            own: id_column(relation.source),
            other: id_column(relation.target),
        }
    }
}
