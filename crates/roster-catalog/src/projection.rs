//! Named projections.
//!
//! A projection is data: an ordered list of scalar fields plus the relations
//! to expand and how. One generic renderer interprets it.

use roster_model::EntityKind;

/// How the related entities of an expanded relation are rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expand {
    /// Minimal representation: identity and self link only.
    Raw,
    /// Render through the named projection of the related kind.
    Projection(String),
}

/// An expanded relation inside a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationExpansion {
    /// Relation declared on the projected kind.
    pub relation: &'static str,
    /// Rendering of the related entities.
    pub expand: Expand,
}

/// A named view of one entity kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionDef {
    /// Projected kind.
    pub kind: EntityKind,
    /// Name, selected by the `projection` query parameter.
    pub name: String,
    /// Scalar fields, in output order.
    pub fields: Vec<&'static str>,
    /// Relations to embed.
    pub relations: Vec<RelationExpansion>,
}

impl ProjectionDef {
    /// Starts a projection with the given scalar fields.
    #[must_use]
    pub fn new(kind: EntityKind, name: impl Into<String>, fields: &[&'static str]) -> Self {
        Self {
            kind,
            name: name.into(),
            fields: fields.to_vec(),
            relations: Vec::new(),
        }
    }

    /// Embeds `relation` in minimal representation.
    #[must_use]
    pub fn raw(mut self, relation: &'static str) -> Self {
        self.relations.push(RelationExpansion {
            relation,
            expand: Expand::Raw,
        });
        self
    }

    /// Embeds `relation` rendered through projection `name` of the related kind.
    #[must_use]
    pub fn chain(mut self, relation: &'static str, name: impl Into<String>) -> Self {
        self.relations.push(RelationExpansion {
            relation,
            expand: Expand::Projection(name.into()),
        });
        self
    }

    /// Chained projections, as `(relation, projection)` pairs.
    pub fn chains(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.relations.iter().filter_map(|r| match &r.expand {
            Expand::Projection(name) => Some((r.relation, name.as_str())),
            Expand::Raw => None,
        })
    }
}
