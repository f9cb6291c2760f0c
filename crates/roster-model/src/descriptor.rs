//! Static entity descriptors.
//!
//! Every generic component (storage engines, catalog validation, the
//! resource layer) learns the shape of an entity from these descriptors
//! instead of from the concrete Rust types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kinds of entity exposed by Roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A user account.
    Account,
    /// A group of accounts.
    Group,
    /// A role conferred by groups.
    Role,
}

impl EntityKind {
    /// All entity kinds, in declaration order.
    pub const ALL: [Self; 3] = [Self::Account, Self::Group, Self::Role];

    /// Returns the static descriptor for this kind.
    #[must_use]
    pub fn descriptor(self) -> &'static EntityDescriptor {
        match self {
            Self::Account => &ACCOUNT,
            Self::Group => &GROUP,
            Self::Role => &ROLE,
        }
    }

    /// Singular display name (e.g. "Account").
    #[must_use]
    pub fn name(self) -> &'static str {
        self.descriptor().name
    }

    /// Collection path segment (e.g. "accounts").
    #[must_use]
    pub fn collection(self) -> &'static str {
        self.descriptor().collection
    }

    /// Resolves a kind from its collection path segment.
    #[must_use]
    pub fn from_collection(segment: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.collection() == segment)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar field of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as exposed in documents and used as column name.
    pub name: &'static str,
    /// Whether the field must hold a non-empty value.
    pub required: bool,
    /// Whether the value must be unique within the entity kind.
    pub unique: bool,
}

impl FieldDescriptor {
    const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            unique: false,
        }
    }

    const fn unique(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            unique: true,
        }
    }

    const fn optional(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            unique: false,
        }
    }
}

/// One navigable direction of a many-to-many association.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationDescriptor {
    /// Relation name, used as the nested resource path segment.
    pub name: &'static str,
    /// Kind owning this direction.
    pub source: EntityKind,
    /// Kind on the other end.
    pub target: EntityKind,
    /// Name of the opposite direction on `target`.
    pub inverse: &'static str,
}

impl RelationDescriptor {
    /// Returns the opposite direction of this relation.
    ///
    /// The built-in descriptors always declare both directions, which the
    /// tests below check.
    #[must_use]
    pub fn inverse_descriptor(&self) -> Option<&'static RelationDescriptor> {
        self.target.descriptor().relation(self.inverse)
    }
}

/// Static description of an entity kind.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Kind described.
    pub kind: EntityKind,
    /// Singular display name.
    pub name: &'static str,
    /// Collection path segment and table name.
    pub collection: &'static str,
    /// Scalar fields in document order.
    pub fields: &'static [FieldDescriptor],
    /// Relations owned by this kind.
    pub relations: &'static [RelationDescriptor],
}

impl EntityDescriptor {
    /// Looks up a scalar field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Looks up a relation by name.
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&'static RelationDescriptor> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Returns the fields that carry a uniqueness constraint.
    pub fn unique_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.unique)
    }
}

static ACCOUNT_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::unique("username"),
    FieldDescriptor::optional("firstname"),
    FieldDescriptor::optional("lastname"),
];

static GROUP_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::required("name"),
    FieldDescriptor::unique("code"),
    FieldDescriptor::optional("description"),
];

static ROLE_FIELDS: [FieldDescriptor; 3] = [
    FieldDescriptor::required("name"),
    FieldDescriptor::unique("code"),
    FieldDescriptor::optional("description"),
];

static ACCOUNT_RELATIONS: [RelationDescriptor; 1] = [RelationDescriptor {
    name: "groups",
    source: EntityKind::Account,
    target: EntityKind::Group,
    inverse: "accounts",
}];

static GROUP_RELATIONS: [RelationDescriptor; 2] = [
    RelationDescriptor {
        name: "accounts",
        source: EntityKind::Group,
        target: EntityKind::Account,
        inverse: "groups",
    },
    RelationDescriptor {
        name: "roles",
        source: EntityKind::Group,
        target: EntityKind::Role,
        inverse: "groups",
    },
];

static ROLE_RELATIONS: [RelationDescriptor; 1] = [RelationDescriptor {
    name: "groups",
    source: EntityKind::Role,
    target: EntityKind::Group,
    inverse: "roles",
}];

static ACCOUNT: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Account,
    name: "Account",
    collection: "accounts",
    fields: &ACCOUNT_FIELDS,
    relations: &ACCOUNT_RELATIONS,
};

static GROUP: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Group,
    name: "Group",
    collection: "groups",
    fields: &GROUP_FIELDS,
    relations: &GROUP_RELATIONS,
};

static ROLE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Role,
    name: "Role",
    collection: "roles",
    fields: &ROLE_FIELDS,
    relations: &ROLE_RELATIONS,
};
