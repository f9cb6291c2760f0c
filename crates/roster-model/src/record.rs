//! Uniform access to entities of any kind.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::Account;
use crate::descriptor::{EntityDescriptor, EntityKind};
use crate::error::{ModelError, ModelResult};
use crate::group::Group;
use crate::role::Role;

/// Field-level access shared by every entity type.
///
/// All scalar fields in this domain are text, so values travel as
/// `Option<&str>` / `Option<String>`.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Kind implemented by this type.
    const KIND: EntityKind;

    /// Returns the identity.
    fn id(&self) -> Uuid;

    /// Reads a scalar field by name.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::UnknownField` for undeclared fields.
    fn field(&self, name: &str) -> ModelResult<Option<&str>>;

    /// Writes a scalar field by name.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::MissingField` when clearing a required field and
    /// `ModelError::UnknownField` for undeclared fields.
    fn set_field(&mut self, name: &str, value: Option<String>) -> ModelResult<()>;
}

pub(crate) fn required_text(
    kind: EntityKind,
    field: &'static str,
    value: Option<String>,
) -> ModelResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ModelError::MissingField { kind, field }),
    }
}

/// An entity of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Record {
    /// An account.
    Account(Account),
    /// A group.
    Group(Group),
    /// A role.
    Role(Role),
}

impl Record {
    /// Creates an empty record with a fresh identity.
    ///
    /// Required fields start blank; callers fill them through
    /// [`Record::set_field`] and finish with [`Record::validate`].
    #[must_use]
    pub fn new(kind: EntityKind) -> Self {
        Self::with_id(kind, Uuid::now_v7())
    }

    /// Creates an empty record with a known identity.
    #[must_use]
    pub fn with_id(kind: EntityKind, id: Uuid) -> Self {
        match kind {
            EntityKind::Account => Self::Account(Account::with_id(id, "")),
            EntityKind::Group => Self::Group(Group::with_id(id, "", "")),
            EntityKind::Role => Self::Role(Role::with_id(id, "", "")),
        }
    }

    /// Returns the entity kind.
    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Account(_) => EntityKind::Account,
            Self::Group(_) => EntityKind::Group,
            Self::Role(_) => EntityKind::Role,
        }
    }

    /// Returns the descriptor of this record's kind.
    #[must_use]
    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.kind().descriptor()
    }

    /// Returns the identity.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        match self {
            Self::Account(a) => a.id,
            Self::Group(g) => g.id,
            Self::Role(r) => r.id,
        }
    }

    /// Reads a scalar field.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::UnknownField` for undeclared fields.
    pub fn field(&self, name: &str) -> ModelResult<Option<&str>> {
        match self {
            Self::Account(a) => a.field(name),
            Self::Group(g) => g.field(name),
            Self::Role(r) => r.field(name),
        }
    }

    /// Writes a scalar field.
    ///
    /// ## Errors
    ///
    /// See [`Entity::set_field`].
    pub fn set_field(&mut self, name: &str, value: Option<String>) -> ModelResult<()> {
        match self {
            Self::Account(a) => a.set_field(name, value),
            Self::Group(g) => g.set_field(name, value),
            Self::Role(r) => r.set_field(name, value),
        }
    }

    /// Iterates over `(field, value)` pairs in descriptor order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, Option<&str>)> + '_ {
        self.descriptor()
            .fields
            .iter()
            .map(move |f| (f.name, self.field(f.name).ok().flatten()))
    }

    /// Checks that every required field holds a non-blank value.
    ///
    /// ## Errors
    ///
    /// Returns `ModelError::MissingField` for the first blank required field.
    pub fn validate(&self) -> ModelResult<()> {
        for (name, value) in self.fields() {
            let Some(field) = self.descriptor().field(name) else {
                continue;
            };
            if field.required && value.is_none_or(|v| v.trim().is_empty()) {
                return Err(ModelError::MissingField {
                    kind: self.kind(),
                    field: field.name,
                });
            }
        }
        Ok(())
    }
}

impl From<Account> for Record {
    fn from(account: Account) -> Self {
        Self::Account(account)
    }
}

impl From<Group> for Record {
    fn from(group: Group) -> Self {
        Self::Group(group)
    }
}

impl From<Role> for Record {
    fn from(role: Role) -> Self {
        Self::Role(role)
    }
}
