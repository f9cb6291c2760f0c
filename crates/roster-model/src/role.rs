//! Role domain model.
//!
//! Roles are conferred on accounts through group membership.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::EntityKind;
use crate::error::{ModelError, ModelResult};
use crate::record::{Entity, required_text};

/// A Roster role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Short unique token (e.g. "admin").
    pub code: String,
    /// Free-form description.
    pub description: Option<String>,
}

impl Role {
    /// Creates a new role with a fresh identity.
    #[must_use]
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self::with_id(Uuid::now_v7(), name, code)
    }

    /// Creates a role with a known identity.
    #[must_use]
    pub fn with_id(id: Uuid, name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            code: code.into(),
            description: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

impl Entity for Role {
    const KIND: EntityKind = EntityKind::Role;

    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> ModelResult<Option<&str>> {
        match name {
            "name" => Ok(Some(&self.name)),
            "code" => Ok(Some(&self.code)),
            "description" => Ok(self.description.as_deref()),
            _ => Err(ModelError::unknown_field(Self::KIND, name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Option<String>) -> ModelResult<()> {
        match name {
            "name" => self.name = required_text(Self::KIND, "name", value)?,
            "code" => self.code = required_text(Self::KIND, "code", value)?,
            "description" => self.description = value,
            _ => return Err(ModelError::unknown_field(Self::KIND, name)),
        }
        Ok(())
    }
}
