//! Account domain model.
//!
//! An account is the local identity of a person. Credentials live in the
//! external directory, keyed by `username`; nothing secret is stored here.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::descriptor::EntityKind;
use crate::error::{ModelError, ModelResult};
use crate::record::{Entity, required_text};

/// A Roster account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier, assigned at creation and never changed.
    pub id: Uuid,
    /// Unique login name, shared with the external directory.
    pub username: String,
    /// Given name.
    pub firstname: Option<String>,
    /// Family name.
    pub lastname: Option<String>,
}

impl Account {
    /// Creates a new account with a fresh identity.
    #[must_use]
    pub fn new(username: impl Into<String>) -> Self {
        Self::with_id(Uuid::now_v7(), username)
    }

    /// Creates an account with a known identity (used when loading rows).
    #[must_use]
    pub fn with_id(id: Uuid, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            firstname: None,
            lastname: None,
        }
    }

    /// Sets the first name.
    #[must_use]
    pub fn with_firstname(mut self, firstname: impl Into<String>) -> Self {
        self.firstname = Some(firstname.into());
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn with_lastname(mut self, lastname: impl Into<String>) -> Self {
        self.lastname = Some(lastname.into());
        self
    }
}

impl Entity for Account {
    const KIND: EntityKind = EntityKind::Account;

    fn id(&self) -> Uuid {
        self.id
    }

    fn field(&self, name: &str) -> ModelResult<Option<&str>> {
        match name {
            "username" => Ok(Some(&self.username)),
            "firstname" => Ok(self.firstname.as_deref()),
            "lastname" => Ok(self.lastname.as_deref()),
            _ => Err(ModelError::unknown_field(Self::KIND, name)),
        }
    }

    fn set_field(&mut self, name: &str, value: Option<String>) -> ModelResult<()> {
        match name {
            "username" => self.username = required_text(Self::KIND, "username", value)?,
            "firstname" => self.firstname = value,
            "lastname" => self.lastname = value,
            _ => return Err(ModelError::unknown_field(Self::KIND, name)),
        }
        Ok(())
    }
}
