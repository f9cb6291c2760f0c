//! Storage error types.

use roster_model::{EntityKind, ModelError};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Entity not found.
    #[error("Entity not found: {kind} with id {id}")]
    NotFound {
        /// Kind of entity.
        kind: EntityKind,
        /// Entity ID.
        id: Uuid,
    },

    /// The relation is not declared on the entity kind.
    #[error("{kind} has no relation '{relation}'")]
    UnknownRelation {
        /// Kind of entity.
        kind: EntityKind,
        /// Requested relation name.
        relation: String,
    },

    /// Duplicate entity (unique constraint violation).
    #[error("Duplicate {kind}: {field} '{value}' already exists")]
    Duplicate {
        /// Kind of entity.
        kind: EntityKind,
        /// Field that caused the conflict.
        field: String,
        /// Conflicting value.
        value: String,
    },

    /// Invalid request data, such as an unknown sort key.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The storage engine did not answer in time.
    #[error("Storage timeout: {0}")]
    Timeout(String),

    /// The storage engine cannot be reached.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Database query error.
    #[error("Database query error: {0}")]
    Query(String),

    /// Transaction error.
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Internal error.
    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Creates a not found error for an entity.
    #[must_use]
    pub const fn not_found(kind: EntityKind, id: Uuid) -> Self {
        Self::NotFound { kind, id }
    }

    /// Creates a duplicate error.
    #[must_use]
    pub fn duplicate(kind: EntityKind, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            kind,
            field: field.into(),
            value: value.into(),
        }
    }

    /// Creates an unknown relation error.
    #[must_use]
    pub fn unknown_relation(kind: EntityKind, relation: impl Into<String>) -> Self {
        Self::UnknownRelation {
            kind,
            relation: relation.into(),
        }
    }

    /// Checks if this is a not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::UnknownRelation { .. })
    }

    /// Checks if this is a duplicate error.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

impl From<ModelError> for StorageError {
    fn from(err: ModelError) -> Self {
        Self::InvalidData(err.to_string())
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
