//! Model error types.

use thiserror::Error;

use crate::descriptor::EntityKind;

/// Errors raised while reading or writing entity fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The field is not declared on the entity kind.
    #[error("{kind} has no field '{field}'")]
    UnknownField {
        /// Entity kind.
        kind: EntityKind,
        /// Requested field.
        field: String,
    },

    /// A required field is absent or blank.
    #[error("{kind}.{field} is required")]
    MissingField {
        /// Entity kind.
        kind: EntityKind,
        /// Required field.
        field: &'static str,
    },
}

impl ModelError {
    /// Creates an unknown field error.
    #[must_use]
    pub fn unknown_field(kind: EntityKind, field: impl Into<String>) -> Self {
        Self::UnknownField {
            kind,
            field: field.into(),
        }
    }
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
