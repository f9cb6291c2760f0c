//! API error types.
//!
//! Maps storage, search and model errors to HTTP responses with a stable
//! `error` code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use roster_catalog::SearchError;
use roster_model::{EntityKind, ModelError};
use roster_storage::StorageError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur in the resource API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown identity, collection, relation or search.
    #[error("{0}")]
    NotFound(String),

    /// Missing or malformed parameter or body.
    #[error("{0}")]
    BadRequest(String),

    /// Uniqueness violation.
    #[error("{kind} already exists: {field} '{value}'")]
    Conflict {
        /// Kind of entity.
        kind: EntityKind,
        /// Field that caused the conflict.
        field: String,
        /// Conflicting value.
        value: String,
    },

    /// The projection is not registered for the kind.
    #[error("{kind} has no projection '{name}'")]
    UnknownProjection {
        /// Kind of entity.
        kind: EntityKind,
        /// Requested projection.
        name: String,
    },

    /// Storage did not answer in time.
    #[error("Storage timeout: {0}")]
    StorageTimeout(String),

    /// Storage cannot be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Creates a not found error for an unknown collection segment.
    #[must_use]
    pub fn unknown_collection(segment: &str) -> Self {
        Self::NotFound(format!("no collection '{segment}'"))
    }

    /// Creates a not found error for an entity.
    #[must_use]
    pub fn entity_not_found(kind: EntityKind, id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("{kind} not found: {id}"))
    }

    /// Creates a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::UnknownProjection { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::StorageTimeout(_) | Self::StorageUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::Conflict { .. } => "conflict",
            Self::UnknownProjection { .. } => "unknown_projection",
            Self::StorageTimeout(_) => "storage_timeout",
            Self::StorageUnavailable(_) => "storage_unavailable",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { kind, id } => Self::entity_not_found(kind, id),
            StorageError::UnknownRelation { .. } => Self::NotFound(err.to_string()),
            StorageError::Duplicate { kind, field, value } => Self::Conflict { kind, field, value },
            StorageError::InvalidData(message) => Self::BadRequest(message),
            StorageError::Timeout(message) => Self::StorageTimeout(message),
            StorageError::Unavailable(message) => Self::StorageUnavailable(message),
            StorageError::Query(_) | StorageError::Transaction(_) | StorageError::Internal(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<ModelError> for ApiError {
    fn from(err: ModelError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

/// API error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub error: String,
    /// Human-readable error message.
    pub error_description: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        } else {
            tracing::debug!(error = %self, code = self.error_code(), "request rejected");
        }
        let body = ErrorResponse {
            error: self.error_code().to_string(),
            error_description: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
