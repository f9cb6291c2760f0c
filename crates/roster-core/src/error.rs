//! Core error type.

use thiserror::Error;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling a Roster process.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Creates a configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
