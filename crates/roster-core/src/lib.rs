//! # roster-core
//!
//! Configuration and error handling shared by the Roster crates.
//!
//! ## Modules
//!
//! - [`config`] - [`Config`], loaded from the environment
//! - [`error`] - [`Error`]

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;

pub use config::{Config, PagingConfig, ServerConfig, StorageConfig, StorageMode};
pub use error::{Error, Result};
