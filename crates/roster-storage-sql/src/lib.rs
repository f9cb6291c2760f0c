//! # roster-storage-sql
//!
//! `PostgreSQL` storage engine for Roster, built on `SQLx`.
//!
//! Each entity kind maps to one table named after its collection, with one
//! column per scalar field. Each association maps to a single join table, so
//! one row carries both navigation directions.
//!
//! ## Modules
//!
//! - [`pool`] - connection pool configuration
//! - [`repository`] - [`PgRepository`]
//! - [`schema`] - table and column naming
//! - [`error`] - `SQLx` error mapping

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod pool;
pub mod repository;
pub mod schema;

pub use pool::{PoolConfig, create_pool};
pub use repository::PgRepository;

use roster_storage::{StorageError, StorageResult};
use sqlx::PgPool;

/// Applies the bundled schema migration.
///
/// ## Errors
///
/// Returns `StorageError::Internal` if a migration fails.
pub async fn migrate(pool: &PgPool) -> StorageResult<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| StorageError::Internal(format!("migration failed: {e}")))?;
    tracing::info!("Database migrations applied");
    Ok(())
}
