//! SQL storage error mapping.

use roster_model::{EntityKind, Record};
use roster_storage::StorageError;
use sqlx::Error as SqlxError;

use crate::schema;

const UNIQUE_VIOLATION: &str = "23505";
const QUERY_CANCELED: &str = "57014";

/// Converts a `SQLx` error to a storage error.
#[allow(clippy::needless_pass_by_value)]
pub fn from_sqlx_error(err: SqlxError) -> StorageError {
    match err {
        SqlxError::RowNotFound => StorageError::Internal("Row not found".to_string()),
        SqlxError::Database(db_err) => {
            if db_err.code().is_some_and(|c| c == QUERY_CANCELED) {
                // statement_timeout expired
                StorageError::Timeout(db_err.message().to_string())
            } else if db_err.code().is_some_and(|c| c == UNIQUE_VIOLATION) {
                StorageError::Query(format!("Duplicate entry: {}", db_err.message()))
            } else {
                StorageError::Query(db_err.to_string())
            }
        }
        SqlxError::PoolTimedOut => StorageError::Timeout("Connection pool timeout".to_string()),
        SqlxError::PoolClosed => StorageError::Unavailable("Connection pool closed".to_string()),
        SqlxError::Io(e) => StorageError::Unavailable(e.to_string()),
        // A row that does not decode is a schema problem, not a client one
        _ => StorageError::Internal(err.to_string()),
    }
}

/// Converts a write error, turning unique violations into
/// `StorageError::Duplicate` naming the offending field and value.
#[allow(clippy::needless_pass_by_value)]
pub fn from_write_error(record: &Record, err: SqlxError) -> StorageError {
    let violated = match &err {
        SqlxError::Database(db_err) if db_err.code().is_some_and(|c| c == UNIQUE_VIOLATION) => {
            Some(db_err.constraint().map(str::to_owned))
        }
        _ => None,
    };
    match violated {
        Some(constraint) => duplicate_for(record, constraint.as_deref()),
        None => from_sqlx_error(err),
    }
}

fn duplicate_for(record: &Record, constraint: Option<&str>) -> StorageError {
    let kind: EntityKind = record.kind();
    if constraint == Some(schema::primary_key(kind).as_str()) {
        return StorageError::duplicate(kind, "id", record.id().to_string());
    }
    let field = kind
        .descriptor()
        .unique_fields()
        .find(|f| constraint == Some(schema::unique_constraint(kind, f.name).as_str()))
        .or_else(|| kind.descriptor().unique_fields().next());
    match field {
        Some(field) => {
            let value = record.field(field.name).ok().flatten().unwrap_or_default();
            StorageError::duplicate(kind, field.name, value)
        }
        None => StorageError::duplicate(kind, "id", record.id().to_string()),
    }
}
