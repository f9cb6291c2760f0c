//! Repository trait.

use async_trait::async_trait;
use roster_model::{EntityKind, Record, RelationDescriptor};
use uuid::Uuid;

use crate::criteria::Criterion;
use crate::error::{StorageError, StorageResult};
use crate::page::{Page, PageRequest};

/// Outcome of a relation mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationChange {
    /// The edge was created.
    Added,
    /// The edge was deleted.
    Removed,
    /// The edge was already in the requested state.
    Unchanged,
}

/// Uniform CRUD, paging, search and relation access for every entity kind.
///
/// Implementations must be thread-safe and support concurrent access. Every
/// mutation is atomic: relation changes update both navigation directions
/// together, and deleting an entity drops its edges in the same step.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Gets an entity by ID.
    async fn find_by_id(&self, kind: EntityKind, id: Uuid) -> StorageResult<Option<Record>>;

    /// Lists entities matching every criterion, one page at a time.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::InvalidData` if a sort key names an unknown field.
    async fn search(
        &self,
        kind: EntityKind,
        criteria: &[Criterion],
        request: &PageRequest,
    ) -> StorageResult<Page<Record>>;

    /// Lists all entities of a kind, one page at a time.
    async fn find_page(&self, kind: EntityKind, request: &PageRequest) -> StorageResult<Page<Record>> {
        self.search(kind, &[], request).await
    }

    /// Inserts a new entity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::Duplicate` if a unique field value is taken.
    async fn create(&self, record: &Record) -> StorageResult<()>;

    /// Replaces the scalar fields of an existing entity.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the entity doesn't exist and
    /// `StorageError::Duplicate` if a unique field value is taken.
    async fn update(&self, record: &Record) -> StorageResult<()>;

    /// Deletes an entity and every relation edge it takes part in.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the entity doesn't exist.
    async fn delete_by_id(&self, kind: EntityKind, id: Uuid) -> StorageResult<()>;

    /// Lists the entities on the other end of `relation`.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if the source entity doesn't exist and
    /// `StorageError::UnknownRelation` if the relation isn't declared.
    async fn list_related(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<Record>>;

    /// Checks whether a single edge exists.
    async fn is_related(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<bool>;

    /// Adds an edge, updating both directions atomically.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if either side doesn't exist.
    async fn add_relation(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<RelationChange>;

    /// Removes an edge, updating both directions atomically.
    ///
    /// ## Errors
    ///
    /// Returns `StorageError::NotFound` if either side doesn't exist.
    async fn remove_relation(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<RelationChange>;

    /// Checks that the storage engine answers.
    async fn ping(&self) -> StorageResult<()>;
}

/// Resolves a relation name on `kind`.
///
/// ## Errors
///
/// Returns `StorageError::UnknownRelation` if the relation isn't declared.
pub fn resolve_relation(
    kind: EntityKind,
    relation: &str,
) -> StorageResult<&'static RelationDescriptor> {
    kind.descriptor()
        .relation(relation)
        .ok_or_else(|| StorageError::unknown_relation(kind, relation))
}

/// Checks that every sort key names a scalar field of `kind`.
///
/// ## Errors
///
/// Returns `StorageError::InvalidData` naming the first unknown field.
pub fn check_sort(kind: EntityKind, request: &PageRequest) -> StorageResult<()> {
    for key in &request.sort {
        if kind.descriptor().field(&key.field).is_none() {
            return Err(StorageError::InvalidData(format!(
                "{kind} cannot be sorted by '{}'",
                key.field
            )));
        }
    }
    Ok(())
}
