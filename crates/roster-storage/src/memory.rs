//! In-memory storage engine.
//!
//! Rows and edges live behind a single `parking_lot::RwLock`, so every
//! mutation (including the two directions of an edge and the cascade on
//! delete) is applied under one write guard.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use async_trait::async_trait;
use parking_lot::RwLock;
use roster_model::{EntityKind, Record};
use uuid::Uuid;

use crate::criteria::Criterion;
use crate::error::{StorageError, StorageResult};
use crate::page::{Direction, Page, PageRequest, SortKey};
use crate::repository::{RelationChange, Repository, check_sort, resolve_relation};

type EdgeKey = (EntityKind, &'static str);

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<EntityKind, BTreeMap<Uuid, Record>>,
    edges: HashMap<EdgeKey, HashMap<Uuid, BTreeSet<Uuid>>>,
}

impl Tables {
    fn get(&self, kind: EntityKind, id: Uuid) -> Option<&Record> {
        self.rows.get(&kind).and_then(|rows| rows.get(&id))
    }

    fn contains(&self, kind: EntityKind, id: Uuid) -> bool {
        self.get(kind, id).is_some()
    }

    fn require(&self, kind: EntityKind, id: Uuid) -> StorageResult<()> {
        if self.contains(kind, id) {
            Ok(())
        } else {
            Err(StorageError::not_found(kind, id))
        }
    }

    fn check_unique(&self, record: &Record) -> StorageResult<()> {
        let kind = record.kind();
        let Some(rows) = self.rows.get(&kind) else {
            return Ok(());
        };
        for field in kind.descriptor().unique_fields() {
            let Some(value) = record.field(field.name)? else {
                continue;
            };
            let taken = rows.values().any(|other| {
                other.id() != record.id() && other.field(field.name).ok().flatten() == Some(value)
            });
            if taken {
                return Err(StorageError::duplicate(kind, field.name, value));
            }
        }
        Ok(())
    }

    fn neighbours(&self, kind: EntityKind, relation: &'static str, id: Uuid) -> Option<&BTreeSet<Uuid>> {
        self.edges.get(&(kind, relation)).and_then(|m| m.get(&id))
    }

    fn link(&mut self, key: EdgeKey, from: Uuid, to: Uuid) -> bool {
        self.edges.entry(key).or_default().entry(from).or_default().insert(to)
    }

    fn unlink(&mut self, key: EdgeKey, from: Uuid, to: Uuid) -> bool {
        let Some(targets) = self.edges.get_mut(&key).and_then(|m| m.get_mut(&from)) else {
            return false;
        };
        let removed = targets.remove(&to);
        if targets.is_empty() {
            if let Some(m) = self.edges.get_mut(&key) {
                m.remove(&from);
            }
        }
        removed
    }
}

fn compare(a: &Record, b: &Record, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let left = a.field(&key.field).ok().flatten();
        let right = b.field(&key.field).ok().flatten();
        // None sorts before any value.
        let ord = match key.direction {
            Direction::Asc => left.cmp(&right),
            Direction::Desc => right.cmp(&left),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.id().cmp(&b.id())
}

fn ordered_page(mut records: Vec<Record>, request: &PageRequest) -> Page<Record> {
    records.sort_by(|a, b| compare(a, b, &request.sort));
    Page::slice(records, request)
}

/// Repository backed by process memory.
///
/// Used by the test suites and by the server when `ROSTER_STORAGE=memory`.
/// Data does not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities of `kind`.
    #[must_use]
    pub fn count(&self, kind: EntityKind) -> usize {
        self.tables.read().rows.get(&kind).map_or(0, BTreeMap::len)
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_by_id(&self, kind: EntityKind, id: Uuid) -> StorageResult<Option<Record>> {
        Ok(self.tables.read().get(kind, id).cloned())
    }

    async fn search(
        &self,
        kind: EntityKind,
        criteria: &[Criterion],
        request: &PageRequest,
    ) -> StorageResult<Page<Record>> {
        check_sort(kind, request)?;
        let tables = self.tables.read();
        let matching: Vec<Record> = tables
            .rows
            .get(&kind)
            .map(|rows| {
                rows.values()
                    .filter(|r| criteria.iter().all(|c| c.matches(r)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(ordered_page(matching, request))
    }

    async fn create(&self, record: &Record) -> StorageResult<()> {
        record.validate()?;
        let mut tables = self.tables.write();
        if tables.contains(record.kind(), record.id()) {
            return Err(StorageError::duplicate(
                record.kind(),
                "id",
                record.id().to_string(),
            ));
        }
        tables.check_unique(record)?;
        tables
            .rows
            .entry(record.kind())
            .or_default()
            .insert(record.id(), record.clone());
        tracing::debug!(kind = %record.kind(), id = %record.id(), "created entity");
        Ok(())
    }

    async fn update(&self, record: &Record) -> StorageResult<()> {
        record.validate()?;
        let mut tables = self.tables.write();
        tables.require(record.kind(), record.id())?;
        tables.check_unique(record)?;
        tables
            .rows
            .entry(record.kind())
            .or_default()
            .insert(record.id(), record.clone());
        Ok(())
    }

    async fn delete_by_id(&self, kind: EntityKind, id: Uuid) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let removed = tables.rows.get_mut(&kind).and_then(|rows| rows.remove(&id));
        if removed.is_none() {
            return Err(StorageError::not_found(kind, id));
        }

        let mut dropped = 0usize;
        for relation in kind.descriptor().relations {
            let related = tables
                .edges
                .get_mut(&(kind, relation.name))
                .and_then(|m| m.remove(&id))
                .unwrap_or_default();
            for other in related {
                tables.unlink((relation.target, relation.inverse), other, id);
                dropped += 1;
            }
        }
        tracing::debug!(kind = %kind, id = %id, edges = dropped, "deleted entity");
        Ok(())
    }

    async fn list_related(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        request: &PageRequest,
    ) -> StorageResult<Page<Record>> {
        let relation = resolve_relation(kind, relation)?;
        check_sort(relation.target, request)?;
        let tables = self.tables.read();
        tables.require(kind, id)?;
        let related: Vec<Record> = tables
            .neighbours(kind, relation.name, id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|other| tables.get(relation.target, *other).cloned())
                    .collect()
            })
            .unwrap_or_default();
        Ok(ordered_page(related, request))
    }

    async fn is_related(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<bool> {
        let relation = resolve_relation(kind, relation)?;
        let tables = self.tables.read();
        tables.require(kind, id)?;
        Ok(tables
            .neighbours(kind, relation.name, id)
            .is_some_and(|ids| ids.contains(&related_id)))
    }

    async fn add_relation(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<RelationChange> {
        let relation = resolve_relation(kind, relation)?;
        let mut tables = self.tables.write();
        tables.require(kind, id)?;
        tables.require(relation.target, related_id)?;

        let added = tables.link((kind, relation.name), id, related_id);
        tables.link((relation.target, relation.inverse), related_id, id);
        Ok(if added {
            RelationChange::Added
        } else {
            RelationChange::Unchanged
        })
    }

    async fn remove_relation(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<RelationChange> {
        let relation = resolve_relation(kind, relation)?;
        let mut tables = self.tables.write();
        tables.require(kind, id)?;
        tables.require(relation.target, related_id)?;

        let removed = tables.unlink((kind, relation.name), id, related_id);
        tables.unlink((relation.target, relation.inverse), related_id, id);
        Ok(if removed {
            RelationChange::Removed
        } else {
            RelationChange::Unchanged
        })
    }

    async fn ping(&self) -> StorageResult<()> {
        Ok(())
    }
}
