//! `PostgreSQL` implementation of the repository.

use async_trait::async_trait;
use roster_model::{EntityKind, Record};
use roster_storage::{
    Criterion, Page, PageRequest, RelationChange, Repository, StorageError, StorageResult,
    check_sort, resolve_relation,
};
use sqlx::postgres::{PgExecutor, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use crate::error::{from_sqlx_error, from_write_error};
use crate::schema::{self, JoinTable};

/// `PostgreSQL` repository for every entity kind.
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    /// Creates a new `PostgreSQL` repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists<'e, E>(executor: E, kind: EntityKind, id: Uuid) -> StorageResult<bool>
    where
        E: PgExecutor<'e>,
    {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", schema::table(kind));
        sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(executor)
            .await
            .map_err(from_sqlx_error)
    }

    async fn require<'e, E>(executor: E, kind: EntityKind, id: Uuid) -> StorageResult<()>
    where
        E: PgExecutor<'e>,
    {
        if Self::exists(executor, kind, id).await? {
            Ok(())
        } else {
            Err(StorageError::not_found(kind, id))
        }
    }
}

fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);
    escaped.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn push_criteria(qb: &mut QueryBuilder<'_, Postgres>, criteria: &[Criterion], alias: Option<&str>) {
    for criterion in criteria {
        match criterion {
            Criterion::Contains { field, value } => {
                qb.push(" AND ");
                if let Some(alias) = alias {
                    qb.push(alias).push(".");
                }
                qb.push(*field)
                    .push(" ILIKE ")
                    .push_bind(escape_like(value));
            }
        }
    }
}

fn push_page(qb: &mut QueryBuilder<'_, Postgres>, request: &PageRequest, alias: Option<&str>) {
    qb.push(schema::order_by(&request.sort, alias))
        .push(" LIMIT ")
        .push_bind(i64::from(request.limit()))
        .push(" OFFSET ")
        .push_bind(i64::try_from(request.offset()).unwrap_or(i64::MAX));
}

fn decode(kind: EntityKind, row: &PgRow) -> StorageResult<Record> {
    let id: Uuid = row.try_get("id").map_err(from_sqlx_error)?;
    let mut record = Record::with_id(kind, id);
    for field in kind.descriptor().fields {
        let value: Option<String> = row.try_get(field.name).map_err(from_sqlx_error)?;
        record
            .set_field(field.name, value)
            .map_err(|e| StorageError::Internal(format!("stored {kind} {id}: {e}")))?;
    }
    Ok(record)
}

fn to_count(total: i64) -> u64 {
    u64::try_from(total).unwrap_or_default()
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_by_id(&self, kind: EntityKind, id: Uuid) -> StorageResult<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = $1",
            schema::columns(kind, None),
            schema::table(kind)
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        row.map(|r| decode(kind, &r)).transpose()
    }

    async fn search(
        &self,
        kind: EntityKind,
        criteria: &[Criterion],
        request: &PageRequest,
    ) -> StorageResult<Page<Record>> {
        check_sort(kind, request)?;
        let table = schema::table(kind);

        let mut count = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {table} WHERE TRUE"));
        push_criteria(&mut count, criteria, None);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {table} WHERE TRUE",
            schema::columns(kind, None)
        ));
        push_criteria(&mut select, criteria, None);
        push_page(&mut select, request, None);
        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        let items = rows
            .iter()
            .map(|r| decode(kind, r))
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(Page::new(items, to_count(total), request))
    }

    async fn create(&self, record: &Record) -> StorageResult<()> {
        record.validate()?;
        let kind = record.kind();

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "INSERT INTO {} ({}) VALUES (",
            schema::table(kind),
            schema::columns(kind, None)
        ));
        let mut values = qb.separated(", ");
        values.push_bind(record.id());
        for (_, value) in record.fields() {
            values.push_bind(value.map(str::to_owned));
        }
        qb.push(")");

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(|e| from_write_error(record, e))?;

        tracing::debug!(kind = %kind, id = %record.id(), "created entity");
        Ok(())
    }

    async fn update(&self, record: &Record) -> StorageResult<()> {
        record.validate()?;
        let kind = record.kind();

        let mut qb = QueryBuilder::<Postgres>::new(format!("UPDATE {} SET ", schema::table(kind)));
        let mut assignments = qb.separated(", ");
        for (name, value) in record.fields() {
            assignments
                .push(format!("{name} = "))
                .push_bind_unseparated(value.map(str::to_owned));
        }
        qb.push(" WHERE id = ").push_bind(record.id());

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| from_write_error(record, e))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(kind, record.id()));
        }
        Ok(())
    }

    async fn delete_by_id(&self, kind: EntityKind, id: Uuid) -> StorageResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        for relation in kind.descriptor().relations {
            let join = JoinTable::of(relation);
            let sql = format!("DELETE FROM {} WHERE {} = $1", join.table, join.own);
            sqlx::query(&sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(from_sqlx_error)?;
        }

        let sql = format!("DELETE FROM {} WHERE id = $1", schema::table(kind));
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx_error)?;
        if result.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(StorageError::not_found(kind, id));
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;
        tracing::debug!(kind = %kind, id = %id, "deleted entity");
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
        Self::require(&self.pool, kind, id).await?;
        let join = JoinTable::of(relation);

        let count_sql = format!("SELECT COUNT(*) FROM {} WHERE {} = $1", join.table, join.own);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        let mut select = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM {} t JOIN {} j ON j.{} = t.id WHERE j.{} = ",
            schema::columns(relation.target, Some("t")),
            schema::table(relation.target),
            join.table,
            join.other,
            join.own
        ));
        select.push_bind(id);
        push_page(&mut select, request, Some("t"));
        let rows = select
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(from_sqlx_error)?;

        let items = rows
            .iter()
            .map(|r| decode(relation.target, r))
            .collect::<StorageResult<Vec<_>>>()?;
        Ok(Page::new(items, to_count(total), request))
    }

    async fn is_related(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<bool> {
        let relation = resolve_relation(kind, relation)?;
        Self::require(&self.pool, kind, id).await?;
        let join = JoinTable::of(relation);

        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = $1 AND {} = $2)",
            join.table, join.own, join.other
        );
        sqlx::query_scalar(&sql)
            .bind(id)
            .bind(related_id)
            .fetch_one(&self.pool)
            .await
            .map_err(from_sqlx_error)
    }

    async fn add_relation(
        &self,
        kind: EntityKind,
        id: Uuid,
        relation: &str,
        related_id: Uuid,
    ) -> StorageResult<RelationChange> {
        let relation = resolve_relation(kind, relation)?;
        let join = JoinTable::of(relation);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        Self::require(&mut *tx, kind, id).await?;
        Self::require(&mut *tx, relation.target, related_id).await?;

        let sql = format!(
            "INSERT INTO {} ({}, {}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            join.table, join.own, join.other
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(related_id)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx_error)?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        Ok(if result.rows_affected() > 0 {
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
        let join = JoinTable::of(relation);
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        Self::require(&mut *tx, kind, id).await?;
        Self::require(&mut *tx, relation.target, related_id).await?;

        let sql = format!(
            "DELETE FROM {} WHERE {} = $1 AND {} = $2",
            join.table, join.own, join.other
        );
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(related_id)
            .execute(&mut *tx)
            .await
            .map_err(from_sqlx_error)?;

        tx.commit()
            .await
            .map_err(|e| StorageError::Transaction(e.to_string()))?;

        Ok(if result.rows_affected() > 0 {
            RelationChange::Removed
        } else {
            RelationChange::Unchanged
        })
    }

    async fn ping(&self) -> StorageResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(from_sqlx_error)?;
        Ok(())
    }
}
