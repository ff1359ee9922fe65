//! PostgreSQL backup store.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgRow};
use sqlx::{Postgres, QueryBuilder, Row};
use tracing::debug;
use uuid::Uuid;

use vaultkeeper_core::context::RequestContext;
use vaultkeeper_core::error::{AppError, ErrorKind};
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_core::types::{FieldValue, Filters, Primitive};
use vaultkeeper_entity::backup::BACKUP_SCHEMA;
use vaultkeeper_entity::object::{FieldKind, FieldSpec};

use crate::columns::{self, TABLE};

/// SQLSTATE raised when a NOT NULL column receives null.
const NOT_NULL_VIOLATION: &str = "23502";

/// [`BackupStore`] over the `backups` table.
#[derive(Debug, Clone)]
pub struct PgBackupStore {
    pool: PgPool,
}

impl PgBackupStore {
    /// Create a new store on an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn not_found(id: &str) -> AppError {
        AppError::not_found(format!("Backup {id} could not be found."))
    }

    fn db_error(message: &str) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
        move |e| AppError::with_source(ErrorKind::Database, message, e)
    }

    async fn fetch_rows(&self, filters: &[(&'static FieldSpec, FieldValue)]) -> AppResult<Vec<Primitive>> {
        let mut qb = select_query();
        push_where(&mut qb, filters);
        qb.push(" ORDER BY created_at, id");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Self::db_error("Failed to list backups"))?;
        rows.iter().map(decode_row).collect()
    }
}

/// Comma-separated list of every declared column.
fn column_list() -> String {
    BACKUP_SCHEMA
        .fields
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn select_query() -> QueryBuilder<'static, Postgres> {
    QueryBuilder::new(format!("SELECT {} FROM {TABLE}", column_list()))
}

/// Bind a value using the column's SQL type.
fn push_value(qb: &mut QueryBuilder<'static, Postgres>, spec: &FieldSpec, value: &FieldValue) {
    match spec.kind {
        FieldKind::Integer => {
            qb.push_bind(value.as_integer());
        }
        FieldKind::Uuid | FieldKind::String => {
            qb.push_bind(value.as_str().map(str::to_string));
        }
    }
}

/// Append `WHERE a = $1 AND b IS NULL ...` for the given equality filters.
fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filters: &[(&'static FieldSpec, FieldValue)]) {
    for (i, (spec, value)) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        qb.push(spec.name);
        if value.is_null() {
            qb.push(" IS NULL");
        } else {
            qb.push(" = ");
            push_value(qb, spec, value);
        }
    }
}

fn insert_query(fields: &[(&'static FieldSpec, FieldValue)]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {TABLE} ("));
    let mut names = qb.separated(", ");
    for (spec, _) in fields {
        names.push(spec.name);
    }
    qb.push(") VALUES (");
    let mut values = qb.separated(", ");
    for (spec, value) in fields {
        match spec.kind {
            FieldKind::Integer => values.push_bind(value.as_integer()),
            FieldKind::Uuid | FieldKind::String => {
                values.push_bind(value.as_str().map(str::to_string))
            }
        };
    }
    qb.push(format!(") RETURNING {}", column_list()));
    qb
}

fn update_query(id: &str, delta: &[(&'static FieldSpec, FieldValue)]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {TABLE} SET "));
    for (i, (spec, value)) in delta.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(spec.name);
        qb.push(" = ");
        push_value(&mut qb, spec, value);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id.to_string());
    qb
}

/// Decode a row into a primitive holding every declared column.
fn decode_row(row: &PgRow) -> AppResult<Primitive> {
    BACKUP_SCHEMA
        .fields
        .iter()
        .map(|spec| {
            let value = match spec.kind {
                FieldKind::Integer => row
                    .try_get::<Option<i64>, _>(spec.name)
                    .map(FieldValue::from),
                FieldKind::Uuid | FieldKind::String => row
                    .try_get::<Option<String>, _>(spec.name)
                    .map(FieldValue::from),
            }
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Database,
                    format!("Failed to decode backup column '{}'", spec.name),
                    e,
                )
            })?;
            Ok((spec.name.to_string(), value))
        })
        .collect()
}

#[async_trait]
impl BackupStore for PgBackupStore {
    async fn get(&self, _ctx: &RequestContext, id: &str) -> AppResult<Primitive> {
        let mut qb = select_query();
        qb.push(" WHERE id = ");
        qb.push_bind(id.to_string());

        let row = qb
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::db_error("Failed to find backup"))?
            .ok_or_else(|| Self::not_found(id))?;
        decode_row(&row)
    }

    async fn create(&self, ctx: &RequestContext, fields: &Primitive) -> AppResult<Primitive> {
        let mut resolved = columns::resolve(fields)?;
        if !resolved
            .iter()
            .any(|(spec, value)| spec.name == "id" && !value.is_null())
        {
            resolved.retain(|(spec, _)| spec.name != "id");
            resolved.push((columns::column("id")?, Uuid::new_v4().into()));
        }

        let row = insert_query(&resolved)
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                let kind = match &e {
                    sqlx::Error::Database(db) if db.is_unique_violation() => ErrorKind::Conflict,
                    sqlx::Error::Database(db)
                        if db.is_check_violation() || db.code().as_deref() == Some(NOT_NULL_VIOLATION) =>
                    {
                        ErrorKind::Validation
                    }
                    _ => ErrorKind::Database,
                };
                AppError::with_source(kind, "Failed to create backup", e)
            })?;

        let row = decode_row(&row)?;
        debug!(
            backup_id = ?row.get("id").and_then(FieldValue::as_str),
            request_id = %ctx.request_id,
            "Inserted backup row"
        );
        Ok(row)
    }

    async fn update(&self, ctx: &RequestContext, id: &str, delta: &Primitive) -> AppResult<()> {
        let resolved = columns::resolve(delta)?;
        if resolved.iter().any(|(spec, _)| spec.name == "id") {
            return Err(AppError::validation("Backup id cannot be updated"));
        }
        if resolved.is_empty() {
            return Ok(());
        }

        let result = update_query(id, &resolved)
            .build()
            .execute(&self.pool)
            .await
            .map_err(Self::db_error("Failed to update backup"))?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }

        debug!(backup_id = %id, request_id = %ctx.request_id, "Updated backup row");
        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, id: &str) -> AppResult<()> {
        if !ctx.is_admin {
            return Err(AppError::authorization(
                "Deleting a backup requires an admin context",
            ));
        }

        let result = sqlx::query(&format!("DELETE FROM {TABLE} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Self::db_error("Failed to delete backup"))?;
        if result.rows_affected() == 0 {
            return Err(Self::not_found(id));
        }

        debug!(backup_id = %id, request_id = %ctx.request_id, "Deleted backup row");
        Ok(())
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        self.fetch_rows(&columns::resolve_filters(filters)?).await
    }

    async fn list_by_host(&self, _ctx: &RequestContext, host: &str) -> AppResult<Vec<Primitive>> {
        self.fetch_rows(&[(columns::column("host")?, host.into())])
            .await
    }

    async fn list_by_project(
        &self,
        _ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        let mut resolved = vec![(columns::column("project_id")?, project_id.into())];
        resolved.extend(columns::resolve_filters(filters)?);
        self.fetch_rows(&resolved).await
    }

    async fn list_by_volume(
        &self,
        _ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        let mut resolved = vec![(columns::column("volume_id")?, volume_id.into())];
        resolved.extend(columns::resolve_filters(filters)?);
        self.fetch_rows(&resolved).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str) -> &'static FieldSpec {
        columns::column(name).expect("declared column")
    }

    #[test]
    fn test_select_lists_every_column() {
        let qb = select_query();
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT id, user_id, project_id, volume_id, host"));
        assert!(sql.ends_with("num_dependent_backups FROM backups"));
    }

    #[test]
    fn test_where_clause_binds_and_null_checks() {
        let mut qb = select_query();
        push_where(
            &mut qb,
            &[
                (spec("project_id"), "p1".into()),
                (spec("parent_id"), FieldValue::Null),
                (spec("size"), FieldValue::Integer(4)),
            ],
        );
        assert!(
            qb.sql()
                .ends_with(" WHERE project_id = $1 AND parent_id IS NULL AND size = $2")
        );
    }

    #[test]
    fn test_insert_returns_full_row() {
        let qb = insert_query(&[(spec("id"), "b1".into()), (spec("size"), FieldValue::Integer(1))]);
        let sql = qb.sql();
        assert!(sql.starts_with("INSERT INTO backups (id, size) VALUES ($1, $2) RETURNING id, "));
    }

    #[test]
    fn test_update_sets_only_delta() {
        let qb = update_query(
            "b1",
            &[(spec("status"), "available".into()), (spec("object_count"), FieldValue::Integer(3))],
        );
        assert_eq!(
            qb.sql(),
            "UPDATE backups SET status = $1, object_count = $2 WHERE id = $3"
        );
    }
}
