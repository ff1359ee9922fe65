//! In-memory backup store using dashmap.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use vaultkeeper_core::context::RequestContext;
use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_core::types::{FieldValue, Filters, Primitive};
use vaultkeeper_entity::backup::BACKUP_SCHEMA;
use vaultkeeper_entity::object::{FieldKind, FieldSpec};

use crate::columns;

/// A stored row plus its insertion sequence, used for stable listing order.
#[derive(Debug, Clone)]
struct StoredRow {
    seq: u64,
    row: Primitive,
}

/// Process-local [`BackupStore`].
///
/// Behaves like the SQL store: rows carry every declared column, `id` is
/// generated when absent, UUID columns are NOT NULL, and listing returns rows
/// in insertion order.
#[derive(Debug, Default)]
pub struct MemoryBackupStore {
    rows: DashMap<String, StoredRow>,
    sequence: AtomicU64,
}

impl MemoryBackupStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn not_found(id: &str) -> AppError {
        AppError::not_found(format!("Backup {id} could not be found."))
    }

    fn matching(&self, filters: &[(&'static FieldSpec, FieldValue)]) -> Vec<Primitive> {
        let mut hits: Vec<StoredRow> = self
            .rows
            .iter()
            .filter(|entry| {
                filters
                    .iter()
                    .all(|(spec, value)| entry.row.get(spec.name) == Some(value))
            })
            .map(|entry| entry.value().clone())
            .collect();
        hits.sort_by_key(|stored| stored.seq);
        hits.into_iter().map(|stored| stored.row).collect()
    }

    fn scoped(
        column: &str,
        value: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<(&'static FieldSpec, FieldValue)>> {
        let mut resolved = columns::resolve_filters(filters)?;
        resolved.push((columns::column(column)?, FieldValue::from(value)));
        Ok(resolved)
    }
}

#[async_trait]
impl BackupStore for MemoryBackupStore {
    async fn get(&self, _ctx: &RequestContext, id: &str) -> AppResult<Primitive> {
        self.rows
            .get(id)
            .map(|entry| entry.row.clone())
            .ok_or_else(|| Self::not_found(id))
    }

    async fn create(&self, ctx: &RequestContext, fields: &Primitive) -> AppResult<Primitive> {
        let mut row = columns::full_row(&columns::resolve(fields)?);

        let id = match row.get("id") {
            Some(FieldValue::String(id)) => id.clone(),
            _ => {
                let id = Uuid::new_v4().to_string();
                row.insert("id".to_string(), FieldValue::String(id.clone()));
                id
            }
        };

        let missing = BACKUP_SCHEMA.fields.iter().find(|spec| {
            spec.kind == FieldKind::Uuid
                && !spec.nullable
                && row.get(spec.name).is_none_or(FieldValue::is_null)
        });
        if let Some(spec) = missing {
            return Err(AppError::validation(format!(
                "null value in column '{}' violates not-null constraint",
                spec.name
            )));
        }

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        match self.rows.entry(id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::conflict(format!("Backup {id} already exists.")));
            }
            Entry::Vacant(slot) => {
                slot.insert(StoredRow {
                    seq,
                    row: row.clone(),
                });
            }
        }

        debug!(backup_id = %id, request_id = %ctx.request_id, "Inserted backup row");
        Ok(row)
    }

    async fn update(&self, ctx: &RequestContext, id: &str, delta: &Primitive) -> AppResult<()> {
        let resolved = columns::resolve(delta)?;
        if resolved.iter().any(|(spec, _)| spec.name == "id") {
            return Err(AppError::validation("Backup id cannot be updated"));
        }

        let mut entry = self.rows.get_mut(id).ok_or_else(|| Self::not_found(id))?;
        for (spec, value) in resolved {
            entry.row.insert(spec.name.to_string(), value);
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
        self.rows.remove(id).ok_or_else(|| Self::not_found(id))?;
        debug!(backup_id = %id, request_id = %ctx.request_id, "Deleted backup row");
        Ok(())
    }

    async fn list(
        &self,
        _ctx: &RequestContext,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        Ok(self.matching(&columns::resolve_filters(filters)?))
    }

    async fn list_by_host(&self, _ctx: &RequestContext, host: &str) -> AppResult<Vec<Primitive>> {
        Ok(self.matching(&Self::scoped("host", host, None)?))
    }

    async fn list_by_project(
        &self,
        _ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        Ok(self.matching(&Self::scoped("project_id", project_id, filters)?))
    }

    async fn list_by_volume(
        &self,
        _ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        Ok(self.matching(&Self::scoped("volume_id", volume_id, filters)?))
    }
}
