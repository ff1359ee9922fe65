//! Storage contract consumed by the backup persistence façade.

use async_trait::async_trait;

use crate::context::RequestContext;
use crate::result::AppResult;
use crate::types::value::{Filters, Primitive};

/// Narrow CRUD contract over persisted backup rows.
///
/// A row maps every declared field name to a primitive value. Implementations
/// return rows in a stable order and report missing identities as
/// `ErrorKind::NotFound`. Each call is a single cancellable unit of work:
/// dropping the returned future abandons it.
#[async_trait]
pub trait BackupStore: Send + Sync + std::fmt::Debug + 'static {
    /// Load the row with the given ID.
    async fn get(&self, ctx: &RequestContext, id: &str) -> AppResult<Primitive>;

    /// Insert a new row and return it as stored (including generated values).
    async fn create(&self, ctx: &RequestContext, fields: &Primitive) -> AppResult<Primitive>;

    /// Apply a partial update to an existing row.
    async fn update(&self, ctx: &RequestContext, id: &str, delta: &Primitive) -> AppResult<()>;

    /// Delete a row. Requires an administrative context.
    async fn delete(&self, ctx: &RequestContext, id: &str) -> AppResult<()>;

    /// List rows, optionally restricted by equality filters.
    async fn list(&self, ctx: &RequestContext, filters: Option<&Filters>)
    -> AppResult<Vec<Primitive>>;

    /// List rows owned by a backup host.
    async fn list_by_host(&self, ctx: &RequestContext, host: &str) -> AppResult<Vec<Primitive>>;

    /// List rows belonging to a project.
    async fn list_by_project(
        &self,
        ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>>;

    /// List rows taken from a volume.
    async fn list_by_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>>;
}
