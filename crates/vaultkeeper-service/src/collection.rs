//! Bulk fetches returning [`BackupList`]s in store order.

use tracing::debug;

use vaultkeeper_core::context::RequestContext;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_core::types::Filters;
use vaultkeeper_entity::backup::BackupList;

/// All backups matching optional equality filters.
pub async fn get_all(
    ctx: &RequestContext,
    store: &dyn BackupStore,
    filters: Option<&Filters>,
) -> AppResult<BackupList> {
    let rows = store.list(ctx, filters).await?;
    debug!(count = rows.len(), filters = ?filters, "Listed backups");
    BackupList::from_rows(&rows)
}

/// Backups owned by a backup host.
pub async fn get_all_by_host(
    ctx: &RequestContext,
    store: &dyn BackupStore,
    host: &str,
) -> AppResult<BackupList> {
    let rows = store.list_by_host(ctx, host).await?;
    debug!(count = rows.len(), host = %host, "Listed backups by host");
    BackupList::from_rows(&rows)
}

/// Backups of one project.
pub async fn get_all_by_project(
    ctx: &RequestContext,
    store: &dyn BackupStore,
    project_id: &str,
    filters: Option<&Filters>,
) -> AppResult<BackupList> {
    let rows = store.list_by_project(ctx, project_id, filters).await?;
    debug!(count = rows.len(), project_id = %project_id, "Listed backups by project");
    BackupList::from_rows(&rows)
}

/// Backups of one volume.
pub async fn get_all_by_volume(
    ctx: &RequestContext,
    store: &dyn BackupStore,
    volume_id: &str,
    filters: Option<&Filters>,
) -> AppResult<BackupList> {
    let rows = store.list_by_volume(ctx, volume_id, filters).await?;
    debug!(count = rows.len(), volume_id = %volume_id, "Listed backups by volume");
    BackupList::from_rows(&rows)
}
