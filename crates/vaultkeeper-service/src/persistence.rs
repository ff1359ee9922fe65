//! Persistence façade: lifecycle operations of a single backup.
//!
//! Each function translates one object-level action into calls on the
//! [`BackupStore`]. Only the change-set travels on create and save; the row
//! returned by the store is authoritative and is loaded back into the record.

use tracing::{debug, info};

use vaultkeeper_core::context::{AdminScope, RequestContext};
use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_entity::backup::Backup;

/// Load the backup with the given ID.
pub async fn fetch(ctx: &RequestContext, store: &dyn BackupStore, id: &str) -> AppResult<Backup> {
    let row = store.get(ctx, id).await?;
    let backup = Backup::from_row(&row)?;
    debug!(backup_id = %id, request_id = %ctx.request_id, "Fetched backup");
    Ok(backup)
}

/// Insert a new backup built from its change-set.
///
/// Fails with an object-action error if the backup already has an ID. On
/// success every field reflects the stored row and nothing is dirty.
pub async fn create(
    ctx: &RequestContext,
    store: &dyn BackupStore,
    backup: &mut Backup,
) -> AppResult<()> {
    if backup.is_set("id") {
        return Err(AppError::object_action("create", "already created"));
    }

    let row = store.create(ctx, &backup.changes()).await?;
    backup.load_row(&row)?;

    info!(
        backup_id = ?backup.id(),
        volume_id = ?backup.volume_id(),
        request_id = %ctx.request_id,
        "Created backup"
    );
    Ok(())
}

/// Persist the dirty fields of a backup.
///
/// An empty change-set issues no store call. The change-set is cleared once
/// the update succeeds; on failure it is kept so the caller may retry.
pub async fn save(ctx: &RequestContext, store: &dyn BackupStore, backup: &mut Backup) -> AppResult<()> {
    let delta = backup.changes();
    if delta.is_empty() {
        debug!(backup_id = ?backup.id(), "Backup has no changes to save");
        backup.reset_changes();
        return Ok(());
    }

    let id = backup.require_id("save")?;
    store.update(ctx, id, &delta).await?;
    info!(
        backup_id = %id,
        fields = ?delta.keys().collect::<Vec<_>>(),
        request_id = %ctx.request_id,
        "Saved backup"
    );

    backup.reset_changes();
    Ok(())
}

/// Delete a backup.
///
/// The store call runs with administrative privilege. `ctx` gets its
/// original privilege back on every exit path, including when the returned
/// future is dropped before completion.
pub async fn destroy(
    ctx: &mut RequestContext,
    store: &dyn BackupStore,
    backup: &Backup,
) -> AppResult<()> {
    let id = backup.require_id("destroy")?;
    let scope = AdminScope::enter(ctx);
    store.delete(&scope, id).await?;
    info!(backup_id = %id, request_id = %scope.request_id, "Destroyed backup");
    Ok(())
}
