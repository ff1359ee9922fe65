//! Remote-callable backup operations.

use std::sync::Arc;

use async_trait::async_trait;

use vaultkeeper_core::config::BackupConfig;
use vaultkeeper_core::context::RequestContext;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::service::Service;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_core::types::{Filters, Primitive};
use vaultkeeper_entity::backup::{self, Backup, BackupList};

use crate::{collection, persistence};

/// Operations a peer may invoke on backups through the RPC layer.
///
/// Each method is one unit of remote work. Token decoding is deliberately
/// absent: it runs locally on untrusted input, see
/// [`BackupService::decode_record`].
#[async_trait]
pub trait BackupObjectApi: Send + Sync {
    /// Load one backup by ID.
    async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> AppResult<Backup>;

    /// Insert a new backup from its change-set.
    async fn create(&self, ctx: &RequestContext, backup: &mut Backup) -> AppResult<()>;

    /// Persist the dirty fields of a backup.
    async fn save(&self, ctx: &RequestContext, backup: &mut Backup) -> AppResult<()>;

    /// Delete a backup with temporarily elevated privilege.
    async fn destroy(&self, ctx: &mut RequestContext, backup: &Backup) -> AppResult<()>;

    /// Export a backup, merged over `extra`, as a portable token.
    async fn encode_record(&self, backup: &Backup, extra: &Primitive) -> AppResult<String>;

    /// All backups matching optional filters.
    async fn get_all(&self, ctx: &RequestContext, filters: Option<&Filters>) -> AppResult<BackupList>;

    /// Backups owned by a host.
    async fn get_all_by_host(&self, ctx: &RequestContext, host: &str) -> AppResult<BackupList>;

    /// Backups of a project.
    async fn get_all_by_project(
        &self,
        ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<BackupList>;

    /// Backups of a volume.
    async fn get_all_by_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<BackupList>;
}

/// [`BackupObjectApi`] over a shared store.
#[derive(Debug, Clone)]
pub struct BackupService {
    /// Storage collaborator.
    store: Arc<dyn BackupStore>,
    /// Naming settings for derived fields.
    config: BackupConfig,
}

impl BackupService {
    /// Creates a new backup service.
    pub fn new(store: Arc<dyn BackupStore>, config: BackupConfig) -> Self {
        Self { store, config }
    }

    /// The backup settings in use.
    pub fn config(&self) -> &BackupConfig {
        &self.config
    }

    /// Display name of a backup under the configured template.
    pub fn name(&self, backup: &Backup) -> Option<String> {
        backup.name(&self.config)
    }

    /// Decode a token produced by [`BackupObjectApi::encode_record`].
    pub fn decode_record(token: &str) -> AppResult<Primitive> {
        backup::decode_record(token)
    }
}

impl Service for BackupService {}

#[async_trait]
impl BackupObjectApi for BackupService {
    async fn get_by_id(&self, ctx: &RequestContext, id: &str) -> AppResult<Backup> {
        persistence::fetch(ctx, self.store.as_ref(), id).await
    }

    async fn create(&self, ctx: &RequestContext, backup: &mut Backup) -> AppResult<()> {
        persistence::create(ctx, self.store.as_ref(), backup).await
    }

    async fn save(&self, ctx: &RequestContext, backup: &mut Backup) -> AppResult<()> {
        persistence::save(ctx, self.store.as_ref(), backup).await
    }

    async fn destroy(&self, ctx: &mut RequestContext, backup: &Backup) -> AppResult<()> {
        persistence::destroy(ctx, self.store.as_ref(), backup).await
    }

    async fn encode_record(&self, backup: &Backup, extra: &Primitive) -> AppResult<String> {
        backup::encode_record(backup, extra)
    }

    async fn get_all(&self, ctx: &RequestContext, filters: Option<&Filters>) -> AppResult<BackupList> {
        collection::get_all(ctx, self.store.as_ref(), filters).await
    }

    async fn get_all_by_host(&self, ctx: &RequestContext, host: &str) -> AppResult<BackupList> {
        collection::get_all_by_host(ctx, self.store.as_ref(), host).await
    }

    async fn get_all_by_project(
        &self,
        ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<BackupList> {
        collection::get_all_by_project(ctx, self.store.as_ref(), project_id, filters).await
    }

    async fn get_all_by_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<BackupList> {
        collection::get_all_by_volume(ctx, self.store.as_ref(), volume_id, filters).await
    }
}
