//! Shared helpers for service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use vaultkeeper_core::config::BackupConfig;
use vaultkeeper_core::context::RequestContext;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_core::types::{Filters, Primitive};
use vaultkeeper_database::MemoryBackupStore;
use vaultkeeper_entity::backup::Backup;
use vaultkeeper_service::BackupService;

/// A non-admin caller context.
pub fn user_ctx() -> RequestContext {
    RequestContext::new(Uuid::new_v4(), Uuid::new_v4())
}

/// A backup with the mandatory identity columns filled in.
pub fn new_backup(project: &str, volume: &str) -> Backup {
    let mut backup = Backup::new();
    backup.set_user_id("user-1").expect("user_id");
    backup.set_project_id(project).expect("project_id");
    backup.set_volume_id(volume).expect("volume_id");
    backup
}

/// Memory store that records every update delta it receives.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub inner: MemoryBackupStore,
    pub updates: Mutex<Vec<(String, Primitive)>>,
}

impl RecordingStore {
    pub fn update_calls(&self) -> Vec<(String, Primitive)> {
        self.updates.lock().expect("updates lock").clone()
    }
}

#[async_trait]
impl BackupStore for RecordingStore {
    async fn get(&self, ctx: &RequestContext, id: &str) -> AppResult<Primitive> {
        self.inner.get(ctx, id).await
    }

    async fn create(&self, ctx: &RequestContext, fields: &Primitive) -> AppResult<Primitive> {
        self.inner.create(ctx, fields).await
    }

    async fn update(&self, ctx: &RequestContext, id: &str, delta: &Primitive) -> AppResult<()> {
        self.updates
            .lock()
            .expect("updates lock")
            .push((id.to_string(), delta.clone()));
        self.inner.update(ctx, id, delta).await
    }

    async fn delete(&self, ctx: &RequestContext, id: &str) -> AppResult<()> {
        self.inner.delete(ctx, id).await
    }

    async fn list(&self, ctx: &RequestContext, filters: Option<&Filters>) -> AppResult<Vec<Primitive>> {
        self.inner.list(ctx, filters).await
    }

    async fn list_by_host(&self, ctx: &RequestContext, host: &str) -> AppResult<Vec<Primitive>> {
        self.inner.list_by_host(ctx, host).await
    }

    async fn list_by_project(
        &self,
        ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        self.inner.list_by_project(ctx, project_id, filters).await
    }

    async fn list_by_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        self.inner.list_by_volume(ctx, volume_id, filters).await
    }
}

/// Store whose delete never completes. Records whether the caller was
/// elevated when the delete started.
#[derive(Debug, Default)]
pub struct StalledDeleteStore {
    pub inner: MemoryBackupStore,
    pub saw_admin: AtomicBool,
}

#[async_trait]
impl BackupStore for StalledDeleteStore {
    async fn get(&self, ctx: &RequestContext, id: &str) -> AppResult<Primitive> {
        self.inner.get(ctx, id).await
    }

    async fn create(&self, ctx: &RequestContext, fields: &Primitive) -> AppResult<Primitive> {
        self.inner.create(ctx, fields).await
    }

    async fn update(&self, ctx: &RequestContext, id: &str, delta: &Primitive) -> AppResult<()> {
        self.inner.update(ctx, id, delta).await
    }

    async fn delete(&self, ctx: &RequestContext, _id: &str) -> AppResult<()> {
        self.saw_admin.store(ctx.is_admin, Ordering::SeqCst);
        std::future::pending().await
    }

    async fn list(&self, ctx: &RequestContext, filters: Option<&Filters>) -> AppResult<Vec<Primitive>> {
        self.inner.list(ctx, filters).await
    }

    async fn list_by_host(&self, ctx: &RequestContext, host: &str) -> AppResult<Vec<Primitive>> {
        self.inner.list_by_host(ctx, host).await
    }

    async fn list_by_project(
        &self,
        ctx: &RequestContext,
        project_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        self.inner.list_by_project(ctx, project_id, filters).await
    }

    async fn list_by_volume(
        &self,
        ctx: &RequestContext,
        volume_id: &str,
        filters: Option<&Filters>,
    ) -> AppResult<Vec<Primitive>> {
        self.inner.list_by_volume(ctx, volume_id, filters).await
    }
}

/// A service over a fresh in-memory store, plus a handle to the store.
pub fn memory_service() -> (BackupService, Arc<MemoryBackupStore>) {
    let store = Arc::new(MemoryBackupStore::new());
    let service = BackupService::new(store.clone(), BackupConfig::default());
    (service, store)
}
