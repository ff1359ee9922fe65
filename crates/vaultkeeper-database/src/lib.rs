//! # vaultkeeper-database
//!
//! Implementations of the [`BackupStore`](vaultkeeper_core::traits::BackupStore)
//! contract: a process-local store for tests and tooling, and a PostgreSQL
//! store backed by sqlx. Also hosts connection pooling and migrations.

pub mod columns;
pub mod connection;
pub mod migration;
pub mod stores;

pub use connection::DatabasePool;
pub use stores::{MemoryBackupStore, PgBackupStore};
