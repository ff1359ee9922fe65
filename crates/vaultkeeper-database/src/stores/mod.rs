//! [`BackupStore`](vaultkeeper_core::traits::BackupStore) implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryBackupStore;
pub use postgres::PgBackupStore;
