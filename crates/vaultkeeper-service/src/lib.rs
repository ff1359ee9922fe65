//! # vaultkeeper-service
//!
//! Backup lifecycle on top of the storage contract. The persistence façade
//! and collection fetches are free functions over a `&dyn BackupStore`;
//! [`BackupService`] bundles them behind the remote-callable
//! [`BackupObjectApi`].

pub mod api;
pub mod collection;
pub mod persistence;

pub use api::{BackupObjectApi, BackupService};
