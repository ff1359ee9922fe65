//! Core traits defined in `vaultkeeper-core` and implemented by other crates.

pub mod service;
pub mod store;

pub use service::Service;
pub use store::BackupStore;
