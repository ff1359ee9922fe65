//! # vaultkeeper-entity
//!
//! Versioned object model for Vaultkeeper. The [`object`] module holds the
//! generic machinery (field schemas, change tracking, version downgrades,
//! wire envelopes); [`backup`] builds the backup record, its list wrapper,
//! and the portable token codec on top of it.

pub mod backup;
pub mod object;

pub use backup::{Backup, BackupList};
pub use object::{ChangeTracker, FieldKind, FieldSpec, Schema, TrackedRecord, VersionedPrimitive};
