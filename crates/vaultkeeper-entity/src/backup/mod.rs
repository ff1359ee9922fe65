//! Backup domain entities.

pub mod list;
pub mod model;
pub mod token;

pub use list::{BackupList, BackupListData};
pub use model::{BACKUP_SCHEMA, Backup};
pub use token::{decode_record, encode_record};
