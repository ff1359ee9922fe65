//! Wire representation commands.

use clap::{Args, Subcommand};

use crate::output;
use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::ObjectVersion;
use vaultkeeper_entity::backup::{Backup, BackupList, BackupListData};
use vaultkeeper_entity::object::VersionedPrimitive;

/// Key naming the object type in a serialized envelope.
const NAME_KEY: &str = "vaultkeeper_object.name";

/// Arguments for wire commands
#[derive(Debug, Args)]
pub struct WireArgs {
    /// Wire subcommand
    #[command(subcommand)]
    pub command: WireCommand,
}

/// Wire subcommands
#[derive(Debug, Subcommand)]
pub enum WireCommand {
    /// Re-serialize a Backup or BackupList envelope for an older peer
    Downgrade {
        /// JSON file holding the envelope
        #[arg(short = 'i', long)]
        file: String,
        /// Target version, e.g. `1.0`
        #[arg(short, long)]
        target: ObjectVersion,
    },
}

/// Downgrade a serialized envelope, dispatching on its object name.
pub fn downgrade(envelope: serde_json::Value, target: ObjectVersion) -> AppResult<serde_json::Value> {
    let name = envelope
        .get(NAME_KEY)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| AppError::invalid_input(format!("Envelope has no '{NAME_KEY}'")))?
        .to_string();

    let downgraded = match name.as_str() {
        "Backup" => {
            let primitive: VersionedPrimitive = serde_json::from_value(envelope)?;
            let backup = Backup::from_primitive(&primitive)?;
            serde_json::to_value(backup.to_primitive(Some(target))?)?
        }
        "BackupList" => {
            let primitive: VersionedPrimitive<BackupListData> = serde_json::from_value(envelope)?;
            let list = BackupList::from_primitive(&primitive)?;
            serde_json::to_value(list.to_primitive(Some(target))?)?
        }
        other => {
            return Err(AppError::invalid_input(format!(
                "Cannot downgrade objects of type '{other}'"
            )));
        }
    };
    Ok(downgraded)
}

/// Execute wire commands
pub async fn execute(args: &WireArgs) -> AppResult<()> {
    match &args.command {
        WireCommand::Downgrade { file, target } => {
            let envelope: serde_json::Value = super::read_json(file).await?;
            output::print_json(&downgrade(envelope, *target)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkeeper_core::error::ErrorKind;

    #[test]
    fn test_downgrade_backup_drops_new_field() {
        let mut backup = Backup::new();
        backup.set_id("a1").expect("id");
        backup.set_num_dependent_backups(3).expect("dependents");
        let envelope = serde_json::to_value(backup.to_primitive(None).expect("primitive")).expect("json");

        let old = downgrade(envelope, ObjectVersion::new(1, 0)).expect("downgrade");
        assert_eq!(old["vaultkeeper_object.version"], "1.0");
        assert_eq!(old["vaultkeeper_object.data"]["id"], "a1");
        assert!(old["vaultkeeper_object.data"].get("num_dependent_backups").is_none());
    }

    #[test]
    fn test_downgrade_rejects_unknown_object() {
        let envelope = serde_json::json!({ "vaultkeeper_object.name": "Volume" });
        let err = downgrade(envelope, ObjectVersion::new(1, 0)).expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::InvalidInput);
    }

    #[test]
    fn test_downgrade_rejects_other_major() {
        let mut backup = Backup::new();
        backup.set_id("a1").expect("id");
        let envelope = serde_json::to_value(backup.to_primitive(None).expect("primitive")).expect("json");

        let err = downgrade(envelope, ObjectVersion::new(0, 9)).expect_err("other major");
        assert_eq!(err.kind, ErrorKind::IncompatibleVersion);
    }
}
