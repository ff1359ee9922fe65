//! Portable token commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::Primitive;
use vaultkeeper_entity::backup::{self, Backup};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Encode a backup record (JSON field map) into a token
    Encode {
        /// JSON file holding the backup's fields
        #[arg(short, long)]
        record: String,
        /// Extra `key=value` info to embed; backup fields win on collision
        #[arg(short = 'x', long = "extra")]
        extra: Vec<String>,
    },
    /// Decode a token and print its fields
    Decode {
        /// The token text
        token: String,
    },
}

/// Build a backup from a flat field map. Undeclared keys are rejected.
pub fn backup_from_fields(fields: &Primitive) -> AppResult<Backup> {
    let mut backup = Backup::new();
    for (name, value) in fields {
        backup.set(name, value.clone())?;
    }
    Ok(backup)
}

/// Execute token commands
pub async fn execute(args: &TokenArgs, format: OutputFormat) -> AppResult<()> {
    match &args.command {
        TokenCommand::Encode { record, extra } => {
            let fields: Primitive = super::read_json(record).await?;
            let backup = backup_from_fields(&fields)?;
            let token = backup::encode_record(&backup, &super::parse_pairs(extra)?)?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({ "token": token })),
                OutputFormat::Table => println!("{token}"),
            }
        }
        TokenCommand::Decode { token } => {
            let fields = backup::decode_record(token)?;
            output::print_fields(&fields, format);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkeeper_core::error::ErrorKind;
    use vaultkeeper_core::types::FieldValue;

    #[test]
    fn test_backup_from_fields() {
        let mut fields = Primitive::new();
        fields.insert("id".into(), "a1".into());
        fields.insert("size".into(), FieldValue::Integer(5));
        let backup = backup_from_fields(&fields).expect("backup");
        assert_eq!(backup.id(), Some("a1"));
        assert_eq!(backup.size(), 5);

        fields.insert("colour".into(), "red".into());
        let err = backup_from_fields(&fields).expect_err("undeclared");
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
    }
}
