//! Stored backup record commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use vaultkeeper_core::config::{AppConfig, BackupConfig};
use vaultkeeper_core::context::RequestContext;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_entity::backup::Backup;
use vaultkeeper_service::BackupObjectApi;

/// Arguments for backup commands
#[derive(Debug, Args)]
pub struct BackupArgs {
    /// Backup subcommand
    #[command(subcommand)]
    pub command: BackupCommand,
}

/// Backup subcommands
#[derive(Debug, Subcommand)]
pub enum BackupCommand {
    /// Show one backup, including derived fields
    Get {
        /// Backup ID
        id: String,
    },
    /// List backups
    List {
        /// Only backups owned by this host
        #[arg(long, conflicts_with_all = ["project", "volume"])]
        host: Option<String>,
        /// Only backups of this project
        #[arg(long, conflicts_with = "volume")]
        project: Option<String>,
        /// Only backups of this volume
        #[arg(long)]
        volume: Option<String>,
        /// Extra `column=value` equality filters
        #[arg(long = "filter", conflicts_with = "host")]
        filters: Vec<String>,
    },
}

/// Backup display row
#[derive(Debug, Serialize, Tabled)]
pub struct BackupRow {
    /// Backup ID
    pub id: String,
    /// Derived display name
    pub name: String,
    /// Source volume
    pub volume_id: String,
    /// Status
    pub status: String,
    /// Size in GiB
    pub size: i64,
    /// Owning host
    pub host: String,
    /// Incremental backup
    pub incremental: bool,
    /// Backups depending on this one
    pub dependents: i64,
}

impl BackupRow {
    /// Project a backup into a display row.
    pub fn from_backup(backup: &Backup, config: &BackupConfig) -> Self {
        Self {
            id: backup.id().unwrap_or("-").to_string(),
            name: backup.name(config).unwrap_or_default(),
            volume_id: backup.volume_id().unwrap_or("-").to_string(),
            status: backup.status().unwrap_or("-").to_string(),
            size: backup.size(),
            host: backup.host().unwrap_or("-").to_string(),
            incremental: backup.is_incremental(),
            dependents: backup.num_dependent_backups(),
        }
    }
}

/// Execute backup commands
pub async fn execute(args: &BackupArgs, config: &AppConfig, format: OutputFormat) -> AppResult<()> {
    let service = super::create_service(config).await?;
    let ctx = RequestContext::admin();

    match &args.command {
        BackupCommand::Get { id } => {
            let backup = service.get_by_id(&ctx, id).await?;
            let mut fields = backup.snapshot();
            fields.extend(backup.derived_values(service.config()));
            output::print_fields(&fields, format);
        }
        BackupCommand::List {
            host,
            project,
            volume,
            filters,
        } => {
            let filters = super::parse_pairs(filters)?;
            let filters = (!filters.is_empty()).then_some(&filters);

            let list = match (host, project, volume) {
                (Some(host), _, _) => service.get_all_by_host(&ctx, host).await?,
                (_, Some(project), _) => service.get_all_by_project(&ctx, project, filters).await?,
                (_, _, Some(volume)) => service.get_all_by_volume(&ctx, volume, filters).await?,
                _ => service.get_all(&ctx, filters).await?,
            };

            let rows: Vec<BackupRow> = list
                .iter()
                .map(|b| BackupRow::from_backup(b, service.config()))
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
