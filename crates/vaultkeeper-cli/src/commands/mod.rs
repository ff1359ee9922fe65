//! CLI command definitions and dispatch.

pub mod backup;
pub mod config;
pub mod schema;
pub mod token;
pub mod wire;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::output::OutputFormat;
use vaultkeeper_core::config::{AppConfig, StoreBackend};
use vaultkeeper_core::error::{AppError, ErrorKind};
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::traits::store::BackupStore;
use vaultkeeper_core::types::{FieldValue, Primitive};
use vaultkeeper_database::DatabasePool;
use vaultkeeper_service::BackupService;

/// Vaultkeeper: inspect, export, and downgrade backup records
#[derive(Debug, Parser)]
#[command(name = "vaultkeeper", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay loaded from `config/<env>`
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Portable backup tokens
    Token(token::TokenArgs),
    /// Versioned wire representations
    Wire(wire::WireArgs),
    /// Show the backup field schema
    Schema,
    /// Configuration management
    Config(config::ConfigArgs),
    /// Stored backup records
    Backup(backup::BackupArgs),
}

impl Cli {
    /// Load the layered configuration named by the global flags.
    pub fn load_config(&self) -> AppResult<AppConfig> {
        AppConfig::load(&self.config, &self.env)
    }

    /// Execute the CLI command
    pub async fn execute(&self, app_config: &AppConfig) -> AppResult<()> {
        match &self.command {
            Commands::Token(args) => token::execute(args, self.format).await,
            Commands::Wire(args) => wire::execute(args).await,
            Commands::Schema => schema::execute(self.format),
            Commands::Config(args) => config::execute(args, app_config, &self.config, self.format),
            Commands::Backup(args) => backup::execute(args, app_config, self.format).await,
        }
    }
}

/// Helper: build the backup service over the configured store.
///
/// The memory backend lives only as long as one process, so a CLI run would
/// always see it empty; stored-record commands require PostgreSQL.
pub async fn create_service(config: &AppConfig) -> AppResult<BackupService> {
    debug!(backend = %config.store.backend, "Opening backup store");
    let store: Arc<dyn BackupStore> = match config.store.backend {
        StoreBackend::Memory => {
            return Err(AppError::configuration(
                "store.backend = \"memory\" holds no records between runs; \
                 set store.backend = \"postgres\" to inspect stored backups",
            ));
        }
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            if !pool.health_check().await? {
                return Err(AppError::database("Database health check returned an unexpected value"));
            }
            vaultkeeper_database::migration::run_migrations(pool.pool()).await?;
            Arc::new(pool.backup_store())
        }
    };
    Ok(BackupService::new(store, config.backup.clone()))
}

/// Helper: parse `key=value` pairs into a field map of strings
pub fn parse_pairs(pairs: &[String]) -> AppResult<Primitive> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), FieldValue::from(v)))
                .ok_or_else(|| AppError::invalid_input(format!("Expected key=value, got '{pair}'")))
        })
        .collect()
}

/// Helper: read a JSON document from disk
pub async fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> AppResult<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::InvalidInput, format!("Failed to read '{path}'"), e)
        })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::with_source(
            ErrorKind::InvalidInput,
            format!("'{path}' is not valid JSON for this command: {e}"),
            e,
        )
    })
}
