//! Configuration inspection commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use vaultkeeper_core::config::AppConfig;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_database::connection::mask_password;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

/// Execute config commands
///
/// Loading already validated the configuration, so `validate` only reports.
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> AppResult<()> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.database.url = mask_password(&shown.database.url);
            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    output::print_kv("backup.name_template", &shown.backup.name_template);
                    output::print_kv("store.backend", &shown.store.backend.to_string());
                    output::print_kv("database.url", &shown.database.url);
                    output::print_kv(
                        "database.max_connections",
                        &shown.database.max_connections.to_string(),
                    );
                    output::print_kv("logging.level", &shown.logging.level);
                    output::print_kv("logging.format", &shown.logging.format);
                }
            }
        }
        ConfigCommand::Validate => {
            config.validate()?;
            output::print_success(&format!("Configuration '{config_path}' is valid"));
            output::print_kv("Store", &config.store.backend.to_string());
            output::print_kv(
                "Sample name",
                &config.backup.render_name("00000000-0000-0000-0000-000000000000"),
            );
        }
    }

    Ok(())
}
