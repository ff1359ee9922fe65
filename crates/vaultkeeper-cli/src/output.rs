//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use vaultkeeper_core::types::Primitive;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One `field | value` line of a record table.
#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    /// Field name.
    pub field: String,
    /// Rendered value (`null` for unset).
    pub value: String,
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(&items),
    }
}

/// Print a field map as a two-column table or a JSON object
pub fn print_fields(fields: &Primitive, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<FieldRow> = fields
                .iter()
                .map(|(field, value)| FieldRow {
                    field: field.clone(),
                    value: value.to_string(),
                })
                .collect();
            print_list(&rows, format);
        }
        OutputFormat::Json => print_json(fields),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Failed to render JSON: {e}")),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
