//! Backup schema listing.

use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use vaultkeeper_core::result::AppResult;
use vaultkeeper_entity::backup::{Backup, BackupList};

/// One line of the schema listing
#[derive(Debug, Serialize, Tabled)]
pub struct SchemaRow {
    /// Field name
    pub field: &'static str,
    /// Semantic type, or `derived`
    pub kind: String,
    /// Whether null is accepted
    pub nullable: bool,
    /// Whether the field can only be assigned once
    pub write_once: bool,
    /// Object version that introduced the field
    pub since: String,
}

/// Rows for every declared and derived backup field, in declaration order.
pub fn schema_rows() -> Vec<SchemaRow> {
    let schema = Backup::schema();
    let declared = schema.fields.iter().map(|spec| SchemaRow {
        field: spec.name,
        kind: spec.kind.to_string(),
        nullable: spec.nullable,
        write_once: spec.write_once,
        since: spec.since.to_string(),
    });
    let derived = schema.derived.iter().map(|field| SchemaRow {
        field: field.name,
        kind: "derived".to_string(),
        nullable: false,
        write_once: false,
        since: field.since.to_string(),
    });
    declared.chain(derived).collect()
}

/// Execute the schema command
pub fn execute(format: OutputFormat) -> AppResult<()> {
    let schema = Backup::schema();
    if format == OutputFormat::Table {
        output::print_kv("Object", &format!("{}.{}", schema.namespace, schema.name));
        output::print_kv("Version", &schema.version.to_string());
        output::print_kv("List version", &BackupList::VERSION.to_string());
    }
    output::print_list(&schema_rows(), format);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_cover_declared_and_derived() {
        let rows = schema_rows();
        let schema = Backup::schema();
        assert_eq!(rows.len(), schema.fields.len() + schema.derived.len());

        let dependents = rows
            .iter()
            .find(|r| r.field == "num_dependent_backups")
            .expect("num_dependent_backups");
        assert_eq!(dependents.since, "1.1");
        assert_eq!(dependents.kind, "integer");

        assert!(rows.iter().any(|r| r.field == "name" && r.kind == "derived"));
    }
}
