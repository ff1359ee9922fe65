//! Column validation shared by every store.
//!
//! Stores only ever touch columns named in the backup schema, so dynamic
//! SQL never interpolates caller-supplied identifiers.

use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::{FieldValue, Filters, Primitive};
use vaultkeeper_entity::backup::BACKUP_SCHEMA;
use vaultkeeper_entity::object::FieldSpec;

/// Table holding backup rows.
pub const TABLE: &str = "backups";

/// Resolve a column name against the backup schema.
pub fn column(name: &str) -> AppResult<&'static FieldSpec> {
    BACKUP_SCHEMA
        .field(name)
        .ok_or_else(|| AppError::validation(format!("Unknown backup column '{name}'")))
}

/// Validate and coerce every entry of a field map.
pub fn resolve(fields: &Primitive) -> AppResult<Vec<(&'static FieldSpec, FieldValue)>> {
    fields
        .iter()
        .map(|(name, value)| {
            let spec = column(name)?;
            Ok((spec, spec.coerce(value.clone())?))
        })
        .collect()
}

/// Validate optional equality filters. Filter values are compared as given,
/// so `null` filters are allowed on any column.
pub fn resolve_filters(filters: Option<&Filters>) -> AppResult<Vec<(&'static FieldSpec, FieldValue)>> {
    let Some(filters) = filters else {
        return Ok(Vec::new());
    };
    filters
        .iter()
        .map(|(name, value)| {
            let spec = column(name)?;
            let value = match value {
                FieldValue::Null => FieldValue::Null,
                other => spec.coerce(other.clone())?,
            };
            Ok((spec, value))
        })
        .collect()
}

/// A full row: every declared column, absent ones as null.
pub fn full_row(fields: &[(&'static FieldSpec, FieldValue)]) -> Primitive {
    BACKUP_SCHEMA
        .fields
        .iter()
        .map(|spec| {
            let value = fields
                .iter()
                .find(|(s, _)| s.name == spec.name)
                .map(|(_, v)| v.clone())
                .unwrap_or(FieldValue::Null);
            (spec.name.to_string(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkeeper_core::error::ErrorKind;

    #[test]
    fn test_unknown_column_is_validation_error() {
        let mut fields = Primitive::new();
        fields.insert("colour".into(), "red".into());
        let err = resolve(&fields).expect_err("unknown");
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_filters_coerce_values() {
        let mut filters = Filters::new();
        filters.insert("size".into(), "10".into());
        filters.insert("host".into(), FieldValue::Null);
        let resolved = resolve_filters(Some(&filters)).expect("filters");
        assert_eq!(resolved.len(), 2);
        assert!(resolved.contains(&(column("size").expect("size"), FieldValue::Integer(10))));
    }

    #[test]
    fn test_full_row_has_every_column() {
        let row = full_row(&[(column("status").expect("status"), "new".into())]);
        assert_eq!(row.len(), BACKUP_SCHEMA.fields.len());
        assert_eq!(row.get("status"), Some(&FieldValue::from("new")));
        assert_eq!(row.get("size"), Some(&FieldValue::Null));
    }
}
