//! Change-tracked record container.

use std::collections::BTreeMap;

use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::{FieldValue, ObjectVersion, Primitive};

use super::compat;
use super::envelope::VersionedPrimitive;
use super::field::{FieldKind, Schema};
use super::tracker::ChangeTracker;

/// Field values of one object plus the set of fields assigned since the last
/// reset. Every read and write is checked against the schema.
#[derive(Debug, Clone)]
pub struct TrackedRecord {
    schema: &'static Schema,
    values: BTreeMap<&'static str, FieldValue>,
    changes: ChangeTracker,
}

impl PartialEq for TrackedRecord {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema)
            && self.values == other.values
            && self.changes == other.changes
    }
}

impl TrackedRecord {
    /// Create an empty record: nothing set, nothing changed.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            values: BTreeMap::new(),
            changes: ChangeTracker::new(),
        }
    }

    /// The schema this record conforms to.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Assign a declared field and mark it changed.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> AppResult<()> {
        let spec = self.schema.require(field)?;
        if spec.write_once && self.values.contains_key(spec.name) {
            return Err(AppError::object_action(
                "set",
                &format!("{} is already assigned", spec.name),
            ));
        }
        let value = spec.coerce(value.into())?;
        self.values.insert(spec.name, value);
        self.changes.mark(spec.name);
        Ok(())
    }

    /// Current value of a declared field, or its default if never assigned.
    pub fn get(&self, field: &str) -> AppResult<FieldValue> {
        let spec = self.schema.require(field)?;
        Ok(self
            .values
            .get(spec.name)
            .cloned()
            .unwrap_or_else(|| spec.default_value()))
    }

    /// Borrow the assigned value of a field; `None` when unset or undeclared.
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Whether the field has ever been assigned.
    pub fn is_set(&self, field: &str) -> bool {
        self.values.contains_key(field)
    }

    /// Dirty fields mapped to their current values.
    pub fn changes(&self) -> Primitive {
        self.changes
            .changed()
            .filter_map(|name| {
                self.values
                    .get(name)
                    .map(|value| (name.to_string(), value.clone()))
            })
            .collect()
    }

    /// Names of the dirty fields.
    pub fn what_changed(&self) -> Vec<&'static str> {
        self.changes.changed().collect()
    }

    /// Whether any field is dirty.
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Clear the dirty set without touching values.
    pub fn reset_changes(&mut self) {
        self.changes.reset();
    }

    /// Clear the dirty marks of the listed fields only.
    pub fn reset_fields(&mut self, fields: &[&str]) {
        self.changes.reset_fields(fields);
    }

    /// Every assigned declared field.
    pub fn snapshot(&self) -> Primitive {
        self.values
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    /// Populate every declared field from a storage row and clear the
    /// change-set.
    ///
    /// Missing columns load as null; null integers load as zero. The row is
    /// authoritative, so write-once fields are overwritten.
    pub fn load_row(&mut self, row: &Primitive) -> AppResult<()> {
        for spec in self.schema.fields {
            let raw = row.get(spec.name).cloned().unwrap_or(FieldValue::Null);
            let raw = match (spec.kind, raw) {
                (FieldKind::Integer, FieldValue::Null) => FieldValue::Integer(0),
                (_, raw) => raw,
            };
            let value = spec.coerce(raw)?;
            self.values.insert(spec.name, value);
        }
        self.changes.reset();
        Ok(())
    }

    /// Serialize into a wire envelope, downgraded for `target` when it is
    /// older than the schema version.
    ///
    /// A target from another major version cannot read any field and is
    /// rejected.
    pub fn to_primitive(&self, target: Option<ObjectVersion>) -> AppResult<VersionedPrimitive> {
        let version = match target {
            Some(target) if target.major != self.schema.version.major => {
                return Err(AppError::incompatible_version(format!(
                    "{} cannot be serialized for version {target} (local version {})",
                    self.schema.name, self.schema.version
                )));
            }
            Some(target) if target < self.schema.version => target,
            _ => self.schema.version,
        };
        let data = compat::make_compatible(self.schema, &self.snapshot(), version);
        let changes = self
            .changes
            .changed()
            .filter(|name| data.contains_key(*name))
            .map(str::to_string)
            .collect();

        Ok(VersionedPrimitive {
            name: self.schema.name.to_string(),
            namespace: self.schema.namespace.to_string(),
            version,
            data,
            changes,
        })
    }

    /// Rebuild a record from a wire envelope.
    ///
    /// Only fields present in the payload are assigned; keys the schema does
    /// not declare are ignored. The change-set is restored from the envelope.
    pub fn from_primitive(
        schema: &'static Schema,
        primitive: &VersionedPrimitive,
    ) -> AppResult<Self> {
        if primitive.name != schema.name || primitive.namespace != schema.namespace {
            return Err(AppError::incompatible_version(format!(
                "Cannot load {}.{} as {}.{}",
                primitive.namespace, primitive.name, schema.namespace, schema.name
            )));
        }
        if !primitive.version.is_compatible_with(&schema.version) {
            return Err(AppError::incompatible_version(format!(
                "{} version {} is not supported (local version {})",
                schema.name, primitive.version, schema.version
            )));
        }

        let mut record = Self::new(schema);
        for (name, value) in &primitive.data {
            if let Some(spec) = schema.field(name) {
                record.values.insert(spec.name, spec.coerce(value.clone())?);
            }
        }
        for name in &primitive.changes {
            if let Some(spec) = schema.field(name) {
                record.changes.mark(spec.name);
            }
        }
        Ok(record)
    }
}
