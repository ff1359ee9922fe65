//! Declarative field schemas.
//!
//! A [`Schema`] is a `'static` table built once per record type. It answers
//! every question the rest of the object layer asks about a field: does it
//! exist, what type is it, may it be null, and in which version did it appear.

use std::collections::HashSet;
use std::fmt;

use tracing::warn;
use uuid::Uuid;

use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::{FieldValue, ObjectVersion};

/// Semantic type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// A UUID carried as its canonical string form.
    Uuid,
    /// Free-form text.
    String,
    /// A signed integer.
    Integer,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid => write!(f, "uuid"),
            Self::String => write!(f, "string"),
            Self::Integer => write!(f, "integer"),
        }
    }
}

/// A declared (persisted and transmitted) field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Field name, unique within the schema.
    pub name: &'static str,
    /// Semantic type.
    pub kind: FieldKind,
    /// Whether `null` is an acceptable value.
    pub nullable: bool,
    /// Whether the field may be assigned only once.
    pub write_once: bool,
    /// Version of the record type that introduced the field.
    pub since: ObjectVersion,
}

impl FieldSpec {
    /// A non-nullable UUID field.
    pub const fn uuid(name: &'static str, since: ObjectVersion) -> Self {
        Self {
            name,
            kind: FieldKind::Uuid,
            nullable: false,
            write_once: false,
            since,
        }
    }

    /// A nullable string field.
    pub const fn string(name: &'static str, since: ObjectVersion) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            nullable: true,
            write_once: false,
            since,
        }
    }

    /// A non-nullable integer field.
    pub const fn integer(name: &'static str, since: ObjectVersion) -> Self {
        Self {
            name,
            kind: FieldKind::Integer,
            nullable: false,
            write_once: false,
            since,
        }
    }

    /// Mark the field as assignable only once.
    pub const fn write_once(mut self) -> Self {
        self.write_once = true;
        self
    }

    /// The value `get` reports for a field that was never assigned.
    pub fn default_value(&self) -> FieldValue {
        match self.kind {
            FieldKind::Integer if !self.nullable => FieldValue::Integer(0),
            _ => FieldValue::Null,
        }
    }

    /// Convert `value` into the canonical representation for this field.
    pub fn coerce(&self, value: FieldValue) -> AppResult<FieldValue> {
        match (self.kind, value) {
            (_, FieldValue::Null) if self.nullable => Ok(FieldValue::Null),
            (_, FieldValue::Null) => Err(AppError::schema_violation(format!(
                "Field '{}' cannot be null",
                self.name
            ))),

            (FieldKind::Uuid, FieldValue::String(s)) => {
                if Uuid::parse_str(&s).is_err() {
                    warn!(field = self.name, value = %s, "Value is not a valid UUID");
                }
                Ok(FieldValue::String(s))
            }
            (FieldKind::Uuid, other) => Err(self.mismatch(&other)),

            (FieldKind::String, FieldValue::String(s)) => Ok(FieldValue::String(s)),
            (FieldKind::String, FieldValue::Integer(n)) => Ok(FieldValue::String(n.to_string())),
            (FieldKind::String, FieldValue::Bool(b)) => Ok(FieldValue::String(b.to_string())),

            (FieldKind::Integer, FieldValue::Integer(n)) => Ok(FieldValue::Integer(n)),
            (FieldKind::Integer, FieldValue::String(s)) => {
                let parsed = s.trim().parse::<i64>();
                match parsed {
                    Ok(n) => Ok(FieldValue::Integer(n)),
                    Err(_) => Err(self.mismatch(&FieldValue::String(s))),
                }
            }
            (FieldKind::Integer, other) => Err(self.mismatch(&other)),
        }
    }

    fn mismatch(&self, value: &FieldValue) -> AppError {
        AppError::schema_violation(format!(
            "Field '{}' expects {}, got {} '{}'",
            self.name,
            self.kind,
            value.type_name(),
            value
        ))
    }
}

/// A computed attribute: readable on the record, never persisted, never a
/// schema field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedField {
    /// Field name.
    pub name: &'static str,
    /// Version of the record type that introduced the field.
    pub since: ObjectVersion,
}

/// The full description of one record type.
#[derive(Debug)]
pub struct Schema {
    /// Object type name carried in wire envelopes.
    pub name: &'static str,
    /// Namespace carried in wire envelopes.
    pub namespace: &'static str,
    /// Current version of the record type.
    pub version: ObjectVersion,
    /// Declared fields.
    pub fields: &'static [FieldSpec],
    /// Derived fields.
    pub derived: &'static [DerivedField],
}

impl Schema {
    /// Look up a declared field.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up a declared field, failing with a schema violation.
    pub fn require(&self, name: &str) -> AppResult<&'static FieldSpec> {
        self.field(name).ok_or_else(|| {
            AppError::schema_violation(format!("{} has no declared field '{name}'", self.name))
        })
    }

    /// Whether `name` is a derived field.
    pub fn is_derived(&self, name: &str) -> bool {
        self.derived.iter().any(|d| d.name == name)
    }

    /// Version that introduced a declared or derived field. `None` for names
    /// the schema does not know (envelope metadata, caller extras).
    pub fn introduced_at(&self, name: &str) -> Option<ObjectVersion> {
        self.field(name)
            .map(|f| f.since)
            .or_else(|| self.derived.iter().find(|d| d.name == name).map(|d| d.since))
    }

    /// Names of all declared fields, in table order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Self-check: unique names, no overlap between declared and derived
    /// fields, and no field newer than the schema itself.
    pub fn check(&self) -> AppResult<()> {
        let mut seen = HashSet::new();
        for name in self.fields.iter().map(|f| f.name).chain(self.derived.iter().map(|d| d.name)) {
            if !seen.insert(name) {
                return Err(AppError::schema_violation(format!(
                    "{} declares '{name}' more than once",
                    self.name
                )));
            }
        }

        let newest = self
            .fields
            .iter()
            .map(|f| (f.name, f.since))
            .chain(self.derived.iter().map(|d| (d.name, d.since)))
            .find(|(_, since)| *since > self.version);
        if let Some((name, since)) = newest {
            return Err(AppError::schema_violation(format!(
                "{} field '{name}' is introduced at {since}, after the schema version {}",
                self.name, self.version
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const V1_0: ObjectVersion = ObjectVersion::new(1, 0);

    #[test]
    fn test_null_handling() {
        let nullable = FieldSpec::string("status", V1_0);
        assert_eq!(nullable.coerce(FieldValue::Null).expect("null ok"), FieldValue::Null);

        let required = FieldSpec::integer("size", V1_0);
        let err = required.coerce(FieldValue::Null).expect_err("null rejected");
        assert!(err.message.contains("cannot be null"));
    }

    #[test]
    fn test_integer_coercion() {
        let size = FieldSpec::integer("size", V1_0);
        assert_eq!(size.coerce(" 42 ".into()).expect("numeric"), FieldValue::Integer(42));
        assert!(size.coerce("forty".into()).is_err());
        assert!(size.coerce(true.into()).is_err());
    }

    #[test]
    fn test_string_coercion() {
        let host = FieldSpec::string("host", V1_0);
        assert_eq!(host.coerce(7i64.into()).expect("int"), FieldValue::from("7"));
        assert_eq!(host.coerce(false.into()).expect("bool"), FieldValue::from("false"));
    }

    #[test]
    fn test_uuid_accepts_non_canonical_strings() {
        let id = FieldSpec::uuid("id", V1_0);
        assert_eq!(id.coerce("a1".into()).expect("lenient"), FieldValue::from("a1"));
        assert!(id.coerce(FieldValue::Integer(1)).is_err());
    }

    #[test]
    fn test_default_values() {
        assert_eq!(FieldSpec::integer("n", V1_0).default_value(), FieldValue::Integer(0));
        assert_eq!(FieldSpec::string("s", V1_0).default_value(), FieldValue::Null);
        assert_eq!(FieldSpec::uuid("u", V1_0).default_value(), FieldValue::Null);
    }

    #[test]
    fn test_check_rejects_duplicates() {
        static FIELDS: [FieldSpec; 2] = [
            FieldSpec::string("host", ObjectVersion::new(1, 0)),
            FieldSpec::string("host", ObjectVersion::new(1, 0)),
        ];
        let schema = Schema {
            name: "Broken",
            namespace: "test",
            version: V1_0,
            fields: &FIELDS,
            derived: &[],
        };
        assert!(schema.check().is_err());
    }

    #[test]
    fn test_check_rejects_future_fields() {
        static FIELDS: [FieldSpec; 1] = [FieldSpec::string("late", ObjectVersion::new(1, 3))];
        let schema = Schema {
            name: "Broken",
            namespace: "test",
            version: V1_0,
            fields: &FIELDS,
            derived: &[],
        };
        assert!(schema.check().is_err());
    }
}
