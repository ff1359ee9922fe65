//! Backup record model.

use vaultkeeper_core::config::BackupConfig;
use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::{FieldValue, ObjectVersion, Primitive};

use crate::object::{DerivedField, FieldSpec, Schema, TrackedRecord, VersionedPrimitive};

const V1_0: ObjectVersion = ObjectVersion::new(1, 0);
const V1_1: ObjectVersion = ObjectVersion::new(1, 1);

// Version history:
// 1.0: initial version
// 1.1: add num_dependent_backups, plus the derived is_incremental and
//      has_dependent_backups
static BACKUP_FIELDS: [FieldSpec; 19] = [
    FieldSpec::uuid("id", V1_0).write_once(),
    FieldSpec::uuid("user_id", V1_0),
    FieldSpec::uuid("project_id", V1_0),
    FieldSpec::uuid("volume_id", V1_0),
    FieldSpec::string("host", V1_0),
    FieldSpec::string("availability_zone", V1_0),
    FieldSpec::string("container", V1_0),
    FieldSpec::string("parent_id", V1_0),
    FieldSpec::string("status", V1_0),
    FieldSpec::string("fail_reason", V1_0),
    FieldSpec::integer("size", V1_0),
    FieldSpec::string("display_name", V1_0),
    FieldSpec::string("display_description", V1_0),
    // Free-form driver data; opaque to the object layer.
    FieldSpec::string("service_metadata", V1_0),
    FieldSpec::string("service", V1_0),
    FieldSpec::integer("object_count", V1_0),
    FieldSpec::string("temp_volume_id", V1_0),
    FieldSpec::string("temp_snapshot_id", V1_0),
    FieldSpec::integer("num_dependent_backups", V1_1),
];

static BACKUP_DERIVED: [DerivedField; 3] = [
    DerivedField {
        name: "name",
        since: V1_0,
    },
    DerivedField {
        name: "is_incremental",
        since: V1_1,
    },
    DerivedField {
        name: "has_dependent_backups",
        since: V1_1,
    },
];

/// Field schema of [`Backup`].
pub static BACKUP_SCHEMA: Schema = Schema {
    name: "Backup",
    namespace: "vaultkeeper",
    version: V1_1,
    fields: &BACKUP_FIELDS,
    derived: &BACKUP_DERIVED,
};

/// Metadata of one volume backup.
///
/// Wraps a [`TrackedRecord`] over [`BACKUP_SCHEMA`] and adds typed
/// accessors plus the derived fields. Single-owner: mutate through `&mut`.
#[derive(Debug, Clone, PartialEq)]
pub struct Backup {
    record: TrackedRecord,
}

impl Default for Backup {
    fn default() -> Self {
        Self::new()
    }
}

/// Getter/setter pairs for nullable string columns.
macro_rules! string_fields {
    ($($getter:ident, $setter:ident => $field:literal;)*) => {
        $(
            #[doc = concat!("The `", $field, "` field, if set and not null.")]
            pub fn $getter(&self) -> Option<&str> {
                self.record.value($field).and_then(FieldValue::as_str)
            }

            #[doc = concat!("Assign the `", $field, "` field.")]
            pub fn $setter(&mut self, value: Option<&str>) -> AppResult<()> {
                self.record.set($field, value)
            }
        )*
    };
}

/// Getter/setter pairs for integer columns.
macro_rules! integer_fields {
    ($($getter:ident, $setter:ident => $field:literal;)*) => {
        $(
            #[doc = concat!("The `", $field, "` field; zero when unset.")]
            pub fn $getter(&self) -> i64 {
                self.record
                    .value($field)
                    .and_then(FieldValue::as_integer)
                    .unwrap_or(0)
            }

            #[doc = concat!("Assign the `", $field, "` field.")]
            pub fn $setter(&mut self, value: i64) -> AppResult<()> {
                self.record.set($field, value)
            }
        )*
    };
}

impl Backup {
    /// Current version of the backup object.
    pub const VERSION: ObjectVersion = V1_1;

    /// Create an empty backup: no identity, nothing changed.
    pub fn new() -> Self {
        Self {
            record: TrackedRecord::new(&BACKUP_SCHEMA),
        }
    }

    /// The backup field schema.
    pub fn schema() -> &'static Schema {
        &BACKUP_SCHEMA
    }

    /// Materialize a backup from a storage row, change-set cleared.
    pub fn from_row(row: &Primitive) -> AppResult<Self> {
        let mut backup = Self::new();
        backup.load_row(row)?;
        Ok(backup)
    }

    /// Overwrite every declared field from a storage row and clear the
    /// change-set. Null integer columns load as zero.
    pub fn load_row(&mut self, row: &Primitive) -> AppResult<()> {
        self.record.load_row(row)
    }

    /// Assign a declared field by name.
    pub fn set(&mut self, field: &str, value: impl Into<FieldValue>) -> AppResult<()> {
        self.record.set(field, value)
    }

    /// Read a declared field by name, falling back to its default.
    pub fn get(&self, field: &str) -> AppResult<FieldValue> {
        self.record.get(field)
    }

    /// Whether the field has been assigned.
    pub fn is_set(&self, field: &str) -> bool {
        self.record.is_set(field)
    }

    /// Dirty fields mapped to their current values.
    pub fn changes(&self) -> Primitive {
        self.record.changes()
    }

    /// Names of the dirty fields.
    pub fn what_changed(&self) -> Vec<&'static str> {
        self.record.what_changed()
    }

    /// Clear the change-set.
    pub fn reset_changes(&mut self) {
        self.record.reset_changes();
    }

    /// Clear the dirty marks of the listed fields only.
    pub fn reset_fields(&mut self, fields: &[&str]) {
        self.record.reset_fields(fields);
    }

    /// Every assigned declared field.
    pub fn snapshot(&self) -> Primitive {
        self.record.snapshot()
    }

    /// The backup ID, once assigned.
    pub fn id(&self) -> Option<&str> {
        self.record.value("id").and_then(FieldValue::as_str)
    }

    /// The backup ID, or an object-action error naming `action`.
    pub fn require_id(&self, action: &str) -> AppResult<&str> {
        self.id()
            .ok_or_else(|| AppError::object_action(action, "object has no id"))
    }

    /// Assign the backup ID. Fails if one is already assigned.
    pub fn set_id(&mut self, id: &str) -> AppResult<()> {
        self.record.set("id", id)
    }

    /// Owning user.
    pub fn user_id(&self) -> Option<&str> {
        self.record.value("user_id").and_then(FieldValue::as_str)
    }

    /// Assign the owning user.
    pub fn set_user_id(&mut self, user_id: &str) -> AppResult<()> {
        self.record.set("user_id", user_id)
    }

    /// Owning project.
    pub fn project_id(&self) -> Option<&str> {
        self.record.value("project_id").and_then(FieldValue::as_str)
    }

    /// Assign the owning project.
    pub fn set_project_id(&mut self, project_id: &str) -> AppResult<()> {
        self.record.set("project_id", project_id)
    }

    /// Source volume.
    pub fn volume_id(&self) -> Option<&str> {
        self.record.value("volume_id").and_then(FieldValue::as_str)
    }

    /// Assign the source volume.
    pub fn set_volume_id(&mut self, volume_id: &str) -> AppResult<()> {
        self.record.set("volume_id", volume_id)
    }

    string_fields! {
        host, set_host => "host";
        availability_zone, set_availability_zone => "availability_zone";
        container, set_container => "container";
        parent_id, set_parent_id => "parent_id";
        status, set_status => "status";
        fail_reason, set_fail_reason => "fail_reason";
        display_name, set_display_name => "display_name";
        display_description, set_display_description => "display_description";
        service_metadata, set_service_metadata => "service_metadata";
        service, set_service => "service";
        temp_volume_id, set_temp_volume_id => "temp_volume_id";
        temp_snapshot_id, set_temp_snapshot_id => "temp_snapshot_id";
    }

    integer_fields! {
        size, set_size => "size";
        object_count, set_object_count => "object_count";
        num_dependent_backups, set_num_dependent_backups => "num_dependent_backups";
    }

    /// Display name derived from the ID and the configured template.
    pub fn name(&self, config: &BackupConfig) -> Option<String> {
        self.id().map(|id| config.render_name(id))
    }

    /// Whether this backup extends a parent backup.
    pub fn is_incremental(&self) -> bool {
        self.parent_id().is_some_and(|parent| !parent.is_empty())
    }

    /// Whether other backups use this one as their parent.
    pub fn has_dependent_backups(&self) -> bool {
        self.num_dependent_backups() > 0
    }

    /// Values of the derived fields, keyed by name. `name` is omitted while
    /// the backup has no ID.
    pub fn derived_values(&self, config: &BackupConfig) -> Primitive {
        let mut derived = Primitive::new();
        if let Some(name) = self.name(config) {
            derived.insert("name".to_string(), FieldValue::String(name));
        }
        derived.insert(
            "is_incremental".to_string(),
            FieldValue::Bool(self.is_incremental()),
        );
        derived.insert(
            "has_dependent_backups".to_string(),
            FieldValue::Bool(self.has_dependent_backups()),
        );
        derived
    }

    /// Serialize for RPC, downgraded for `target` when it is older than
    /// [`Backup::VERSION`].
    pub fn to_primitive(&self, target: Option<ObjectVersion>) -> AppResult<VersionedPrimitive> {
        self.record.to_primitive(target)
    }

    /// Rebuild a backup received over RPC.
    pub fn from_primitive(primitive: &VersionedPrimitive) -> AppResult<Self> {
        Ok(Self {
            record: TrackedRecord::from_primitive(&BACKUP_SCHEMA, primitive)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultkeeper_core::error::ErrorKind;

    fn row() -> Primitive {
        let mut row = Primitive::new();
        row.insert("id".into(), "5f0a7bd0-6a9c-4d4c-9d3e-0e0f7a3f2b11".into());
        row.insert("user_id".into(), "0b5e3a2c-1a7f-4f55-8d8c-3f4b8b6c9d01".into());
        row.insert("project_id".into(), "a7f2e0b4-3c41-4b6e-9e1d-7c2f5a8b4e02".into());
        row.insert("volume_id".into(), "d1c9b8a7-6e5f-4d3c-2b1a-0f9e8d7c6b03".into());
        row.insert("status".into(), "available".into());
        row.insert("size".into(), FieldValue::Integer(10));
        row.insert("object_count".into(), FieldValue::Null);
        row
    }

    #[test]
    fn test_schema_is_consistent() {
        BACKUP_SCHEMA.check().expect("backup schema");
        assert_eq!(Backup::schema().version, Backup::VERSION);
    }

    #[test]
    fn test_from_row_populates_every_field() {
        let backup = Backup::from_row(&row()).expect("from row");
        assert!(Backup::schema().field_names().all(|name| backup.is_set(name)));
        assert_eq!(backup.size(), 10);
        assert_eq!(backup.object_count(), 0);
        assert_eq!(backup.num_dependent_backups(), 0);
        assert_eq!(backup.status(), Some("available"));
        assert_eq!(backup.host(), None);
        assert!(backup.changes().is_empty());
    }

    #[test]
    fn test_every_declared_field_tracks_changes() {
        for spec in Backup::schema().fields {
            let mut backup = Backup::new();
            let value = match spec.kind {
                crate::object::FieldKind::Integer => FieldValue::Integer(1),
                _ => FieldValue::from("5f0a7bd0-6a9c-4d4c-9d3e-0e0f7a3f2b11"),
            };
            backup.set(spec.name, value.clone()).expect("set");
            assert_eq!(backup.changes().get(spec.name), Some(&value), "{}", spec.name);
            backup.reset_changes();
            assert!(backup.changes().is_empty());
        }
    }

    #[test]
    fn test_get_defaults() {
        let backup = Backup::new();
        assert_eq!(backup.get("size").expect("size"), FieldValue::Integer(0));
        assert_eq!(backup.get("display_name").expect("name"), FieldValue::Null);
        let err = backup.get("is_incremental").expect_err("derived is not declared");
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
    }

    #[test]
    fn test_derived_fields_scenario() {
        let mut backup = Backup::new();
        backup.set_id("a1").expect("id");
        backup.set_parent_id(Some("")).expect("parent");
        backup.set_num_dependent_backups(0).expect("deps");

        assert!(!backup.is_incremental());
        assert!(!backup.has_dependent_backups());
        assert_eq!(
            backup.name(&BackupConfig::default()).as_deref(),
            Some("backup-a1")
        );
    }

    #[test]
    fn test_derived_fields_follow_persisted_fields() {
        for parent in [None, Some(""), Some("p1")] {
            for deps in [0i64, 1, 5] {
                let mut backup = Backup::new();
                backup.set_parent_id(parent).expect("parent");
                backup.set_num_dependent_backups(deps).expect("deps");
                assert_eq!(backup.is_incremental(), parent.is_some_and(|p| !p.is_empty()));
                assert_eq!(backup.has_dependent_backups(), deps > 0);
                assert!(!backup.changes().contains_key("is_incremental"));
            }
        }
    }

    #[test]
    fn test_id_assigned_once() {
        let mut backup = Backup::new();
        backup.set_id("a1").expect("first");
        let err = backup.set_id("a2").expect_err("second");
        assert_eq!(err.kind, ErrorKind::ObjectAction);
        assert_eq!(backup.id(), Some("a1"));
    }

    #[test]
    fn test_rpc_downgrade_to_1_0() {
        let mut backup = Backup::from_row(&row()).expect("from row");
        backup.set_num_dependent_backups(2).expect("deps");

        let wire = backup
            .to_primitive(Some(ObjectVersion::new(1, 0)))
            .expect("primitive");
        assert_eq!(wire.version, ObjectVersion::new(1, 0));
        assert!(!wire.data.contains_key("num_dependent_backups"));
        assert!(wire.changes.is_empty());

        let current = backup.to_primitive(None).expect("primitive");
        assert_eq!(current.data.get("num_dependent_backups"), Some(&FieldValue::Integer(2)));
        assert_eq!(current.changes, vec!["num_dependent_backups".to_string()]);

        let back = Backup::from_primitive(&current).expect("from primitive");
        assert_eq!(back, backup);
    }

    #[test]
    fn test_derived_values() {
        let mut backup = Backup::new();
        let derived = backup.derived_values(&BackupConfig::default());
        assert!(!derived.contains_key("name"));

        backup.set_id("b2").expect("id");
        backup.set_parent_id(Some("b1")).expect("parent");
        let derived = backup.derived_values(&BackupConfig::default());
        assert_eq!(derived.get("name"), Some(&FieldValue::from("backup-b2")));
        assert_eq!(derived.get("is_incremental"), Some(&FieldValue::Bool(true)));
        assert_eq!(derived.get("has_dependent_backups"), Some(&FieldValue::Bool(false)));
    }
}
