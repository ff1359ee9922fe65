//! Generic versioned-object machinery shared by every record type.

pub mod compat;
pub mod envelope;
pub mod field;
pub mod record;
pub mod tracker;

pub use compat::make_compatible;
pub use envelope::VersionedPrimitive;
pub use field::{DerivedField, FieldKind, FieldSpec, Schema};
pub use record::TrackedRecord;
pub use tracker::ChangeTracker;
