//! Core type definitions used across the Vaultkeeper workspace.

pub mod value;
pub mod version;

pub use value::{FieldValue, Filters, Primitive};
pub use version::ObjectVersion;
