//! Self-describing wire envelopes for versioned objects.

use serde::{Deserialize, Serialize};

use vaultkeeper_core::types::{ObjectVersion, Primitive};

/// The RPC form of a versioned object.
///
/// ```json
/// {
///   "vaultkeeper_object.name": "Backup",
///   "vaultkeeper_object.namespace": "vaultkeeper",
///   "vaultkeeper_object.version": "1.1",
///   "vaultkeeper_object.data": {"id": "...", "size": 0},
///   "vaultkeeper_object.changes": ["size"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedPrimitive<D = Primitive> {
    /// Object type name.
    #[serde(rename = "vaultkeeper_object.name")]
    pub name: String,
    /// Object namespace.
    #[serde(rename = "vaultkeeper_object.namespace")]
    pub namespace: String,
    /// Version the payload conforms to.
    #[serde(rename = "vaultkeeper_object.version")]
    pub version: ObjectVersion,
    /// Object payload.
    #[serde(rename = "vaultkeeper_object.data")]
    pub data: D,
    /// Fields that were dirty when the object was serialized.
    #[serde(
        rename = "vaultkeeper_object.changes",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub changes: Vec<String>,
}
