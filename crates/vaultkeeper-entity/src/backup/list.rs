//! Backup list wrapper.

use std::ops::Index;

use serde::{Deserialize, Serialize};

use vaultkeeper_core::error::AppError;
use vaultkeeper_core::result::AppResult;
use vaultkeeper_core::types::{ObjectVersion, Primitive};

use super::model::{BACKUP_SCHEMA, Backup};
use crate::object::VersionedPrimitive;

/// Payload of a serialized [`BackupList`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupListData {
    /// Serialized elements, in list order.
    pub objects: Vec<VersionedPrimitive>,
}

/// An ordered list of backups sharing one element version.
///
/// The list is versioned separately from its elements; `CHILD_VERSIONS`
/// pins which `Backup` version a peer expecting a given list version
/// understands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackupList {
    objects: Vec<Backup>,
}

impl BackupList {
    /// Current version of the list object.
    pub const VERSION: ObjectVersion = ObjectVersion::new(1, 0);

    /// List version mapped to the element version it carries.
    pub const CHILD_VERSIONS: &'static [(ObjectVersion, ObjectVersion)] =
        &[(ObjectVersion::new(1, 0), ObjectVersion::new(1, 0))];

    const NAME: &'static str = "BackupList";

    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from storage rows, keeping their order.
    pub fn from_rows(rows: &[Primitive]) -> AppResult<Self> {
        let objects = rows.iter().map(Backup::from_row).collect::<AppResult<Vec<_>>>()?;
        Ok(Self { objects })
    }

    /// Append a backup.
    pub fn push(&mut self, backup: Backup) {
        self.objects.push(backup);
    }

    /// Number of backups.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the list is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Backup at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Backup> {
        self.objects.get(index)
    }

    /// Iterate in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, Backup> {
        self.objects.iter()
    }

    /// Element version carried by a list serialized at `target`: the entry
    /// for `target` itself, else the closest lower list version.
    pub fn child_version_for(target: ObjectVersion) -> AppResult<ObjectVersion> {
        Self::CHILD_VERSIONS
            .iter()
            .filter(|(list, _)| *list <= target)
            .max_by_key(|(list, _)| *list)
            .map(|(_, child)| *child)
            .ok_or_else(|| {
                AppError::incompatible_version(format!(
                    "{} version {target} is not supported",
                    Self::NAME
                ))
            })
    }

    /// Serialize for RPC.
    ///
    /// At the list's own version (or no target, or a newer one) elements keep
    /// their own version; for an older target each element is downgraded to
    /// the pinned child version.
    pub fn to_primitive(
        &self,
        target: Option<ObjectVersion>,
    ) -> AppResult<VersionedPrimitive<BackupListData>> {
        let (version, child) = match target {
            Some(target) if target.major != Self::VERSION.major => {
                return Err(AppError::incompatible_version(format!(
                    "{} cannot be serialized for version {target} (local version {})",
                    Self::NAME,
                    Self::VERSION
                )));
            }
            Some(target) if target < Self::VERSION => {
                (target, Some(Self::child_version_for(target)?))
            }
            _ => (Self::VERSION, None),
        };

        let objects = self
            .objects
            .iter()
            .map(|b| b.to_primitive(child))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(VersionedPrimitive {
            name: Self::NAME.to_string(),
            namespace: BACKUP_SCHEMA.namespace.to_string(),
            version,
            data: BackupListData { objects },
            changes: Vec::new(),
        })
    }

    /// Rebuild a list received over RPC.
    pub fn from_primitive(primitive: &VersionedPrimitive<BackupListData>) -> AppResult<Self> {
        if primitive.name != Self::NAME || primitive.namespace != BACKUP_SCHEMA.namespace {
            return Err(AppError::incompatible_version(format!(
                "Cannot load {}.{} as {}",
                primitive.namespace,
                primitive.name,
                Self::NAME
            )));
        }
        if !primitive.version.is_compatible_with(&Self::VERSION) {
            return Err(AppError::incompatible_version(format!(
                "{} version {} is not supported (local version {})",
                Self::NAME,
                primitive.version,
                Self::VERSION
            )));
        }

        let objects = primitive
            .data
            .objects
            .iter()
            .map(Backup::from_primitive)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(Self { objects })
    }
}

impl Index<usize> for BackupList {
    type Output = Backup;

    fn index(&self, index: usize) -> &Self::Output {
        &self.objects[index]
    }
}

impl<'a> IntoIterator for &'a BackupList {
    type Item = &'a Backup;
    type IntoIter = std::slice::Iter<'a, Backup>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

impl IntoIterator for BackupList {
    type Item = Backup;
    type IntoIter = std::vec::IntoIter<Backup>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.into_iter()
    }
}

impl FromIterator<Backup> for BackupList {
    fn from_iter<I: IntoIterator<Item = Backup>>(iter: I) -> Self {
        Self {
            objects: iter.into_iter().collect(),
        }
    }
}
