//! Structured `(major, minor)` object versions.
//!
//! Versions are parsed once at the boundary and compared as tuples from then
//! on, so `1.10` correctly sorts after `1.9`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// The schema version of a versioned object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectVersion {
    /// Major component. Objects with different majors never interoperate.
    pub major: u16,
    /// Minor component. Bumped for every additive schema change.
    pub minor: u16,
}

impl ObjectVersion {
    /// Create a version from its components.
    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Whether an object at `self` can be read by code built for `other`
    /// without any downgrade.
    pub fn is_compatible_with(&self, other: &ObjectVersion) -> bool {
        self.major == other.major && self.minor <= other.minor
    }
}

impl fmt::Display for ObjectVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ObjectVersion {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::validation(format!("Invalid object version '{s}'"));
        let (major, minor) = match s.trim().split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (s.trim(), "0"),
        };
        let major = major.parse::<u16>().map_err(|_| invalid())?;
        let minor = minor.parse::<u16>().map_err(|_| invalid())?;
        Ok(Self { major, minor })
    }
}

impl TryFrom<String> for ObjectVersion {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ObjectVersion> for String {
    fn from(version: ObjectVersion) -> String {
        version.to_string()
    }
}
