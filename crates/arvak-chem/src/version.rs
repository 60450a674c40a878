//! Schema version resolution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};

/// Supported Broombridge schema versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SchemaVersion {
    /// Version `0.1`.
    V0_1,
    /// Version `0.2`.
    V0_2,
}

impl SchemaVersion {
    /// The version string as written in documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V0_1 => "0.1",
            Self::V0_2 => "0.2",
        }
    }
}

impl fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaVersion {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_version(s)
    }
}

/// Map a version string onto a [`SchemaVersion`].
///
/// The match is exact: no trimming, no case folding.
pub fn resolve_version(version: &str) -> ChemResult<SchemaVersion> {
    match version {
        "0.1" => Ok(SchemaVersion::V0_1),
        "0.2" => Ok(SchemaVersion::V0_2),
        other => Err(ChemError::InvalidVersion(other.to_string())),
    }
}
