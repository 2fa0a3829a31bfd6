//! Schema version discriminators for module documents.
//!
//! # Responsibility
//! - Name the closed set of schema versions each document family supports.
//! - Resolve a caller-requested version against a document's actual variant.
//!
//! # Invariants
//! - Schema versions are independent of a stream's build `version`.
//! - `VersionSelector::Unset` always accepts the document's own variant.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Schema version of a stream document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StreamSchemaVersion {
    V1,
    V2,
}

impl StreamSchemaVersion {
    pub fn as_u64(self) -> u64 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
        }
    }
}

impl Display for StreamSchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

/// Schema version of a defaults document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DefaultsSchemaVersion {
    V1,
}

impl DefaultsSchemaVersion {
    pub fn as_u64(self) -> u64 {
        match self {
            Self::V1 => 1,
        }
    }
}

impl Display for DefaultsSchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

/// Caller-requested schema version for add/set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VersionSelector<V> {
    /// Accept whatever variant the document carries.
    #[default]
    Unset,
    /// Require the document to be exactly this variant.
    Exact(V),
}

impl<V: Copy + PartialEq> VersionSelector<V> {
    /// Resolves the selector against the document's actual version.
    ///
    /// Returns the version to record on success, or the requested version
    /// that conflicted with `actual`.
    pub fn resolve(self, actual: V) -> Result<V, V> {
        match self {
            Self::Unset => Ok(actual),
            Self::Exact(requested) if requested == actual => Ok(actual),
            Self::Exact(requested) => Err(requested),
        }
    }
}
