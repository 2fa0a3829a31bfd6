//! Recoverable module registry errors.

use crate::model::stream::{NsvcKey, NsvcParseError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ModuleResult<T> = Result<T, ModuleError>;

/// Document family an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Stream,
    Defaults,
    Translation,
}

impl Display for DocumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stream => write!(f, "stream"),
            Self::Defaults => write!(f, "defaults"),
            Self::Translation => write!(f, "translation"),
        }
    }
}

/// Errors returned by module mutations and lookups.
///
/// Every variant leaves the module unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Requested schema version conflicts with the document's variant.
    SchemaVersionMismatch {
        document: DocumentKind,
        requested: u64,
        actual: u64,
    },
    /// Document names a different module than the one it was added to.
    ModuleNameMismatch {
        document: DocumentKind,
        expected: String,
        found: String,
    },
    /// A stream with the same `(stream, version, context)` is already indexed.
    DuplicateKey(NsvcKey),
    /// NSVC text could not be parsed.
    InvalidNsvc(NsvcParseError),
    /// An indexed stream has a blank identity part (`stream` or `context`).
    IncompleteStream { key: NsvcKey, field: &'static str },
}

impl Display for ModuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SchemaVersionMismatch {
                document,
                requested,
                actual,
            } => write!(
                f,
                "{document} schema version mismatch: requested {requested}, document is {actual}"
            ),
            Self::ModuleNameMismatch {
                document,
                expected,
                found,
            } => write!(
                f,
                "{document} module name mismatch: expected `{expected}`, found `{found}`"
            ),
            Self::DuplicateKey(key) => write!(f, "stream already indexed: {key}"),
            Self::InvalidNsvc(err) => write!(f, "{err}"),
            Self::IncompleteStream { key, field } => {
                write!(f, "stream {key} has an empty `{field}`")
            }
        }
    }
}

impl Error for ModuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidNsvc(err) => Some(err),
            Self::SchemaVersionMismatch { .. } => None,
            Self::ModuleNameMismatch { .. } => None,
            Self::DuplicateKey(_) => None,
            Self::IncompleteStream { .. } => None,
        }
    }
}

impl From<NsvcParseError> for ModuleError {
    fn from(value: NsvcParseError) -> Self {
        Self::InvalidNsvc(value)
    }
}
