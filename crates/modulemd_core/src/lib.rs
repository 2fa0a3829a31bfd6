//! In-memory registry for module metadata documents.
//!
//! A [`Module`] aggregates schema-versioned stream documents keyed by
//! `(stream, version, context)`, at most one defaults document, and
//! translation overlays that apply to every stream sharing a stream name.
//! Parsing and emitting the documents is left to an external codec.

pub mod index;
pub mod logging;
pub mod model;
pub mod module;

pub use index::overlay_store::RegisterOutcome;
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::defaults::{DefaultsDocument, DefaultsV1};
pub use model::stream::{
    Dependencies, Nsvc, NsvcKey, NsvcParseError, Profile, StreamDocument, StreamHeader, StreamV1,
    StreamV2,
};
pub use model::translation::{TranslationEntry, TranslationOverlay};
pub use model::version::{DefaultsSchemaVersion, StreamSchemaVersion, VersionSelector};
pub use module::error::{DocumentKind, ModuleError, ModuleResult};
pub use module::Module;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
