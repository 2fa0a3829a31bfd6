//! Module aggregate.
//!
//! # Responsibility
//! - Own all streams, the defaults binding and translation overlays of one
//!   module.
//! - Validate documents against the module identity and requested schema
//!   versions before they become queryable.
//!
//! # Invariants
//! - `name` is non-empty and immutable.
//! - Every indexed stream carries `module_name == name`.
//! - Locale lookups on a stream reflect the newest overlay for its stream
//!   name, whichever of the two was added first.

use crate::index::defaults_binding::DefaultsBinding;
use crate::index::overlay_store::{OverlayStore, RegisterOutcome};
use crate::index::stream_index::StreamIndex;
use crate::model::defaults::DefaultsDocument;
use crate::model::stream::{Nsvc, StreamDocument};
use crate::model::translation::TranslationOverlay;
use crate::model::version::{DefaultsSchemaVersion, StreamSchemaVersion, VersionSelector};
use crate::module::error::{DocumentKind, ModuleError, ModuleResult};
use log::{debug, warn};

/// Registry for every document belonging to one named module.
#[derive(Debug)]
pub struct Module {
    name: String,
    streams: StreamIndex,
    translations: OverlayStore,
    defaults: DefaultsBinding,
}

impl Module {
    /// Creates an empty module.
    ///
    /// # Panics
    /// - When `name` is empty.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        assert!(!name.is_empty(), "module name must not be empty");

        Self {
            name,
            streams: StreamIndex::new(),
            translations: OverlayStore::new(),
            defaults: DefaultsBinding::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Adds one stream document and seeds it with any stored translation.
    ///
    /// Returns the schema version actually recorded.
    ///
    /// # Errors
    /// - `SchemaVersionMismatch` when `requested` conflicts with `doc`.
    /// - `ModuleNameMismatch` when `doc` names another module.
    /// - `DuplicateKey` when the NSVC key is already indexed.
    pub fn add_stream(
        &mut self,
        mut doc: StreamDocument,
        requested: VersionSelector<StreamSchemaVersion>,
    ) -> ModuleResult<StreamSchemaVersion> {
        let actual = doc.schema_version();
        let used = requested.resolve(actual).map_err(|requested| {
            self.rejected(
                "stream_add",
                ModuleError::SchemaVersionMismatch {
                    document: DocumentKind::Stream,
                    requested: requested.as_u64(),
                    actual: actual.as_u64(),
                },
            )
        })?;

        match doc.module_name() {
            Some(found) if found != self.name => {
                let err = ModuleError::ModuleNameMismatch {
                    document: DocumentKind::Stream,
                    expected: self.name.clone(),
                    found: found.to_string(),
                };
                return Err(self.rejected("stream_add", err));
            }
            Some(_) => {}
            None => doc.set_module_name(&self.name),
        }

        let key = doc.key();
        if self.streams.contains_key(&key) {
            return Err(self.rejected("stream_add", ModuleError::DuplicateKey(key)));
        }

        let translated = self.translations.attach_to_new(&mut doc);
        self.streams
            .insert(doc)
            .map_err(|err| self.rejected("stream_add", err))?;

        debug!(
            "event=stream_add module={} status=ok nsvc={} mdversion={} translated={}",
            self.name, key, used, translated
        );
        Ok(used)
    }

    /// Stores a translation overlay and applies it to every indexed stream
    /// sharing its stream name.
    ///
    /// An overlay with a lower revision than the stored one is ignored and
    /// reported as `RegisterOutcome::Superseded`.
    ///
    /// # Errors
    /// - `ModuleNameMismatch` when the overlay names another module.
    pub fn add_translation(
        &mut self,
        overlay: TranslationOverlay,
    ) -> ModuleResult<RegisterOutcome> {
        if overlay.module_name != self.name {
            let err = ModuleError::ModuleNameMismatch {
                document: DocumentKind::Translation,
                expected: self.name.clone(),
                found: overlay.module_name.clone(),
            };
            return Err(self.rejected("translation_add", err));
        }

        let stream_name = overlay.stream_name.clone();
        let revision = overlay.revision;
        let outcome = self.translations.register(overlay, &mut self.streams);
        match outcome {
            RegisterOutcome::Stored { streams_updated } => debug!(
                "event=translation_add module={} status=ok stream={} revision={} streams_updated={}",
                self.name, stream_name, revision, streams_updated
            ),
            RegisterOutcome::Superseded { current_revision } => warn!(
                "event=translation_add module={} status=ignored stream={} revision={} current_revision={}",
                self.name, stream_name, revision, current_revision
            ),
        }
        Ok(outcome)
    }

    /// Binds or clears the defaults document.
    ///
    /// Returns `Ok(None)` after clearing, or the schema version recorded.
    ///
    /// # Errors
    /// - `ModuleNameMismatch` when `doc` names another module.
    /// - `SchemaVersionMismatch` when `requested` conflicts with `doc`.
    ///
    /// The previous binding is kept on error.
    pub fn set_defaults(
        &mut self,
        doc: Option<DefaultsDocument>,
        requested: VersionSelector<DefaultsSchemaVersion>,
    ) -> ModuleResult<Option<DefaultsSchemaVersion>> {
        let Some(doc) = doc else {
            self.defaults.clear();
            debug!("event=defaults_clear module={} status=ok", self.name);
            return Ok(None);
        };

        let used = self
            .defaults
            .bind(self.name.as_str(), doc, requested)
            .map_err(|err| self.rejected("defaults_set", err))?;
        debug!(
            "event=defaults_set module={} status=ok mdversion={}",
            self.name, used
        );
        Ok(Some(used))
    }

    pub fn defaults(&self) -> Option<&DefaultsDocument> {
        self.defaults.get()
    }

    /// Returns a caller-owned snapshot of streams named `stream_name`,
    /// newest `version` first with ties in insertion order.
    pub fn streams_by_name(&self, stream_name: &str) -> Vec<&StreamDocument> {
        self.streams.lookup_by_name(stream_name)
    }

    pub fn stream_by_key(
        &self,
        stream_name: &str,
        version: u64,
        context: &str,
    ) -> Option<&StreamDocument> {
        self.streams.lookup_exact(stream_name, version, context)
    }

    /// Looks up a stream by `module:stream:version:context` text.
    ///
    /// Returns `Ok(None)` when the text names another module or an
    /// unindexed stream.
    ///
    /// # Errors
    /// - `InvalidNsvc` when the text is malformed.
    pub fn stream_by_nsvc_str(&self, nsvc: &str) -> ModuleResult<Option<&StreamDocument>> {
        let parsed = Nsvc::parse(nsvc)?;
        if parsed.module_name != self.name {
            return Ok(None);
        }
        Ok(self.stream_by_key(
            parsed.key.stream_name.as_str(),
            parsed.key.version,
            parsed.key.context.as_str(),
        ))
    }

    /// Filters `streams_by_name` by optional version and context.
    pub fn search_streams(
        &self,
        stream_name: &str,
        version: Option<u64>,
        context: Option<&str>,
    ) -> Vec<&StreamDocument> {
        self.streams
            .lookup_by_name(stream_name)
            .into_iter()
            .filter(|doc| version.map_or(true, |v| doc.version() == v))
            .filter(|doc| context.map_or(true, |c| doc.context() == c))
            .collect()
    }

    /// Borrowed view of every stream in insertion order.
    pub fn all_streams(&self) -> &[StreamDocument] {
        self.streams.as_slice()
    }

    /// Returns sorted, de-duplicated stream names.
    pub fn stream_names(&self) -> Vec<&str> {
        self.streams.stream_names()
    }

    /// Returns sorted stream names that have a translation overlay.
    pub fn translated_stream_names(&self) -> Vec<&str> {
        self.translations.stream_names()
    }

    /// Returns the authoritative overlay for `stream_name`.
    pub fn translation(&self, stream_name: &str) -> Option<&TranslationOverlay> {
        self.translations.get(stream_name)
    }

    /// Checks that every indexed stream can be addressed by a full NSVC.
    ///
    /// `add_stream` accepts blank identity parts; this reports the first one.
    ///
    /// # Errors
    /// - `IncompleteStream` naming the first blank `stream` or `context`.
    pub fn validate(&self) -> ModuleResult<()> {
        for stream in self.streams.iter_all() {
            let field = if stream.stream_name().is_empty() {
                "stream"
            } else if stream.context().is_empty() {
                "context"
            } else {
                continue;
            };
            return Err(ModuleError::IncompleteStream {
                key: stream.key(),
                field,
            });
        }
        Ok(())
    }

    fn rejected(&self, event: &str, err: ModuleError) -> ModuleError {
        warn!(
            "event={} module={} status=error error={}",
            event, self.name, err
        );
        err
    }
}

#[cfg(test)]
mod tests {
    use super::Module;
    use crate::index::overlay_store::RegisterOutcome;
    use crate::model::stream::{NsvcKey, StreamDocument};
    use crate::model::translation::{TranslationEntry, TranslationOverlay};
    use crate::model::version::{StreamSchemaVersion, VersionSelector};
    use crate::module::error::{DocumentKind, ModuleError};

    fn v2(stream_name: &str, version: u64, context: &str) -> StreamDocument {
        StreamDocument::new(StreamSchemaVersion::V2, stream_name)
            .with_version(version)
            .with_context(context)
    }

    #[test]
    fn add_stream_fills_missing_module_name() {
        let mut module = Module::new("testmodule");
        module
            .add_stream(v2("stream1", 1, "c1"), VersionSelector::Unset)
            .expect("stream should add");
        let stream = module.stream_by_key("stream1", 1, "c1").expect("indexed");
        assert_eq!(stream.module_name(), Some("testmodule"));
        assert!(module.validate().is_ok());
    }

    #[test]
    fn validate_reports_stream_without_context() {
        let mut module = Module::new("testmodule");
        module
            .add_stream(v2("stream1", 1, "c1"), VersionSelector::Unset)
            .expect("stream should add");
        module
            .add_stream(v2("stream1", 2, ""), VersionSelector::Unset)
            .expect("blank context is accepted at add time");

        let err = module.validate().expect_err("blank context must fail validation");
        assert_eq!(
            err,
            ModuleError::IncompleteStream {
                key: NsvcKey::new("stream1", 2, ""),
                field: "context",
            }
        );
    }

    #[test]
    fn validate_reports_stream_without_name() {
        let mut module = Module::new("testmodule");
        module
            .add_stream(v2("", 1, "c1"), VersionSelector::Unset)
            .expect("blank stream name is accepted at add time");

        let err = module.validate().expect_err("blank stream must fail validation");
        assert!(matches!(
            err,
            ModuleError::IncompleteStream {
                field: "stream",
                ..
            }
        ));
    }

    #[test]
    fn add_stream_rejects_foreign_module_name() {
        let mut module = Module::new("testmodule");
        let err = module
            .add_stream(
                v2("stream1", 1, "c1").with_module_name("other"),
                VersionSelector::Unset,
            )
            .expect_err("foreign stream must be rejected");
        assert_eq!(
            err,
            ModuleError::ModuleNameMismatch {
                document: DocumentKind::Stream,
                expected: "testmodule".to_string(),
                found: "other".to_string(),
            }
        );
        assert!(module.all_streams().is_empty());
    }

    #[test]
    fn add_stream_rejects_schema_mismatch_without_indexing() {
        let mut module = Module::new("testmodule");
        let err = module
            .add_stream(
                v2("stream1", 1, "c1"),
                VersionSelector::Exact(StreamSchemaVersion::V1),
            )
            .expect_err("schema mismatch must fail");
        assert_eq!(
            err,
            ModuleError::SchemaVersionMismatch {
                document: DocumentKind::Stream,
                requested: 1,
                actual: 2,
            }
        );
        assert!(module.stream_by_key("stream1", 1, "c1").is_none());
    }

    #[test]
    fn add_translation_rejects_foreign_module() {
        let mut module = Module::new("testmodule");
        let err = module
            .add_translation(TranslationOverlay::new("other", "stream1", 1))
            .expect_err("foreign overlay must be rejected");
        assert!(matches!(
            err,
            ModuleError::ModuleNameMismatch {
                document: DocumentKind::Translation,
                ..
            }
        ));
        assert!(module.translated_stream_names().is_empty());
    }

    #[test]
    fn add_translation_reports_outcome() {
        let mut module = Module::new("testmodule");
        module
            .add_stream(v2("stream1", 1, "c1"), VersionSelector::Unset)
            .expect("stream should add");

        let overlay = TranslationOverlay::new("testmodule", "stream1", 4)
            .with_entry(TranslationEntry::new("nl_NL").with_summary("vier"));
        let outcome = module.add_translation(overlay).expect("overlay should add");
        assert_eq!(outcome, RegisterOutcome::Stored { streams_updated: 1 });

        let stale = TranslationOverlay::new("testmodule", "stream1", 2);
        let outcome = module.add_translation(stale).expect("stale overlay is not an error");
        assert_eq!(
            outcome,
            RegisterOutcome::Superseded {
                current_revision: 4
            }
        );
        assert_eq!(module.translation("stream1").map(|o| o.revision), Some(4));
    }

    #[test]
    fn nsvc_text_lookup_scopes_to_this_module() {
        let mut module = Module::new("testmodule");
        module
            .add_stream(v2("stream1", 3, "c2"), VersionSelector::Unset)
            .expect("stream should add");

        let found = module
            .stream_by_nsvc_str("testmodule:stream1:3:c2")
            .expect("valid nsvc");
        assert!(found.is_some());
        let other = module
            .stream_by_nsvc_str("othermodule:stream1:3:c2")
            .expect("valid nsvc");
        assert!(other.is_none());
        let err = module
            .stream_by_nsvc_str("testmodule:stream1")
            .expect_err("malformed nsvc");
        assert!(matches!(err, ModuleError::InvalidNsvc(_)));
    }

    #[test]
    fn search_streams_filters_on_optional_fields() {
        let mut module = Module::new("testmodule");
        for (version, context) in [(1, "c1"), (3, "c2"), (1, "c2")] {
            module
                .add_stream(v2("stream1", version, context), VersionSelector::Unset)
                .expect("stream should add");
        }

        assert_eq!(module.search_streams("stream1", None, None).len(), 3);
        assert_eq!(module.search_streams("stream1", Some(1), None).len(), 2);
        let contexts: Vec<&str> = module
            .search_streams("stream1", None, Some("c2"))
            .iter()
            .map(|doc| doc.context())
            .collect();
        assert_eq!(contexts, vec!["c2", "c2"]);
        assert!(module.search_streams("stream1", Some(3), Some("c1")).is_empty());
    }
}
