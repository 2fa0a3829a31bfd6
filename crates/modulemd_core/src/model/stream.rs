//! Stream document model.
//!
//! # Responsibility
//! - Define the schema-versioned stream documents indexed by a module.
//! - Resolve locale-aware strings against an attached translation overlay.
//!
//! # Invariants
//! - `(stream_name, version, context)` is the identity of a stream inside a
//!   module and is never changed once the document is indexed.
//! - Locale lookups never fail: a missing overlay, locale or field falls
//!   back to the document's native value.

use crate::model::translation::{TranslationEntry, TranslationOverlay};
use crate::model::version::StreamSchemaVersion;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

static NSVC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^:\s]+):([^:\s]+):([0-9]+):([^:\s]+)$").expect("valid nsvc regex")
});

/// Composite identity of a stream inside one module.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NsvcKey {
    pub stream_name: String,
    pub version: u64,
    pub context: String,
}

impl NsvcKey {
    pub fn new(stream_name: impl Into<String>, version: u64, context: impl Into<String>) -> Self {
        Self {
            stream_name: stream_name.into(),
            version,
            context: context.into(),
        }
    }
}

impl Display for NsvcKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.stream_name, self.version, self.context)
    }
}

/// Fully qualified `module:stream:version:context` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nsvc {
    pub module_name: String,
    pub key: NsvcKey,
}

impl Nsvc {
    /// Parses `name:stream:version:context`.
    ///
    /// # Errors
    /// - `NsvcParseError::Malformed` when the text does not have four
    ///   non-empty, colon-separated parts with a numeric version.
    /// - `NsvcParseError::VersionOutOfRange` when the version overflows `u64`.
    pub fn parse(value: &str) -> Result<Self, NsvcParseError> {
        let trimmed = value.trim();
        let captures = NSVC_RE
            .captures(trimmed)
            .ok_or_else(|| NsvcParseError::Malformed(trimmed.to_string()))?;

        let version_text = &captures[3];
        let version = version_text
            .parse::<u64>()
            .map_err(|_| NsvcParseError::VersionOutOfRange(version_text.to_string()))?;

        Ok(Self {
            module_name: captures[1].to_string(),
            key: NsvcKey::new(&captures[2], version, &captures[4]),
        })
    }
}

impl Display for Nsvc {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.module_name, self.key)
    }
}

/// Errors from parsing an NSVC string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NsvcParseError {
    Malformed(String),
    VersionOutOfRange(String),
}

impl Display for NsvcParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(
                f,
                "invalid nsvc `{value}` (expected name:stream:version:context)"
            ),
            Self::VersionOutOfRange(value) => write!(f, "nsvc version out of range: {value}"),
        }
    }
}

impl Error for NsvcParseError {}

/// Installable profile declared by a stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub rpms: BTreeSet<String>,
}

/// Fields shared by every stream schema version.
///
/// Equality compares document content only; an attached overlay is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamHeader {
    /// Filled in by the owning module when the parser left it unset.
    #[serde(default, rename = "name", skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(rename = "stream")]
    pub stream_name: String,
    /// Build number; unrelated to the schema version.
    #[serde(default)]
    pub version: u64,
    #[serde(default)]
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    /// Native (untranslated) summary.
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(skip)]
    translation: Option<Arc<TranslationOverlay>>,
}

impl StreamHeader {
    pub fn new(stream_name: impl Into<String>) -> Self {
        Self {
            module_name: None,
            stream_name: stream_name.into(),
            version: 0,
            context: String::new(),
            arch: None,
            summary: String::new(),
            description: None,
            profiles: BTreeMap::new(),
            translation: None,
        }
    }

    fn translated(&self, locale: Option<&str>) -> Option<&TranslationEntry> {
        let locale = locale?;
        self.translation.as_ref()?.entry(locale)
    }
}

impl PartialEq for StreamHeader {
    fn eq(&self, other: &Self) -> bool {
        self.module_name == other.module_name
            && self.stream_name == other.stream_name
            && self.version == other.version
            && self.context == other.context
            && self.arch == other.arch
            && self.summary == other.summary
            && self.description == other.description
            && self.profiles == other.profiles
    }
}

impl Eq for StreamHeader {}

/// Stream payload, schema version 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamV1 {
    #[serde(flatten)]
    pub header: StreamHeader,
    /// Runtime module requirements: module name -> stream name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requires: BTreeMap<String, String>,
}

/// One dependency block of a v2 stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dependencies {
    /// Module name -> acceptable stream names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub buildrequires: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub requires: BTreeMap<String, Vec<String>>,
}

/// Stream payload, schema version 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamV2 {
    #[serde(flatten)]
    pub header: StreamHeader,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependencies>,
    #[serde(default)]
    pub static_context: bool,
}

/// Stream document, tagged by schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mdversion", content = "data")]
pub enum StreamDocument {
    #[serde(rename = "1")]
    V1(StreamV1),
    #[serde(rename = "2")]
    V2(StreamV2),
}

impl StreamDocument {
    /// Creates an empty stream of the given schema version.
    pub fn new(schema_version: StreamSchemaVersion, stream_name: impl Into<String>) -> Self {
        let header = StreamHeader::new(stream_name);
        match schema_version {
            StreamSchemaVersion::V1 => Self::V1(StreamV1 {
                header,
                requires: BTreeMap::new(),
            }),
            StreamSchemaVersion::V2 => Self::V2(StreamV2 {
                header,
                dependencies: Vec::new(),
                static_context: false,
            }),
        }
    }

    pub fn with_module_name(mut self, module_name: impl Into<String>) -> Self {
        self.header_mut().module_name = Some(module_name.into());
        self
    }

    pub fn with_version(mut self, version: u64) -> Self {
        self.header_mut().version = version;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.header_mut().context = context.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.header_mut().summary = summary.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.header_mut().description = Some(description.into());
        self
    }

    pub fn with_profile(mut self, name: impl Into<String>, profile: Profile) -> Self {
        self.header_mut().profiles.insert(name.into(), profile);
        self
    }

    pub fn schema_version(&self) -> StreamSchemaVersion {
        match self {
            Self::V1(_) => StreamSchemaVersion::V1,
            Self::V2(_) => StreamSchemaVersion::V2,
        }
    }

    pub fn header(&self) -> &StreamHeader {
        match self {
            Self::V1(inner) => &inner.header,
            Self::V2(inner) => &inner.header,
        }
    }

    fn header_mut(&mut self) -> &mut StreamHeader {
        match self {
            Self::V1(inner) => &mut inner.header,
            Self::V2(inner) => &mut inner.header,
        }
    }

    pub fn module_name(&self) -> Option<&str> {
        self.header().module_name.as_deref()
    }

    pub fn stream_name(&self) -> &str {
        self.header().stream_name.as_str()
    }

    pub fn version(&self) -> u64 {
        self.header().version
    }

    pub fn context(&self) -> &str {
        self.header().context.as_str()
    }

    pub fn key(&self) -> NsvcKey {
        let header = self.header();
        NsvcKey::new(header.stream_name.as_str(), header.version, header.context.as_str())
    }

    /// Returns `module:stream:version:context`; the module part is empty
    /// while the stream is not yet bound to a module.
    pub fn nsvc_string(&self) -> String {
        format!("{}:{}", self.module_name().unwrap_or_default(), self.key())
    }

    /// Summary for `locale`, falling back to the native summary.
    pub fn summary(&self, locale: Option<&str>) -> &str {
        let header = self.header();
        header
            .translated(locale)
            .and_then(|entry| entry.summary.as_deref())
            .unwrap_or(header.summary.as_str())
    }

    /// Description for `locale`, falling back to the native description.
    pub fn description(&self, locale: Option<&str>) -> Option<&str> {
        let header = self.header();
        header
            .translated(locale)
            .and_then(|entry| entry.description.as_deref())
            .or(header.description.as_deref())
    }

    /// Profile description for `locale`, falling back to the native one.
    ///
    /// Returns `None` when the profile is not declared by this stream.
    pub fn profile_description(&self, profile: &str, locale: Option<&str>) -> Option<&str> {
        let header = self.header();
        let native = header.profiles.get(profile)?;
        header
            .translated(locale)
            .and_then(|entry| entry.profile_descriptions.get(profile))
            .map(String::as_str)
            .or(native.description.as_deref())
    }

    /// Revision of the attached overlay, if any.
    pub fn translation_revision(&self) -> Option<u64> {
        self.header()
            .translation
            .as_ref()
            .map(|overlay| overlay.revision)
    }

    pub(crate) fn attach_translation(&mut self, overlay: Arc<TranslationOverlay>) {
        self.header_mut().translation = Some(overlay);
    }

    pub(crate) fn set_module_name(&mut self, module_name: &str) {
        self.header_mut().module_name = Some(module_name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{Nsvc, NsvcKey, NsvcParseError, Profile, StreamDocument};
    use crate::model::translation::{TranslationEntry, TranslationOverlay};
    use crate::model::version::StreamSchemaVersion;
    use std::sync::Arc;

    fn stream() -> StreamDocument {
        StreamDocument::new(StreamSchemaVersion::V2, "stream1")
            .with_version(1)
            .with_context("context1")
            .with_summary("Stream 1")
            .with_description("Native description")
            .with_profile(
                "server",
                Profile {
                    description: Some("Server profile".to_string()),
                    ..Profile::default()
                },
            )
    }

    #[test]
    fn identity_accessors_read_header() {
        let doc = stream();
        assert_eq!(doc.schema_version(), StreamSchemaVersion::V2);
        assert_eq!(doc.key(), NsvcKey::new("stream1", 1, "context1"));
        assert_eq!(doc.nsvc_string(), ":stream1:1:context1");
        assert_eq!(
            doc.with_module_name("testmodule").nsvc_string(),
            "testmodule:stream1:1:context1"
        );
    }

    #[test]
    fn locale_lookup_without_overlay_returns_native_values() {
        let doc = stream();
        assert_eq!(doc.summary(None), "Stream 1");
        assert_eq!(doc.summary(Some("unknown_locale")), "Stream 1");
        assert_eq!(doc.description(Some("nl_NL")), Some("Native description"));
        assert_eq!(
            doc.profile_description("server", Some("nl_NL")),
            Some("Server profile")
        );
        assert_eq!(doc.profile_description("missing", None), None);
        assert_eq!(doc.translation_revision(), None);
    }

    #[test]
    fn locale_lookup_prefers_attached_overlay_fields() {
        let mut doc = stream();
        let overlay = TranslationOverlay::new("testmodule", "stream1", 7).with_entry(
            TranslationEntry::new("nl_NL")
                .with_summary("Stroom 1")
                .with_profile_description("server", "Serverprofiel"),
        );
        doc.attach_translation(Arc::new(overlay));

        assert_eq!(doc.summary(Some("nl_NL")), "Stroom 1");
        assert_eq!(doc.summary(None), "Stream 1");
        // The entry has no description, so the native one is used.
        assert_eq!(doc.description(Some("nl_NL")), Some("Native description"));
        assert_eq!(
            doc.profile_description("server", Some("nl_NL")),
            Some("Serverprofiel")
        );
        assert_eq!(doc.summary(Some("de_DE")), "Stream 1");
        assert_eq!(doc.translation_revision(), Some(7));
    }

    #[test]
    fn equality_ignores_attached_overlay() {
        let plain = stream();
        let mut translated = stream();
        translated.attach_translation(Arc::new(
            TranslationOverlay::new("testmodule", "stream1", 2)
                .with_entry(TranslationEntry::new("nl_NL").with_summary("Stroom 1")),
        ));

        assert_eq!(translated, plain);
        assert_ne!(translated, stream().with_summary("Other"));
    }

    #[test]
    fn parses_nsvc_strings() {
        let nsvc = Nsvc::parse(" testmodule:stream1:3:context2 ").expect("valid nsvc");
        assert_eq!(nsvc.module_name, "testmodule");
        assert_eq!(nsvc.key, NsvcKey::new("stream1", 3, "context2"));
        assert_eq!(nsvc.to_string(), "testmodule:stream1:3:context2");
    }

    #[test]
    fn rejects_malformed_nsvc_strings() {
        for value in ["", "testmodule:stream1:3", "a:b:c:d", "a::1:ctx", "a:b:1:c:d"] {
            let err = Nsvc::parse(value).expect_err("malformed nsvc must be rejected");
            assert!(matches!(err, NsvcParseError::Malformed(_)), "value: {value}");
        }

        let err = Nsvc::parse("a:b:99999999999999999999999:c").expect_err("overflow");
        assert!(matches!(err, NsvcParseError::VersionOutOfRange(_)));
    }
}
