//! Translation overlay documents.
//!
//! # Responsibility
//! - Carry locale-keyed string overrides for one `(module, stream)` pair.
//!
//! # Invariants
//! - `entries` keys equal the `locale` of the entry they map to.
//! - `revision` orders overlays for the same `(module, stream)`; it is not
//!   related to any stream's build `version` or `context`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-locale string overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Locale tag such as `nl_NL` or `en_GB`.
    pub locale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Profile name -> translated profile description.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profile_descriptions: BTreeMap<String, String>,
}

impl TranslationEntry {
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            summary: None,
            description: None,
            profile_descriptions: BTreeMap::new(),
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_profile_description(
        mut self,
        profile: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        self.profile_descriptions
            .insert(profile.into(), description.into());
        self
    }
}

/// Locale overlay applied to every stream sharing `stream_name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationOverlay {
    #[serde(rename = "module")]
    pub module_name: String,
    #[serde(rename = "stream")]
    pub stream_name: String,
    /// Monotonic document revision for this `(module, stream)` pair.
    #[serde(rename = "modified")]
    pub revision: u64,
    #[serde(default, rename = "translations")]
    pub entries: BTreeMap<String, TranslationEntry>,
}

impl TranslationOverlay {
    pub fn new(module_name: impl Into<String>, stream_name: impl Into<String>, revision: u64) -> Self {
        Self {
            module_name: module_name.into(),
            stream_name: stream_name.into(),
            revision,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the entry for `entry.locale`.
    pub fn set_entry(&mut self, entry: TranslationEntry) {
        self.entries.insert(entry.locale.clone(), entry);
    }

    pub fn with_entry(mut self, entry: TranslationEntry) -> Self {
        self.set_entry(entry);
        self
    }

    pub fn entry(&self, locale: &str) -> Option<&TranslationEntry> {
        self.entries.get(locale)
    }
}
