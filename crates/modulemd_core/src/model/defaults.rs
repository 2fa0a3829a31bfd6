//! Defaults document model.
//!
//! # Responsibility
//! - Describe the preferred stream and profile selection for a module.
//!
//! # Invariants
//! - `module_name` identifies the module these defaults belong to; binding
//!   them to another module is rejected by the aggregate.

use crate::model::version::DefaultsSchemaVersion;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Defaults payload, schema version 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsV1 {
    #[serde(rename = "module")]
    pub module_name: String,
    /// Document revision, usually a `YYYYMMDDHHMM` stamp.
    #[serde(default)]
    pub modified: u64,
    #[serde(default, rename = "stream", skip_serializing_if = "Option::is_none")]
    pub default_stream: Option<String>,
    /// Stream name -> default profile names.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub profiles: BTreeMap<String, BTreeSet<String>>,
}

impl DefaultsV1 {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            modified: 0,
            default_stream: None,
            profiles: BTreeMap::new(),
        }
    }

    pub fn add_default_profile(&mut self, stream_name: impl Into<String>, profile: impl Into<String>) {
        self.profiles
            .entry(stream_name.into())
            .or_default()
            .insert(profile.into());
    }
}

/// Defaults document, tagged by schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mdversion", content = "data")]
pub enum DefaultsDocument {
    #[serde(rename = "1")]
    V1(DefaultsV1),
}

impl DefaultsDocument {
    pub fn schema_version(&self) -> DefaultsSchemaVersion {
        match self {
            Self::V1(_) => DefaultsSchemaVersion::V1,
        }
    }

    pub fn module_name(&self) -> &str {
        match self {
            Self::V1(inner) => inner.module_name.as_str(),
        }
    }

    pub fn default_stream(&self) -> Option<&str> {
        match self {
            Self::V1(inner) => inner.default_stream.as_deref(),
        }
    }

    /// Returns default profiles for `stream_name`, sorted; empty when none.
    pub fn default_profiles_for_stream(&self, stream_name: &str) -> Vec<&str> {
        match self {
            Self::V1(inner) => inner
                .profiles
                .get(stream_name)
                .map(|set| set.iter().map(String::as_str).collect())
                .unwrap_or_default(),
        }
    }
}

impl From<DefaultsV1> for DefaultsDocument {
    fn from(value: DefaultsV1) -> Self {
        Self::V1(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{DefaultsDocument, DefaultsV1};
    use crate::model::version::DefaultsSchemaVersion;

    #[test]
    fn exposes_identity_and_selection() {
        let mut inner = DefaultsV1::new("testmodule");
        inner.default_stream = Some("stream1".to_string());
        inner.add_default_profile("stream1", "server");
        inner.add_default_profile("stream1", "client");
        let doc = DefaultsDocument::from(inner);

        assert_eq!(doc.module_name(), "testmodule");
        assert_eq!(doc.schema_version(), DefaultsSchemaVersion::V1);
        assert_eq!(doc.default_stream(), Some("stream1"));
        assert_eq!(
            doc.default_profiles_for_stream("stream1"),
            vec!["client", "server"]
        );
        assert!(doc.default_profiles_for_stream("stream2").is_empty());
    }
}
