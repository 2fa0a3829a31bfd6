//! Composite-key stream index.
//!
//! # Responsibility
//! - Own every stream document of a module under its NSVC key.
//! - Serve exact, by-name and full-scan lookups in deterministic order.
//!
//! # Invariants
//! - Keys are unique; a colliding insert is rejected, never overwritten.
//! - `entries` is append-only, so a position doubles as insertion sequence.
//! - By-name results are ordered `version DESC`, ties in insertion order.

use crate::model::stream::{NsvcKey, StreamDocument};
use crate::module::error::{ModuleError, ModuleResult};
use std::collections::BTreeMap;

/// Insertion-ordered stream storage with key and name lookups.
#[derive(Debug, Default)]
pub struct StreamIndex {
    entries: Vec<StreamDocument>,
    by_key: BTreeMap<NsvcKey, usize>,
    by_name: BTreeMap<String, Vec<usize>>,
}

impl StreamIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes one document under its NSVC key.
    ///
    /// # Errors
    /// - `ModuleError::DuplicateKey` when the key is already present.
    pub fn insert(&mut self, doc: StreamDocument) -> ModuleResult<()> {
        let key = doc.key();
        if self.by_key.contains_key(&key) {
            return Err(ModuleError::DuplicateKey(key));
        }

        let position = self.entries.len();
        self.by_name
            .entry(key.stream_name.clone())
            .or_default()
            .push(position);
        self.by_key.insert(key, position);
        self.entries.push(doc);
        Ok(())
    }

    pub fn contains_key(&self, key: &NsvcKey) -> bool {
        self.by_key.contains_key(key)
    }

    pub fn lookup_exact(
        &self,
        stream_name: &str,
        version: u64,
        context: &str,
    ) -> Option<&StreamDocument> {
        let position = self
            .by_key
            .get(&NsvcKey::new(stream_name, version, context))?;
        self.entries.get(*position)
    }

    /// Returns a fresh snapshot of all documents named `stream_name`.
    ///
    /// Newest `version` first; equal versions keep insertion order. The
    /// result is empty, not absent, for unknown names.
    pub fn lookup_by_name(&self, stream_name: &str) -> Vec<&StreamDocument> {
        let Some(positions) = self.by_name.get(stream_name) else {
            return vec![];
        };

        let mut matches: Vec<&StreamDocument> = positions
            .iter()
            .filter_map(|position| self.entries.get(*position))
            .collect();
        // `sort_by` is stable, and `positions` is already in insertion order.
        matches.sort_by(|left, right| right.version().cmp(&left.version()));
        matches
    }

    /// Iterates every document in insertion order.
    pub fn iter_all(&self) -> impl Iterator<Item = &StreamDocument> {
        self.entries.iter()
    }

    pub fn as_slice(&self) -> &[StreamDocument] {
        &self.entries
    }

    /// Returns sorted, de-duplicated stream names.
    pub fn stream_names(&self) -> Vec<&str> {
        self.by_name.keys().map(String::as_str).collect()
    }

    /// Runs `apply` on every document named `stream_name`, in insertion order.
    pub fn for_each_named_mut(
        &mut self,
        stream_name: &str,
        mut apply: impl FnMut(&mut StreamDocument),
    ) {
        let Some(positions) = self.by_name.get(stream_name) else {
            return;
        };
        for position in positions {
            if let Some(doc) = self.entries.get_mut(*position) {
                apply(doc);
            }
        }
    }
}
