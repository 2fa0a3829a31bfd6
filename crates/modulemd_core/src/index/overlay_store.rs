//! Translation overlay store.
//!
//! # Responsibility
//! - Keep the authoritative translation overlay per stream name.
//! - Propagate overlays onto indexed streams, and seed new streams, so
//!   locale lookups do not depend on insertion order.
//!
//! # Invariants
//! - At most one overlay is stored per stream name: the highest `revision`
//!   seen so far. Equal revisions replace (last write wins).
//! - A stored overlay is replaced as a whole document; locales are never
//!   merged across revisions.
//! - A stream never has an overlay attached whose revision is lower than
//!   the one it already carries.

use crate::index::stream_index::StreamIndex;
use crate::model::stream::StreamDocument;
use crate::model::translation::TranslationOverlay;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Result of registering one overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// Overlay became authoritative and was applied to `streams_updated` streams.
    Stored { streams_updated: usize },
    /// A newer overlay is already stored; the new one was ignored.
    Superseded { current_revision: u64 },
}

/// Authoritative overlays keyed by stream name.
#[derive(Debug, Default)]
pub struct OverlayStore {
    overlays: BTreeMap<String, Arc<TranslationOverlay>>,
}

impl OverlayStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `overlay` unless a higher revision is already held, then
    /// applies it to every matching stream in `index`.
    pub fn register(
        &mut self,
        overlay: TranslationOverlay,
        index: &mut StreamIndex,
    ) -> RegisterOutcome {
        if let Some(current) = self.overlays.get(overlay.stream_name.as_str()) {
            if overlay.revision < current.revision {
                return RegisterOutcome::Superseded {
                    current_revision: current.revision,
                };
            }
        }

        let overlay = Arc::new(overlay);
        self.overlays
            .insert(overlay.stream_name.clone(), Arc::clone(&overlay));
        let streams_updated = Self::apply(&overlay, index);
        RegisterOutcome::Stored { streams_updated }
    }

    /// Attaches `overlay` to every indexed stream sharing its stream name.
    ///
    /// Streams already carrying a newer revision are left alone. Returns the
    /// number of streams updated.
    pub fn apply(overlay: &Arc<TranslationOverlay>, index: &mut StreamIndex) -> usize {
        let mut updated = 0;
        index.for_each_named_mut(overlay.stream_name.as_str(), |doc| {
            if attach_if_newer(doc, overlay) {
                updated += 1;
            }
        });
        updated
    }

    /// Seeds a not-yet-indexed stream with the stored overlay for its name.
    ///
    /// Returns `true` when an overlay was attached.
    pub fn attach_to_new(&self, doc: &mut StreamDocument) -> bool {
        match self.overlays.get(doc.stream_name()) {
            Some(overlay) => attach_if_newer(doc, overlay),
            None => false,
        }
    }

    pub fn get(&self, stream_name: &str) -> Option<&TranslationOverlay> {
        self.overlays.get(stream_name).map(|overlay| overlay.as_ref())
    }

    /// Returns sorted stream names that have an overlay.
    pub fn stream_names(&self) -> Vec<&str> {
        self.overlays.keys().map(String::as_str).collect()
    }
}

fn attach_if_newer(doc: &mut StreamDocument, overlay: &Arc<TranslationOverlay>) -> bool {
    if let Some(attached) = doc.translation_revision() {
        if overlay.revision < attached {
            return false;
        }
    }
    doc.attach_translation(Arc::clone(overlay));
    true
}
