//! Module metadata document model.
//!
//! # Responsibility
//! - Define the schema-versioned documents a module aggregates: streams,
//!   defaults and translation overlays.
//! - Keep document variants a closed set so version checks are exhaustive.
//!
//! # Invariants
//! - Documents arrive fully formed from an external codec; this layer only
//!   exposes identity and locale-aware lookups.

pub mod defaults;
pub mod stream;
pub mod translation;
pub mod version;
