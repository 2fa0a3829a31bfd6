//! In-memory indexes owned by a module aggregate.
//!
//! # Responsibility
//! - Store stream documents under their composite NSVC key.
//! - Hold translation overlays and propagate them onto streams.
//! - Bind the module's single defaults document.
//!
//! # Invariants
//! - Indexes never validate document schemas; the aggregate does that
//!   before handing documents down.

pub mod defaults_binding;
pub mod overlay_store;
pub mod stream_index;
