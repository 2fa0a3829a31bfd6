//! Module aggregate and its error contract.
//!
//! # Responsibility
//! - Expose the single public container for one named module.
//! - Orchestrate validation, indexing and translation propagation.
//!
//! # Invariants
//! - A module name is never empty; violating this is a fatal contract
//!   error (panic), not a recoverable one.
//! - Every recoverable error leaves the module unchanged.

mod aggregate;
pub mod error;

pub use aggregate::Module;
