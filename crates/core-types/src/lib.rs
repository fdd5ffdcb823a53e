//! Shared primitives for the steadyhand action reliability layer.
//!
//! Everything here is plain data: snapshots handed out by the snapshot
//! provider, the descriptors a planner uses to point at elements, and the
//! action requests that flow through scheduling, resolution, execution and
//! verification.

pub mod action;
pub mod descriptor;
pub mod ids;
pub mod resolution;
pub mod snapshot;

pub use action::*;
pub use descriptor::*;
pub use ids::*;
pub use resolution::*;
pub use snapshot::*;

use thiserror::Error;

/// Shared error type for malformed core values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("duplicate element index {0} in snapshot")]
    DuplicateIndex(u32),
}

/// Lower-cases, trims and collapses inner whitespace so that semantic
/// comparisons ignore formatting noise coming from the page.
pub fn normalize_text(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
