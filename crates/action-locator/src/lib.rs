//! L3 Locator - Element resolution against an indexed snapshot
//!
//! This crate turns a planner's target description into a live element:
//! - index lookup, trusted only when capability and hints agree
//! - semantic hint fallback in fixed priority (label, placeholder, text, selector)
//! - candidate ranking with deterministic tie-breaking
//! - `NeedsReanalysis` as a value when nothing matches
//! - the `SnapshotProvider` port used to fetch a fresh snapshot

pub mod errors;
pub mod provider;
pub mod resolver;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use provider::*;
pub use resolver::*;
pub use strategies::*;
pub use types::*;
