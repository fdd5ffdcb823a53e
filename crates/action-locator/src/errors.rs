//! Error types for locator system

use thiserror::Error;

/// Locator error enumeration
///
/// A failed match is not an error; it is reported as
/// [`Resolution::NeedsReanalysis`](crate::Resolution).
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LocatorError {
    /// Descriptor carries neither an index nor hints
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    /// Resolver configuration out of range
    #[error("Invalid resolver config: {0}")]
    InvalidConfig(String),

    /// Snapshot could not be produced
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}
