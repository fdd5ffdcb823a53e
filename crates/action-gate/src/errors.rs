//! Error types for verification

use thiserror::Error;

/// Gate error enumeration
///
/// A mismatch after the last attempt is not an error; it is a failed
/// [`VerificationOutcome`](crate::VerificationOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Configuration out of range
    #[error("Invalid verification config: {0}")]
    InvalidConfig(String),

    /// Action kind has nothing to read back
    #[error("Action cannot be verified: {0}")]
    Unverifiable(String),
}

