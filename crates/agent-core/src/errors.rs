use serde::{Deserialize, Serialize};
use thiserror::Error;

use perceiver_visual::VisualError;

/// Why an action in a cycle did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureClass {
    /// No strategy found the element, even on a fresh snapshot.
    ResolutionFailure,
    /// Element found but the primitive could not run, after local retries.
    ExecutionFailure,
    /// Action ran but its effect was never observed.
    VerificationFailure,
    /// Dropped by the single-mutation policy; informational.
    BatchPolicyViolation,
}

impl FailureClass {
    /// Only unconfirmed effects are escalated to the planning loop; the
    /// other classes are recovered (or reported) locally.
    pub fn is_surfaced(&self) -> bool {
        matches!(self, FailureClass::VerificationFailure)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FailureClass::ResolutionFailure => "resolution_failure",
            FailureClass::ExecutionFailure => "execution_failure",
            FailureClass::VerificationFailure => "verification_failure",
            FailureClass::BatchPolicyViolation => "batch_policy_violation",
        }
    }
}

/// Errors emitted while escalating a stuck state to visual analysis.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StuckError {
    #[error("screenshot capture failed: {0}")]
    Capture(VisualError),

    #[error("vision analysis failed: {0}")]
    Analysis(VisualError),

    #[error("vision service returned empty advice")]
    EmptyAdvice,
}

impl StuckError {
    pub fn is_retryable(&self) -> bool {
        match self {
            StuckError::Capture(err) | StuckError::Analysis(err) => err.is_retryable(),
            StuckError::EmptyAdvice => true,
        }
    }
}

/// Errors that abort a whole cycle.
#[derive(Debug, Error)]
pub enum CycleError {
    /// Raised when the runner is built from an out-of-range configuration.
    #[error("invalid cycle configuration: {0}")]
    InvalidConfig(String),

    /// Raised when the enclosing task was cancelled before the cycle began.
    #[error("cycle cancelled before start")]
    Cancelled,
}

impl CycleError {
    pub fn invalid_config(message: impl std::fmt::Display) -> Self {
        Self::InvalidConfig(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_verification_failures_surface() {
        assert!(FailureClass::VerificationFailure.is_surfaced());
        assert!(!FailureClass::ResolutionFailure.is_surfaced());
        assert!(!FailureClass::ExecutionFailure.is_surfaced());
        assert!(!FailureClass::BatchPolicyViolation.is_surfaced());
    }
}
