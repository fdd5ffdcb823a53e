//! Error types for action primitives

use steadyhand_core_types::ElementHandle;
use thiserror::Error;

/// Failures reported by a [`crate::DocumentDriver`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Node no longer attached to the document
    #[error("element {0} is detached from the document")]
    Detached(ElementHandle),

    /// Option is not part of the element's enumerated list
    #[error("option '{0}' not present")]
    OptionMissing(String),

    /// Driver does not support the operation for this element
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Transport or protocol failure
    #[error("driver I/O error: {0}")]
    Io(String),
}

/// Comprehensive error types for action primitive operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Target element is no longer attached to the document
    #[error("Element detached: {0}")]
    Detached(String),

    /// Element is hidden or disabled
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Dropdown option was not found
    #[error("Option not found: {0}")]
    OptionNotFound(String),

    /// Request shape does not fit the primitive (e.g. click without target)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation was cancelled or interrupted
    #[error("Operation interrupted: {0}")]
    Interrupted(String),

    /// Execution deadline elapsed
    #[error("Deadline exceeded: {0}")]
    Timeout(String),

    /// Driver communication or protocol error
    #[error("Driver error: {0}")]
    Driver(String),
}

impl ActionError {
    /// Check if this error can be recovered by a local scroll/wait retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, ActionError::NotInteractable(_) | ActionError::Driver(_))
    }

    /// Whether the element must be re-resolved from a fresh snapshot
    pub fn needs_reresolve(&self) -> bool {
        matches!(self, ActionError::Detached(_))
    }
}

impl From<DriverError> for ActionError {
    fn from(err: DriverError) -> Self {
        match err {
            DriverError::Detached(handle) => ActionError::Detached(handle.to_string()),
            DriverError::OptionMissing(option) => ActionError::OptionNotFound(option),
            DriverError::Unsupported(detail) => ActionError::NotInteractable(detail),
            DriverError::Io(detail) => ActionError::Driver(detail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_errors_map_to_action_failures() {
        let err: ActionError = DriverError::Detached(ElementHandle::new("n1")).into();
        assert!(err.needs_reresolve());
        let err: ActionError = DriverError::OptionMissing("Blue".into()).into();
        assert_eq!(err, ActionError::OptionNotFound("Blue".into()));
        assert!(!err.is_retryable());
    }
}
