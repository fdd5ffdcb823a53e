//! Core types for verification

use std::time::Duration;

use serde::{Deserialize, Serialize};
use steadyhand_core_types::TargetKey;

use crate::{errors::GateError, evidence::CheckEvidence};

/// Verification retry budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Upper bound on observations; re-executions are capped at one less
    pub max_attempts: u32,
    /// Attempt `n` waits `n * base_delay_ms` before reading
    pub base_delay_ms: u64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
        }
    }
}

impl VerificationConfig {
    pub fn validate(&self) -> Result<(), GateError> {
        if self.max_attempts == 0 {
            return Err(GateError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.base_delay_ms.saturating_mul(attempt as u64))
    }
}

/// Verification state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "attempt", rename_all = "snake_case")]
pub enum VerifyState {
    Pending,
    /// Settling then reading for attempt `n`
    Checking(u32),
    /// Attempt `n` mismatched; re-applying before `n + 1`
    Retrying(u32),
    Passed(u32),
    Failed(u32),
}

impl VerifyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, VerifyState::Passed(_) | VerifyState::Failed(_))
    }
}

/// Result of verifying one mutating action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub passed: bool,
    /// Attempt that produced the verdict (0 when cancelled before any check)
    pub attempt: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
    pub message: String,
    /// Logical target the outcome belongs to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetKey>,
    /// Re-executions spent
    #[serde(default)]
    pub reapplied: u32,
    #[serde(default)]
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub checks: Vec<CheckEvidence>,
}

impl VerificationOutcome {
    pub fn pass(attempt: u32, message: impl Into<String>) -> Self {
        Self {
            passed: true,
            attempt,
            observed_value: None,
            expected_value: None,
            message: message.into(),
            target: None,
            reapplied: 0,
            cancelled: false,
            checks: Vec::new(),
        }
    }

    pub fn fail(attempt: u32, message: impl Into<String>) -> Self {
        Self {
            passed: false,
            ..Self::pass(attempt, message)
        }
    }

    pub fn with_values(mut self, expected: Option<String>, observed: Option<String>) -> Self {
        self.expected_value = expected;
        self.observed_value = observed;
        self
    }

    pub fn with_target(mut self, target: Option<TargetKey>) -> Self {
        self.target = target;
        self
    }

    pub fn with_checks(mut self, checks: Vec<CheckEvidence>, reapplied: u32) -> Self {
        self.checks = checks;
        self.reapplied = reapplied;
        self
    }

    pub fn cancelled(mut self) -> Self {
        self.cancelled = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_linearly() {
        let config = VerificationConfig::default();
        assert_eq!(config.delay_for(1), Duration::from_millis(250));
        assert_eq!(config.delay_for(3), Duration::from_millis(750));
    }

    #[test]
    fn zero_attempts_rejected() {
        let config = VerificationConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn state_serializes_with_attempt() {
        let json = serde_json::to_value(VerifyState::Checking(2)).unwrap();
        assert_eq!(json, serde_json::json!({"state": "checking", "attempt": 2}));
        assert!(VerifyState::Failed(3).is_terminal());
        assert!(!VerifyState::Retrying(1).is_terminal());
    }
}
