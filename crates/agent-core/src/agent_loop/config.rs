//! Configuration for the cycle runner.

use action_gate::VerificationConfig;
use action_locator::ResolverConfig;
use serde::{Deserialize, Serialize};
use steadyhand_scheduler::SchedulerConfig;

use crate::{errors::CycleError, stuck::StuckConfig};

/// Local recovery budget for execution failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Retries after a not-interactable element (scroll into view, wait).
    /// Default: 2
    pub max_retries: u32,

    /// Wait before each not-interactable retry in milliseconds.
    /// Default: 200
    pub retry_delay_ms: u64,

    /// Deadline for one action's resolve/execute/verify pass in milliseconds.
    /// Default: 30000 (30 seconds)
    pub action_timeout_ms: u64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_delay_ms: 200,
            action_timeout_ms: 30_000,
        }
    }
}

/// Everything one [`CycleRunner`](super::CycleRunner) needs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleConfig {
    pub resolver: ResolverConfig,
    pub verification: VerificationConfig,
    pub scheduler: SchedulerConfig,
    pub execution: ExecutionConfig,
    pub stuck: StuckConfig,
}

impl CycleConfig {
    pub fn validate(&self) -> Result<(), CycleError> {
        self.resolver.validate().map_err(CycleError::invalid_config)?;
        self.verification
            .validate()
            .map_err(CycleError::invalid_config)?;
        if self.execution.action_timeout_ms == 0 {
            return Err(CycleError::invalid_config(
                "execution.action_timeout_ms must be positive",
            ));
        }
        if self.stuck.failure_threshold == 0 {
            return Err(CycleError::invalid_config(
                "stuck.failure_threshold must be at least 1",
            ));
        }
        // Shorter history can never hold a full failure streak.
        if self.stuck.history_limit < self.stuck.failure_threshold as usize {
            return Err(CycleError::invalid_config(format!(
                "stuck.history_limit ({}) must be at least stuck.failure_threshold ({})",
                self.stuck.history_limit, self.stuck.failure_threshold
            )));
        }
        Ok(())
    }
}
