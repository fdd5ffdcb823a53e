//! Verification engine

use std::time::Instant;

use action_primitives::{ActionExecutor, ExecCtx};
use async_trait::async_trait;
use steadyhand_core_types::{ActionRequest, ResolvedElement};
use tracing::{debug, info, warn};

use crate::{
    conditions::value_matches,
    errors::GateError,
    evidence::CheckEvidence,
    types::{VerificationConfig, VerificationOutcome, VerifyState},
};

/// Verifier trait
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Confirm the action's effect, re-applying it on mismatch.
    ///
    /// `prior` is the field value captured before appending input.
    async fn verify_with_retry(
        &self,
        ctx: &ExecCtx,
        executor: &dyn ActionExecutor,
        action: &ActionRequest,
        element: &ResolvedElement,
        prior: Option<&str>,
    ) -> Result<VerificationOutcome, GateError>;
}

/// Default verifier driven by [`VerificationConfig`]
#[derive(Debug, Clone, Default)]
pub struct DefaultVerifier {
    config: VerificationConfig,
}

impl DefaultVerifier {
    pub fn new(config: VerificationConfig) -> Result<Self, GateError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }
}

#[async_trait]
impl Verifier for DefaultVerifier {
    async fn verify_with_retry(
        &self,
        ctx: &ExecCtx,
        executor: &dyn ActionExecutor,
        action: &ActionRequest,
        element: &ResolvedElement,
        prior: Option<&str>,
    ) -> Result<VerificationOutcome, GateError> {
        verify_with_retry(ctx, executor, action, element, prior, &self.config).await
    }
}

/// Run the verification state machine for one executed action.
///
/// Performs at most `max_attempts` observations and at most
/// `max_attempts - 1` re-executions. An action without an expected value
/// passes at attempt 1 without touching the page. Every check, including
/// the first, waits its settle delay; a check never writes to the page.
///
/// Appending input is expected to yield `prior` followed by the typed
/// text, and re-executions retype on top of `prior`.
pub async fn verify_with_retry(
    ctx: &ExecCtx,
    executor: &dyn ActionExecutor,
    action: &ActionRequest,
    element: &ResolvedElement,
    prior: Option<&str>,
    config: &VerificationConfig,
) -> Result<VerificationOutcome, GateError> {
    config.validate()?;
    if !action.is_form_mutating() {
        return Err(GateError::Unverifiable(format!(
            "{} has no post-condition",
            action.kind.name()
        )));
    }

    let target = action.target.as_ref().map(|t| t.key());
    let Some(expected) = action.expected_value_after(prior) else {
        debug!(action_id = %ctx.action_id, "No expected value; nothing to verify");
        return Ok(
            VerificationOutcome::pass(1, "no expected value; action accepted as executed")
                .with_target(target),
        );
    };

    let start = Instant::now();
    let mut state = VerifyState::Pending;
    let mut checks: Vec<CheckEvidence> = Vec::new();
    let mut reapplied = 0u32;
    let mut last_observed: Option<String> = None;

    loop {
        state = match state {
            VerifyState::Pending => VerifyState::Checking(1),

            VerifyState::Checking(attempt) => {
                let delay = config.delay_for(attempt);
                let cancelled = tokio::select! {
                    _ = ctx.cancel_token.cancelled() => true,
                    _ = tokio::time::sleep(delay) => false,
                };
                if cancelled {
                    return Ok(cancelled_outcome(attempt - 1, &expected, last_observed, checks, reapplied)
                        .with_target(target));
                }

                let evidence = CheckEvidence::new(attempt, delay.as_millis() as u64);
                let evidence = match executor.observe(ctx, element).await {
                    Ok(observed) => {
                        let matched = value_matches(&expected, observed.as_deref());
                        last_observed = observed.clone();
                        evidence.observed(observed, matched)
                    }
                    Err(err) => {
                        warn!(action_id = %ctx.action_id, attempt, error = %err, "Observation failed");
                        evidence.with_error(err.to_string())
                    }
                };
                let matched = evidence.matched;
                debug!(
                    action_id = %ctx.action_id,
                    attempt,
                    matched,
                    observed = ?evidence.observed,
                    "Verification check"
                );
                checks.push(evidence);

                if matched {
                    VerifyState::Passed(attempt)
                } else if attempt < config.max_attempts {
                    VerifyState::Retrying(attempt)
                } else {
                    VerifyState::Failed(attempt)
                }
            }

            VerifyState::Retrying(attempt) => {
                if ctx.is_cancelled() {
                    return Ok(cancelled_outcome(attempt, &expected, last_observed, checks, reapplied)
                        .with_target(target));
                }
                reapplied += 1;
                if let Err(err) = executor.reapply(ctx, action, element, prior).await {
                    warn!(action_id = %ctx.action_id, attempt, error = %err, "Re-apply failed");
                    if let Some(last) = checks.last_mut() {
                        last.error = Some(format!("re-apply failed: {}", err));
                    }
                }
                VerifyState::Checking(attempt + 1)
            }

            VerifyState::Passed(attempt) => {
                info!(
                    action_id = %ctx.action_id,
                    attempt,
                    reapplied,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Verification passed"
                );
                return Ok(VerificationOutcome::pass(
                    attempt,
                    format!("observed value matches '{}' at attempt {}", expected, attempt),
                )
                .with_values(Some(expected), last_observed)
                .with_target(target)
                .with_checks(checks, reapplied));
            }

            VerifyState::Failed(attempt) => {
                let message = format!(
                    "expected '{}' but observed {} after {} checks and {} re-executions",
                    expected,
                    last_observed
                        .as_deref()
                        .map(|o| format!("'{}'", o))
                        .unwrap_or_else(|| "nothing".to_string()),
                    attempt,
                    reapplied
                );
                warn!(action_id = %ctx.action_id, attempt, "Verification failed: {}", message);
                return Ok(VerificationOutcome::fail(attempt, message)
                    .with_values(Some(expected), last_observed)
                    .with_target(target)
                    .with_checks(checks, reapplied));
            }
        };
    }
}

fn cancelled_outcome(
    attempt: u32,
    expected: &str,
    observed: Option<String>,
    checks: Vec<CheckEvidence>,
    reapplied: u32,
) -> VerificationOutcome {
    warn!(attempt, "Verification cancelled");
    VerificationOutcome::fail(
        attempt,
        format!(
            "verification cancelled after {} checks; partially applied input was left as-is",
            attempt
        ),
    )
    .with_values(Some(expected.to_string()), observed)
    .with_checks(checks, reapplied)
    .cancelled()
}
