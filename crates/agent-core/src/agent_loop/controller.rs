//! Cycle runner - one planning cycle from proposed batch to verified result.
//!
//! ```text
//! filter batch (one form-mutating action per snapshot)
//! for each retained action:
//!     resolve            -> NeedsReanalysis: fresh snapshot, resolve once more
//!     execute            -> not interactable: reveal, wait, retry (capped)
//!                        -> detached: fresh snapshot, re-resolve once
//!     verify (mutating)  -> bounded re-execution
//!     stuck check        -> screenshot + vision advice after repeated failures
//! planner intent check on the refreshed snapshot
//! ```

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use action_gate::{DefaultVerifier, VerificationOutcome, Verifier};
use action_locator::{
    DefaultElementResolver, ElementResolver, LocatorError, Resolution, SnapshotProvider,
};
use action_primitives::{ActionError, ActionExecutor, ExecCtx, RawResult};
use chrono::Utc;
use parking_lot::Mutex;
use perceiver_visual::{ScreenshotSource, VisionAnalyzer};
use steadyhand_core_types::{
    ActionKind, ActionRequest, DocumentSnapshot, ResolvedElement, TargetDescriptor,
};
use steadyhand_scheduler::{BatchFilter, SingleActionScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::config::CycleConfig;
use super::memory::CycleMemory;
use super::types::{ActionRecord, CycleResult};
use crate::errors::{CycleError, FailureClass};
use crate::stuck::{PlannedIntent, StuckStateDetector, StuckStateEvent};

/// External collaborators of the runner.
#[derive(Clone)]
pub struct CyclePorts {
    pub executor: Arc<dyn ActionExecutor>,
    pub snapshots: Arc<dyn SnapshotProvider>,
    pub screenshots: Arc<dyn ScreenshotSource>,
    pub vision: Arc<dyn VisionAnalyzer>,
}

/// Mutable state of one cycle.
struct CycleState {
    snapshot: DocumentSnapshot,
    /// Snapshot was fetched after the last document mutation.
    snapshot_fresh: bool,
    document_changed: bool,
    autocomplete_fired: bool,
    stuck: Option<StuckStateEvent>,
    escalation_error: Option<String>,
    advisories: Vec<String>,
}

pub struct CycleRunner {
    config: CycleConfig,
    scheduler: SingleActionScheduler,
    resolver: Arc<dyn ElementResolver>,
    verifier: DefaultVerifier,
    executor: Arc<dyn ActionExecutor>,
    snapshots: Arc<dyn SnapshotProvider>,
    detector: StuckStateDetector,
    memory: Mutex<CycleMemory>,
    outcomes: Mutex<VecDeque<VerificationOutcome>>,
    cycles: AtomicU64,
}

impl CycleRunner {
    pub fn new(config: CycleConfig, ports: CyclePorts) -> Result<Self, CycleError> {
        config.validate()?;
        let resolver: Arc<dyn ElementResolver> =
            Arc::new(DefaultElementResolver::new(config.resolver.clone()));
        let verifier = DefaultVerifier::new(config.verification.clone())
            .map_err(CycleError::invalid_config)?;
        let detector = StuckStateDetector::new(
            config.stuck.clone(),
            resolver.clone(),
            ports.screenshots,
            ports.vision,
        );

        Ok(Self {
            scheduler: SingleActionScheduler::new(config.scheduler.clone()),
            resolver,
            verifier,
            executor: ports.executor,
            snapshots: ports.snapshots,
            detector,
            memory: Mutex::new(CycleMemory::new()),
            outcomes: Mutex::new(VecDeque::new()),
            cycles: AtomicU64::new(0),
            config,
        })
    }

    pub fn config(&self) -> &CycleConfig {
        &self.config
    }

    /// Planner-facing digest of recent actions and autocomplete events.
    pub fn memory_digest(&self) -> String {
        self.memory.lock().context_digest()
    }

    pub fn should_break_sequence(&self) -> bool {
        self.memory.lock().should_break_sequence()
    }

    /// Verification outcomes kept for stuck detection, oldest first.
    pub fn recent_outcomes(&self) -> Vec<VerificationOutcome> {
        self.outcomes.lock().iter().cloned().collect()
    }

    /// Run one planning cycle against the snapshot the batch was planned on.
    pub async fn run_cycle(
        &self,
        actions: Vec<ActionRequest>,
        snapshot: DocumentSnapshot,
    ) -> Result<CycleResult, CycleError> {
        self.run_cycle_with(actions, snapshot, None, CancellationToken::new())
            .await
    }

    /// [`run_cycle`](Self::run_cycle) with the planner's next intent and the
    /// enclosing task's cancellation token.
    pub async fn run_cycle_with(
        &self,
        actions: Vec<ActionRequest>,
        snapshot: DocumentSnapshot,
        intent: Option<&PlannedIntent>,
        cancel: CancellationToken,
    ) -> Result<CycleResult, CycleError> {
        if cancel.is_cancelled() {
            return Err(CycleError::Cancelled);
        }

        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        let start = Instant::now();
        let snapshot_id = snapshot.id.clone();
        info!(
            cycle,
            proposed = actions.len(),
            snapshot = %snapshot_id,
            "Starting cycle"
        );
        if let Some(intent) = intent {
            self.memory.lock().set_goal(intent.next_goal.clone());
        }

        let decision = self.scheduler.filter_batch(actions);
        for dropped in &decision.dropped {
            info!(
                cycle,
                action_id = %dropped.action_id,
                class = FailureClass::BatchPolicyViolation.name(),
                "{}",
                dropped.reason
            );
        }

        let mut state = CycleState {
            snapshot,
            snapshot_fresh: false,
            document_changed: false,
            autocomplete_fired: false,
            stuck: None,
            escalation_error: None,
            advisories: Vec::new(),
        };
        let mut records = Vec::with_capacity(decision.retained.len());
        let mut cancelled = false;
        let timeout = Duration::from_millis(self.config.execution.action_timeout_ms);

        for action in &decision.retained {
            let mut record = ActionRecord::new(action);
            if cancelled || cancel.is_cancelled() {
                cancelled = true;
                records.push(record);
                continue;
            }

            let ctx = ExecCtx::new(action.id.clone(), timeout, cancel.clone());
            self.process_action(&ctx, action, intent, &mut state, &mut record)
                .await;
            if ctx.is_cancelled() {
                cancelled = true;
            }

            self.memory
                .lock()
                .record_action(cycle, record.action.clone(), record.summary());
            records.push(record);
        }

        if !cancelled && state.stuck.is_none() {
            if let Some(intent) = intent.filter(|i| i.target.is_some()) {
                self.check_planner_intent(intent, &mut state).await;
            }
        }

        if state.autocomplete_fired {
            state.advisories.push(self.memory.lock().context_digest());
        }

        let result = CycleResult {
            cycle,
            snapshot_id,
            records,
            dropped: decision.dropped,
            stuck: state.stuck,
            advisories: state.advisories,
            fresh_snapshot_required: state.document_changed,
            escalation_error: state.escalation_error,
            cancelled,
            started_at,
            elapsed_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            cycle,
            success = result.is_success(),
            executed = result.records.len(),
            dropped = result.dropped.len(),
            stuck = result.stuck.is_some(),
            elapsed_ms = result.elapsed_ms,
            "Cycle finished"
        );
        Ok(result)
    }

    async fn process_action(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
        intent: Option<&PlannedIntent>,
        state: &mut CycleState,
        record: &mut ActionRecord,
    ) {
        if !action.is_form_mutating() {
            match self.executor.perform(ctx, action).await {
                Ok(raw) => {
                    if matches!(action.kind, ActionKind::Navigate { .. }) {
                        state.document_changed = true;
                        state.snapshot_fresh = false;
                    }
                    record.raw = Some(raw);
                    record.succeed();
                }
                Err(err) => record.fail(FailureClass::ExecutionFailure, err.to_string()),
            }
            return;
        }

        let Some(target) = &action.target else {
            record.fail(
                FailureClass::ResolutionFailure,
                "form-mutating action without a target",
            );
            return;
        };

        let Some(element) = self.resolve_with_reanalysis(target, state, record).await else {
            return;
        };
        record.resolved(&element);

        let Some((element, raw)) = self
            .execute_with_recovery(ctx, action, target, element, state, record)
            .await
        else {
            return;
        };
        record.resolved(&element);

        // Whatever the verdict, the snapshot no longer describes the page.
        state.document_changed = true;
        state.snapshot_fresh = false;
        self.note_autocomplete(action, &element, &raw, state);
        let prior = raw.prior_value.clone();
        record.raw = Some(raw);

        let outcome = match self
            .verifier
            .verify_with_retry(
                ctx,
                self.executor.as_ref(),
                action,
                &element,
                prior.as_deref(),
            )
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                record.fail(FailureClass::VerificationFailure, err.to_string());
                return;
            }
        };

        record.verification = Some(outcome.clone());
        if outcome.cancelled {
            record.skip(outcome.message);
            return;
        }
        if outcome.passed {
            record.succeed();
        } else {
            record.fail(FailureClass::VerificationFailure, outcome.message.clone());
        }

        let history = {
            let mut outcomes = self.outcomes.lock();
            outcomes.push_back(outcome);
            while outcomes.len() > self.config.stuck.history_limit.max(1) {
                outcomes.pop_front();
            }
            outcomes.iter().cloned().collect::<Vec<_>>()
        };

        match self
            .detector
            .check_failures(&history, intent, &state.snapshot)
            .await
        {
            Ok(Some(event)) => {
                let advisory = event.advisory();
                record.stuck_advisory = Some(advisory.clone());
                state.advisories.push(advisory);
                state.stuck = Some(event);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    action_id = %ctx.action_id,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Stuck-state escalation failed"
                );
                state.escalation_error = Some(err.to_string());
            }
        }
    }

    /// Resolve; on `NeedsReanalysis` fetch one fresh snapshot and try again.
    async fn resolve_with_reanalysis(
        &self,
        target: &TargetDescriptor,
        state: &mut CycleState,
        record: &mut ActionRecord,
    ) -> Option<ResolvedElement> {
        match self.resolver.resolve(target, &state.snapshot) {
            Ok(Resolution::Resolved(element)) => return Some(element),
            Ok(Resolution::NeedsReanalysis { reason }) => {
                debug!(target = %target, reason = %reason, "Re-analysing on a fresh snapshot");
            }
            Err(err) => {
                record.fail(FailureClass::ResolutionFailure, err.to_string());
                return None;
            }
        }

        record.reanalysed = true;
        if let Err(err) = self.refresh_snapshot(state).await {
            record.fail(FailureClass::ResolutionFailure, err.to_string());
            return None;
        }
        match self.resolver.resolve(target, &state.snapshot) {
            Ok(Resolution::Resolved(element)) => Some(element),
            Ok(Resolution::NeedsReanalysis { reason }) => {
                record.fail(FailureClass::ResolutionFailure, reason);
                None
            }
            Err(err) => {
                record.fail(FailureClass::ResolutionFailure, err.to_string());
                None
            }
        }
    }

    async fn execute_with_recovery(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
        target: &TargetDescriptor,
        mut element: ResolvedElement,
        state: &mut CycleState,
        record: &mut ActionRecord,
    ) -> Option<(ResolvedElement, RawResult)> {
        let budget = &self.config.execution;
        let mut retries = 0u32;
        let mut reresolved = false;

        loop {
            let err = match self.executor.execute(ctx, action, &element).await {
                Ok(raw) => return Some((element, raw.with_retries(retries))),
                Err(err) => err,
            };

            if matches!(err, ActionError::Interrupted(_)) {
                record.fail(FailureClass::ExecutionFailure, err.to_string());
                return None;
            }

            if err.needs_reresolve() && !reresolved {
                reresolved = true;
                record.reanalysed = true;
                warn!(action_id = %ctx.action_id, error = %err, "Element detached; re-resolving");
                if let Err(refresh_err) = self.refresh_snapshot(state).await {
                    record.fail(FailureClass::ResolutionFailure, refresh_err.to_string());
                    return None;
                }
                match self.resolver.resolve(target, &state.snapshot) {
                    Ok(Resolution::Resolved(fresh)) => {
                        element = fresh;
                        continue;
                    }
                    Ok(Resolution::NeedsReanalysis { reason }) => {
                        record.fail(FailureClass::ResolutionFailure, reason);
                        return None;
                    }
                    Err(resolve_err) => {
                        record.fail(FailureClass::ResolutionFailure, resolve_err.to_string());
                        return None;
                    }
                }
            }

            if err.is_retryable() && retries < budget.max_retries {
                retries += 1;
                debug!(
                    action_id = %ctx.action_id,
                    retry = retries,
                    error = %err,
                    "Execution failed; revealing element before retry"
                );
                if let Err(reveal_err) = self.executor.reveal(ctx, &element).await {
                    debug!(error = %reveal_err, "Reveal failed");
                }
                let delay = Duration::from_millis(budget.retry_delay_ms);
                let interrupted = tokio::select! {
                    _ = ctx.cancel_token.cancelled() => true,
                    _ = tokio::time::sleep(delay) => false,
                };
                if interrupted {
                    record.fail(
                        FailureClass::ExecutionFailure,
                        "interrupted while waiting to retry",
                    );
                    return None;
                }
                continue;
            }

            warn!(action_id = %ctx.action_id, retries, error = %err, "Execution failed");
            record.fail(FailureClass::ExecutionFailure, err.to_string());
            return None;
        }
    }

    fn note_autocomplete(
        &self,
        action: &ActionRequest,
        element: &ResolvedElement,
        raw: &RawResult,
        state: &mut CycleState,
    ) {
        let text = match &action.kind {
            ActionKind::TypeText { text, .. } => text.clone(),
            _ if raw.signals.autocomplete_detected => String::new(),
            _ => return,
        };
        let detected = raw.signals.autocomplete_detected;
        if detected {
            info!(index = element.index, "Autocomplete detected; sequence must break");
            state.autocomplete_fired = true;
        }
        self.memory
            .lock()
            .record_autocomplete(element.index, text, detected);
    }

    async fn check_planner_intent(&self, intent: &PlannedIntent, state: &mut CycleState) {
        let Some(target) = &intent.target else {
            return;
        };
        let resolves = matches!(
            self.resolver.resolve(target, &state.snapshot),
            Ok(Resolution::Resolved(_))
        );
        if !resolves && !state.snapshot_fresh {
            if let Err(err) = self.refresh_snapshot(state).await {
                warn!(error = %err, "Could not refresh snapshot for intent check");
                return;
            }
        }

        match self.detector.check_intent(intent, &state.snapshot).await {
            Ok(Some(event)) => {
                state.advisories.push(event.advisory());
                state.stuck = Some(event);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(
                    error = %err,
                    retryable = err.is_retryable(),
                    "Stuck-state escalation failed"
                );
                state.escalation_error = Some(err.to_string());
            }
        }
    }

    /// Discard the current snapshot in favour of a fresh one.
    async fn refresh_snapshot(&self, state: &mut CycleState) -> Result<(), LocatorError> {
        let fresh = self.snapshots.snapshot().await?;
        debug!(old = %state.snapshot.id, new = %fresh.id, "Snapshot replaced");
        state.snapshot = fresh;
        state.snapshot_fresh = true;
        Ok(())
    }
}
