//! Core data types for cycle results.

use action_gate::VerificationOutcome;
use action_primitives::RawResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steadyhand_core_types::{ActionId, ActionRequest, ResolutionSource, ResolvedElement, SnapshotId};
use steadyhand_scheduler::DroppedAction;

use crate::{errors::FailureClass, stuck::StuckStateEvent};

/// Final status of one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    /// Executed and, if mutating, verified.
    Succeeded,
    Failed,
    /// Not attempted because the cycle was cancelled.
    Skipped,
}

/// Per-action entry of a [`CycleResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_id: ActionId,
    /// Human-readable rendering of the request.
    pub action: String,
    pub status: ActionStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub element_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_source: Option<ResolutionSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Resolution needed a fresh snapshot.
    #[serde(default)]
    pub reanalysed: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<RawResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationOutcome>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Advice from visual analysis when this action tipped the detector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stuck_advisory: Option<String>,
}

impl ActionRecord {
    pub fn new(action: &ActionRequest) -> Self {
        Self {
            action_id: action.id.clone(),
            action: action.to_string(),
            status: ActionStatus::Skipped,
            element_index: None,
            resolution_source: None,
            confidence: None,
            reanalysed: false,
            raw: None,
            verification: None,
            failure: None,
            error: None,
            stuck_advisory: None,
        }
    }

    pub fn resolved(&mut self, element: &ResolvedElement) {
        self.element_index = Some(element.index);
        self.resolution_source = Some(element.source);
        self.confidence = Some(element.confidence);
    }

    pub fn succeed(&mut self) {
        self.status = ActionStatus::Succeeded;
        self.failure = None;
        self.error = None;
    }

    pub fn fail(&mut self, class: FailureClass, error: impl Into<String>) {
        self.status = ActionStatus::Failed;
        self.failure = Some(class);
        self.error = Some(error.into());
    }

    /// Abandoned mid-flight; not a failure of the page or the plan.
    pub fn skip(&mut self, reason: impl Into<String>) {
        self.status = ActionStatus::Skipped;
        self.failure = None;
        self.error = Some(reason.into());
    }

    pub fn is_success(&self) -> bool {
        self.status == ActionStatus::Succeeded
    }

    /// Short form kept in cycle memory.
    pub fn summary(&self) -> String {
        match (&self.status, &self.failure) {
            (ActionStatus::Succeeded, _) => match &self.resolution_source {
                Some(source) => format!("succeeded via {}", source),
                None => "succeeded".to_string(),
            },
            (ActionStatus::Failed, Some(class)) => format!(
                "{}: {}",
                class.name(),
                self.error.as_deref().unwrap_or("unknown")
            ),
            (ActionStatus::Failed, None) => "failed".to_string(),
            (ActionStatus::Skipped, _) => match &self.error {
                Some(reason) => format!("skipped: {}", reason),
                None => "skipped".to_string(),
            },
        }
    }
}

/// Everything the planning loop needs from one cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CycleResult {
    pub cycle: u64,
    /// Snapshot the batch was planned against.
    pub snapshot_id: SnapshotId,
    pub records: Vec<ActionRecord>,
    /// Actions removed by the single-mutation policy.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<DroppedAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stuck: Option<StuckStateEvent>,
    /// Text for the planner's next context (stuck advice, memory digest).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<String>,
    /// The document changed; plan the next step on a new snapshot.
    pub fresh_snapshot_required: bool,
    /// Escalation was due but the visual service failed; no advice fabricated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escalation_error: Option<String>,
    #[serde(default)]
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

impl CycleResult {
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.records.iter().all(ActionRecord::is_success)
    }

    /// Records whose failure must be surfaced to the planner.
    pub fn surfaced_failures(&self) -> impl Iterator<Item = &ActionRecord> {
        self.records
            .iter()
            .filter(|r| r.failure.map_or(false, |f| f.is_surfaced()))
    }
}
