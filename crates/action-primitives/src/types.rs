//! Core data types for action primitives

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use steadyhand_core_types::{ActionId, ResolutionSource};
use tokio_util::sync::CancellationToken;

/// Execution context for action primitives
///
/// Carries the action id used for log correlation, the deadline for the
/// whole resolve/execute/verify pass and the cancellation token of the
/// enclosing task.
#[derive(Clone, Debug)]
pub struct ExecCtx {
    /// Unique identifier for this action
    pub action_id: ActionId,

    /// Deadline for this operation
    pub deadline: Instant,

    /// Cancellation token for cooperative cancellation
    pub cancel_token: CancellationToken,
}

impl ExecCtx {
    pub fn new(action_id: ActionId, timeout: Duration, cancel_token: CancellationToken) -> Self {
        Self {
            action_id,
            deadline: Instant::now() + timeout,
            cancel_token,
        }
    }

    /// Context with a fresh id and its own token, mostly for tests and tools
    pub fn detached(timeout: Duration) -> Self {
        Self::new(ActionId::new(), timeout, CancellationToken::new())
    }

    /// Child context for another action sharing the parent's cancellation
    pub fn for_action(&self, action_id: ActionId) -> Self {
        Self {
            action_id,
            deadline: self.deadline,
            cancel_token: self.cancel_token.clone(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn is_timeout(&self) -> bool {
        Instant::now() >= self.deadline
    }

    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(Instant::now())
    }
}

/// Whether an attached element can receive input right now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interactability {
    Ready,
    Hidden,
    Disabled,
}

/// A visible overlay node that typically indicates autocomplete or a dropdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayMarker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub aria_expanded: bool,
    #[serde(default)]
    pub text: String,
}

impl OverlayMarker {
    /// listbox/option roles or an expanded control
    pub fn is_suggestion_marker(&self) -> bool {
        self.aria_expanded || matches!(self.role.as_deref(), Some("listbox") | Some("option"))
    }
}

/// Overlay census taken right before or after an action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayProbe {
    pub markers: Vec<OverlayMarker>,
}

impl OverlayProbe {
    pub fn count(&self) -> usize {
        self.markers.len()
    }
}

/// Post-action signals captured around click and type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSignals {
    pub overlays_before: usize,
    pub overlays_after: usize,
    /// Suggestion list appeared after input; the next step should pick from it
    pub autocomplete_detected: bool,
    /// Overlay population changed; indices from the current snapshot are suspect
    pub dom_changed: bool,
}

/// Raw outcome of one primitive; says nothing about whether the effect stuck
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawResult {
    pub action_id: ActionId,

    /// Primitive name (`click`, `type_text`, ...)
    pub primitive: String,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub started_at: DateTime<Utc>,

    pub latency_ms: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_index: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ResolutionSource>,

    pub signals: PostSignals,

    /// Number of local recovery retries spent before the primitive went through
    #[serde(default)]
    pub retries: u32,

    /// Field value read right before appending input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_value: Option<String>,
}

impl RawResult {
    pub fn new(action_id: ActionId, primitive: &str, started_at: DateTime<Utc>) -> Self {
        Self {
            action_id,
            primitive: primitive.to_string(),
            started_at,
            latency_ms: 0,
            element_index: None,
            source: None,
            signals: PostSignals::default(),
            retries: 0,
            prior_value: None,
        }
    }

    pub fn with_signals(mut self, signals: PostSignals) -> Self {
        self.signals = signals;
        self
    }

    pub fn with_element(mut self, index: u32, source: ResolutionSource) -> Self {
        self.element_index = Some(index);
        self.source = Some(source);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_prior_value(mut self, prior: Option<String>) -> Self {
        self.prior_value = prior;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_context_shares_cancellation() {
        let parent = ExecCtx::detached(Duration::from_secs(5));
        let child = parent.for_action(ActionId::new());
        assert!(!child.is_cancelled());
        parent.cancel_token.cancel();
        assert!(child.is_cancelled());
    }

    #[test]
    fn suggestion_markers() {
        let listbox = OverlayMarker {
            role: Some("listbox".into()),
            ..Default::default()
        };
        let banner = OverlayMarker {
            role: Some("banner".into()),
            ..Default::default()
        };
        assert!(listbox.is_suggestion_marker());
        assert!(!banner.is_suggestion_marker());
    }
}
