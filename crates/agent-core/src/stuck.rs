//! Stuck-state detection and visual escalation.
//!
//! Fires when the cheaper paths are exhausted: the same logical target has
//! failed verification `failure_threshold` times in a row, or the planner's
//! next intent cannot be resolved on a fresh snapshot. Firing costs one
//! screenshot and one vision call; the advice that comes back is text for
//! the planner, never an action.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use action_gate::VerificationOutcome;
use action_locator::{ElementResolver, Resolution};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use perceiver_visual::{ContextPrompt, ScreenshotSource, VisionAnalyzer};
use serde::{Deserialize, Serialize};
use steadyhand_core_types::{DocumentSnapshot, TargetDescriptor, TargetKey};
use tracing::{debug, info, warn};

use crate::errors::StuckError;

/// Configuration for the stuck-state detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StuckConfig {
    /// Consecutive failed verifications on one target before escalating.
    /// Default: 3
    pub failure_threshold: u32,

    /// Whether unresolvable planner intents escalate.
    /// Default: true
    pub detect_planner_mismatch: bool,

    /// Outcomes kept for streak detection.
    /// Default: 50
    pub history_limit: usize,
}

impl Default for StuckConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            detect_planner_mismatch: true,
            history_limit: 50,
        }
    }
}

/// What the planner says it will do next.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedIntent {
    pub next_goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_action: Option<String>,
    /// Element the next step is going to need.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetDescriptor>,
}

impl PlannedIntent {
    pub fn new(next_goal: impl Into<String>) -> Self {
        Self {
            next_goal: next_goal.into(),
            ..Self::default()
        }
    }

    pub fn with_last_action(mut self, action: impl Into<String>) -> Self {
        self.last_action = Some(action.into());
        self
    }

    pub fn with_target(mut self, target: TargetDescriptor) -> Self {
        self.target = Some(target);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StuckReason {
    /// Trailing verifications for one target all failed.
    RepeatedVerificationFailure,
    /// The planner's next target does not resolve on the current document.
    PlannerMismatch,
}

/// Escalation record handed back to the planning loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StuckStateEvent {
    pub reason: StuckReason,
    pub failed_descriptor: String,
    pub target: TargetKey,
    pub recent_failure_count: u32,
    pub screenshot_ref: String,
    pub advice: String,
    pub created_at: DateTime<Utc>,
}

impl StuckStateEvent {
    /// Advisory line appended to the planner's next context.
    pub fn advisory(&self) -> String {
        format!(
            "Visual analysis after {} on {}: {}",
            match self.reason {
                StuckReason::RepeatedVerificationFailure => "repeated verification failures",
                StuckReason::PlannerMismatch => "an unresolvable planned target",
            },
            self.failed_descriptor,
            self.advice
        )
    }
}

struct Trigger {
    reason: StuckReason,
    target: TargetKey,
    failed_descriptor: String,
    count: u32,
    prompt: ContextPrompt,
}

pub struct StuckStateDetector {
    config: StuckConfig,
    resolver: Arc<dyn ElementResolver>,
    screenshots: Arc<dyn ScreenshotSource>,
    vision: Arc<dyn VisionAnalyzer>,
    /// Targets whose current failure streak already escalated.
    fired: Mutex<HashSet<TargetKey>>,
    mismatch_fired: Mutex<HashSet<TargetKey>>,
}

impl StuckStateDetector {
    pub fn new(
        config: StuckConfig,
        resolver: Arc<dyn ElementResolver>,
        screenshots: Arc<dyn ScreenshotSource>,
        vision: Arc<dyn VisionAnalyzer>,
    ) -> Self {
        Self {
            config,
            resolver,
            screenshots,
            vision,
            fired: Mutex::new(HashSet::new()),
            mismatch_fired: Mutex::new(HashSet::new()),
        }
    }

    pub fn config(&self) -> &StuckConfig {
        &self.config
    }

    /// Evaluate recent outcomes (oldest first) and the planner's intent;
    /// escalate at most once per call.
    pub async fn check_and_escalate(
        &self,
        recent: &[VerificationOutcome],
        intent: Option<&PlannedIntent>,
        snapshot: &DocumentSnapshot,
    ) -> Result<Option<StuckStateEvent>, StuckError> {
        let trigger = match self.failure_streak(recent, intent) {
            Some(trigger) => Some(trigger),
            None => self.planner_mismatch(intent, snapshot),
        };
        self.fire(trigger, snapshot).await
    }

    /// Failure-streak trigger only; `intent` just enriches the prompt.
    pub async fn check_failures(
        &self,
        recent: &[VerificationOutcome],
        intent: Option<&PlannedIntent>,
        snapshot: &DocumentSnapshot,
    ) -> Result<Option<StuckStateEvent>, StuckError> {
        let trigger = self.failure_streak(recent, intent);
        self.fire(trigger, snapshot).await
    }

    /// Planner-mismatch trigger only, against an already refreshed snapshot.
    pub async fn check_intent(
        &self,
        intent: &PlannedIntent,
        snapshot: &DocumentSnapshot,
    ) -> Result<Option<StuckStateEvent>, StuckError> {
        let trigger = self.planner_mismatch(Some(intent), snapshot);
        self.fire(trigger, snapshot).await
    }

    async fn fire(
        &self,
        trigger: Option<Trigger>,
        snapshot: &DocumentSnapshot,
    ) -> Result<Option<StuckStateEvent>, StuckError> {
        let Some(trigger) = trigger else {
            return Ok(None);
        };
        let event = self.escalate(trigger, snapshot).await?;
        let fired = match event.reason {
            StuckReason::RepeatedVerificationFailure => &self.fired,
            StuckReason::PlannerMismatch => &self.mismatch_fired,
        };
        fired.lock().insert(event.target.clone());
        Ok(Some(event))
    }

    fn failure_streak(
        &self,
        recent: &[VerificationOutcome],
        intent: Option<&PlannedIntent>,
    ) -> Option<Trigger> {
        let threshold = self.config.failure_threshold.max(1);
        let mut streaks: HashMap<&TargetKey, (u32, &VerificationOutcome)> = HashMap::new();
        let mut order: Vec<&TargetKey> = Vec::new();

        // Streak per key is the run of failures at the tail of its history.
        for outcome in recent {
            let Some(key) = outcome.target.as_ref() else {
                continue;
            };
            let entry = streaks.entry(key).or_insert_with(|| {
                order.push(key);
                (0, outcome)
            });
            if outcome.passed {
                *entry = (0, outcome);
            } else {
                *entry = (entry.0 + 1, outcome);
            }
        }

        let mut fired = self.fired.lock();
        for key in &order {
            if streaks[key].0 == 0 && fired.remove(*key) {
                debug!(target = %key, "Failure streak broken; detector re-armed");
            }
        }

        // Most recently failing target first.
        let candidate = recent
            .iter()
            .rev()
            .filter(|o| !o.passed)
            .filter_map(|o| o.target.as_ref())
            .find(|key| streaks[key].0 >= threshold && !fired.contains(*key))?;
        let (count, last) = streaks[&candidate];
        drop(fired);

        warn!(target = %candidate, count, "Repeated verification failures on one target");
        let mut prompt = ContextPrompt::new(format!(
            "verification failed {} times in a row: {}",
            count, last.message
        ))
        .with_values(last.expected_value.clone(), last.observed_value.clone())
        .with_recent_failures(count);
        if let Some(intent) = intent {
            prompt = prompt.with_next_goal(intent.next_goal.clone());
            if let Some(action) = &intent.last_action {
                prompt = prompt.with_last_action(action.clone());
            }
        }

        Some(Trigger {
            reason: StuckReason::RepeatedVerificationFailure,
            target: candidate.clone(),
            failed_descriptor: candidate.to_string(),
            count,
            prompt,
        })
    }

    fn planner_mismatch(
        &self,
        intent: Option<&PlannedIntent>,
        snapshot: &DocumentSnapshot,
    ) -> Option<Trigger> {
        if !self.config.detect_planner_mismatch {
            return None;
        }
        let intent = intent?;
        let target = intent.target.as_ref()?;
        let key = target.key();

        let reason = match self.resolver.resolve(target, snapshot) {
            Ok(Resolution::Resolved(_)) => {
                self.mismatch_fired.lock().remove(&key);
                return None;
            }
            Ok(Resolution::NeedsReanalysis { reason }) => reason,
            Err(err) => err.to_string(),
        };
        if self.mismatch_fired.lock().contains(&key) {
            debug!(target = %key, "Planner mismatch already escalated");
            return None;
        }

        warn!(target = %target, "Planned target cannot be resolved on the current document");
        let mut prompt = ContextPrompt::new(format!(
            "the next planned target {} cannot be found: {}",
            target, reason
        ))
        .with_next_goal(intent.next_goal.clone());
        if let Some(action) = &intent.last_action {
            prompt = prompt.with_last_action(action.clone());
        }

        Some(Trigger {
            reason: StuckReason::PlannerMismatch,
            target: key,
            failed_descriptor: target.to_string(),
            count: 0,
            prompt,
        })
    }

    async fn escalate(
        &self,
        trigger: Trigger,
        snapshot: &DocumentSnapshot,
    ) -> Result<StuckStateEvent, StuckError> {
        let image = self
            .screenshots
            .capture_screenshot()
            .await
            .map_err(StuckError::Capture)?;
        let prompt = trigger.prompt.with_page_url(snapshot.url.clone());
        let advice = self
            .vision
            .analyze_image(&image, &prompt)
            .await
            .map_err(StuckError::Analysis)?;
        if advice.text.trim().is_empty() {
            return Err(StuckError::EmptyAdvice);
        }

        info!(
            target = %trigger.target,
            reason = ?trigger.reason,
            screenshot = %image.reference(),
            "Stuck state escalated to visual analysis"
        );
        Ok(StuckStateEvent {
            reason: trigger.reason,
            failed_descriptor: trigger.failed_descriptor,
            target: trigger.target,
            recent_failure_count: trigger.count,
            screenshot_ref: image.reference(),
            advice: advice.text,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::DefaultElementResolver;
    use perceiver_visual::OfflineVisualService;
    use steadyhand_core_types::{Capability, Hint};

    fn detector(service: Arc<OfflineVisualService>) -> StuckStateDetector {
        StuckStateDetector::new(
            StuckConfig::default(),
            Arc::new(DefaultElementResolver::default()),
            service.clone(),
            service,
        )
    }

    fn outcome(target: &TargetKey, passed: bool) -> VerificationOutcome {
        let outcome = if passed {
            VerificationOutcome::pass(1, "ok")
        } else {
            VerificationOutcome::fail(3, "expected 'x' but observed nothing")
        };
        outcome.with_target(Some(target.clone()))
    }

    fn subject_key() -> TargetKey {
        TargetDescriptor::at(4, Capability::TextInput)
            .with_hint(Hint::AriaLabel("Subject".into()))
            .key()
    }

    #[tokio::test]
    async fn fires_once_per_streak() {
        let service = Arc::new(OfflineVisualService::default());
        let detector = detector(service.clone());
        let snapshot = DocumentSnapshot::empty();
        let key = subject_key();
        let mut history = Vec::new();

        for _ in 0..2 {
            history.push(outcome(&key, false));
            assert!(detector
                .check_and_escalate(&history, None, &snapshot)
                .await
                .unwrap()
                .is_none());
        }

        history.push(outcome(&key, false));
        let event = detector
            .check_and_escalate(&history, None, &snapshot)
            .await
            .unwrap()
            .expect("third failure escalates");
        assert_eq!(event.reason, StuckReason::RepeatedVerificationFailure);
        assert_eq!(event.recent_failure_count, 3);
        assert!(!event.screenshot_ref.is_empty());
        assert!(!event.advice.is_empty());

        history.push(outcome(&key, false));
        assert!(detector
            .check_and_escalate(&history, None, &snapshot)
            .await
            .unwrap()
            .is_none());
        assert_eq!(service.captures(), 1);
    }

    #[tokio::test]
    async fn pass_re_arms_detector() {
        let service = Arc::new(OfflineVisualService::default());
        let detector = detector(service.clone());
        let snapshot = DocumentSnapshot::empty();
        let key = subject_key();
        let mut history: Vec<_> = (0..3).map(|_| outcome(&key, false)).collect();
        assert!(detector
            .check_and_escalate(&history, None, &snapshot)
            .await
            .unwrap()
            .is_some());

        history.push(outcome(&key, true));
        assert!(detector
            .check_and_escalate(&history, None, &snapshot)
            .await
            .unwrap()
            .is_none());

        history.extend((0..3).map(|_| outcome(&key, false)));
        assert!(detector
            .check_and_escalate(&history, None, &snapshot)
            .await
            .unwrap()
            .is_some());
        assert_eq!(service.captures(), 2);
    }

    #[tokio::test]
    async fn failures_on_different_targets_do_not_combine() {
        let service = Arc::new(OfflineVisualService::default());
        let detector = detector(service.clone());
        let other = TargetDescriptor::at(9, Capability::Clickable).key();
        let key = subject_key();
        let history = vec![
            outcome(&key, false),
            outcome(&other, false),
            outcome(&key, false),
            outcome(&other, false),
        ];
        assert!(detector
            .check_and_escalate(&history, None, &DocumentSnapshot::empty())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn unresolvable_intent_is_a_planner_mismatch() {
        let service = Arc::new(OfflineVisualService::default());
        let detector = detector(service.clone());
        let intent = PlannedIntent::new("open the checkout")
            .with_last_action("click(#3 <clickable>)")
            .with_target(
                TargetDescriptor::new(Capability::Clickable)
                    .with_hint(Hint::Text("Checkout".into())),
            );

        let event = detector
            .check_and_escalate(&[], Some(&intent), &DocumentSnapshot::empty())
            .await
            .unwrap()
            .expect("mismatch escalates");
        assert_eq!(event.reason, StuckReason::PlannerMismatch);
        assert!(event.failed_descriptor.contains("Checkout"));
        assert!(event.advisory().contains("unresolvable planned target"));

        assert!(detector
            .check_and_escalate(&[], Some(&intent), &DocumentSnapshot::empty())
            .await
            .unwrap()
            .is_none());
    }
}
