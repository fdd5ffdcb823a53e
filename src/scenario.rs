//! Scripted scenarios
//!
//! A scenario describes an in-memory page, the ways it misbehaves and the
//! batches a planner proposes on each cycle. Running one drives every batch
//! through [`CycleRunner`] with the offline visual service.

use std::path::Path;
use std::sync::Arc;

use action_primitives::{CallCounters, DefaultActionExecutor, Glitch, MemoryDocument, MemoryElement};
use agent_core::{CyclePorts, CycleResult, CycleRunner, PlannedIntent};
use anyhow::{Context, Result};
use perceiver_visual::OfflineVisualService;
use serde::{Deserialize, Serialize};
use steadyhand_core_types::ActionRequest;
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    pub elements: Vec<MemoryElement>,
    /// Installed before the first cycle
    #[serde(default)]
    pub glitches: Vec<Glitch>,
    /// Canned advice returned by the offline visual service
    #[serde(default)]
    pub advice: Option<String>,
    pub cycles: Vec<ScenarioCycle>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioCycle {
    pub actions: Vec<ActionRequest>,
    #[serde(default)]
    pub intent: Option<PlannedIntent>,
    /// Installed after the planner's snapshot is taken
    #[serde(default)]
    pub glitches: Vec<Glitch>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub cycles: Vec<CycleResult>,
    pub calls: CallCounters,
    pub screenshots: u32,
    /// Planner-facing memory digest after the last cycle
    pub digest: String,
}

impl ScenarioReport {
    pub fn is_success(&self) -> bool {
        self.cycles.iter().all(CycleResult::is_success)
    }
}

impl Scenario {
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse scenario")
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| "scenario".to_string())
    }
}

/// Run every cycle of `scenario` against a fresh in-memory document.
pub async fn run_scenario(scenario: &Scenario, config: &Config) -> Result<ScenarioReport> {
    let doc = Arc::new(MemoryDocument::with_elements(
        scenario.url.clone(),
        scenario.elements.clone(),
    ));
    for glitch in &scenario.glitches {
        doc.glitch(glitch.clone());
    }

    let mut visual = OfflineVisualService::default();
    if let Some(advice) = &scenario.advice {
        visual = visual.with_advice(advice.clone());
    }
    let visual = Arc::new(visual);

    let ports = CyclePorts {
        executor: Arc::new(DefaultActionExecutor::new(doc.clone())),
        snapshots: doc.clone(),
        screenshots: visual.clone(),
        vision: visual.clone(),
    };
    let runner = CycleRunner::new(config.cycle_config(), ports).context("Invalid cycle configuration")?;

    let name = scenario.display_name();
    info!(scenario = %name, cycles = scenario.cycles.len(), "Running scenario");
    let mut results = Vec::with_capacity(scenario.cycles.len());
    for (position, cycle) in scenario.cycles.iter().enumerate() {
        let snapshot = doc
            .snapshot()
            .with_context(|| format!("snapshot for cycle {}", position + 1))?;
        for glitch in &cycle.glitches {
            doc.glitch(glitch.clone());
        }
        let result = runner
            .run_cycle_with(
                cycle.actions.clone(),
                snapshot,
                cycle.intent.as_ref(),
                CancellationToken::new(),
            )
            .await
            .with_context(|| format!("cycle {}", position + 1))?;
        results.push(result);
    }

    Ok(ScenarioReport {
        name,
        cycles: results,
        calls: doc.calls(),
        screenshots: visual.captures(),
        digest: runner.memory_digest(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::StuckReason;

    const SWALLOWING_FORM: &str = r#"
name: swallowing subject field
url: https://example.test/compose
elements:
  - handle: subject
    capability: text-input
    attributes:
      aria_label: Subject field
  - handle: send
    capability: clickable
    attributes:
      text: Send
glitches:
  - kind: swallow_inputs
    handle: subject
    count: 100
advice: The subject field is read-only until a recipient is chosen.
cycles:
  - actions: &type_subject
      - type: type_text
        text: Quarterly report
        target:
          index: 0
          capability: text-input
          hints:
            - kind: aria-label
              value: Subject field
  - actions: *type_subject
  - actions: *type_subject
"#;

    #[test]
    fn parses_actions_and_glitches() {
        let scenario = Scenario::from_yaml(SWALLOWING_FORM).unwrap();
        assert_eq!(scenario.elements.len(), 2);
        assert_eq!(scenario.glitches.len(), 1);
        assert_eq!(scenario.cycles.len(), 3);
        let action = &scenario.cycles[0].actions[0];
        assert!(action.is_form_mutating());
        assert_eq!(action.expected_value(), Some("Quarterly report"));
    }

    #[tokio::test(start_paused = true)]
    async fn third_failing_cycle_escalates() {
        let scenario = Scenario::from_yaml(SWALLOWING_FORM).unwrap();
        let report = run_scenario(&scenario, &Config::default()).await.unwrap();

        assert!(!report.is_success());
        assert!(report.cycles[0].stuck.is_none());
        assert!(report.cycles[1].stuck.is_none());
        let event = report.cycles[2].stuck.as_ref().unwrap();
        assert_eq!(event.reason, StuckReason::RepeatedVerificationFailure);
        assert!(event.screenshot_ref.starts_with("screenshot:"));
        assert!(event.advice.contains("read-only"));
        assert_eq!(report.screenshots, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clean_page_succeeds() {
        let scenario = Scenario::from_yaml(
            r#"
elements:
  - handle: country
    capability: selectable
    attributes:
      aria_label: Country
    options: [Austria, Germany]
cycles:
  - actions:
      - type: select
        option: germany
        target:
          capability: selectable
          hints:
            - kind: aria-label
              value: country
"#,
        )
        .unwrap();
        let report = run_scenario(&scenario, &Config::default()).await.unwrap();
        assert!(report.is_success());
        assert_eq!(report.calls.selects, 1);
        assert!(report.digest.contains("Cycle 1"));
    }
}
