//! Bounded cross-cycle memory fed back into the planner's context.

use std::collections::VecDeque;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Entries kept per history.
pub const HISTORY_LIMIT: usize = 50;

/// How long a detected autocomplete blocks further form input.
pub const SEQUENCE_BREAK_WINDOW_MS: i64 = 2_000;

/// Autocomplete detection result for one typed or clicked element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteEvent {
    pub element_index: u32,
    pub text: String,
    pub detected: bool,
    pub at: DateTime<Utc>,
}

/// One line of action history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionSummary {
    pub cycle: u64,
    pub action: String,
    pub result: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CycleMemory {
    goal: Option<String>,
    autocomplete: VecDeque<AutocompleteEvent>,
    actions: VecDeque<ActionSummary>,
}

impl CycleMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_goal(&mut self, goal: impl Into<String>) {
        self.goal = Some(goal.into());
    }

    pub fn goal(&self) -> Option<&str> {
        self.goal.as_deref()
    }

    pub fn record_autocomplete(&mut self, element_index: u32, text: impl Into<String>, detected: bool) {
        self.record_autocomplete_at(element_index, text, detected, Utc::now());
    }

    pub fn record_autocomplete_at(
        &mut self,
        element_index: u32,
        text: impl Into<String>,
        detected: bool,
        at: DateTime<Utc>,
    ) {
        push_bounded(
            &mut self.autocomplete,
            AutocompleteEvent {
                element_index,
                text: text.into(),
                detected,
                at,
            },
        );
    }

    pub fn record_action(&mut self, cycle: u64, action: impl Into<String>, result: impl Into<String>) {
        push_bounded(
            &mut self.actions,
            ActionSummary {
                cycle,
                action: action.into(),
                result: result.into(),
                at: Utc::now(),
            },
        );
    }

    pub fn autocomplete_events(&self) -> impl Iterator<Item = &AutocompleteEvent> {
        self.autocomplete.iter()
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionSummary> {
        self.actions.iter()
    }

    pub fn should_break_sequence(&self) -> bool {
        self.should_break_sequence_at(Utc::now())
    }

    /// The latest event detected autocomplete less than two seconds before `now`.
    pub fn should_break_sequence_at(&self, now: DateTime<Utc>) -> bool {
        match self.autocomplete.back() {
            Some(latest) => {
                latest.detected
                    && now.signed_duration_since(latest.at)
                        < Duration::milliseconds(SEQUENCE_BREAK_WINDOW_MS)
            }
            None => false,
        }
    }

    pub fn context_digest(&self) -> String {
        self.context_digest_at(Utc::now())
    }

    pub fn context_digest_at(&self, now: DateTime<Utc>) -> String {
        let mut out = String::new();
        if let Some(goal) = &self.goal {
            out.push_str(&format!("Current goal: {}\n", goal));
        }

        out.push_str("Recent actions:\n");
        if self.actions.is_empty() {
            out.push_str("- none yet\n");
        }
        for action in self.actions.iter().rev().take(3).rev() {
            out.push_str(&format!(
                "- Cycle {}: {} -> {}\n",
                action.cycle, action.action, action.result
            ));
        }

        if self.should_break_sequence_at(now) {
            out.push_str(
                "\nAutocomplete opened after the last input. Pick an entry from the \
                 suggestion list before any further typing or form filling; element \
                 indices have shifted, so work from a fresh snapshot.\n",
            );
        }

        if !self.autocomplete.is_empty() {
            out.push_str("\nRecent autocomplete events:\n");
            for event in self.autocomplete.iter().rev().take(3).rev() {
                out.push_str(&format!(
                    "- Element {}: '{}' -> {}\n",
                    event.element_index,
                    event.text,
                    if event.detected { "DETECTED" } else { "NONE" }
                ));
            }
        }
        out
    }
}

fn push_bounded<T>(queue: &mut VecDeque<T>, item: T) {
    queue.push_back(item);
    while queue.len() > HISTORY_LIMIT {
        queue.pop_front();
    }
}
