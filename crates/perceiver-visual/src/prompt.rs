//! Context prompt sent with the screenshot

use serde::{Deserialize, Serialize};

/// What the vision service needs to know about the stall
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextPrompt {
    pub last_action: Option<String>,
    pub next_goal: Option<String>,
    pub failure_reason: String,
    pub expected: Option<String>,
    pub observed: Option<String>,
    pub recent_failures: u32,
    pub page_url: Option<String>,
    /// Free-form context lines (cycle memory digest, etc.)
    pub notes: Vec<String>,
}

impl ContextPrompt {
    pub fn new(failure_reason: impl Into<String>) -> Self {
        Self {
            failure_reason: failure_reason.into(),
            ..Self::default()
        }
    }

    pub fn with_last_action(mut self, action: impl Into<String>) -> Self {
        self.last_action = Some(action.into());
        self
    }

    pub fn with_next_goal(mut self, goal: impl Into<String>) -> Self {
        self.next_goal = Some(goal.into());
        self
    }

    pub fn with_values(mut self, expected: Option<String>, observed: Option<String>) -> Self {
        self.expected = expected;
        self.observed = observed;
        self
    }

    pub fn with_recent_failures(mut self, count: u32) -> Self {
        self.recent_failures = count;
        self
    }

    pub fn with_page_url(mut self, url: Option<String>) -> Self {
        self.page_url = url;
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::from(
            "The browser agent appears stuck. Look at the screenshot and explain what blocks progress.\n\n",
        );
        if let Some(action) = &self.last_action {
            out.push_str(&format!("Last action attempted: {}\n", action));
        }
        if let Some(goal) = &self.next_goal {
            out.push_str(&format!("Next goal: {}\n", goal));
        }
        out.push_str(&format!("Failure: {}\n", self.failure_reason));
        if self.expected.is_some() || self.observed.is_some() {
            out.push_str(&format!(
                "Expected value: {}; observed: {}\n",
                quoted(self.expected.as_deref()),
                quoted(self.observed.as_deref())
            ));
        }
        if self.recent_failures > 0 {
            out.push_str(&format!(
                "Consecutive failures on this target: {}\n",
                self.recent_failures
            ));
        }
        if let Some(url) = &self.page_url {
            out.push_str(&format!("Page: {}\n", url));
        }
        if !self.notes.is_empty() {
            out.push_str("\nAdditional context:\n");
            for note in &self.notes {
                out.push_str(note.trim_end());
                out.push('\n');
            }
        }
        out.push_str(
            "\nSuggest what the agent should try next in plain language. \
             Do not reply with an executable command.",
        );
        out
    }
}

fn quoted(value: Option<&str>) -> String {
    value
        .map(|v| format!("'{}'", v))
        .unwrap_or_else(|| "nothing".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_includes_failure_detail() {
        let prompt = ContextPrompt::new("verification failed 3 times")
            .with_last_action("type_text(#4 <text-input>) \"hello\"")
            .with_next_goal("fill the subject")
            .with_values(Some("hello".into()), None)
            .with_recent_failures(3);
        let text = prompt.render();
        assert!(text.contains("Last action attempted: type_text"));
        assert!(text.contains("Next goal: fill the subject"));
        assert!(text.contains("Expected value: 'hello'; observed: nothing"));
        assert!(text.contains("Consecutive failures on this target: 3"));
        assert!(!text.contains("Additional context"));
    }
}
