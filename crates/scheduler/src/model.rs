use serde::{Deserialize, Serialize};
use steadyhand_core_types::{ActionId, ActionRequest};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Keep at most one form-mutating action per snapshot
    pub enforce_single_mutation: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enforce_single_mutation: true,
        }
    }
}

/// An action removed from the batch, kept for the cycle report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DroppedAction {
    pub action_id: ActionId,
    /// Position in the proposed batch
    pub position: usize,
    pub kind: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDecision {
    /// Actions to run, in proposed order
    pub retained: Vec<ActionRequest>,
    pub dropped: Vec<DroppedAction>,
}

impl BatchDecision {
    pub fn mutating_count(&self) -> usize {
        self.retained.iter().filter(|a| a.is_form_mutating()).count()
    }

    pub fn was_filtered(&self) -> bool {
        !self.dropped.is_empty()
    }
}
