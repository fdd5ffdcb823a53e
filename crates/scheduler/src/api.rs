use steadyhand_core_types::ActionRequest;
use tracing::{debug, warn};

use crate::model::{BatchDecision, DroppedAction, SchedulerConfig};

pub trait BatchFilter: Send + Sync {
    fn filter_batch(&self, proposed: Vec<ActionRequest>) -> BatchDecision;
}

/// Lets one form-mutating action through per snapshot.
///
/// Every action in a batch was planned against the same snapshot; once the
/// first click/type/select lands, the indices of the rest may point at
/// different elements. Non-mutating actions always pass.
#[derive(Clone, Debug, Default)]
pub struct SingleActionScheduler {
    config: SchedulerConfig,
}

impl SingleActionScheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}

impl BatchFilter for SingleActionScheduler {
    fn filter_batch(&self, proposed: Vec<ActionRequest>) -> BatchDecision {
        if !self.config.enforce_single_mutation {
            warn!("single-mutation policy disabled; batch passes unfiltered");
            return BatchDecision {
                retained: proposed,
                dropped: Vec::new(),
            };
        }

        let mut decision = BatchDecision::default();
        let mut kept: Option<(usize, String)> = None;

        for (position, action) in proposed.into_iter().enumerate() {
            if !action.is_form_mutating() {
                decision.retained.push(action);
                continue;
            }
            match &kept {
                None => {
                    debug!(position, action = %action, "retaining first form-mutating action");
                    kept = Some((position, action.id.to_string()));
                    decision.retained.push(action);
                }
                Some((first_position, first_id)) => {
                    let reason = format!(
                        "form-mutating action after #{} ({}) in the same batch; needs a fresh snapshot",
                        first_position, first_id
                    );
                    warn!(
                        action_id = %action.id,
                        position,
                        kind = action.kind.name(),
                        "batch policy: dropped action"
                    );
                    decision.dropped.push(DroppedAction {
                        action_id: action.id.clone(),
                        position,
                        kind: action.kind.name().to_string(),
                        reason,
                    });
                }
            }
        }

        decision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steadyhand_core_types::{ActionKind, Capability, TargetDescriptor};

    fn click(index: u32) -> ActionRequest {
        ActionRequest::click(TargetDescriptor::at(index, Capability::Clickable))
    }

    fn type_at(index: u32, text: &str) -> ActionRequest {
        ActionRequest::type_text(TargetDescriptor::at(index, Capability::TextInput), text)
    }

    fn scroll(delta_y: i32) -> ActionRequest {
        ActionRequest::new(ActionKind::Scroll { delta_y })
    }

    #[test]
    fn keeps_only_first_mutation() {
        let scheduler = SingleActionScheduler::default();
        let batch = vec![click(5), type_at(7, "x"), type_at(9, "y")];
        let first_id = batch[0].id.clone();

        let decision = scheduler.filter_batch(batch);

        assert_eq!(decision.retained.len(), 1);
        assert_eq!(decision.retained[0].id, first_id);
        assert_eq!(decision.dropped.len(), 2);
        assert_eq!(decision.dropped[0].position, 1);
        assert_eq!(decision.dropped[1].kind, "type_text");
    }

    #[test]
    fn non_mutating_actions_pass_in_order() {
        let scheduler = SingleActionScheduler::default();
        let wait = ActionRequest::new(ActionKind::Wait { millis: 100 });
        let keys = ActionRequest::new(ActionKind::SendKeys {
            keys: "Enter".into(),
        });
        let batch = vec![
            scroll(200),
            type_at(1, "a"),
            wait.clone(),
            click(2),
            keys.clone(),
            scroll(-50),
        ];
        let ids: Vec<_> = batch.iter().map(|a| a.id.clone()).collect();

        let decision = scheduler.filter_batch(batch);
        let kept: Vec<_> = decision.retained.iter().map(|a| a.id.clone()).collect();

        assert_eq!(kept, vec![ids[0].clone(), ids[1].clone(), ids[2].clone(), ids[4].clone(), ids[5].clone()]);
        assert_eq!(decision.mutating_count(), 1);
        assert_eq!(decision.dropped[0].action_id, ids[3]);
    }

    #[test]
    fn never_more_than_one_mutation_for_any_batch_size() {
        let scheduler = SingleActionScheduler::default();
        for size in 0..40u32 {
            let batch: Vec<_> = (0..size)
                .map(|i| match i % 4 {
                    0 => click(i),
                    1 => type_at(i, "v"),
                    2 => scroll(10),
                    _ => ActionRequest::select(
                        TargetDescriptor::at(i, Capability::Selectable),
                        "opt",
                    ),
                })
                .collect();
            let non_mutating = batch.iter().filter(|a| !a.is_form_mutating()).count();
            let decision = scheduler.filter_batch(batch);
            assert!(decision.mutating_count() <= 1);
            assert_eq!(
                decision.retained.iter().filter(|a| !a.is_form_mutating()).count(),
                non_mutating
            );
        }
    }

    #[test]
    fn disabled_policy_passes_everything() {
        let scheduler = SingleActionScheduler::new(SchedulerConfig {
            enforce_single_mutation: false,
        });
        let decision = scheduler.filter_batch(vec![click(1), click(2)]);
        assert_eq!(decision.retained.len(), 2);
        assert!(!decision.was_filtered());
    }
}
