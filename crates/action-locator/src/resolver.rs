//! Element resolver: index validation, then ordered hint fallback

use steadyhand_core_types::{
    DocumentSnapshot, HintKind, ResolutionSource, ResolvedElement, SnapshotElement,
    TargetDescriptor,
};
use tracing::{debug, info, warn};

use crate::{
    errors::LocatorError,
    strategies::{any_hint_matches, select_best_candidate, strategy_for},
    types::{Resolution, ResolverConfig},
};

/// Reason attached to every failed resolution
pub const REANALYSIS_REASON: &str = "index and all hints failed";

/// Element resolver trait
pub trait ElementResolver: Send + Sync {
    /// Resolve a descriptor against one snapshot
    fn resolve(
        &self,
        descriptor: &TargetDescriptor,
        snapshot: &DocumentSnapshot,
    ) -> Result<Resolution, LocatorError>;
}

/// Default element resolver implementation
#[derive(Debug, Clone, Default)]
pub struct DefaultElementResolver {
    config: ResolverConfig,
}

impl DefaultElementResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Index hit: present, same capability, and corroborated by a hint when
    /// hints were supplied
    fn validate_index<'s>(
        &self,
        descriptor: &TargetDescriptor,
        snapshot: &'s DocumentSnapshot,
    ) -> Option<&'s SnapshotElement> {
        let index = descriptor.index?;
        let Some(element) = snapshot.get(index) else {
            debug!(index, "Index not present in snapshot");
            return None;
        };
        if element.capability != descriptor.capability {
            debug!(
                index,
                found = %element.capability,
                wanted = %descriptor.capability,
                "Index points at an element with the wrong capability"
            );
            return None;
        }
        if !descriptor.hints.is_empty() && !any_hint_matches(descriptor, element) {
            debug!(index, "Index element contradicts every hint");
            return None;
        }
        Some(element)
    }

    fn resolve_by_hints(
        &self,
        descriptor: &TargetDescriptor,
        snapshot: &DocumentSnapshot,
    ) -> Option<ResolvedElement> {
        for kind in HintKind::PRIORITY {
            let strategy = strategy_for(kind);
            let candidates: Vec<_> = strategy
                .candidates(descriptor, snapshot)
                .into_iter()
                .filter(|c| c.confidence >= self.config.min_confidence)
                .collect();

            let Some(best) = select_best_candidate(&candidates, descriptor.index) else {
                continue;
            };
            if candidates.len() > 1 {
                debug!(
                    strategy = strategy.name(),
                    count = candidates.len(),
                    chosen = best.index,
                    "Several hint candidates, picked best"
                );
            }
            let attributes = snapshot
                .get(best.index)
                .map(|e| e.attributes.clone())
                .unwrap_or_default();
            return Some(ResolvedElement {
                index: best.index,
                handle: best.handle.clone(),
                source: best.source,
                confidence: best.confidence,
                snapshot_id: snapshot.id.clone(),
                attributes,
            });
        }
        None
    }
}

impl ElementResolver for DefaultElementResolver {
    fn resolve(
        &self,
        descriptor: &TargetDescriptor,
        snapshot: &DocumentSnapshot,
    ) -> Result<Resolution, LocatorError> {
        if descriptor.index.is_none() && descriptor.hints.is_empty() {
            return Err(LocatorError::InvalidDescriptor(format!(
                "{} has neither an index nor hints",
                descriptor
            )));
        }

        debug!(descriptor = %descriptor, snapshot = %snapshot.id, "Resolving element");

        if let Some(element) = self.validate_index(descriptor, snapshot) {
            info!(index = element.index, source = "index", "Resolved element");
            return Ok(Resolution::Resolved(ResolvedElement {
                index: element.index,
                handle: element.handle.clone(),
                source: ResolutionSource::Index,
                confidence: 1.0,
                snapshot_id: snapshot.id.clone(),
                attributes: element.attributes.clone(),
            }));
        }

        if let Some(resolved) = self.resolve_by_hints(descriptor, snapshot) {
            info!(
                index = resolved.index,
                source = %resolved.source,
                confidence = resolved.confidence,
                "Resolved element via hint"
            );
            return Ok(Resolution::Resolved(resolved));
        }

        warn!(descriptor = %descriptor, "Resolution exhausted; re-analysis required");
        Ok(Resolution::needs_reanalysis(REANALYSIS_REASON))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use steadyhand_core_types::{Capability, ElementHandle, Hint, SemanticAttributes};

    fn element(index: u32, capability: Capability, attributes: SemanticAttributes) -> SnapshotElement {
        SnapshotElement::new(index, ElementHandle::new(format!("el-{index}")), capability)
            .with_attributes(attributes)
    }

    fn compose_snapshot() -> DocumentSnapshot {
        DocumentSnapshot::new(
            Some("https://mail.example.test/compose".into()),
            vec![
                element(
                    3,
                    Capability::TextInput,
                    SemanticAttributes::default()
                        .with_aria_label("To")
                        .with_placeholder("Recipients"),
                ),
                element(
                    4,
                    Capability::TextInput,
                    SemanticAttributes::default().with_aria_label("Subject field"),
                ),
                element(
                    5,
                    Capability::Clickable,
                    SemanticAttributes::default().with_text("Send"),
                ),
                element(
                    6,
                    Capability::Clickable,
                    SemanticAttributes::default().with_text("Send later"),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn index_hit_returns_full_confidence() {
        let resolver = DefaultElementResolver::default();
        let snapshot = compose_snapshot();
        let resolution = resolver
            .resolve(&TargetDescriptor::at(5, Capability::Clickable), &snapshot)
            .unwrap();
        let element = resolution.element().unwrap();
        assert_eq!(element.index, 5);
        assert_eq!(element.source, ResolutionSource::Index);
        assert_eq!(element.confidence, 1.0);
        assert_eq!(element.snapshot_id, snapshot.id);
    }

    #[test]
    fn stale_index_falls_back_to_label() {
        let resolver = DefaultElementResolver::default();
        let descriptor = TargetDescriptor::at(12, Capability::TextInput)
            .with_hint(Hint::AriaLabel("Subject field".into()));
        let resolution = resolver.resolve(&descriptor, &compose_snapshot()).unwrap();
        let element = resolution.element().unwrap();
        assert_eq!(element.index, 4);
        assert_eq!(element.source, ResolutionSource::AriaLabel);
        assert!(element.confidence < 1.0);
    }

    #[test]
    fn index_contradicted_by_hints_is_not_trusted() {
        let resolver = DefaultElementResolver::default();
        // Index 3 is a text input, but it is the recipients field.
        let descriptor = TargetDescriptor::at(3, Capability::TextInput)
            .with_hint(Hint::AriaLabel("Subject field".into()));
        let element = resolver
            .resolve(&descriptor, &compose_snapshot())
            .unwrap()
            .into_element()
            .unwrap();
        assert_eq!(element.index, 4);
        assert_eq!(element.source, ResolutionSource::AriaLabel);
    }

    #[test]
    fn higher_priority_kind_wins_over_better_lower_kind() {
        let resolver = DefaultElementResolver::default();
        // Label substring (0.75) beats placeholder exact (0.90) by priority.
        let descriptor = TargetDescriptor::new(Capability::TextInput)
            .with_hint(Hint::Placeholder("Recipients".into()))
            .with_hint(Hint::AriaLabel("subject".into()));
        let element = resolver
            .resolve(&descriptor, &compose_snapshot())
            .unwrap()
            .into_element()
            .unwrap();
        assert_eq!(element.index, 4);
        assert_eq!(element.confidence, 0.75);
    }

    #[test]
    fn exact_text_beats_substring_text() {
        let resolver = DefaultElementResolver::default();
        let descriptor =
            TargetDescriptor::at(6, Capability::Clickable).with_hint(Hint::Text("send".into()));
        // Index 6 is "Send later" which substring-matches, so the index hit stands.
        let element = resolver
            .resolve(&descriptor, &compose_snapshot())
            .unwrap()
            .into_element()
            .unwrap();
        assert_eq!(element.index, 6);
        assert_eq!(element.source, ResolutionSource::Index);

        let descriptor =
            TargetDescriptor::at(40, Capability::Clickable).with_hint(Hint::Text("send".into()));
        let element = resolver
            .resolve(&descriptor, &compose_snapshot())
            .unwrap()
            .into_element()
            .unwrap();
        assert_eq!(element.index, 5);
        assert_eq!(element.confidence, 0.85);
    }

    #[test]
    fn nothing_matches_needs_reanalysis() {
        let resolver = DefaultElementResolver::default();
        let descriptor = TargetDescriptor::at(12, Capability::Selectable)
            .with_hint(Hint::AriaLabel("Country".into()));
        assert_eq!(
            resolver.resolve(&descriptor, &compose_snapshot()).unwrap(),
            Resolution::needs_reanalysis(REANALYSIS_REASON)
        );
    }

    #[test]
    fn threshold_discards_weak_candidates() {
        let resolver = DefaultElementResolver::new(ResolverConfig {
            min_confidence: 0.7,
        });
        let descriptor =
            TargetDescriptor::new(Capability::Clickable).with_hint(Hint::Text("later".into()));
        // Only a 0.65 substring match exists.
        assert!(!resolver
            .resolve(&descriptor, &compose_snapshot())
            .unwrap()
            .is_resolved());
    }

    #[test]
    fn empty_descriptor_is_rejected() {
        let resolver = DefaultElementResolver::default();
        let err = resolver
            .resolve(&TargetDescriptor::new(Capability::Clickable), &compose_snapshot())
            .unwrap_err();
        assert!(matches!(err, LocatorError::InvalidDescriptor(_)));
    }
}
