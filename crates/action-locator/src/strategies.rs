//! Hint strategies
//!
//! One strategy per hint kind, tried in fallback order:
//! 1. AriaLabel - accessible label
//! 2. Placeholder - input placeholder
//! 3. Text - visible text
//! 4. Selector - structural selector equivalent (exact only)

use std::cmp::Ordering;

use steadyhand_core_types::{
    normalize_text, DocumentSnapshot, Hint, HintKind, SemanticAttributes, SnapshotElement,
    TargetDescriptor,
};
use tracing::debug;

use crate::types::{hint_confidence, Candidate, MatchQuality};

/// Strategy trait for hint-based resolution
pub trait Strategy: Send + Sync {
    /// Hint kind this strategy consumes
    fn kind(&self) -> HintKind;

    /// The attribute this strategy compares hints against
    fn attribute<'a>(&self, attributes: &'a SemanticAttributes) -> Option<&'a str>;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Quality of the best match between `hint` and the element, if any
    fn match_quality(&self, element: &SnapshotElement, hint: &Hint) -> Option<MatchQuality> {
        if hint.kind() != self.kind() {
            return None;
        }
        let attribute = normalize_text(self.attribute(&element.attributes)?);
        let wanted = normalize_text(hint.value());
        if wanted.is_empty() || attribute.is_empty() {
            return None;
        }
        if attribute == wanted {
            Some(MatchQuality::Exact)
        } else if attribute.contains(&wanted) {
            Some(MatchQuality::Substring)
        } else {
            None
        }
    }

    /// Every capability-compatible element matched by one of this kind's hints
    fn candidates(
        &self,
        descriptor: &TargetDescriptor,
        snapshot: &DocumentSnapshot,
    ) -> Vec<Candidate> {
        let hints: Vec<&Hint> = descriptor.hints_of(self.kind()).collect();
        if hints.is_empty() {
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for element in snapshot
            .elements()
            .filter(|e| e.capability == descriptor.capability)
        {
            let best = hints
                .iter()
                .filter_map(|hint| self.match_quality(element, hint))
                .filter_map(|quality| {
                    hint_confidence(self.kind(), quality).map(|conf| (quality, conf))
                })
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));

            if let Some((quality, confidence)) = best {
                candidates.push(Candidate::new(
                    element.index,
                    element.handle.clone(),
                    self.kind(),
                    quality,
                    confidence,
                ));
            }
        }

        debug!(
            strategy = self.name(),
            count = candidates.len(),
            "Collected hint candidates"
        );
        candidates
    }
}

pub struct AriaLabelStrategy;

impl Strategy for AriaLabelStrategy {
    fn kind(&self) -> HintKind {
        HintKind::AriaLabel
    }

    fn attribute<'a>(&self, attributes: &'a SemanticAttributes) -> Option<&'a str> {
        attributes.aria_label.as_deref()
    }
}

pub struct PlaceholderStrategy;

impl Strategy for PlaceholderStrategy {
    fn kind(&self) -> HintKind {
        HintKind::Placeholder
    }

    fn attribute<'a>(&self, attributes: &'a SemanticAttributes) -> Option<&'a str> {
        attributes.placeholder.as_deref()
    }
}

pub struct TextStrategy;

impl Strategy for TextStrategy {
    fn kind(&self) -> HintKind {
        HintKind::Text
    }

    fn attribute<'a>(&self, attributes: &'a SemanticAttributes) -> Option<&'a str> {
        attributes.text.as_deref()
    }
}

pub struct SelectorStrategy;

impl Strategy for SelectorStrategy {
    fn kind(&self) -> HintKind {
        HintKind::Selector
    }

    fn attribute<'a>(&self, attributes: &'a SemanticAttributes) -> Option<&'a str> {
        attributes.selector.as_deref()
    }

    /// Selectors are structural; a partial selector says nothing
    fn match_quality(&self, element: &SnapshotElement, hint: &Hint) -> Option<MatchQuality> {
        if hint.kind() != HintKind::Selector {
            return None;
        }
        let selector = element.attributes.selector.as_deref()?;
        (normalize_text(selector) == normalize_text(hint.value())).then_some(MatchQuality::Exact)
    }
}

/// Strategy for a hint kind
pub fn strategy_for(kind: HintKind) -> &'static dyn Strategy {
    match kind {
        HintKind::AriaLabel => &AriaLabelStrategy,
        HintKind::Placeholder => &PlaceholderStrategy,
        HintKind::Text => &TextStrategy,
        HintKind::Selector => &SelectorStrategy,
    }
}

/// Whether any of the descriptor's hints matches the element at all
pub fn any_hint_matches(descriptor: &TargetDescriptor, element: &SnapshotElement) -> bool {
    descriptor
        .hints
        .iter()
        .any(|hint| strategy_for(hint.kind()).match_quality(element, hint).is_some())
}

/// Pick the best candidate: highest confidence, then closest to the
/// requested index, then lowest index
pub fn select_best_candidate(candidates: &[Candidate], wanted: Option<u32>) -> Option<&Candidate> {
    candidates.iter().min_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.distance_from(wanted).cmp(&b.distance_from(wanted)))
            .then_with(|| a.index.cmp(&b.index))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use steadyhand_core_types::{Capability, ElementHandle};

    fn input(index: u32, attributes: SemanticAttributes) -> SnapshotElement {
        SnapshotElement::new(
            index,
            ElementHandle::new(format!("el-{index}")),
            Capability::TextInput,
        )
        .with_attributes(attributes)
    }

    #[test]
    fn label_match_is_case_and_whitespace_insensitive() {
        let element = input(
            0,
            SemanticAttributes::default().with_aria_label("  Subject   Field "),
        );
        let exact = Hint::AriaLabel("subject field".into());
        let partial = Hint::AriaLabel("SUBJECT".into());
        assert_eq!(
            AriaLabelStrategy.match_quality(&element, &exact),
            Some(MatchQuality::Exact)
        );
        assert_eq!(
            AriaLabelStrategy.match_quality(&element, &partial),
            Some(MatchQuality::Substring)
        );
        assert_eq!(
            AriaLabelStrategy.match_quality(&element, &Hint::Text("subject".into())),
            None
        );
    }

    #[test]
    fn selector_requires_exact_match() {
        let element = input(0, SemanticAttributes::default().with_selector("#compose input.to"));
        assert_eq!(
            SelectorStrategy.match_quality(&element, &Hint::Selector("#compose".into())),
            None
        );
        assert_eq!(
            SelectorStrategy.match_quality(&element, &Hint::Selector("#COMPOSE input.to".into())),
            Some(MatchQuality::Exact)
        );
    }

    #[test]
    fn candidates_respect_capability() {
        let snapshot = DocumentSnapshot::new(
            None,
            vec![
                input(0, SemanticAttributes::default().with_text("Send")),
                SnapshotElement::new(1, ElementHandle::new("btn"), Capability::Clickable)
                    .with_attributes(SemanticAttributes::default().with_text("Send")),
            ],
        )
        .unwrap();
        let descriptor =
            TargetDescriptor::new(Capability::Clickable).with_hint(Hint::Text("send".into()));

        let candidates = TextStrategy.candidates(&descriptor, &snapshot);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].index, 1);
    }

    #[test]
    fn ties_break_on_proximity_then_lowest_index() {
        let make = |index| {
            Candidate::new(
                index,
                ElementHandle::new(format!("el-{index}")),
                HintKind::Text,
                MatchQuality::Exact,
                0.85,
            )
        };
        let candidates = vec![make(2), make(8), make(12)];

        assert_eq!(select_best_candidate(&candidates, Some(10)).unwrap().index, 8);
        assert_eq!(select_best_candidate(&candidates, Some(5)).unwrap().index, 2);
        assert_eq!(select_best_candidate(&candidates, None).unwrap().index, 2);
    }
}
