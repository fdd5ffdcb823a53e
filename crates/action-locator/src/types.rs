//! Core types for locator system

use serde::{Deserialize, Serialize};
use steadyhand_core_types::{ElementHandle, HintKind, ResolutionSource, ResolvedElement};

use crate::errors::LocatorError;

/// How specifically a hint matched an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchQuality {
    Substring,
    Exact,
}

/// Confidence for a hint kind at a given match quality.
///
/// | kind        | exact | substring |
/// |-------------|-------|-----------|
/// | aria-label  | 0.95  | 0.75      |
/// | placeholder | 0.90  | 0.70      |
/// | text        | 0.85  | 0.65      |
/// | selector    | 0.60  | -         |
pub fn hint_confidence(kind: HintKind, quality: MatchQuality) -> Option<f64> {
    match (kind, quality) {
        (HintKind::AriaLabel, MatchQuality::Exact) => Some(0.95),
        (HintKind::AriaLabel, MatchQuality::Substring) => Some(0.75),
        (HintKind::Placeholder, MatchQuality::Exact) => Some(0.90),
        (HintKind::Placeholder, MatchQuality::Substring) => Some(0.70),
        (HintKind::Text, MatchQuality::Exact) => Some(0.85),
        (HintKind::Text, MatchQuality::Substring) => Some(0.65),
        (HintKind::Selector, MatchQuality::Exact) => Some(0.60),
        (HintKind::Selector, MatchQuality::Substring) => None,
    }
}

/// Element candidate produced by one hint strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub index: u32,
    pub handle: ElementHandle,
    pub source: ResolutionSource,
    pub quality: MatchQuality,
    /// Confidence score (0.0-1.0)
    pub confidence: f64,
}

impl Candidate {
    pub fn new(
        index: u32,
        handle: ElementHandle,
        kind: HintKind,
        quality: MatchQuality,
        confidence: f64,
    ) -> Self {
        Self {
            index,
            handle,
            source: kind.into(),
            quality,
            confidence,
        }
    }

    /// Distance from the index the planner asked for; unknown sorts last
    pub fn distance_from(&self, wanted: Option<u32>) -> u32 {
        wanted.map_or(u32::MAX, |w| self.index.abs_diff(w))
    }
}

/// Resolver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Candidates below this confidence are discarded
    pub min_confidence: f64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), LocatorError> {
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(LocatorError::InvalidConfig(format!(
                "min_confidence must be within [0, 1], got {}",
                self.min_confidence
            )));
        }
        Ok(())
    }
}

/// Outcome of resolving a descriptor against one snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Resolution {
    Resolved(ResolvedElement),
    /// Caller must fetch a fresh snapshot and retry once
    NeedsReanalysis { reason: String },
}

impl Resolution {
    pub fn needs_reanalysis(reason: impl Into<String>) -> Self {
        Resolution::NeedsReanalysis {
            reason: reason.into(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    pub fn element(&self) -> Option<&ResolvedElement> {
        match self {
            Resolution::Resolved(element) => Some(element),
            Resolution::NeedsReanalysis { .. } => None,
        }
    }

    pub fn into_element(self) -> Option<ResolvedElement> {
        match self {
            Resolution::Resolved(element) => Some(element),
            Resolution::NeedsReanalysis { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_always_beats_substring_within_a_kind() {
        for kind in HintKind::PRIORITY {
            let exact = hint_confidence(kind, MatchQuality::Exact).unwrap();
            if let Some(partial) = hint_confidence(kind, MatchQuality::Substring) {
                assert!(exact > partial, "{:?}", kind);
            }
            assert!(exact < 1.0);
        }
    }

    #[test]
    fn config_rejects_out_of_range_threshold() {
        assert!(ResolverConfig::default().validate().is_ok());
        let config = ResolverConfig {
            min_confidence: 1.5,
        };
        assert!(config.validate().is_err());
    }
}
