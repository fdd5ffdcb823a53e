use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ElementHandle, HintKind, SemanticAttributes, SnapshotId};

/// Evidence that produced a resolved element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    Index,
    AriaLabel,
    Placeholder,
    Text,
    SelectorFallback,
}

impl ResolutionSource {
    pub fn name(&self) -> &'static str {
        match self {
            ResolutionSource::Index => "index",
            ResolutionSource::AriaLabel => "aria-label",
            ResolutionSource::Placeholder => "placeholder",
            ResolutionSource::Text => "text",
            ResolutionSource::SelectorFallback => "selector-fallback",
        }
    }
}

impl From<HintKind> for ResolutionSource {
    fn from(kind: HintKind) -> Self {
        match kind {
            HintKind::AriaLabel => ResolutionSource::AriaLabel,
            HintKind::Placeholder => ResolutionSource::Placeholder,
            HintKind::Text => ResolutionSource::Text,
            HintKind::Selector => ResolutionSource::SelectorFallback,
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Live handle chosen by the resolver.
///
/// Valid only until the next document mutation; never cache it across
/// actions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedElement {
    pub index: u32,
    pub handle: ElementHandle,
    pub source: ResolutionSource,
    /// In `[0, 1]`; `1.0` only for a fully validated index hit.
    pub confidence: f64,
    pub snapshot_id: SnapshotId,
    #[serde(default)]
    pub attributes: SemanticAttributes,
}

impl ResolvedElement {
    pub fn is_combobox_like(&self) -> bool {
        matches!(
            self.attributes.role.as_deref(),
            Some("combobox") | Some("searchbox")
        )
    }
}
