//! Planner-facing element descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{normalize_text, Capability};

/// Kind of semantic evidence, in resolution priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HintKind {
    AriaLabel,
    Placeholder,
    Text,
    Selector,
}

impl HintKind {
    /// Fixed priority: label > placeholder > text > selector.
    pub const PRIORITY: [HintKind; 4] = [
        HintKind::AriaLabel,
        HintKind::Placeholder,
        HintKind::Text,
        HintKind::Selector,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            HintKind::AriaLabel => "aria-label",
            HintKind::Placeholder => "placeholder",
            HintKind::Text => "text",
            HintKind::Selector => "selector",
        }
    }
}

/// One piece of semantic evidence about the intended element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum Hint {
    AriaLabel(String),
    Placeholder(String),
    Text(String),
    Selector(String),
}

impl Hint {
    pub fn kind(&self) -> HintKind {
        match self {
            Hint::AriaLabel(_) => HintKind::AriaLabel,
            Hint::Placeholder(_) => HintKind::Placeholder,
            Hint::Text(_) => HintKind::Text,
            Hint::Selector(_) => HintKind::Selector,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Hint::AriaLabel(v) | Hint::Placeholder(v) | Hint::Text(v) | Hint::Selector(v) => v,
        }
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.kind().name(), self.value())
    }
}

/// Resolver input: an index from the planner's snapshot, optional hints and
/// the capability the action needs.
///
/// An index without hints is accepted but is weaker evidence; hints without
/// a live index must still resolve on their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    pub capability: Capability,
}

impl TargetDescriptor {
    pub fn new(capability: Capability) -> Self {
        Self {
            index: None,
            hints: Vec::new(),
            capability,
        }
    }

    pub fn at(index: u32, capability: Capability) -> Self {
        Self {
            index: Some(index),
            hints: Vec::new(),
            capability,
        }
    }

    pub fn with_index(mut self, index: u32) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_hint(mut self, hint: Hint) -> Self {
        self.hints.push(hint);
        self
    }

    pub fn hints_of(&self, kind: HintKind) -> impl Iterator<Item = &Hint> {
        self.hints.iter().filter(move |hint| hint.kind() == kind)
    }

    /// Stable identity of the logical target, independent of snapshot
    /// indices where hints are available.
    pub fn key(&self) -> TargetKey {
        TargetKey::from(self)
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "#{index}")?,
            None => f.write_str("#?")?,
        }
        write!(f, " <{}>", self.capability)?;
        for hint in &self.hints {
            write!(f, " {hint}")?;
        }
        Ok(())
    }
}

/// Grouping key for "the same logical target" across snapshots.
///
/// Indices shift when the page mutates, so descriptors that carry hints are
/// keyed by capability and normalised hints; bare indices fall back to the
/// index itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TargetKey(pub String);

impl From<&TargetDescriptor> for TargetKey {
    fn from(descriptor: &TargetDescriptor) -> Self {
        if descriptor.hints.is_empty() {
            let index = descriptor
                .index
                .map(|i| i.to_string())
                .unwrap_or_else(|| "?".to_string());
            return TargetKey(format!("{}@{}", descriptor.capability, index));
        }
        let mut parts: Vec<String> = descriptor
            .hints
            .iter()
            .map(|hint| format!("{}:{}", hint.kind().name(), normalize_text(hint.value())))
            .collect();
        parts.sort();
        TargetKey(format!("{}|{}", descriptor.capability, parts.join("|")))
    }
}

impl fmt::Display for TargetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_ignores_index_when_hints_present() {
        let a = TargetDescriptor::at(12, Capability::TextInput)
            .with_hint(Hint::AriaLabel("Subject field".into()));
        let b = TargetDescriptor::at(14, Capability::TextInput)
            .with_hint(Hint::AriaLabel("  subject   FIELD".into()));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn key_uses_index_without_hints() {
        let a = TargetDescriptor::at(3, Capability::Clickable);
        let b = TargetDescriptor::at(4, Capability::Clickable);
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key().0, "clickable@3");
    }

    #[test]
    fn hints_deserialize_from_tagged_form() {
        let hint: Hint =
            serde_json::from_str(r#"{"kind":"placeholder","value":"Search"}"#).unwrap();
        assert_eq!(hint, Hint::Placeholder("Search".into()));
    }
}
