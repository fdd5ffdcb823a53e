//! Indexed, immutable views of a document's interactive elements.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{normalize_text, CoreError, ElementHandle, SnapshotId};

/// What an element can be asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Clickable,
    TextInput,
    Selectable,
}

impl Capability {
    pub fn name(&self) -> &'static str {
        match self {
            Capability::Clickable => "clickable",
            Capability::TextInput => "text-input",
            Capability::Selectable => "selectable",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Semantic attributes the snapshot builder extracted for an element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,

    /// Visible text content, already truncated by the builder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Structural selector equivalent (e.g. a CSS path) for the element.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

impl SemanticAttributes {
    pub fn with_aria_label(mut self, label: impl Into<String>) -> Self {
        self.aria_label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotElement {
    /// Index unique within the owning snapshot only.
    pub index: u32,
    pub handle: ElementHandle,
    pub capability: Capability,
    #[serde(default)]
    pub attributes: SemanticAttributes,
}

impl SnapshotElement {
    pub fn new(index: u32, handle: ElementHandle, capability: Capability) -> Self {
        Self {
            index,
            handle,
            capability,
            attributes: SemanticAttributes::default(),
        }
    }

    pub fn with_attributes(mut self, attributes: SemanticAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Short human-readable rendering used in log lines and prompts.
    pub fn describe(&self) -> String {
        let label = self
            .attributes
            .aria_label
            .as_deref()
            .or(self.attributes.placeholder.as_deref())
            .or(self.attributes.text.as_deref())
            .unwrap_or("");
        format!("[{}]<{}> {}", self.index, self.capability, normalize_text(label))
    }
}

/// Point-in-time enumeration of the document's interactive elements.
///
/// Snapshots are never patched; once the page may have changed the owner
/// discards the snapshot and asks the provider for a new one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSnapshot {
    pub id: SnapshotId,
    pub captured_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    elements: BTreeMap<u32, SnapshotElement>,
}

impl DocumentSnapshot {
    /// Build a snapshot, rejecting duplicate indices.
    pub fn new(
        url: Option<String>,
        elements: impl IntoIterator<Item = SnapshotElement>,
    ) -> Result<Self, CoreError> {
        let mut map = BTreeMap::new();
        for element in elements {
            let index = element.index;
            if map.insert(index, element).is_some() {
                return Err(CoreError::DuplicateIndex(index));
            }
        }
        Ok(Self {
            id: SnapshotId::new(),
            captured_at: Utc::now(),
            url,
            elements: map,
        })
    }

    pub fn empty() -> Self {
        Self {
            id: SnapshotId::new(),
            captured_at: Utc::now(),
            url: None,
            elements: BTreeMap::new(),
        }
    }

    pub fn get(&self, index: u32) -> Option<&SnapshotElement> {
        self.elements.get(&index)
    }

    /// Elements in ascending index order.
    pub fn elements(&self) -> impl Iterator<Item = &SnapshotElement> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Indexed tree in the `[i]<capability> label` form planners consume.
    pub fn render(&self) -> String {
        self.elements
            .values()
            .map(SnapshotElement::describe)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(index: u32, capability: Capability) -> SnapshotElement {
        SnapshotElement::new(index, ElementHandle::new(format!("node-{index}")), capability)
    }

    #[test]
    fn rejects_duplicate_indices() {
        let err = DocumentSnapshot::new(
            None,
            vec![element(1, Capability::Clickable), element(1, Capability::TextInput)],
        )
        .unwrap_err();
        assert_eq!(err, CoreError::DuplicateIndex(1));
    }

    #[test]
    fn elements_are_ordered_by_index() {
        let snapshot = DocumentSnapshot::new(
            None,
            vec![element(7, Capability::Clickable), element(2, Capability::TextInput)],
        )
        .unwrap();
        let indices: Vec<u32> = snapshot.elements().map(|e| e.index).collect();
        assert_eq!(indices, vec![2, 7]);
        assert!(snapshot.get(7).is_some());
        assert!(snapshot.get(3).is_none());
    }

    #[test]
    fn render_uses_first_available_label() {
        let input = element(0, Capability::TextInput)
            .with_attributes(SemanticAttributes::default().with_placeholder("  Search   mail "));
        let snapshot = DocumentSnapshot::new(None, vec![input]).unwrap();
        assert_eq!(snapshot.render(), "[0]<text-input> search mail");
    }
}
