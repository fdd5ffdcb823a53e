//! Deterministic in-memory document.
//!
//! Backs tests and the scenario runner. It behaves like a small page whose
//! interactive elements are kept in document order; snapshot indices are
//! positions among attached elements, so inserting an overlay shifts every
//! index after it exactly like a live page does. Misbehaviour (swallowed
//! input, overlays revealed by typing) is scripted through [`Glitch`].

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use steadyhand_core_types::{
    Capability, CoreError, DocumentSnapshot, ElementHandle, SemanticAttributes, SnapshotElement,
};
use tracing::debug;

use crate::{
    driver::DocumentDriver,
    errors::DriverError,
    types::{Interactability, OverlayMarker, OverlayProbe},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryElement {
    pub handle: ElementHandle,
    pub capability: Capability,
    #[serde(default)]
    pub attributes: SemanticAttributes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl MemoryElement {
    pub fn new(handle: impl Into<String>, capability: Capability) -> Self {
        Self {
            handle: ElementHandle::new(handle),
            capability,
            attributes: SemanticAttributes::default(),
            value: None,
            options: Vec::new(),
            visible: true,
            enabled: true,
        }
    }

    pub fn with_attributes(mut self, attributes: SemanticAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// Scripted page misbehaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Glitch {
    /// The next `count` text insertions into `handle` are silently dropped
    SwallowInputs { handle: ElementHandle, count: u32 },
    /// The next `count` text insertions are undone by a re-render before the
    /// value can be read
    ResetOnRender { handle: ElementHandle, count: u32 },
    /// First input into `handle` inserts `elements` right after it and shows
    /// `markers` as overlays (an autocomplete dropdown)
    RevealOnInput {
        handle: ElementHandle,
        elements: Vec<MemoryElement>,
        #[serde(default)]
        markers: Vec<OverlayMarker>,
    },
    /// First click on `handle` inserts `elements` right after it
    RevealOnClick {
        handle: ElementHandle,
        elements: Vec<MemoryElement>,
        #[serde(default)]
        markers: Vec<OverlayMarker>,
    },
}

/// Number of driver calls, by operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallCounters {
    pub clicks: u32,
    pub focuses: u32,
    pub inserts: u32,
    pub selects: u32,
    pub reads: u32,
    pub reveals: u32,
    pub navigations: u32,
    pub scrolls: u32,
    pub key_presses: u32,
}

#[derive(Debug, Default)]
struct DocState {
    url: Option<String>,
    elements: Vec<MemoryElement>,
    detached: HashSet<ElementHandle>,
    overlays: Vec<OverlayMarker>,
    swallow: HashMap<ElementHandle, u32>,
    reset: HashMap<ElementHandle, u32>,
    reveal_on_input: HashMap<ElementHandle, (Vec<MemoryElement>, Vec<OverlayMarker>)>,
    reveal_on_click: HashMap<ElementHandle, (Vec<MemoryElement>, Vec<OverlayMarker>)>,
    calls: CallCounters,
    scroll_y: i64,
    keys: Vec<String>,
}

impl DocState {
    fn position(&self, handle: &ElementHandle) -> Result<usize, DriverError> {
        if self.detached.contains(handle) {
            return Err(DriverError::Detached(handle.clone()));
        }
        self.elements
            .iter()
            .position(|e| &e.handle == handle)
            .ok_or_else(|| DriverError::Detached(handle.clone()))
    }

    fn element_mut(&mut self, handle: &ElementHandle) -> Result<&mut MemoryElement, DriverError> {
        let pos = self.position(handle)?;
        Ok(&mut self.elements[pos])
    }

    fn reveal(
        &mut self,
        after: &ElementHandle,
        elements: Vec<MemoryElement>,
        markers: Vec<OverlayMarker>,
    ) {
        if let Ok(pos) = self.position(after) {
            debug!(after = %after, inserted = elements.len(), "Revealing overlay elements");
            for (offset, element) in elements.into_iter().enumerate() {
                self.elements.insert(pos + 1 + offset, element);
            }
        }
        self.overlays.extend(markers);
    }
}

/// In-memory implementation of [`DocumentDriver`]
#[derive(Debug, Default)]
pub struct MemoryDocument {
    state: Mutex<DocState>,
}

impl MemoryDocument {
    pub fn new(url: Option<String>) -> Self {
        Self {
            state: Mutex::new(DocState {
                url,
                ..DocState::default()
            }),
        }
    }

    pub fn with_elements(url: Option<String>, elements: Vec<MemoryElement>) -> Self {
        let doc = Self::new(url);
        doc.state.lock().elements = elements;
        doc
    }

    pub fn push(&self, element: MemoryElement) {
        self.state.lock().elements.push(element);
    }

    /// Insert `element` at document position `position` (clamped)
    pub fn insert(&self, position: usize, element: MemoryElement) {
        let mut state = self.state.lock();
        let position = position.min(state.elements.len());
        state.elements.insert(position, element);
    }

    pub fn glitch(&self, glitch: Glitch) {
        let mut state = self.state.lock();
        match glitch {
            Glitch::SwallowInputs { handle, count } => {
                state.swallow.insert(handle, count);
            }
            Glitch::ResetOnRender { handle, count } => {
                state.reset.insert(handle, count);
            }
            Glitch::RevealOnInput {
                handle,
                elements,
                markers,
            } => {
                state.reveal_on_input.insert(handle, (elements, markers));
            }
            Glitch::RevealOnClick {
                handle,
                elements,
                markers,
            } => {
                state.reveal_on_click.insert(handle, (elements, markers));
            }
        }
    }

    pub fn detach(&self, handle: &ElementHandle) {
        self.state.lock().detached.insert(handle.clone());
    }

    pub fn set_visible(&self, handle: &ElementHandle, visible: bool) {
        if let Ok(element) = self.state.lock().element_mut(handle) {
            element.visible = visible;
        }
    }

    pub fn set_enabled(&self, handle: &ElementHandle, enabled: bool) {
        if let Ok(element) = self.state.lock().element_mut(handle) {
            element.enabled = enabled;
        }
    }

    pub fn set_value(&self, handle: &ElementHandle, value: Option<String>) {
        if let Ok(element) = self.state.lock().element_mut(handle) {
            element.value = value;
        }
    }

    pub fn value_of(&self, handle: &ElementHandle) -> Option<String> {
        let state = self.state.lock();
        state
            .elements
            .iter()
            .find(|e| &e.handle == handle)
            .and_then(|e| e.value.clone())
    }

    pub fn calls(&self) -> CallCounters {
        self.state.lock().calls.clone()
    }

    pub fn url(&self) -> Option<String> {
        self.state.lock().url.clone()
    }

    pub fn scroll_y(&self) -> i64 {
        self.state.lock().scroll_y
    }

    pub fn pressed_keys(&self) -> Vec<String> {
        self.state.lock().keys.clone()
    }

    /// Enumerate attached elements in document order
    pub fn snapshot(&self) -> Result<DocumentSnapshot, CoreError> {
        let state = self.state.lock();
        let elements = state
            .elements
            .iter()
            .filter(|e| !state.detached.contains(&e.handle))
            .enumerate()
            .map(|(index, e)| {
                SnapshotElement::new(index as u32, e.handle.clone(), e.capability)
                    .with_attributes(e.attributes.clone())
            })
            .collect::<Vec<_>>();
        DocumentSnapshot::new(state.url.clone(), elements)
    }
}

#[async_trait]
impl DocumentDriver for MemoryDocument {
    async fn is_attached(&self, handle: &ElementHandle) -> Result<bool, DriverError> {
        Ok(self.state.lock().position(handle).is_ok())
    }

    async fn interactability(
        &self,
        handle: &ElementHandle,
    ) -> Result<Interactability, DriverError> {
        let mut state = self.state.lock();
        let element = state.element_mut(handle)?;
        Ok(if !element.visible {
            Interactability::Hidden
        } else if !element.enabled {
            Interactability::Disabled
        } else {
            Interactability::Ready
        })
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.position(handle)?;
        state.calls.clicks += 1;
        if let Some((elements, markers)) = state.reveal_on_click.remove(handle) {
            state.reveal(handle, elements, markers);
        }
        Ok(())
    }

    async fn focus(&self, handle: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.position(handle)?;
        state.calls.focuses += 1;
        Ok(())
    }

    async fn insert_text(
        &self,
        handle: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.position(handle)?;
        state.calls.inserts += 1;

        if let Some(remaining) = state.swallow.get_mut(handle) {
            if *remaining > 0 {
                *remaining -= 1;
                debug!(handle = %handle, "Input swallowed by page");
                return Ok(());
            }
        }

        let reset = match state.reset.get_mut(handle) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        };

        let element = state.element_mut(handle)?;
        if element.capability != Capability::TextInput {
            return Err(DriverError::Unsupported(format!(
                "{} does not accept text",
                handle
            )));
        }
        if reset {
            debug!(handle = %handle, "Input reset by re-render");
            element.value = Some(String::new());
        } else if clear {
            element.value = Some(text.to_string());
        } else {
            let mut current = element.value.take().unwrap_or_default();
            current.push_str(text);
            element.value = Some(current);
        }

        if let Some((elements, markers)) = state.reveal_on_input.remove(handle) {
            state.reveal(handle, elements, markers);
        }
        Ok(())
    }

    async fn options(&self, handle: &ElementHandle) -> Result<Vec<String>, DriverError> {
        let mut state = self.state.lock();
        Ok(state.element_mut(handle)?.options.clone())
    }

    async fn select_option(
        &self,
        handle: &ElementHandle,
        option: &str,
    ) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.selects += 1;
        let element = state.element_mut(handle)?;
        if !element.options.iter().any(|o| o == option) {
            return Err(DriverError::OptionMissing(option.to_string()));
        }
        element.value = Some(option.to_string());
        Ok(())
    }

    async fn read_value(&self, handle: &ElementHandle) -> Result<Option<String>, DriverError> {
        let mut state = self.state.lock();
        state.calls.reads += 1;
        let element = state.element_mut(handle)?;
        Ok(match element.capability {
            Capability::Clickable => element
                .value
                .clone()
                .or_else(|| element.attributes.text.clone()),
            _ => element.value.clone(),
        })
    }

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.reveals += 1;
        let element = state.element_mut(handle)?;
        // Off-screen elements become visible once scrolled to.
        element.visible = true;
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.navigations += 1;
        state.url = Some(url.to_string());
        Ok(())
    }

    async fn scroll_by(&self, delta_y: i32) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.scrolls += 1;
        state.scroll_y = (state.scroll_y + delta_y as i64).max(0);
        Ok(())
    }

    async fn send_keys(&self, keys: &str) -> Result<(), DriverError> {
        let mut state = self.state.lock();
        state.calls.key_presses += 1;
        state.keys.push(keys.to_string());
        Ok(())
    }

    async fn probe_overlays(&self) -> Result<OverlayProbe, DriverError> {
        Ok(OverlayProbe {
            markers: self.state.lock().overlays.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_indices_shift_when_overlay_inserted() {
        let doc = MemoryDocument::with_elements(
            None,
            vec![
                MemoryElement::new("to", Capability::TextInput),
                MemoryElement::new("subject", Capability::TextInput),
            ],
        );
        assert_eq!(doc.snapshot().unwrap().get(1).unwrap().handle.0, "subject");

        doc.insert(1, MemoryElement::new("suggestion", Capability::Clickable));
        let snapshot = doc.snapshot().unwrap();
        assert_eq!(snapshot.get(1).unwrap().handle.0, "suggestion");
        assert_eq!(snapshot.get(2).unwrap().handle.0, "subject");
    }

    #[tokio::test]
    async fn swallowed_inputs_leave_value_untouched() {
        let handle = ElementHandle::new("q");
        let doc = MemoryDocument::with_elements(
            None,
            vec![MemoryElement::new("q", Capability::TextInput)],
        );
        doc.glitch(Glitch::SwallowInputs {
            handle: handle.clone(),
            count: 1,
        });
        doc.insert_text(&handle, "rust", true).await.unwrap();
        assert_eq!(doc.value_of(&handle), None);
        doc.insert_text(&handle, "rust", true).await.unwrap();
        assert_eq!(doc.value_of(&handle).as_deref(), Some("rust"));
        assert_eq!(doc.calls().inserts, 2);
    }

    #[tokio::test]
    async fn detached_elements_reject_operations() {
        let handle = ElementHandle::new("btn");
        let doc = MemoryDocument::with_elements(
            None,
            vec![MemoryElement::new("btn", Capability::Clickable)],
        );
        doc.detach(&handle);
        assert!(!doc.is_attached(&handle).await.unwrap());
        assert_eq!(
            doc.click(&handle).await,
            Err(DriverError::Detached(handle.clone()))
        );
        assert!(doc.snapshot().unwrap().is_empty());
    }
}
