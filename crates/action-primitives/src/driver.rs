//! Port to the live document.
//!
//! Whatever sits behind this trait (CDP, WebDriver, an extension bridge or
//! the in-memory document) owns the element handles that snapshots hand
//! out.

use async_trait::async_trait;
use steadyhand_core_types::ElementHandle;

use crate::{errors::DriverError, types::Interactability, types::OverlayProbe};

#[async_trait]
pub trait DocumentDriver: Send + Sync {
    async fn is_attached(&self, handle: &ElementHandle) -> Result<bool, DriverError>;

    async fn interactability(
        &self,
        handle: &ElementHandle,
    ) -> Result<Interactability, DriverError>;

    /// Dispatch activation on the element
    async fn click(&self, handle: &ElementHandle) -> Result<(), DriverError>;

    async fn focus(&self, handle: &ElementHandle) -> Result<(), DriverError>;

    /// Insert text at the focused element, optionally clearing it first
    async fn insert_text(
        &self,
        handle: &ElementHandle,
        text: &str,
        clear: bool,
    ) -> Result<(), DriverError>;

    /// Enumerated option labels of a selectable element
    async fn options(&self, handle: &ElementHandle) -> Result<Vec<String>, DriverError>;

    async fn select_option(&self, handle: &ElementHandle, option: &str)
        -> Result<(), DriverError>;

    /// Current value (inputs/selects) or state text of the element
    async fn read_value(&self, handle: &ElementHandle) -> Result<Option<String>, DriverError>;

    async fn scroll_into_view(&self, handle: &ElementHandle) -> Result<(), DriverError>;

    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn scroll_by(&self, delta_y: i32) -> Result<(), DriverError>;

    async fn send_keys(&self, keys: &str) -> Result<(), DriverError>;

    /// Visible autocomplete/dropdown overlays
    async fn probe_overlays(&self) -> Result<OverlayProbe, DriverError>;
}
