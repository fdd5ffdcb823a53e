//! Overlay signals captured around mutating primitives

use std::sync::Arc;

use steadyhand_core_types::ResolvedElement;
use tracing::{debug, info, warn};

use crate::{
    driver::DocumentDriver,
    types::{OverlayProbe, PostSignals},
};

/// Probe overlays, degrading to an empty census if the driver cannot
pub async fn capture_overlays(driver: &Arc<dyn DocumentDriver>) -> OverlayProbe {
    match driver.probe_overlays().await {
        Ok(probe) => probe,
        Err(err) => {
            warn!("failed to probe overlays: {}", err);
            OverlayProbe::default()
        }
    }
}

/// Compare overlay censuses taken before and after a primitive.
///
/// Autocomplete counts as detected when overlays appeared, or when a
/// combobox-like field shows a listbox/option/expanded marker afterwards.
pub fn derive_signals(
    element: &ResolvedElement,
    typed: bool,
    before: &OverlayProbe,
    after: &OverlayProbe,
) -> PostSignals {
    let overlays_before = before.count();
    let overlays_after = after.count();
    let dom_changed = overlays_before != overlays_after;

    let mut autocomplete_detected = false;
    if typed {
        if overlays_after > overlays_before {
            autocomplete_detected = true;
            info!(
                new_overlays = overlays_after - overlays_before,
                index = element.index,
                "Autocomplete detected after input"
            );
        } else if element.is_combobox_like()
            && after.markers.iter().any(|m| m.is_suggestion_marker())
        {
            autocomplete_detected = true;
            info!(index = element.index, "Autocomplete marker present on combobox");
        }
    }

    if dom_changed {
        debug!(
            overlays_before,
            overlays_after, "Overlay population changed; snapshot is stale"
        );
    }

    PostSignals {
        overlays_before,
        overlays_after,
        autocomplete_detected,
        dom_changed,
    }
}
