//! Type text primitive - focus and insert text

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use steadyhand_core_types::ResolvedElement;
use tracing::{debug, info};

use crate::{
    driver::DocumentDriver,
    errors::ActionError,
    primitives::precheck,
    signals::{capture_overlays, derive_signals},
    types::{ExecCtx, RawResult},
};

/// Execute type_text primitive
///
/// Focuses the element and inserts `text`, optionally clearing the field
/// first. When appending, the field's value is read beforehand and
/// returned as [`RawResult::prior_value`]. Overlays are probed on both sides so an autocomplete list that the
/// input opened is reported to the caller.
pub async fn execute_type_text(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    element: &ResolvedElement,
    text: &str,
    clear: bool,
) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        index = element.index,
        source = %element.source,
        text_length = text.len(),
        clear = clear,
        "Executing type_text primitive"
    );

    precheck(driver, ctx, element).await?;

    let prior = if clear {
        None
    } else {
        driver.read_value(&element.handle).await?
    };
    let before = capture_overlays(driver).await;
    debug!("Focusing {}", element.handle);
    driver.focus(&element.handle).await?;
    debug!("Inserting {} characters", text.chars().count());
    driver.insert_text(&element.handle, text, clear).await?;
    let after = capture_overlays(driver).await;

    let signals = derive_signals(element, true, &before, &after);
    let latency_ms = start_instant.elapsed().as_millis() as u64;

    info!(
        action_id = %ctx.action_id,
        latency_ms = latency_ms,
        autocomplete = signals.autocomplete_detected,
        "Type text completed"
    );

    Ok(RawResult::new(ctx.action_id.clone(), "type_text", started_at)
        .with_element(element.index, element.source)
        .with_signals(signals)
        .with_latency(latency_ms)
        .with_prior_value(prior))
}
