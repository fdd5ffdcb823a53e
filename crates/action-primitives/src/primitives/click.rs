//! Click primitive - dispatch activation on a resolved element

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

/// Execute click primitive
///
/// Steps:
/// 1. Check context, attachment and interactability
/// 2. Probe overlays
/// 3. Dispatch click
/// 4. Probe overlays again and derive post-signals
pub async fn execute_click(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    element: &ResolvedElement,
) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        index = element.index,
        source = %element.source,
        "Executing click primitive"
    );

    precheck(driver, ctx, element).await?;

    let before = capture_overlays(driver).await;
    debug!("Dispatching click on {}", element.handle);
    driver.click(&element.handle).await?;
    let after = capture_overlays(driver).await;

    let signals = derive_signals(element, false, &before, &after);
    let latency_ms = start_instant.elapsed().as_millis() as u64;

    info!(
        action_id = %ctx.action_id,
        latency_ms = latency_ms,
        dom_changed = signals.dom_changed,
        "Click completed"
    );

    Ok(RawResult::new(ctx.action_id.clone(), "click", started_at)
        .with_element(element.index, element.source)
        .with_signals(signals)
        .with_latency(latency_ms))
}
