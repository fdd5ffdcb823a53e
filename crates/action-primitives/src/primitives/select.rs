//! Select primitive - choose from the element's enumerated options

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use steadyhand_core_types::{normalize_text, ResolvedElement};
use tracing::{debug, info};

use crate::{
    driver::DocumentDriver,
    errors::ActionError,
    primitives::precheck,
    types::{ExecCtx, PostSignals, RawResult},
};

/// Execute select primitive
///
/// The option list is enumerated first; a requested option that is not in
/// it fails with [`ActionError::OptionNotFound`] without touching the page.
pub async fn execute_select(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    element: &ResolvedElement,
    option: &str,
) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();

    info!(
        action_id = %ctx.action_id,
        index = element.index,
        option = %option,
        "Executing select primitive"
    );

    precheck(driver, ctx, element).await?;

    let options = driver.options(&element.handle).await?;
    let chosen = find_option(&options, option).ok_or_else(|| {
        ActionError::OptionNotFound(format!(
            "'{}' not among {} options of element [{}]",
            option,
            options.len(),
            element.index
        ))
    })?;

    debug!("Selecting option: {}", chosen);
    driver.select_option(&element.handle, chosen).await?;

    let latency_ms = start_instant.elapsed().as_millis() as u64;
    info!(
        action_id = %ctx.action_id,
        latency_ms = latency_ms,
        "Select completed"
    );

    Ok(RawResult::new(ctx.action_id.clone(), "select", started_at)
        .with_element(element.index, element.source)
        .with_signals(PostSignals::default())
        .with_latency(latency_ms))
}

/// Exact (case-insensitive) label match first, then a unique substring match
pub fn find_option<'a>(options: &'a [String], wanted: &str) -> Option<&'a str> {
    let wanted = normalize_text(wanted);
    if let Some(exact) = options.iter().find(|o| normalize_text(o) == wanted) {
        return Some(exact.as_str());
    }
    let mut partial = options
        .iter()
        .filter(|o| !wanted.is_empty() && normalize_text(o).contains(&wanted));
    match (partial.next(), partial.next()) {
        (Some(only), None) => Some(only.as_str()),
        _ => None,
    }
}
