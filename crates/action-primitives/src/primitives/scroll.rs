//! Scroll primitive - page scroll by a vertical delta

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::info;

use crate::{
    driver::DocumentDriver,
    errors::ActionError,
    primitives::check_context,
    types::{ExecCtx, RawResult},
};

pub async fn execute_scroll(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    delta_y: i32,
) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();
    check_context(ctx)?;

    info!(action_id = %ctx.action_id, delta_y, "Executing scroll primitive");
    driver.scroll_by(delta_y).await?;

    Ok(RawResult::new(ctx.action_id.clone(), "scroll", started_at)
        .with_latency(start_instant.elapsed().as_millis() as u64))
}
