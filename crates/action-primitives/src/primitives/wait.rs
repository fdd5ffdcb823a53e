//! Wait primitive - cancellable fixed delay

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    errors::ActionError,
    primitives::check_context,
    types::{ExecCtx, RawResult},
};

pub async fn execute_wait(ctx: &ExecCtx, millis: u64) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();
    check_context(ctx)?;

    let wanted = Duration::from_millis(millis);
    if wanted > ctx.remaining_time() {
        return Err(ActionError::Timeout(format!(
            "wait of {}ms exceeds remaining budget",
            millis
        )));
    }

    info!(action_id = %ctx.action_id, millis, "Executing wait primitive");
    tokio::select! {
        _ = tokio::time::sleep(wanted) => {}
        _ = ctx.cancel_token.cancelled() => {
            debug!(action_id = %ctx.action_id, "Wait interrupted");
            return Err(ActionError::Interrupted("Wait cancelled".to_string()));
        }
    }

    Ok(RawResult::new(ctx.action_id.clone(), "wait", started_at)
        .with_latency(start_instant.elapsed().as_millis() as u64))
}
