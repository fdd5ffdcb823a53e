//! Send keys primitive - key presses to whatever currently has focus

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

pub async fn execute_send_keys(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    keys: &str,
) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();
    check_context(ctx)?;

    if keys.is_empty() {
        return Err(ActionError::InvalidRequest("Keys cannot be empty".to_string()));
    }

    info!(action_id = %ctx.action_id, keys = %keys, "Executing send_keys primitive");
    driver.send_keys(keys).await?;

    Ok(RawResult::new(ctx.action_id.clone(), "send_keys", started_at)
        .with_latency(start_instant.elapsed().as_millis() as u64))
}
