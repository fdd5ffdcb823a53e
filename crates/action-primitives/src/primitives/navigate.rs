//! Navigate primitive

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

pub async fn execute_navigate(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    url: &str,
) -> Result<RawResult, ActionError> {
    let started_at = Utc::now();
    let start_instant = Instant::now();
    check_context(ctx)?;

    if url.trim().is_empty() {
        return Err(ActionError::InvalidRequest("URL cannot be empty".to_string()));
    }

    info!(action_id = %ctx.action_id, url = %url, "Executing navigate primitive");
    driver.navigate(url).await?;

    Ok(RawResult::new(ctx.action_id.clone(), "navigate", started_at)
        .with_latency(start_instant.elapsed().as_millis() as u64))
}
