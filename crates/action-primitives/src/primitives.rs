//! Action primitives implementation
//!
//! Targeted primitives (need a resolved element):
//! 1. click - dispatch activation
//! 2. type_text - focus + insert text
//! 3. select - set value from the enumerated option list
//!
//! Untargeted primitives: navigate, scroll, wait, send_keys.

mod click;
mod keys;
mod navigate;
mod scroll;
mod select;
mod type_text;
mod wait;

pub use click::*;
pub use keys::*;
pub use navigate::*;
pub use scroll::*;
pub use select::*;
pub use type_text::*;
pub use wait::*;

use std::sync::Arc;

use async_trait::async_trait;
use steadyhand_core_types::{ActionKind, ActionRequest, ResolvedElement};
use tracing::debug;

use crate::{
    driver::DocumentDriver,
    errors::ActionError,
    types::{ExecCtx, Interactability, RawResult},
};

/// Action executor trait
///
/// The executor only performs side effects. It reports failures it can
/// observe directly (detached, hidden/disabled, missing option) and never
/// checks whether the page kept the change.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Run a targeted primitive against a resolved element
    async fn execute(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
        element: &ResolvedElement,
    ) -> Result<RawResult, ActionError>;

    /// Run an untargeted primitive (navigate, scroll, wait, send_keys)
    async fn perform(&self, ctx: &ExecCtx, action: &ActionRequest)
        -> Result<RawResult, ActionError>;

    /// Re-apply a targeted action after its effect was not observed:
    /// re-click the element, then repeat the primitive. Appending input is
    /// retyped on top of `prior`, the value the field held before the
    /// first attempt.
    async fn reapply(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
        element: &ResolvedElement,
        prior: Option<&str>,
    ) -> Result<RawResult, ActionError>;

    /// Bring the element into view before a retry
    async fn reveal(&self, ctx: &ExecCtx, element: &ResolvedElement) -> Result<(), ActionError>;

    /// Read the element's observable value for verification
    async fn observe(
        &self,
        ctx: &ExecCtx,
        element: &ResolvedElement,
    ) -> Result<Option<String>, ActionError>;
}

/// Default implementation over a [`DocumentDriver`]
pub struct DefaultActionExecutor {
    driver: Arc<dyn DocumentDriver>,
}

impl DefaultActionExecutor {
    pub fn new(driver: Arc<dyn DocumentDriver>) -> Self {
        Self { driver }
    }

    pub fn driver(&self) -> &Arc<dyn DocumentDriver> {
        &self.driver
    }
}

#[async_trait]
impl ActionExecutor for DefaultActionExecutor {
    async fn execute(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
        element: &ResolvedElement,
    ) -> Result<RawResult, ActionError> {
        match &action.kind {
            ActionKind::Click => execute_click(&self.driver, ctx, element).await,
            ActionKind::TypeText { text, clear } => {
                execute_type_text(&self.driver, ctx, element, text, *clear).await
            }
            ActionKind::Select { option } => {
                execute_select(&self.driver, ctx, element, option).await
            }
            other => Err(ActionError::InvalidRequest(format!(
                "{} does not take a target element",
                other.name()
            ))),
        }
    }

    async fn perform(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
    ) -> Result<RawResult, ActionError> {
        match &action.kind {
            ActionKind::Navigate { url } => execute_navigate(&self.driver, ctx, url).await,
            ActionKind::Scroll { delta_y } => execute_scroll(&self.driver, ctx, *delta_y).await,
            ActionKind::Wait { millis } => execute_wait(ctx, *millis).await,
            ActionKind::SendKeys { keys } => execute_send_keys(&self.driver, ctx, keys).await,
            other => Err(ActionError::InvalidRequest(format!(
                "{} requires a resolved target",
                other.name()
            ))),
        }
    }

    async fn reapply(
        &self,
        ctx: &ExecCtx,
        action: &ActionRequest,
        element: &ResolvedElement,
        prior: Option<&str>,
    ) -> Result<RawResult, ActionError> {
        debug!(action_id = %ctx.action_id, index = element.index, "Re-applying action");
        match &action.kind {
            ActionKind::Click => execute_click(&self.driver, ctx, element).await,
            ActionKind::TypeText { text, clear } => {
                // A dropped keystroke burst usually means focus never landed;
                // re-click first, then retype from a known field value.
                execute_click(&self.driver, ctx, element).await?;
                let full = if *clear {
                    text.clone()
                } else {
                    format!("{}{}", prior.unwrap_or_default(), text)
                };
                execute_type_text(&self.driver, ctx, element, &full, true).await
            }
            ActionKind::Select { option } => {
                execute_select(&self.driver, ctx, element, option).await
            }
            other => Err(ActionError::InvalidRequest(format!(
                "{} cannot be re-applied",
                other.name()
            ))),
        }
    }

    async fn reveal(&self, ctx: &ExecCtx, element: &ResolvedElement) -> Result<(), ActionError> {
        check_context(ctx)?;
        self.driver
            .scroll_into_view(&element.handle)
            .await
            .map_err(ActionError::from)
    }

    async fn observe(
        &self,
        ctx: &ExecCtx,
        element: &ResolvedElement,
    ) -> Result<Option<String>, ActionError> {
        check_context(ctx)?;
        self.driver
            .read_value(&element.handle)
            .await
            .map_err(ActionError::from)
    }
}

/// Fail fast on cancelled or expired contexts
pub(crate) fn check_context(ctx: &ExecCtx) -> Result<(), ActionError> {
    if ctx.is_cancelled() {
        return Err(ActionError::Interrupted("Context cancelled".to_string()));
    }
    if ctx.is_timeout() {
        return Err(ActionError::Timeout("Context deadline exceeded".to_string()));
    }
    Ok(())
}

/// Attachment then interactability precheck for targeted primitives
pub(crate) async fn precheck(
    driver: &Arc<dyn DocumentDriver>,
    ctx: &ExecCtx,
    element: &ResolvedElement,
) -> Result<(), ActionError> {
    check_context(ctx)?;

    if !driver.is_attached(&element.handle).await? {
        return Err(ActionError::Detached(format!(
            "element [{}] ({}) is no longer attached",
            element.index, element.handle
        )));
    }

    match driver.interactability(&element.handle).await? {
        Interactability::Ready => Ok(()),
        Interactability::Hidden => Err(ActionError::NotInteractable(format!(
            "element [{}] is hidden",
            element.index
        ))),
        Interactability::Disabled => Err(ActionError::NotInteractable(format!(
            "element [{}] is disabled",
            element.index
        ))),
    }
}
