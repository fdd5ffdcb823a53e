//! Vision analysis port
use async_trait::async_trait;

use crate::{errors::VisualError, models::Advice, models::ImageRef, prompt::ContextPrompt};

/// Multimodal analysis of a screenshot plus context.
///
/// The returned advice is advisory text for the planner; it is never
/// executed directly.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    async fn analyze_image(
        &self,
        image: &ImageRef,
        prompt: &ContextPrompt,
    ) -> Result<Advice, VisualError>;
}
