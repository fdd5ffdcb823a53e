//! Offline visual service
//!
//! Stands in for a real browser screenshot and a multimodal model: renders a
//! checkerboard PNG and answers with canned advice built from the prompt.
//! Used by the scenario runner and tests.

use std::io::Cursor;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use tracing::debug;

use crate::{
    errors::VisualError,
    models::{Advice, ImageRef},
    prompt::ContextPrompt,
    screenshot::ScreenshotSource,
    visual::VisionAnalyzer,
};

const MODEL_NAME: &str = "offline-placeholder";

/// Render a `width x height` checkerboard as PNG bytes
pub fn render_placeholder(width: u32, height: u32) -> Result<Vec<u8>, VisualError> {
    if width == 0 || height == 0 {
        return Err(VisualError::InvalidInput(format!(
            "placeholder size {}x{}",
            width, height
        )));
    }
    let image = RgbImage::from_fn(width, height, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgb([236, 236, 236])
        } else {
            Rgb([196, 196, 196])
        }
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

#[derive(Debug)]
pub struct OfflineVisualService {
    width: u32,
    height: u32,
    advice: Option<String>,
    captures: AtomicU32,
    analyses: AtomicU32,
}

impl Default for OfflineVisualService {
    fn default() -> Self {
        Self::new(320, 200)
    }
}

impl OfflineVisualService {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            advice: None,
            captures: AtomicU32::new(0),
            analyses: AtomicU32::new(0),
        }
    }

    /// Fixed advice text instead of the prompt-derived default
    pub fn with_advice(mut self, advice: impl Into<String>) -> Self {
        self.advice = Some(advice.into());
        self
    }

    pub fn captures(&self) -> u32 {
        self.captures.load(Ordering::SeqCst)
    }

    pub fn analyses(&self) -> u32 {
        self.analyses.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScreenshotSource for OfflineVisualService {
    async fn capture_screenshot(&self) -> Result<ImageRef, VisualError> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        let png = render_placeholder(self.width, self.height)?;
        let image = ImageRef::from_png_bytes(&png)?;
        debug!(id = %image.id, width = image.width, height = image.height, "Rendered placeholder screenshot");
        Ok(image)
    }
}

#[async_trait]
impl VisionAnalyzer for OfflineVisualService {
    async fn analyze_image(
        &self,
        image: &ImageRef,
        prompt: &ContextPrompt,
    ) -> Result<Advice, VisualError> {
        self.analyses.fetch_add(1, Ordering::SeqCst);
        if image.data_base64.is_empty() {
            return Err(VisualError::InvalidInput("image has no data".to_string()));
        }
        let text = match &self.advice {
            Some(advice) => advice.clone(),
            None => format!(
                "No visual model is attached. Reported failure: {}. \
                 Take a fresh snapshot, check for overlays or dialogs covering the target, \
                 and try a different element or approach.",
                prompt.failure_reason
            ),
        };
        Ok(Advice::new(text).with_model(MODEL_NAME))
    }
}
