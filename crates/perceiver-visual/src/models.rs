//! Data models for visual escalation

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{errors::VisualError, screenshot::image_dimensions};

/// Image format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
}

/// A captured screenshot, carried base64-encoded so it can be handed to a
/// vision service or logged as-is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub id: String,
    pub captured_at: DateTime<Utc>,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub data_base64: String,
}

impl ImageRef {
    /// Wrap encoded PNG bytes, decoding dimensions from the header
    pub fn from_png_bytes(data: &[u8]) -> Result<Self, VisualError> {
        if data.is_empty() {
            return Err(VisualError::InvalidInput("empty screenshot".to_string()));
        }
        let (width, height) = image_dimensions(data)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            captured_at: Utc::now(),
            format: ImageFormat::Png,
            width,
            height,
            data_base64: STANDARD.encode(data),
        })
    }

    /// Stable reference used in events and logs
    pub fn reference(&self) -> String {
        format!("screenshot:{}", self.id)
    }

    pub fn bytes(&self) -> Result<Vec<u8>, VisualError> {
        STANDARD
            .decode(&self.data_base64)
            .map_err(|e| VisualError::ImageProcessing(format!("invalid base64: {}", e)))
    }
}

/// Natural-language guidance returned by the vision service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl Advice {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}
