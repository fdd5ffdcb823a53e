//! Error types for visual escalation
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisualError {
    /// Screenshot capture failed
    CaptureFailed(String),

    /// Image processing error
    ImageProcessing(String),

    /// Vision service did not produce advice
    AnalysisFailed(String),

    /// Invalid input parameters
    InvalidInput(String),
}

impl VisualError {
    /// Capture and analysis are worth one more try; bad input is not
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CaptureFailed(_) | Self::AnalysisFailed(_))
    }
}

impl fmt::Display for VisualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CaptureFailed(msg) => write!(f, "Screenshot capture failed: {}", msg),
            Self::ImageProcessing(msg) => write!(f, "Image processing error: {}", msg),
            Self::AnalysisFailed(msg) => write!(f, "Vision analysis failed: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for VisualError {}

impl From<image::ImageError> for VisualError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing(err.to_string())
    }
}
