//! Visual Perceiver - Screenshot and vision-analysis ports for stuck-state escalation
//!
//! This crate provides:
//! - `ImageRef`, a captured screenshot with decoded dimensions
//! - the `ScreenshotSource` and `VisionAnalyzer` ports
//! - the context prompt sent alongside the screenshot
//! - an offline service that renders a placeholder image and canned advice

pub mod errors;
pub mod models;
pub mod offline;
pub mod prompt;
pub mod screenshot;
pub mod visual;

// Re-exports
pub use errors::VisualError;
pub use models::*;
pub use offline::OfflineVisualService;
pub use prompt::ContextPrompt;
pub use screenshot::{image_dimensions, ScreenshotSource};
pub use visual::VisionAnalyzer;
