//! Screenshot port
use async_trait::async_trait;
use image::io::Reader as ImageReader;
use std::io::Cursor;

use crate::{errors::VisualError, models::ImageRef};

/// Source of viewport screenshots
#[async_trait]
pub trait ScreenshotSource: Send + Sync {
    async fn capture_screenshot(&self) -> Result<ImageRef, VisualError>;
}

/// Get image dimensions from encoded data
pub fn image_dimensions(data: &[u8]) -> Result<(u32, u32), VisualError> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| VisualError::ImageProcessing(format!("Format detection failed: {}", e)))?
        .into_dimensions()
        .map_err(|e| VisualError::ImageProcessing(format!("Image decode failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offline::render_placeholder;

    #[test]
    fn dimensions_round_trip_through_png() {
        let png = render_placeholder(32, 16).unwrap();
        assert_eq!(image_dimensions(&png).unwrap(), (32, 16));

        let image = ImageRef::from_png_bytes(&png).unwrap();
        assert_eq!((image.width, image.height), (32, 16));
        assert_eq!(image.bytes().unwrap(), png);
        assert!(image.reference().starts_with("screenshot:"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(image_dimensions(b"not an image").is_err());
        assert!(matches!(
            ImageRef::from_png_bytes(&[]),
            Err(VisualError::InvalidInput(_))
        ));
    }
}
