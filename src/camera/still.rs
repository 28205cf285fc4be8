use super::VideoSource;
use crate::errors::{FaceCaptureError, Result};
use crate::types::{PixelLayout, SourceFrame};
use image::RgbImage;
use std::path::PathBuf;

/// Video source backed by a single still image, repeated on every grab.
pub struct StillImageSource {
    path: Option<PathBuf>,
    image: Option<RgbImage>,
    open: bool,
}

impl StillImageSource {
    /// Source that loads `path` when opened.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            image: None,
            open: false,
        }
    }

    /// Source over an already decoded image.
    pub fn from_image(image: RgbImage) -> Self {
        Self {
            path: None,
            image: Some(image),
            open: false,
        }
    }
}

impl VideoSource for StillImageSource {
    fn open(&mut self) -> Result<()> {
        if self.image.is_none() {
            let path = self
                .path
                .as_ref()
                .ok_or_else(|| FaceCaptureError::CameraUnavailable("no image configured".to_string()))?;
            let decoded = image::open(path).map_err(|e| {
                FaceCaptureError::CameraUnavailable(format!("cannot read {}: {}", path.display(), e))
            })?;
            self.image = Some(decoded.to_rgb8());
        }
        self.open = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<SourceFrame> {
        if !self.open {
            return Err(FaceCaptureError::CameraUnavailable("source not opened".to_string()));
        }
        let image = self
            .image
            .as_ref()
            .ok_or_else(|| FaceCaptureError::CameraUnavailable("image not loaded".to_string()))?;
        SourceFrame::new(image.as_raw().clone(), image.width(), image.height(), PixelLayout::Rgb8)
    }

    fn release(&mut self) -> Result<()> {
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => format!("still:{}", path.display()),
            None => "still:<memory>".to_string(),
        }
    }
}
