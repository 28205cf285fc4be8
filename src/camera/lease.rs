use super::VideoSource;
use crate::errors::{FaceCaptureError, Result};
use crate::types::SourceFrame;

/// Open video source that is released when the lease goes away.
pub struct CameraLease {
    source: Option<Box<dyn VideoSource>>,
    label: String,
}

impl CameraLease {
    /// Open `source` and hold it until [`release`](Self::release) or drop.
    pub fn acquire(mut source: Box<dyn VideoSource>) -> Result<Self> {
        let label = source.describe();
        source.open().map_err(|e| match e {
            FaceCaptureError::CameraUnavailable(msg) => FaceCaptureError::CameraUnavailable(msg),
            other => FaceCaptureError::CameraUnavailable(other.to_string()),
        })?;
        log::info!("Acquired camera {}", label);
        Ok(Self {
            source: Some(source),
            label,
        })
    }

    pub fn grab(&mut self) -> Result<SourceFrame> {
        let source = self.source.as_mut().ok_or_else(|| {
            FaceCaptureError::CameraUnavailable(format!("camera {} already released", self.label))
        })?;
        source.grab()
    }

    pub fn is_held(&self) -> bool {
        self.source.as_ref().map(|s| s.is_open()).unwrap_or(false)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Release the device. Calling it again is a no-op.
    pub fn release(&mut self) {
        if let Some(mut source) = self.source.take() {
            match source.release() {
                Ok(()) => log::info!("Released camera {}", self.label),
                Err(e) => log::warn!("Error releasing camera {}: {}", self.label, e),
            }
        }
    }
}

impl Drop for CameraLease {
    fn drop(&mut self) {
        self.release();
    }
}
