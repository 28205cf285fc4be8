use super::VideoSource;
use crate::errors::{FaceCaptureError, Result};
use crate::types::{CameraFormat, PixelLayout, SourceFrame};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution},
    CallbackCamera,
};
use std::sync::{Arc, Mutex};

/// Live camera through nokhwa's native backend (V4L2, AVFoundation, Media Foundation).
pub struct NokhwaSource {
    device_index: u32,
    format: CameraFormat,
    camera: Option<Arc<Mutex<CallbackCamera>>>,
}

impl NokhwaSource {
    pub fn new(device_index: u32, format: CameraFormat) -> Self {
        Self {
            device_index,
            format,
            camera: None,
        }
    }

    fn requested_format(&self) -> RequestedFormat<'static> {
        let closest = nokhwa::utils::CameraFormat::new(
            Resolution::new(self.format.width, self.format.height),
            FrameFormat::MJPEG,
            self.format.fps.round().max(1.0) as u32,
        );
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(closest))
    }
}

/// Indexes of cameras the native backend can see.
pub fn list_device_indexes() -> Result<Vec<u32>> {
    let cameras = nokhwa::query(nokhwa::utils::ApiBackend::Auto)
        .map_err(|e| FaceCaptureError::CameraUnavailable(format!("Failed to query cameras: {}", e)))?;
    Ok(cameras
        .iter()
        .filter_map(|info| match info.index() {
            CameraIndex::Index(i) => Some(*i),
            CameraIndex::String(_) => None,
        })
        .collect())
}

impl VideoSource for NokhwaSource {
    fn open(&mut self) -> Result<()> {
        if self.camera.is_some() {
            return Ok(());
        }

        let mut camera = CallbackCamera::new(
            CameraIndex::Index(self.device_index),
            self.requested_format(),
            |_| {},
        )
        .map_err(|e| FaceCaptureError::CameraUnavailable(format!("Failed to initialize camera: {}", e)))?;

        camera
            .open_stream()
            .map_err(|e| FaceCaptureError::CameraUnavailable(format!("Failed to start stream: {}", e)))?;

        self.camera = Some(Arc::new(Mutex::new(camera)));
        Ok(())
    }

    fn grab(&mut self) -> Result<SourceFrame> {
        let camera = self
            .camera
            .as_ref()
            .ok_or_else(|| FaceCaptureError::CameraUnavailable("camera not opened".to_string()))?;
        let mut camera = camera
            .lock()
            .map_err(|_| FaceCaptureError::CameraUnavailable("Failed to lock camera".to_string()))?;

        let buffer = camera
            .poll_frame()
            .map_err(|e| FaceCaptureError::InvalidFrame(format!("Failed to capture frame: {}", e)))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| FaceCaptureError::InvalidFrame(format!("Failed to decode frame: {}", e)))?;

        let (width, height) = (decoded.width(), decoded.height());
        SourceFrame::new(decoded.into_raw(), width, height, PixelLayout::Rgb8)
    }

    fn release(&mut self) -> Result<()> {
        if let Some(camera) = self.camera.take() {
            let mut camera = camera
                .lock()
                .map_err(|_| FaceCaptureError::CameraUnavailable("Failed to lock camera".to_string()))?;
            camera
                .stop_stream()
                .map_err(|e| FaceCaptureError::CameraUnavailable(format!("Failed to stop stream: {}", e)))?;
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.camera
            .as_ref()
            .and_then(|c| c.lock().ok().map(|c| c.is_stream_open()))
            .unwrap_or(false)
    }

    fn describe(&self) -> String {
        format!(
            "native:{} ({}x{}@{})",
            self.device_index, self.format.width, self.format.height, self.format.fps
        )
    }
}
