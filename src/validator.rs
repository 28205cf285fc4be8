//! The face capture validation pipeline.
//!
//! grab -> lighting -> detect -> face size -> descriptor. Each stage ends
//! the attempt on failure; nothing here touches the network.

use crate::detector::FaceDetector;
use crate::errors::{FaceCaptureError, Result};
use crate::quality::{check_face_size, check_lighting};
use crate::raster::{grab_frame, DEFAULT_TARGET_WIDTH};
use crate::types::{BoundingBox, FaceDescriptor, FrameBuffer, SourceFrame};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// A descriptor that passed every check, with the measurements that let it through.
#[derive(Debug, Clone, Serialize)]
pub struct ValidatedCapture {
    pub descriptor: FaceDescriptor,
    pub luminance: f32,
    pub face_ratio: f32,
    pub bounding_box: BoundingBox,
    pub frame_width: u32,
    pub frame_height: u32,
}

pub struct FaceCaptureValidator {
    detector: Arc<dyn FaceDetector>,
    target_width: u32,
    detect_timeout: Option<Duration>,
}

impl FaceCaptureValidator {
    pub fn new(detector: Arc<dyn FaceDetector>) -> Self {
        Self {
            detector,
            target_width: DEFAULT_TARGET_WIDTH,
            detect_timeout: None,
        }
    }

    pub fn with_target_width(mut self, target_width: u32) -> Self {
        self.target_width = target_width;
        self
    }

    /// Bound the detection call. Unbounded by default.
    pub fn with_detect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.detect_timeout = timeout;
        self
    }

    /// Resample a native frame to the target width and validate it.
    ///
    /// The resample runs on the blocking pool.
    pub async fn validate_source(&self, source: SourceFrame) -> Result<ValidatedCapture> {
        let target_width = self.target_width;
        let frame = tokio::task::spawn_blocking(move || grab_frame(&source, target_width))
            .await
            .map_err(|e| FaceCaptureError::InvalidFrame(format!("Task join error: {}", e)))??;
        self.validate_frame(frame).await
    }

    /// Validate an already grabbed raster. The buffer is dropped after detection.
    pub async fn validate_frame(&self, frame: FrameBuffer) -> Result<ValidatedCapture> {
        let (width, height) = (frame.width(), frame.height());

        let luminance = check_lighting(&frame)?;

        let detection = match self.detect_timeout {
            Some(limit) => tokio::time::timeout(limit, self.detector.detect(&frame))
                .await
                .map_err(|_| FaceCaptureError::Timeout(limit))??,
            None => self.detector.detect(&frame).await?,
        };
        drop(frame);

        let detection = detection.ok_or(FaceCaptureError::NoFaceDetected)?;
        let face_ratio = check_face_size(&detection.bounding_box, width, height)?;
        let descriptor = detection
            .descriptor
            .ok_or(FaceCaptureError::DescriptorUnavailable)?;

        log::info!(
            "Face validated: luminance={:.1}, face_ratio={:.3}, frame={}x{}",
            luminance,
            face_ratio,
            width,
            height
        );

        Ok(ValidatedCapture {
            descriptor,
            luminance,
            face_ratio,
            bounding_box: detection.bounding_box,
            frame_width: width,
            frame_height: height,
        })
    }
}
