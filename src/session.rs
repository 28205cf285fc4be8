//! Verification screen session.
//!
//! Holds the camera for the lifetime of the screen, runs at most one
//! capture at a time, and dispatches validated descriptors to the
//! verification server. Camera calls run on the blocking pool.

use crate::camera::{CameraLease, VideoSource};
use crate::detector::{FaceDetector, ModelGate};
use crate::errors::{FaceCaptureError, Result};
use crate::validator::{FaceCaptureValidator, ValidatedCapture};
use crate::verify::{FaceVerifier, VerifiedUser};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

/// Per-session capture settings.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub target_width: u32,
    pub detect_timeout: Option<Duration>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            target_width: crate::raster::DEFAULT_TARGET_WIDTH,
            detect_timeout: None,
        }
    }
}

impl From<&crate::config::CaptureConfig> for SessionOptions {
    fn from(config: &crate::config::CaptureConfig) -> Self {
        Self {
            target_width: config.target_width,
            detect_timeout: config.timeout_ms.map(Duration::from_millis),
        }
    }
}

/// One successful capture.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub attempt_id: Uuid,
    pub captured_at: DateTime<Utc>,
    #[serde(flatten)]
    pub capture: ValidatedCapture,
}

/// Result of a face login. The descriptor is not kept.
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub attempt_id: Uuid,
    pub identifier: String,
    pub user: Option<VerifiedUser>,
    pub luminance: f32,
    pub face_ratio: f32,
    pub completed_at: DateTime<Utc>,
}

pub struct FaceCaptureSession {
    id: Uuid,
    camera: Arc<Mutex<CameraLease>>,
    /// Held for the duration of one capture or login.
    in_flight: tokio::sync::Mutex<()>,
    validator: FaceCaptureValidator,
    detector: Arc<dyn FaceDetector>,
    verifier: Arc<dyn FaceVerifier>,
    models: ModelGate,
    closed: AtomicBool,
}

impl FaceCaptureSession {
    /// Acquire the camera and set up the capture pipeline.
    pub async fn open(
        source: Box<dyn VideoSource>,
        detector: Arc<dyn FaceDetector>,
        verifier: Arc<dyn FaceVerifier>,
        options: SessionOptions,
    ) -> Result<Self> {
        let camera = tokio::task::spawn_blocking(move || CameraLease::acquire(source))
            .await
            .map_err(|e| FaceCaptureError::CameraUnavailable(format!("Task join error: {}", e)))??;
        let id = Uuid::new_v4();
        log::info!(
            "Opened face capture session {} on {} (width={}, timeout={:?})",
            id,
            camera.label(),
            options.target_width,
            options.detect_timeout
        );

        let validator = FaceCaptureValidator::new(detector.clone())
            .with_target_width(options.target_width)
            .with_detect_timeout(options.detect_timeout);

        Ok(Self {
            id,
            camera: Arc::new(Mutex::new(camera)),
            in_flight: tokio::sync::Mutex::new(()),
            validator,
            detector,
            verifier,
            models: ModelGate::new(),
            closed: AtomicBool::new(false),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn models_ready(&self) -> bool {
        self.models.is_ready()
    }

    /// True while a capture or login is running.
    pub fn is_capturing(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Load the face models ahead of the first capture.
    pub async fn prepare(&self) -> Result<()> {
        self.models.ensure(self.detector.as_ref()).await
    }

    fn check_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(FaceCaptureError::CameraUnavailable(format!(
                "session {} is closed",
                self.id
            )));
        }
        Ok(())
    }

    async fn capture_with(&self, attempt_id: Uuid) -> Result<CaptureReport> {
        self.models.ensure(self.detector.as_ref()).await?;

        let camera = self.camera.clone();
        let source = tokio::task::spawn_blocking(move || {
            let mut lease = camera
                .lock()
                .map_err(|_| FaceCaptureError::CameraUnavailable("Mutex poisoned".to_string()))?;
            lease.grab()
        })
        .await
        .map_err(|e| FaceCaptureError::CameraUnavailable(format!("Task join error: {}", e)))??;

        log::debug!(
            "Attempt {}: grabbed {}x{} source frame",
            attempt_id,
            source.width,
            source.height
        );
        let captured_at = source.captured_at;

        let capture = self.validator.validate_source(source).await?;
        Ok(CaptureReport {
            attempt_id,
            captured_at,
            capture,
        })
    }

    /// Capture and validate one frame without contacting the server.
    pub async fn capture_descriptor(&self) -> Result<CaptureReport> {
        self.check_open()?;
        let _attempt = self
            .in_flight
            .try_lock()
            .map_err(|_| FaceCaptureError::CaptureInProgress)?;

        let attempt_id = Uuid::new_v4();
        let result = self.capture_with(attempt_id).await;
        if let Err(e) = &result {
            log::warn!("Attempt {} failed: {}", attempt_id, e);
        }
        result
    }

    /// Capture a face and log `identifier` in with it.
    pub async fn login(&self, identifier: &str) -> Result<LoginOutcome> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(FaceCaptureError::MissingIdentifier);
        }
        self.check_open()?;
        let _attempt = self
            .in_flight
            .try_lock()
            .map_err(|_| FaceCaptureError::CaptureInProgress)?;

        let attempt_id = Uuid::new_v4();
        log::info!("Attempt {}: face login started", attempt_id);

        let report = match self.capture_with(attempt_id).await {
            Ok(report) => report,
            Err(e) => {
                log::warn!("Attempt {} failed before dispatch: {}", attempt_id, e);
                return Err(e);
            }
        };

        let user = self
            .verifier
            .verify(identifier, &report.capture.descriptor)
            .await?;

        log::info!("Attempt {}: face login succeeded", attempt_id);
        Ok(LoginOutcome {
            attempt_id,
            identifier: identifier.to_string(),
            user,
            luminance: report.capture.luminance,
            face_ratio: report.capture.face_ratio,
            completed_at: Utc::now(),
        })
    }

    /// Release the camera, waiting for an in-flight attempt to finish.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        let _attempt = self.in_flight.lock().await;
        let camera = self.camera.clone();
        let released = tokio::task::spawn_blocking(move || {
            if let Ok(mut lease) = camera.lock() {
                lease.release();
            }
        })
        .await;
        if let Err(e) = released {
            log::warn!("Camera release task failed: {}", e);
        }
        log::info!("Closed face capture session {}", self.id);
    }
}
