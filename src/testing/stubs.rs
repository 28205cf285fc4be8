//! In-memory stand-ins for the external collaborators.

use crate::camera::VideoSource;
use crate::detector::FaceDetector;
use crate::errors::{FaceCaptureError, Result};
use crate::types::{BoundingBox, Detection, FaceDescriptor, FrameBuffer, SourceFrame};
use crate::verify::{FaceVerifier, VerifiedUser};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Counters shared with a [`ScriptedSource`] after it has been boxed.
#[derive(Debug, Clone, Default)]
pub struct SourceProbe {
    opens: Arc<AtomicUsize>,
    grabs: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

impl SourceProbe {
    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn grabs(&self) -> usize {
        self.grabs.load(Ordering::SeqCst)
    }

    pub fn releases(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

/// Video source that returns the same frame on every grab.
pub struct ScriptedSource {
    frame: SourceFrame,
    open_error: Option<String>,
    grab_delay: Option<Duration>,
    open: bool,
    probe: SourceProbe,
}

impl ScriptedSource {
    pub fn new(frame: SourceFrame) -> Self {
        Self {
            frame,
            open_error: None,
            grab_delay: None,
            open: false,
            probe: SourceProbe::default(),
        }
    }

    pub fn gray(width: u32, height: u32, level: u8) -> Self {
        Self::new(super::gray_source(width, height, level))
    }

    pub fn failing_open(mut self, message: &str) -> Self {
        self.open_error = Some(message.to_string());
        self
    }

    /// Block the calling thread for `delay` on every grab, like a device read.
    pub fn with_grab_delay(mut self, delay: Duration) -> Self {
        self.grab_delay = Some(delay);
        self
    }

    pub fn probe(&self) -> SourceProbe {
        self.probe.clone()
    }
}

impl VideoSource for ScriptedSource {
    fn open(&mut self) -> Result<()> {
        self.probe.opens.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.open_error {
            return Err(FaceCaptureError::CameraUnavailable(message.clone()));
        }
        self.open = true;
        Ok(())
    }

    fn grab(&mut self) -> Result<SourceFrame> {
        if !self.open {
            return Err(FaceCaptureError::CameraUnavailable("source not opened".to_string()));
        }
        if let Some(delay) = self.grab_delay {
            std::thread::sleep(delay);
        }
        self.probe.grabs.fetch_add(1, Ordering::SeqCst);
        Ok(self.frame.clone())
    }

    fn release(&mut self) -> Result<()> {
        if self.open {
            self.probe.releases.fetch_add(1, Ordering::SeqCst);
        }
        self.open = false;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn describe(&self) -> String {
        format!("scripted:{}x{}", self.frame.width, self.frame.height)
    }
}

/// Detector returning a fixed answer.
pub struct StubDetector {
    response: Option<Detection>,
    init_error: Option<String>,
    delay: Option<Duration>,
    init_calls: AtomicUsize,
    detect_calls: AtomicUsize,
    last_frame_size: Mutex<Option<(u32, u32)>>,
}

impl StubDetector {
    pub fn with_response(response: Option<Detection>) -> Self {
        Self {
            response,
            init_error: None,
            delay: None,
            init_calls: AtomicUsize::new(0),
            detect_calls: AtomicUsize::new(0),
            last_frame_size: Mutex::new(None),
        }
    }

    pub fn no_face() -> Self {
        Self::with_response(None)
    }

    pub fn face(bounding_box: BoundingBox, descriptor: Option<FaceDescriptor>) -> Self {
        Self::with_response(Some(Detection::new(bounding_box, descriptor)))
    }

    pub fn failing_init(mut self, message: &str) -> Self {
        self.init_error = Some(message.to_string());
        self
    }

    /// Make every detect call take `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn init_calls(&self) -> usize {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub fn detect_calls(&self) -> usize {
        self.detect_calls.load(Ordering::SeqCst)
    }

    /// Dimensions of the last frame passed to `detect`.
    pub fn last_frame_size(&self) -> Option<(u32, u32)> {
        self.last_frame_size.lock().ok().and_then(|g| *g)
    }
}

#[async_trait]
impl FaceDetector for StubDetector {
    async fn initialize(&self) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
        match &self.init_error {
            Some(message) => Err(FaceCaptureError::ModelsUnavailable(message.clone())),
            None => Ok(()),
        }
    }

    async fn detect(&self, frame: &FrameBuffer) -> Result<Option<Detection>> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut size) = self.last_frame_size.lock() {
            *size = Some((frame.width(), frame.height()));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Verifier that records every call and answers from a script.
pub struct RecordingVerifier {
    outcome: std::result::Result<Option<VerifiedUser>, String>,
    calls: Mutex<Vec<(String, FaceDescriptor)>>,
}

impl RecordingVerifier {
    pub fn accepting(user: VerifiedUser) -> Self {
        Self {
            outcome: Ok(Some(user)),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<(String, FaceDescriptor)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// A plain user record for tests.
    pub fn user(email: &str) -> VerifiedUser {
        VerifiedUser {
            id: Some("user-1".to_string()),
            name: Some("Test User".to_string()),
            email: Some(email.to_string()),
            extra: serde_json::Map::new(),
        }
    }
}

#[async_trait]
impl FaceVerifier for RecordingVerifier {
    async fn verify(&self, identifier: &str, descriptor: &FaceDescriptor) -> Result<Option<VerifiedUser>> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((identifier.to_string(), descriptor.clone()));
        }
        self.outcome
            .clone()
            .map_err(FaceCaptureError::RemoteVerificationFailed)
    }
}
