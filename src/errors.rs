use std::time::Duration;
use thiserror::Error;

/// Everything that can stop a face capture attempt.
///
/// All variants are recoverable: the caller surfaces [`user_message`] and
/// the user starts a new capture. Nothing in this crate retries on its own.
///
/// [`user_message`]: FaceCaptureError::user_message
#[derive(Debug, Error)]
pub enum FaceCaptureError {
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),
    #[error("Face models unavailable: {0}")]
    ModelsUnavailable(String),
    #[error("Insufficient lighting: average luminance {luminance:.1} is below the minimum")]
    InsufficientLighting { luminance: f32 },
    #[error("No face detected")]
    NoFaceDetected,
    #[error("Face too small: covers {:.1}% of the frame", .ratio * 100.0)]
    FaceTooSmall { ratio: f32 },
    #[error("Face detected but no descriptor was produced")]
    DescriptorUnavailable,
    #[error("Remote verification failed: {0}")]
    RemoteVerificationFailed(String),
    #[error("A capture is already in progress")]
    CaptureInProgress,
    #[error("No identifier supplied for face login")]
    MissingIdentifier,
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    #[error("Face detection error: {0}")]
    Detection(String),
    #[error("Capture timed out after {0:?}")]
    Timeout(Duration),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FaceCaptureError {
    /// The single message shown to the person in front of the camera.
    pub fn user_message(&self) -> String {
        match self {
            Self::CameraUnavailable(_) => {
                "Unable to access camera. Please ensure camera permissions are granted.".to_string()
            }
            Self::ModelsUnavailable(_) => {
                "Failed to load face recognition models. Please refresh and try again.".to_string()
            }
            Self::InsufficientLighting { .. } => {
                "Too dark—please increase lighting or move to a brighter area.".to_string()
            }
            Self::NoFaceDetected => {
                "No face detected. Please align your face in the frame and try again.".to_string()
            }
            Self::FaceTooSmall { .. } => {
                "Move closer so your face fills more of the frame.".to_string()
            }
            Self::DescriptorUnavailable => {
                "Failed to extract face features. Please try again.".to_string()
            }
            Self::RemoteVerificationFailed(message) => message.clone(),
            Self::CaptureInProgress => {
                "A capture is already being processed. Please wait.".to_string()
            }
            Self::MissingIdentifier => "Please enter your email before capturing.".to_string(),
            Self::Timeout(_) => "Face capture took too long. Please try again.".to_string(),
            Self::InvalidFrame(_) | Self::Detection(_) | Self::Transport(_) | Self::Config(_) => {
                "Face capture failed. Please try again.".to_string()
            }
        }
    }

    /// True for failures caused by what the camera saw rather than by the system.
    pub fn is_capture_quality(&self) -> bool {
        matches!(
            self,
            Self::InsufficientLighting { .. }
                | Self::NoFaceDetected
                | Self::FaceTooSmall { .. }
                | Self::DescriptorUnavailable
        )
    }
}

impl From<reqwest::Error> for FaceCaptureError {
    fn from(e: reqwest::Error) -> Self {
        FaceCaptureError::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for FaceCaptureError {
    fn from(e: serde_json::Error) -> Self {
        FaceCaptureError::Transport(format!("invalid JSON: {}", e))
    }
}

impl From<config::ConfigError> for FaceCaptureError {
    fn from(e: config::ConfigError) -> Self {
        FaceCaptureError::Config(e.to_string())
    }
}

impl From<image::ImageError> for FaceCaptureError {
    fn from(e: image::ImageError) -> Self {
        FaceCaptureError::InvalidFrame(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FaceCaptureError>;
