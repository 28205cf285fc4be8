//! facegate: face-verification capture for a workspace portal login screen
//!
//! A capture attempt grabs one camera frame, resamples it to a fixed-width
//! raster, rejects dark frames, asks an external face model for a single
//! face, rejects faces that fill too little of the frame, and hands the
//! 128-value descriptor to the authentication server.
//!
//! # Features
//! - Scoped camera acquisition, released on every exit path
//! - Fixed lighting (mean luminance 40) and framing (10% of frame) gates
//! - Pluggable face detector and verifier traits
//! - At most one capture in flight per session
//! - `native-camera` feature for live capture through nokhwa
//!
//! # Usage
//! ```rust,ignore
//! use facegate::{FaceCaptureSession, SessionOptions};
//! use facegate::camera::StillImageSource;
//! use facegate::detector::ExternalProcessDetector;
//! use facegate::verify::HttpFaceVerifier;
//! use std::sync::Arc;
//!
//! let session = FaceCaptureSession::open(
//!     Box::new(StillImageSource::from_path("face.png")),
//!     Arc::new(ExternalProcessDetector::new("facegate-detector", vec![])),
//!     Arc::new(HttpFaceVerifier::new("http://localhost:5000/api/auth/face-login", None)?),
//!     SessionOptions::default(),
//! ).await?;
//! let outcome = session.login("ada@example.com").await?;
//! ```
pub mod camera;
pub mod compare;
pub mod config;
pub mod detector;
pub mod errors;
pub mod permissions;
pub mod quality;
pub mod raster;
pub mod session;
pub mod types;
pub mod validator;
pub mod verify;

// Testing utilities - synthetic frames and stub collaborators
pub mod testing;

// Re-exports for convenience
pub use errors::FaceCaptureError;
pub use session::{CaptureReport, FaceCaptureSession, LoginOutcome, SessionOptions};
pub use types::{BoundingBox, Detection, FaceDescriptor, FrameBuffer, SourceFrame};
pub use validator::{FaceCaptureValidator, ValidatedCapture};

/// Initialize logging for facegate
pub fn init_logging() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "facegate=info");
    }
    let _ = env_logger::try_init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get crate information
pub fn get_info() -> CrateInfo {
    CrateInfo {
        name: NAME.to_string(),
        version: VERSION.to_string(),
        description: DESCRIPTION.to_string(),
        native_camera: cfg!(feature = "native-camera"),
    }
}

/// Crate information structure
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CrateInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub native_camera: bool,
}

#[cfg(test)]
mod lib_tests {
    use super::*;

    #[test]
    fn test_crate_info() {
        let info = get_info();
        assert_eq!(info.name, "facegate");
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }

    #[test]
    fn test_init_logging_is_repeatable() {
        init_logging();
        init_logging();
    }
}
