//! Still-image source through the full session, as the CLI `--image` path uses it

use facegate::camera::StillImageSource;
use facegate::errors::FaceCaptureError;
use facegate::testing::{synthetic_descriptor, RecordingVerifier, StubDetector};
use facegate::types::BoundingBox;
use facegate::{CaptureReport, FaceCaptureSession, SessionOptions};
use image::{Rgb, RgbImage};
use std::path::Path;
use std::sync::Arc;

async fn session_for(path: &Path, detector: StubDetector) -> Result<FaceCaptureSession, FaceCaptureError> {
    FaceCaptureSession::open(
        Box::new(StillImageSource::from_path(path)),
        Arc::new(detector),
        Arc::new(RecordingVerifier::rejecting("unused")),
        SessionOptions::default(),
    )
    .await
}

fn capture_once(path: &Path, detector: StubDetector) -> Result<CaptureReport, FaceCaptureError> {
    tokio_test::block_on(async {
        let session = session_for(path, detector).await?;
        session.capture_descriptor().await
    })
}

#[test]
fn test_bright_image_passes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bright.png");
    RgbImage::from_pixel(800, 600, Rgb([180, 170, 160])).save(&path).unwrap();

    let report = capture_once(
        &path,
        StubDetector::face(BoundingBox::new(40.0, 20.0, 180.0, 200.0), Some(synthetic_descriptor(8))),
    )
    .unwrap();
    assert_eq!((report.capture.frame_width, report.capture.frame_height), (320, 240));
    assert!(report.capture.luminance > 150.0);
}

#[test]
fn test_dark_image_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dark.png");
    RgbImage::from_pixel(640, 480, Rgb([20, 20, 20])).save(&path).unwrap();

    let err = capture_once(&path, StubDetector::no_face()).unwrap_err();
    assert!(matches!(err, FaceCaptureError::InsufficientLighting { .. }));
}

#[test]
fn test_missing_image_is_camera_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let err = capture_once(&dir.path().join("missing.png"), StubDetector::no_face()).unwrap_err();
    assert!(matches!(err, FaceCaptureError::CameraUnavailable(_)));
}
