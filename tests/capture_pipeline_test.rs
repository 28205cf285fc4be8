//! End-to-end capture flow tests
//!
//! Runs the session against a scripted camera, a stub face model and a
//! recording verifier. Every failing precondition must stop the attempt
//! before anything is sent to the server.

use facegate::errors::FaceCaptureError;
use facegate::testing::{
    centered_face_box, gray_source, synthetic_descriptor, RecordingVerifier, ScriptedSource,
    StubDetector,
};
use facegate::types::{BoundingBox, PixelLayout, SourceFrame};
use facegate::{FaceCaptureSession, SessionOptions};
use std::sync::Arc;

const EMAIL: &str = "ada@example.com";

struct Harness {
    session: FaceCaptureSession,
    detector: Arc<StubDetector>,
    verifier: Arc<RecordingVerifier>,
}

async fn harness(source: ScriptedSource, detector: StubDetector, verifier: RecordingVerifier) -> Harness {
    let detector = Arc::new(detector);
    let verifier = Arc::new(verifier);
    let session = FaceCaptureSession::open(
        Box::new(source),
        detector.clone(),
        verifier.clone(),
        SessionOptions::default(),
    )
    .await
    .expect("session opens");
    Harness {
        session,
        detector,
        verifier,
    }
}

fn good_detector() -> StubDetector {
    StubDetector::face(centered_face_box(320, 240, 0.4), Some(synthetic_descriptor(42)))
}

#[tokio::test]
async fn test_successful_login_dispatches_descriptor_once() {
    let h = harness(
        ScriptedSource::gray(640, 480, 128),
        good_detector(),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;

    let outcome = h.session.login(EMAIL).await.unwrap();
    assert_eq!(outcome.identifier, EMAIL);
    assert_eq!(outcome.user.unwrap().email.as_deref(), Some(EMAIL));
    assert!((outcome.face_ratio - 0.4).abs() < 1e-3);

    let calls = h.verifier.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, EMAIL);
    assert_eq!(calls[0].1, synthetic_descriptor(42));
    assert_eq!(h.detector.last_frame_size(), Some((320, 240)));
}

#[tokio::test]
async fn test_identifier_is_trimmed() {
    let h = harness(
        ScriptedSource::gray(640, 480, 128),
        good_detector(),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    h.session.login("  ada@example.com \n").await.unwrap();
    assert_eq!(h.verifier.calls()[0].0, EMAIL);
}

#[tokio::test]
async fn test_dark_frame_makes_no_network_call() {
    let h = harness(
        ScriptedSource::gray(640, 480, 0),
        good_detector(),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    let err = h.session.login(EMAIL).await.unwrap_err();
    assert!(matches!(err, FaceCaptureError::InsufficientLighting { luminance } if luminance == 0.0));
    assert_eq!(h.verifier.call_count(), 0);
    assert_eq!(h.detector.detect_calls(), 0);
}

#[tokio::test]
async fn test_no_face_makes_no_network_call() {
    let h = harness(
        ScriptedSource::gray(640, 480, 128),
        StubDetector::no_face(),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    let err = h.session.login(EMAIL).await.unwrap_err();
    assert!(matches!(err, FaceCaptureError::NoFaceDetected));
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn test_tiny_face_makes_no_network_call() {
    let h = harness(
        ScriptedSource::gray(640, 480, 128),
        StubDetector::face(BoundingBox::new(150.0, 110.0, 10.0, 10.0), Some(synthetic_descriptor(1))),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    let err = h.session.login(EMAIL).await.unwrap_err();
    match err {
        FaceCaptureError::FaceTooSmall { ratio } => assert!((ratio - 100.0 / 76800.0).abs() < 1e-6),
        other => panic!("expected FaceTooSmall, got {:?}", other),
    }
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn test_missing_descriptor_makes_no_network_call() {
    let h = harness(
        ScriptedSource::gray(640, 480, 128),
        StubDetector::face(BoundingBox::new(0.0, 0.0, 200.0, 200.0), None),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    let err = h.session.login(EMAIL).await.unwrap_err();
    assert!(matches!(err, FaceCaptureError::DescriptorUnavailable));
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn test_models_unavailable_stops_before_grab() {
    let source = ScriptedSource::gray(640, 480, 128);
    let probe = source.probe();
    let h = harness(
        source,
        good_detector().failing_init("could not fetch weights"),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    let err = h.session.login(EMAIL).await.unwrap_err();
    assert!(matches!(err, FaceCaptureError::ModelsUnavailable(_)));
    assert_eq!(probe.grabs(), 0);
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn test_server_rejection_surfaces_message() {
    let h = harness(
        ScriptedSource::gray(640, 480, 128),
        good_detector(),
        RecordingVerifier::rejecting("Face does not match"),
    )
    .await;
    let err = h.session.login(EMAIL).await.unwrap_err();
    assert_eq!(err.user_message(), "Face does not match");
    assert_eq!(h.verifier.call_count(), 1);
}

#[tokio::test]
async fn test_capture_descriptor_uses_native_aspect() {
    let h = harness(
        ScriptedSource::gray(1280, 720, 128),
        StubDetector::face(BoundingBox::new(0.0, 0.0, 150.0, 150.0), Some(synthetic_descriptor(5))),
        RecordingVerifier::rejecting("unused"),
    )
    .await;
    let report = h.session.capture_descriptor().await.unwrap();
    assert_eq!((report.capture.frame_width, report.capture.frame_height), (320, 180));
    assert_eq!(report.capture.descriptor, synthetic_descriptor(5));
    assert_eq!(h.verifier.call_count(), 0);
}

#[tokio::test]
async fn test_rgba_source_accepted() {
    let data = [90u8, 90, 90, 255].repeat(640 * 480);
    let frame = SourceFrame::new(data, 640, 480, PixelLayout::Rgba8).unwrap();
    let h = harness(
        ScriptedSource::new(frame),
        good_detector(),
        RecordingVerifier::rejecting("unused"),
    )
    .await;
    let report = h.session.capture_descriptor().await.unwrap();
    assert!((report.capture.luminance - 90.0).abs() < 0.5);
}

#[tokio::test]
async fn test_retry_after_failure_is_caller_driven() {
    // same session, two manual attempts; the first fails, nothing retries on its own
    let h = harness(
        ScriptedSource::new(gray_source(640, 480, 10)),
        good_detector(),
        RecordingVerifier::accepting(RecordingVerifier::user(EMAIL)),
    )
    .await;
    assert!(h.session.login(EMAIL).await.is_err());
    assert!(h.session.login(EMAIL).await.is_err());
    assert_eq!(h.detector.detect_calls(), 0);
    assert_eq!(h.verifier.call_count(), 0);
}
