//! Environment overrides for the layered configuration.
//!
//! Kept in its own test binary because it mutates process environment.

use facegate::config::FaceGateConfig;
use facegate::errors::FaceCaptureError;

#[test]
fn test_environment_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("facegate.toml");
    std::fs::write(&path, "[capture]\ntarget_width = 400\n\n[camera]\nfps = 15\n").unwrap();

    std::env::set_var("FACEGATE__CAPTURE__TARGET_WIDTH", "480");
    std::env::set_var("FACEGATE__VERIFICATION__ENDPOINT", "https://auth.example.com/face");
    let loaded = FaceGateConfig::load_layered(&path);
    std::env::remove_var("FACEGATE__CAPTURE__TARGET_WIDTH");
    std::env::remove_var("FACEGATE__VERIFICATION__ENDPOINT");

    let loaded = loaded.unwrap();
    assert_eq!(loaded.capture.target_width, 480);
    assert_eq!(loaded.camera.fps, 15);
    assert_eq!(loaded.verification.endpoint, "https://auth.example.com/face");

    // invalid values are rejected after layering
    std::env::set_var("FACEGATE__CAPTURE__TARGET_WIDTH", "2");
    let rejected = FaceGateConfig::load_layered(&path);
    std::env::remove_var("FACEGATE__CAPTURE__TARGET_WIDTH");
    assert!(matches!(rejected, Err(FaceCaptureError::Config(_))));
}
