#[cfg(test)]
mod error_tests {
    use facegate::errors::FaceCaptureError;
    use std::error::Error;
    use std::time::Duration;

    #[test]
    fn test_camera_unavailable_display() {
        let error = FaceCaptureError::CameraUnavailable("no /dev/video0".to_string());
        assert_eq!(error.to_string(), "Camera unavailable: no /dev/video0");
    }

    #[test]
    fn test_lighting_display_includes_measurement() {
        let error = FaceCaptureError::InsufficientLighting { luminance: 12.34 };
        assert!(error.to_string().contains("12.3"));
    }

    #[test]
    fn test_face_too_small_display_as_percent() {
        let error = FaceCaptureError::FaceTooSmall { ratio: 0.05 };
        assert!(error.to_string().contains("5.0%"));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            FaceCaptureError::InsufficientLighting { luminance: 0.0 }.user_message(),
            "Too dark—please increase lighting or move to a brighter area."
        );
        assert_eq!(
            FaceCaptureError::NoFaceDetected.user_message(),
            "No face detected. Please align your face in the frame and try again."
        );
        assert_eq!(
            FaceCaptureError::FaceTooSmall { ratio: 0.01 }.user_message(),
            "Move closer so your face fills more of the frame."
        );
        assert_eq!(
            FaceCaptureError::DescriptorUnavailable.user_message(),
            "Failed to extract face features. Please try again."
        );
    }

    #[test]
    fn test_remote_message_passed_through() {
        let error = FaceCaptureError::RemoteVerificationFailed("Face does not match".to_string());
        assert_eq!(error.user_message(), "Face does not match");
    }

    #[test]
    fn test_capture_quality_classification() {
        assert!(FaceCaptureError::NoFaceDetected.is_capture_quality());
        assert!(FaceCaptureError::DescriptorUnavailable.is_capture_quality());
        assert!(!FaceCaptureError::CaptureInProgress.is_capture_quality());
        assert!(!FaceCaptureError::ModelsUnavailable("x".to_string()).is_capture_quality());
    }

    #[test]
    fn test_all_error_variants() {
        let errors = vec![
            FaceCaptureError::CameraUnavailable("camera".to_string()),
            FaceCaptureError::ModelsUnavailable("models".to_string()),
            FaceCaptureError::InsufficientLighting { luminance: 1.0 },
            FaceCaptureError::NoFaceDetected,
            FaceCaptureError::FaceTooSmall { ratio: 0.01 },
            FaceCaptureError::DescriptorUnavailable,
            FaceCaptureError::RemoteVerificationFailed("remote".to_string()),
            FaceCaptureError::CaptureInProgress,
            FaceCaptureError::MissingIdentifier,
            FaceCaptureError::InvalidFrame("frame".to_string()),
            FaceCaptureError::Detection("detect".to_string()),
            FaceCaptureError::Timeout(Duration::from_secs(1)),
            FaceCaptureError::Transport("transport".to_string()),
            FaceCaptureError::Config("config".to_string()),
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
            assert!(!error.user_message().is_empty());
            assert!(!format!("{:?}", error).is_empty());
            assert!(error.source().is_none());
        }
    }

    #[test]
    fn test_json_error_converts_to_transport() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: FaceCaptureError = json_err.into();
        assert!(matches!(error, FaceCaptureError::Transport(_)));
    }
}
