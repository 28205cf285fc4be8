//! Face size relative to the frame.

use crate::errors::{FaceCaptureError, Result};
use crate::types::BoundingBox;

/// Minimum share of the frame area the face box must cover.
pub const MIN_FACE_AREA_RATIO: f32 = 0.10;

/// Box area divided by frame area. Zero for an empty frame.
pub fn face_area_ratio(bounding_box: &BoundingBox, frame_width: u32, frame_height: u32) -> f32 {
    let frame_area = frame_width as f64 * frame_height as f64;
    if frame_area == 0.0 {
        return 0.0;
    }
    (bounding_box.area() as f64 / frame_area) as f32
}

/// Returns the ratio, or `FaceTooSmall` below [`MIN_FACE_AREA_RATIO`].
pub fn check_face_size(bounding_box: &BoundingBox, frame_width: u32, frame_height: u32) -> Result<f32> {
    let ratio = face_area_ratio(bounding_box, frame_width, frame_height);
    log::debug!(
        "Face box {:.0}x{:.0} covers {:.3} of {}x{} frame",
        bounding_box.width,
        bounding_box.height,
        ratio,
        frame_width,
        frame_height
    );
    if ratio < MIN_FACE_AREA_RATIO {
        return Err(FaceCaptureError::FaceTooSmall { ratio });
    }
    Ok(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiny_face_rejected() {
        let b = BoundingBox::new(100.0, 100.0, 10.0, 10.0);
        let ratio = face_area_ratio(&b, 320, 240);
        assert!((ratio - 100.0 / 76800.0).abs() < 1e-6);
        assert!(matches!(
            check_face_size(&b, 320, 240),
            Err(FaceCaptureError::FaceTooSmall { .. })
        ));
    }

    #[test]
    fn test_large_face_accepted() {
        let b = BoundingBox::new(60.0, 20.0, 200.0, 200.0);
        let ratio = check_face_size(&b, 320, 240).unwrap();
        assert!((ratio - 0.5208).abs() < 1e-3);
    }

    #[test]
    fn test_negative_box_counts_as_empty() {
        let b = BoundingBox::new(0.0, 0.0, -50.0, 50.0);
        assert_eq!(face_area_ratio(&b, 320, 240), 0.0);
    }

    #[test]
    fn test_exact_threshold_passes() {
        // 7680 / 76800 == 0.10
        let b = BoundingBox::new(0.0, 0.0, 96.0, 80.0);
        assert!(check_face_size(&b, 320, 240).is_ok());
    }
}
