//! Lighting check based on mean perceptual luminance.

use crate::errors::{FaceCaptureError, Result};
use crate::types::FrameBuffer;

/// Minimum mean luminance (0-255 scale) for a usable frame.
pub const MIN_LUMINANCE: f32 = 40.0;

const LUMA_R: f64 = 0.2126;
const LUMA_G: f64 = 0.7152;
const LUMA_B: f64 = 0.0722;

/// Rec.709 luma of a single RGB sample.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * r as f64 + LUMA_G * g as f64 + LUMA_B * b as f64
}

/// Mean luminance over every pixel of the frame. Alpha is ignored.
pub fn average_luminance(frame: &FrameBuffer) -> f32 {
    let total: f64 = frame.pixels().map(|p| luma(p[0], p[1], p[2])).sum();
    (total / frame.pixel_count() as f64) as f32
}

/// Returns the measured luminance, or `InsufficientLighting` below [`MIN_LUMINANCE`].
pub fn check_lighting(frame: &FrameBuffer) -> Result<f32> {
    let luminance = average_luminance(frame);
    log::debug!(
        "Frame {}x{} average luminance {:.2}",
        frame.width(),
        frame.height(),
        luminance
    );
    if luminance < MIN_LUMINANCE {
        return Err(FaceCaptureError::InsufficientLighting { luminance });
    }
    Ok(luminance)
}
