//! Frame grab: resample a native camera frame into the fixed-width RGBA
//! raster the detector and quality checks run on.

use crate::errors::{FaceCaptureError, Result};
use crate::types::{FrameBuffer, PixelLayout, SourceFrame};
use image::{imageops::FilterType, ImageBuffer, RgbImage, RgbaImage};

/// Default raster width used for face verification.
pub const DEFAULT_TARGET_WIDTH: u32 = 320;

/// Raster height for `target_width` that keeps the source aspect ratio.
///
/// Fractional heights are truncated, never below one row.
pub fn target_height(target_width: u32, source_width: u32, source_height: u32) -> Result<u32> {
    if target_width == 0 || source_width == 0 || source_height == 0 {
        return Err(FaceCaptureError::InvalidFrame(format!(
            "cannot scale {}x{} source to width {}",
            source_width, source_height, target_width
        )));
    }
    let height = (target_width as u64 * source_height as u64) / source_width as u64;
    u32::try_from(height.max(1)).map_err(|_| {
        FaceCaptureError::InvalidFrame(format!(
            "scaling {}x{} source to width {} gives height {} which is out of range",
            source_width, source_height, target_width, height
        ))
    })
}

fn to_rgba(source: &SourceFrame) -> Result<RgbaImage> {
    let invalid = || {
        FaceCaptureError::InvalidFrame(format!(
            "source buffer does not match {}x{} {:?}",
            source.width, source.height, source.layout
        ))
    };
    match source.layout {
        PixelLayout::Rgba8 => {
            ImageBuffer::from_raw(source.width, source.height, source.data.clone()).ok_or_else(invalid)
        }
        PixelLayout::Rgb8 => {
            let rgb: RgbImage = ImageBuffer::from_raw(source.width, source.height, source.data.clone())
                .ok_or_else(invalid)?;
            Ok(image::DynamicImage::ImageRgb8(rgb).to_rgba8())
        }
    }
}

/// Sample `source` into a `target_width` wide raster, preserving aspect ratio.
pub fn grab_frame(source: &SourceFrame, target_width: u32) -> Result<FrameBuffer> {
    let height = target_height(target_width, source.width, source.height)?;
    let rgba = to_rgba(source)?;

    let scaled = if rgba.width() == target_width && rgba.height() == height {
        rgba
    } else {
        image::imageops::resize(&rgba, target_width, height, FilterType::Triangle)
    };

    log::debug!(
        "Grabbed frame {}x{} -> {}x{}",
        source.width,
        source.height,
        target_width,
        height
    );
    FrameBuffer::from_rgba(target_width, height, scaled.into_raw())
}
