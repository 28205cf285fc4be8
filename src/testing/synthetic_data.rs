//! Synthetic frames and descriptors.

use crate::types::{BoundingBox, FaceDescriptor, FrameBuffer, PixelLayout, SourceFrame, DESCRIPTOR_LEN};

/// Uniform gray RGBA raster.
pub fn gray_frame(width: u32, height: u32, level: u8) -> FrameBuffer {
    FrameBuffer::filled(width, height, [level, level, level]).expect("synthetic frame dimensions")
}

/// Uniform gray RGB8 frame at native resolution.
pub fn gray_source(width: u32, height: u32, level: u8) -> SourceFrame {
    let data = vec![level; width as usize * height as usize * 3];
    SourceFrame::new(data, width, height, PixelLayout::Rgb8).expect("synthetic source dimensions")
}

/// Deterministic descriptor; different seeds give different vectors.
pub fn synthetic_descriptor(seed: u32) -> FaceDescriptor {
    let values = (0..DESCRIPTOR_LEN)
        .map(|i| {
            let phase = (seed as f32 + 1.0) * 0.37 + i as f32 * 0.11;
            phase.sin() * 0.25
        })
        .collect();
    FaceDescriptor::new(values).expect("synthetic descriptor length")
}

/// Box centered in the frame covering `ratio` of its area, frame aspect kept.
pub fn centered_face_box(frame_width: u32, frame_height: u32, ratio: f32) -> BoundingBox {
    let scale = ratio.max(0.0).sqrt();
    let width = frame_width as f32 * scale;
    let height = frame_height as f32 * scale;
    BoundingBox::new(
        (frame_width as f32 - width) / 2.0,
        (frame_height as f32 - height) / 2.0,
        width,
        height,
    )
}
