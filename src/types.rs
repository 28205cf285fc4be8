use crate::errors::{FaceCaptureError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of values in a face descriptor.
pub const DESCRIPTOR_LEN: usize = 128;

/// Requested camera format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraFormat {
    pub width: u32,
    pub height: u32,
    pub fps: f32,
}

impl CameraFormat {
    pub fn new(width: u32, height: u32, fps: f32) -> Self {
        Self { width, height, fps }
    }
}

/// Pixel layout of a frame as delivered by a video source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelLayout {
    Rgb8,
    Rgba8,
}

impl PixelLayout {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelLayout::Rgb8 => 3,
            PixelLayout::Rgba8 => 4,
        }
    }
}

/// A frame at the camera's native resolution.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub data: Vec<u8>,
    pub captured_at: chrono::DateTime<chrono::Utc>,
}

impl SourceFrame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, layout: PixelLayout) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FaceCaptureError::InvalidFrame(format!(
                "source frame has zero dimension {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * layout.bytes_per_pixel();
        if data.len() != expected {
            return Err(FaceCaptureError::InvalidFrame(format!(
                "source frame {}x{} {:?} needs {} bytes, got {}",
                width,
                height,
                layout,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
            captured_at: chrono::Utc::now(),
        })
    }
}

/// Fixed-size RGBA raster handed to the face detector.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl FrameBuffer {
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(FaceCaptureError::InvalidFrame(format!(
                "frame buffer has zero dimension {}x{}",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(FaceCaptureError::InvalidFrame(format!(
                "RGBA buffer {}x{} needs {} bytes, got {}",
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self { width, height, data })
    }

    /// Buffer where every pixel has the same color, alpha 255.
    pub fn filled(width: u32, height: u32, rgb: [u8; 3]) -> Result<Self> {
        let pixel = [rgb[0], rgb[1], rgb[2], 255];
        let data = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self::from_rgba(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn pixels(&self) -> impl Iterator<Item = &[u8]> {
        self.data.chunks_exact(4)
    }

    /// Encode the buffer as PNG, for detectors that take an image file.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut out = std::io::Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut out,
            &self.data,
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        Ok(out.into_inner())
    }
}

/// Where a face was found, in frame-buffer pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// 128-value face embedding produced by the recognition model.
///
/// Serializes as a plain JSON array of numbers. Deserializing an array of
/// any other length fails.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f32>", into = "Vec<f32>")]
pub struct FaceDescriptor(Vec<f32>);

impl FaceDescriptor {
    pub fn new(values: Vec<f32>) -> Result<Self> {
        Self::try_from(values).map_err(FaceCaptureError::Detection)
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<f32>> for FaceDescriptor {
    type Error = String;

    fn try_from(values: Vec<f32>) -> std::result::Result<Self, Self::Error> {
        if values.len() != DESCRIPTOR_LEN {
            return Err(format!(
                "descriptor must have {} values, got {}",
                DESCRIPTOR_LEN,
                values.len()
            ));
        }
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(format!("descriptor value {} is not finite", i));
        }
        Ok(Self(values))
    }
}

impl From<FaceDescriptor> for Vec<f32> {
    fn from(descriptor: FaceDescriptor) -> Self {
        descriptor.0
    }
}

// Embeddings are biometric data; keep them out of logs.
impl fmt::Debug for FaceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FaceDescriptor([{} values])", self.0.len())
    }
}

/// Output of the face detector for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    #[serde(rename = "box")]
    pub bounding_box: BoundingBox,
    #[serde(default)]
    pub descriptor: Option<FaceDescriptor>,
}

impl Detection {
    pub fn new(bounding_box: BoundingBox, descriptor: Option<FaceDescriptor>) -> Self {
        Self {
            bounding_box,
            descriptor,
        }
    }
}
