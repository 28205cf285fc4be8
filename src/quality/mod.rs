/// Capture quality checks
///
/// Lighting and framing gates applied to a frame before its descriptor is
/// trusted. Both thresholds are fixed.
pub mod framing;
pub mod lighting;

pub use framing::{check_face_size, face_area_ratio, MIN_FACE_AREA_RATIO};
pub use lighting::{average_luminance, check_lighting, luma, MIN_LUMINANCE};
