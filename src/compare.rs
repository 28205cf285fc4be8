//! Descriptor similarity.

use crate::types::FaceDescriptor;

/// Distance below which two descriptors are taken to be the same person.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.6;

/// Euclidean distance between two descriptors.
pub fn euclidean_distance(a: &FaceDescriptor, b: &FaceDescriptor) -> f32 {
    a.as_slice()
        .iter()
        .zip(b.as_slice())
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt() as f32
}

pub fn descriptors_match(a: &FaceDescriptor, b: &FaceDescriptor) -> bool {
    descriptors_match_with(a, b, DEFAULT_MATCH_THRESHOLD)
}

pub fn descriptors_match_with(a: &FaceDescriptor, b: &FaceDescriptor, threshold: f32) -> bool {
    euclidean_distance(a, b) < threshold
}
