//! Testing utilities for facegate
//!
//! Synthetic frames and stand-ins for the camera, the face model and the
//! verification server, so the capture flow can run without hardware or
//! network.

pub mod stubs;
pub mod synthetic_data;

pub use stubs::{RecordingVerifier, ScriptedSource, SourceProbe, StubDetector};
pub use synthetic_data::{centered_face_box, gray_frame, gray_source, synthetic_descriptor};
