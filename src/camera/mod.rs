//! Video sources and scoped camera acquisition.
//!
//! A [`VideoSource`] is opened once for the lifetime of a verification
//! screen through a [`CameraLease`], which releases the device on every
//! exit path.

pub mod lease;
#[cfg(feature = "native-camera")]
pub mod native;
pub mod still;

pub use lease::CameraLease;
#[cfg(feature = "native-camera")]
pub use native::NokhwaSource;
pub use still::StillImageSource;

use crate::errors::Result;
use crate::types::SourceFrame;

/// Anything that can hand out frames at its native resolution.
pub trait VideoSource: Send {
    /// Acquire the device. Failures map to `CameraUnavailable`.
    fn open(&mut self) -> Result<()>;

    /// Current frame at native resolution.
    fn grab(&mut self) -> Result<SourceFrame>;

    /// Give the device back. Must be safe to call on an unopened source.
    fn release(&mut self) -> Result<()>;

    fn is_open(&self) -> bool;

    /// Human-readable label for logs.
    fn describe(&self) -> String;
}
