//! facecat-hw — Camera capture for live recognition.
//!
//! Provides V4L2-based camera access that yields RGB frames, plus the
//! [`FrameSource`] seam the live loop is written against.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, CameraStream, PixelFormat, DEFAULT_DEVICE};
pub use frame::Frame;

/// Anything that yields camera frames one at a time.
pub trait FrameSource {
    /// Block until the next frame is available. An error ends the stream.
    fn next_frame(&mut self) -> Result<Frame, CameraError>;
}
