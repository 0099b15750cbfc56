//! Optional frame transform stage between decode and encode.

use crate::codec::Frame;

/// Transforms decoded frames before they reach the encoder (scaling,
/// rotation, overlays). The actual pixel work is external; a transcode
/// pipeline built without a renderer passes frames through untouched.
pub trait FrameRenderer: Send + Sync {
    /// Transforms one frame. End-of-stream markers are forwarded unchanged
    /// by callers and never rendered.
    fn render(&self, frame: Frame) -> Frame;
}
