//! Video stream metadata.
//!
//! Read once when a [`VideoFile`](crate::VideoFile) is opened and cached
//! for the lifetime of the handle.

use std::time::Duration;

/// Metadata for the best video stream of a file.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Average frames per second (approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Total number of frames.
    ///
    /// Taken from the stream header when the container records it,
    /// otherwise estimated from duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container duration.
    pub duration: Duration,
}
