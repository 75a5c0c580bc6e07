//! Error types for the `framegrid` crate.
//!
//! [`FramegridError`] is returned by every fallible operation. Per-video
//! failures carry the offending path or counts so that the catalog
//! processor can report a skipped entry without extra logging at the call
//! site.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `framegrid` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramegridError {
    /// The video file does not exist.
    #[error("Video file not found: {0}")]
    SourceNotFound(PathBuf),

    /// The video file exists but could not be opened as media.
    #[error("Failed to open media file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A sample count of zero was requested.
    #[error("Invalid sample count: {0} (must be greater than zero)")]
    InvalidSampleCount(usize),

    /// The trimmed frame range is too short for the requested sample count.
    #[error("Cannot sample {requested} frames: only {usable} frames remain after trimming")]
    InsufficientFrames {
        /// Number of frames requested.
        requested: usize,
        /// Frames left once the head and tail offsets are removed.
        usable: u64,
    },

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A column count of zero was requested.
    #[error("Invalid column count: {0} (must be greater than zero)")]
    InvalidColumnCount(usize),

    /// More columns were requested than there are frames.
    #[error("Cannot lay out {frames} frames in {columns} columns")]
    TooManyColumns {
        /// Requested column count.
        columns: usize,
        /// Number of frames in the batch.
        frames: usize,
    },

    /// The frames of a batch do not share one size.
    #[error(
        "Frame {index} is {actual_width}x{actual_height}, expected {expected_width}x{expected_height}"
    )]
    MismatchedFrameDimensions {
        /// Position of the first mismatching frame.
        index: usize,
        /// Width of the first frame.
        expected_width: u32,
        /// Height of the first frame.
        expected_height: u32,
        /// Width of the mismatching frame.
        actual_width: u32,
        /// Height of the mismatching frame.
        actual_height: u32,
    },

    /// The input catalog file does not exist.
    #[error("Input catalog not found: {0}")]
    InputCatalogNotFound(PathBuf),

    /// The input catalog has an extension that no reader handles.
    #[error("Unsupported catalog format: {0}")]
    UnsupportedCatalogFormat(PathBuf),

    /// The input catalog has no column with the expected header.
    #[error("Catalog has no `{0}` column")]
    MissingColumn(String),

    /// The input catalog could not be parsed.
    #[error("Failed to read catalog: {0}")]
    CatalogParseError(String),

    /// Processing a single video took longer than the configured limit.
    #[error("Processing {path} exceeded the {limit:?} timeout")]
    Timeout {
        /// Video that was being processed.
        path: PathBuf,
        /// The configured limit.
        limit: Duration,
    },

    /// The worker thread processing a video stopped without a result.
    #[error("Worker processing {0} stopped unexpectedly")]
    WorkerFailed(PathBuf),

    /// The operation was cancelled via a [`CancellationToken`](crate::CancellationToken).
    #[error("Operation cancelled")]
    Cancelled,

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while composing or encoding.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),

    /// The output store could not be serialized or parsed.
    #[error("JSON error: {0}")]
    JsonError(#[from] JsonError),
}

impl From<FfmpegError> for FramegridError {
    fn from(error: FfmpegError) -> Self {
        FramegridError::FfmpegError(error.to_string())
    }
}

impl From<calamine::Error> for FramegridError {
    fn from(error: calamine::Error) -> Self {
        FramegridError::CatalogParseError(error.to_string())
    }
}

impl From<csv::Error> for FramegridError {
    fn from(error: csv::Error) -> Self {
        FramegridError::CatalogParseError(error.to_string())
    }
}
