//! Video sources.
//!
//! The sampler only needs two things from a video: how many frames it has
//! and a way to decode the frame at a given index. [`FrameSource`] captures
//! that, and [`VideoFile`] implements it on top of FFmpeg. Tests and other
//! embedders can plug in their own sources.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::{context::Context as CodecContext, decoder::Video as VideoDecoder},
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{error::FramegridError, metadata::VideoMetadata, utilities};

/// A decodable video stream addressed by frame index.
pub trait FrameSource {
    /// Total number of decodable frames.
    fn frame_count(&self) -> u64;

    /// Native frame size as `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Seek to `frame_index`, decode one frame and return it resampled to
    /// `width × height`.
    fn decode_frame(
        &mut self,
        frame_index: u64,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, FramegridError>;
}

/// Opens [`FrameSource`]s by path.
///
/// [`CatalogProcessor`](crate::CatalogProcessor) opens every catalog entry
/// through one of these, possibly from several threads at once.
pub trait SourceOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, FramegridError>;
}

/// Opens videos with FFmpeg as [`VideoFile`]s. The default opener.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegOpener;

impl SourceOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn FrameSource>, FramegridError> {
        Ok(Box::new(VideoFile::open(path)?))
    }
}

/// An opened video file.
///
/// Holds the demuxer, a decoder for the best video stream, and cached
/// [`VideoMetadata`]. Dropping the value closes the file.
///
/// ```no_run
/// use framegrid::{FrameSource, VideoFile};
///
/// let mut video = VideoFile::open("input.mp4")?;
/// let (width, height) = video.dimensions();
/// let frame = video.decode_frame(10, width / 2, height / 2)?;
/// frame.save("frame_10.png")?;
/// # Ok::<(), framegrid::FramegridError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    stream_index: usize,
    time_base: Rational,
    metadata: VideoMetadata,
    path: PathBuf,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("stream_index", &self.stream_index)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file and prepare a decoder for its best video stream.
    ///
    /// # Errors
    ///
    /// Returns [`FramegridError::SourceNotFound`] if the path does not exist,
    /// [`FramegridError::FileOpen`] if FFmpeg cannot open it, or
    /// [`FramegridError::NoVideoStream`] if it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramegridError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(FramegridError::SourceNotFound(path));
        }

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| FramegridError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| FramegridError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(FramegridError::NoVideoStream)?;
        let stream_index = stream.index();
        let time_base = stream.time_base();

        let decoder_context = CodecContext::from_parameters(stream.parameters()).map_err(
            |error| FramegridError::FileOpen {
                path: path.clone(),
                reason: format!("Failed to read codec parameters: {error}"),
            },
        )?;
        let decoder =
            decoder_context
                .decoder()
                .video()
                .map_err(|error| FramegridError::FileOpen {
                    path: path.clone(),
                    reason: format!("Failed to create video decoder: {error}"),
                })?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let frame_count = match stream.frames() {
            frames if frames > 0 => frames as u64,
            _ if frames_per_second > 0.0 => (duration.as_secs_f64() * frames_per_second) as u64,
            _ => 0,
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
            duration,
        };

        log::debug!(
            "Opened {}: {}x{}, {} frames at {:.3} fps ({})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frame_count,
            metadata.frames_per_second,
            metadata.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            stream_index,
            time_base,
            metadata,
            path,
        })
    }

    /// Cached metadata for the video stream.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Path the file was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for VideoFile {
    fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.metadata.width, self.metadata.height)
    }

    /// Seeks to the nearest keyframe before `frame_index` and decodes
    /// forward until the first frame at or past the index. Resampling uses
    /// FFmpeg's area filter.
    fn decode_frame(
        &mut self,
        frame_index: u64,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, FramegridError> {
        let frames_per_second = self.metadata.frames_per_second;
        if frames_per_second <= 0.0 {
            return Err(FramegridError::VideoDecodeError(
                "Video stream has no usable frame rate".to_string(),
            ));
        }

        let mut scaler = ScalingContext::get(
            self.decoder.format(),
            self.decoder.width(),
            self.decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::AREA,
        )?;

        let seek_timestamp =
            utilities::frame_index_to_seek_timestamp(frame_index, frames_per_second);
        self.input_context.seek(seek_timestamp, ..seek_timestamp)?;
        self.decoder.flush();

        let stream_index = self.stream_index;
        let time_base = self.time_base;
        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != stream_index {
                continue;
            }

            self.decoder.send_packet(&packet)?;

            while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
                let current = utilities::pts_to_frame_index(pts, time_base, frames_per_second);
                if current >= frame_index {
                    scaler.run(&decoded_frame, &mut rgb_frame)?;
                    return rgb_frame_to_image(&rgb_frame, width, height);
                }
            }
        }

        self.decoder.send_eof()?;
        while self.decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts = decoded_frame.timestamp().or(decoded_frame.pts()).unwrap_or(0);
            let current = utilities::pts_to_frame_index(pts, time_base, frames_per_second);
            if current >= frame_index {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                return rgb_frame_to_image(&rgb_frame, width, height);
            }
        }

        Err(FramegridError::VideoDecodeError(format!(
            "Could not locate frame {frame_index} in {}",
            self.path.display()
        )))
    }
}

fn rgb_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, FramegridError> {
    let buffer = utilities::frame_to_rgb_buffer(rgb_frame, width, height);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        FramegridError::VideoDecodeError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}
