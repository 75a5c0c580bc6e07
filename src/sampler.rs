//! Uniform frame sampling.
//!
//! A [`SamplingPlan`] decides which frame indices to take: a percentage of
//! the video is skipped at each end (titles, credits), and the requested
//! number of frames is spread evenly over what remains. [`FrameSampler`]
//! executes a plan against a [`FrameSource`], scaling each frame down.
//!
//! ```
//! use framegrid::SamplingPlan;
//!
//! let plan = SamplingPlan::new(100, 16, 5)?;
//! assert_eq!(plan.offset(), 5);
//! assert_eq!(plan.step(), 6);
//! assert_eq!(plan.positions().first(), Some(&5));
//! assert_eq!(plan.positions().last(), Some(&95));
//! # Ok::<(), framegrid::FramegridError>(())
//! ```

use std::path::Path;

use image::DynamicImage;

use crate::{
    configuration::SamplerOptions,
    error::FramegridError,
    utilities,
    video::{FfmpegOpener, FrameSource, SourceOpener},
};

/// Frame indices to sample from a video of known length.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct SamplingPlan {
    total: u64,
    offset: u64,
    usable: u64,
    step: u64,
    positions: Vec<u64>,
}

impl SamplingPlan {
    /// Plan `num_frames` samples over `total` frames, skipping
    /// `head_tail_percent` percent at each end.
    ///
    /// The offset is `(total / 100) * head_tail_percent` in integer
    /// arithmetic, so a 150-frame video still gets an offset of 5 at 5%.
    ///
    /// # Errors
    ///
    /// [`FramegridError::InvalidSampleCount`] for zero samples, and
    /// [`FramegridError::InsufficientFrames`] if more samples are requested
    /// than frames remain after trimming.
    pub fn new(
        total: u64,
        num_frames: usize,
        head_tail_percent: u64,
    ) -> Result<Self, FramegridError> {
        if num_frames == 0 {
            return Err(FramegridError::InvalidSampleCount(num_frames));
        }

        let offset = (total / 100) * head_tail_percent;
        let usable = total.saturating_sub(2 * offset);
        let requested = num_frames as u64;

        if requested > usable {
            return Err(FramegridError::InsufficientFrames {
                requested: num_frames,
                usable,
            });
        }

        let step = if num_frames > 1 {
            usable / (requested - 1)
        } else {
            usable
        };

        // usable >= 1 here, so total - 1 cannot underflow.
        let last_index = total - 1;
        let positions = (0..requested)
            .map(|index| (offset + index * step).min(last_index))
            .collect();

        Ok(Self {
            total,
            offset,
            usable,
            step,
            positions,
        })
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Frames skipped at each end.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Frames left between the two trimmed ends.
    pub fn usable(&self) -> u64 {
        self.usable
    }

    /// Distance between consecutive samples.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Frame indices to decode, in increasing order.
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }
}

/// Samples evenly spaced, scaled-down frames from videos.
#[derive(Debug, Clone, Default)]
pub struct FrameSampler {
    options: SamplerOptions,
}

impl FrameSampler {
    pub fn new(options: SamplerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SamplerOptions {
        &self.options
    }

    /// Open the video at `path` with FFmpeg and sample `num_frames` frames
    /// from it.
    ///
    /// The file is closed before this returns, whether sampling succeeded
    /// or not.
    ///
    /// # Errors
    ///
    /// [`FramegridError::SourceNotFound`] if the file does not exist, any
    /// error from [`VideoFile::open`](crate::VideoFile::open), or the errors
    /// of [`sample_source`](FrameSampler::sample_source).
    ///
    /// ```no_run
    /// use framegrid::{FrameSampler, SamplerOptions};
    ///
    /// let sampler = FrameSampler::new(SamplerOptions::new());
    /// let frames = sampler.sample("input.mp4", 16)?;
    /// assert_eq!(frames.len(), 16);
    /// # Ok::<(), framegrid::FramegridError>(())
    /// ```
    pub fn sample<P: AsRef<Path>>(
        &self,
        path: P,
        num_frames: usize,
    ) -> Result<Vec<DynamicImage>, FramegridError> {
        self.sample_with(&FfmpegOpener, path.as_ref(), num_frames)
    }

    /// Like [`sample`](FrameSampler::sample), opening the source through
    /// `opener`.
    pub fn sample_with<O: SourceOpener + ?Sized>(
        &self,
        opener: &O,
        path: &Path,
        num_frames: usize,
    ) -> Result<Vec<DynamicImage>, FramegridError> {
        if !path.exists() {
            return Err(FramegridError::SourceNotFound(path.to_path_buf()));
        }
        if num_frames == 0 {
            return Err(FramegridError::InvalidSampleCount(num_frames));
        }

        let mut source = opener.open(path)?;
        self.sample_source(source.as_mut(), num_frames)
    }

    /// Sample `num_frames` frames from an already opened source.
    ///
    /// Nothing is decoded if the plan cannot be satisfied. The first decode
    /// failure aborts the whole call; a partial batch is never returned.
    pub fn sample_source<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        num_frames: usize,
    ) -> Result<Vec<DynamicImage>, FramegridError> {
        let plan = SamplingPlan::new(
            source.frame_count(),
            num_frames,
            self.options.head_tail_percent,
        )?;

        let (width, height) = source.dimensions();
        let scaled_width = utilities::scale_dimension(width, self.options.scale_factor);
        let scaled_height = utilities::scale_dimension(height, self.options.scale_factor);

        log::debug!(
            "Sampling {} of {} frames (offset={}, step={}) at {}x{}",
            num_frames,
            plan.total(),
            plan.offset(),
            plan.step(),
            scaled_width,
            scaled_height,
        );

        plan.positions()
            .iter()
            .map(|&position| source.decode_frame(position, scaled_width, scaled_height))
            .collect()
    }
}
