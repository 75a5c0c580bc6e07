//! Sampling and catalog processing options.
//!
//! [`SamplerOptions`] controls how frames are picked and scaled;
//! [`CatalogOptions`] wraps it together with the grid layout, output
//! settings, and the operational knobs (timeout, progress, cancellation)
//! used by [`CatalogProcessor`](crate::CatalogProcessor).
//! Defaults: 16 frames, 4 columns, 0.7× scaling, 5% trimmed at each end.
//!
//! ```
//! use std::time::Duration;
//!
//! use framegrid::{CatalogOptions, OutputEncoding, SamplerOptions};
//!
//! let options = CatalogOptions::new()
//!     .with_sample_count(12)
//!     .with_columns(3)
//!     .with_sampler(SamplerOptions::new().with_scale_factor(0.5))
//!     .with_timeout(Duration::from_secs(30))
//!     .with_output_encoding(OutputEncoding::Document);
//! assert_eq!(options.sample_count(), 12);
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
    time::Duration,
};

use crate::progress::{CancellationToken, NoOpProgress, ProgressCallback};

/// Default number of frames sampled per video.
pub const DEFAULT_SAMPLE_COUNT: usize = 16;
/// Default number of grid columns.
pub const DEFAULT_COLUMNS: usize = 4;
/// Default scale applied to both frame dimensions.
pub const DEFAULT_SCALE_FACTOR: f64 = 0.7;
/// Default percentage of frames skipped at each end of a video.
pub const DEFAULT_HEAD_TAIL_PERCENT: u64 = 5;
/// Default JPEG quality of written contact sheets.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;
/// Default suffix appended to the video stem for the contact sheet file.
pub const DEFAULT_PREVIEW_SUFFIX: &str = "_preview";

/// Largest trim percentage; at 50% nothing would be left to sample.
const MAX_HEAD_TAIL_PERCENT: u64 = 49;

/// Frame selection and scaling settings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[must_use]
pub struct SamplerOptions {
    pub(crate) scale_factor: f64,
    pub(crate) head_tail_percent: u64,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplerOptions {
    /// Defaults: scale factor 0.7, 5% trimmed at each end.
    pub fn new() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            head_tail_percent: DEFAULT_HEAD_TAIL_PERCENT,
        }
    }

    /// Set the factor applied to both dimensions of every sampled frame.
    ///
    /// Non-finite or non-positive values are ignored.
    pub fn with_scale_factor(mut self, factor: f64) -> Self {
        if factor.is_finite() && factor > 0.0 {
            self.scale_factor = factor;
        } else {
            log::warn!("Ignoring invalid scale factor {factor}");
        }
        self
    }

    /// Set the percentage of frames excluded at the start and at the end.
    ///
    /// Clamped to at most 49.
    pub fn with_head_tail_percent(mut self, percent: u64) -> Self {
        self.head_tail_percent = percent.min(MAX_HEAD_TAIL_PERCENT);
        self
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn head_tail_percent(&self) -> u64 {
        self.head_tail_percent
    }
}

/// How the list of catalog entries is written to the output store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputEncoding {
    /// A single pretty-printed JSON array.
    #[default]
    Document,
    /// The array pretty-printed with a four-space indent, then written again
    /// as one JSON string, with non-ASCII characters escaped as `\uXXXX`.
    /// Only for consumers that parse the legacy artifact.
    DoubleEncoded,
}

/// Settings for a full catalog pass.
#[derive(Clone)]
#[must_use]
pub struct CatalogOptions {
    pub(crate) sample_count: usize,
    pub(crate) columns: usize,
    pub(crate) sampler: SamplerOptions,
    pub(crate) jpeg_quality: u8,
    pub(crate) preview_suffix: String,
    pub(crate) output_encoding: OutputEncoding,
    pub(crate) timeout: Option<Duration>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    pub(crate) cancellation: Option<CancellationToken>,
}

impl Debug for CatalogOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CatalogOptions")
            .field("sample_count", &self.sample_count)
            .field("columns", &self.columns)
            .field("sampler", &self.sampler)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("preview_suffix", &self.preview_suffix)
            .field("output_encoding", &self.output_encoding)
            .field("timeout", &self.timeout)
            .field("has_cancellation", &self.cancellation.is_some())
            .finish()
    }
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogOptions {
    /// Create options with the reference defaults.
    pub fn new() -> Self {
        Self {
            sample_count: DEFAULT_SAMPLE_COUNT,
            columns: DEFAULT_COLUMNS,
            sampler: SamplerOptions::new(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            preview_suffix: DEFAULT_PREVIEW_SUFFIX.to_string(),
            output_encoding: OutputEncoding::default(),
            timeout: None,
            progress: Arc::new(NoOpProgress),
            cancellation: None,
        }
    }

    /// Number of frames sampled from each video.
    ///
    /// Zero is passed through and makes every entry fail with
    /// [`InvalidSampleCount`](crate::FramegridError::InvalidSampleCount).
    pub fn with_sample_count(mut self, count: usize) -> Self {
        self.sample_count = count;
        self
    }

    /// Requested number of grid columns.
    pub fn with_columns(mut self, columns: usize) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_sampler(mut self, sampler: SamplerOptions) -> Self {
        self.sampler = sampler;
        self
    }

    /// JPEG quality (1–100) for written contact sheets.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Suffix appended to the video stem, `_preview` by default.
    pub fn with_preview_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.preview_suffix = suffix.into();
        self
    }

    pub fn with_output_encoding(mut self, encoding: OutputEncoding) -> Self {
        self.output_encoding = encoding;
        self
    }

    /// Abandon a video that takes longer than `limit` to sample, compose and
    /// write. The entry is skipped with
    /// [`Timeout`](crate::FramegridError::Timeout).
    ///
    /// The abandoned decode may still run alongside the next entry until it
    /// finishes; its contact sheet is not written.
    pub fn with_timeout(mut self, limit: Duration) -> Self {
        self.timeout = Some(limit);
        self
    }

    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Attach a cancellation token, checked before each entry.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn sampler(&self) -> &SamplerOptions {
        &self.sampler
    }

    pub fn output_encoding(&self) -> OutputEncoding {
        self.output_encoding
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let options = CatalogOptions::default();
        assert_eq!(options.sample_count(), 16);
        assert_eq!(options.columns(), 4);
        assert_eq!(options.sampler().scale_factor(), 0.7);
        assert_eq!(options.sampler().head_tail_percent(), 5);
        assert_eq!(options.output_encoding(), OutputEncoding::Document);
        assert!(!options.is_cancelled());
    }

    #[test]
    fn invalid_scale_factor_is_ignored() {
        let sampler = SamplerOptions::new()
            .with_scale_factor(0.0)
            .with_scale_factor(f64::NAN)
            .with_scale_factor(-1.0);
        assert_eq!(sampler.scale_factor(), DEFAULT_SCALE_FACTOR);
    }

    #[test]
    fn head_tail_percent_is_clamped() {
        let sampler = SamplerOptions::new().with_head_tail_percent(80);
        assert_eq!(sampler.head_tail_percent(), 49);
    }

    #[test]
    fn debug_hides_callback() {
        let debug = format!("{:?}", CatalogOptions::new().with_jpeg_quality(0));
        assert!(debug.contains("CatalogOptions"));
        assert!(debug.contains("jpeg_quality: 1"));
        assert!(debug.contains("has_cancellation: false"));
    }
}
