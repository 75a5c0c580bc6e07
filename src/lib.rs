//! # framegrid
//!
//! Build contact sheets for every video listed in a catalog.
//!
//! For each video, `framegrid` samples a fixed number of evenly spaced
//! frames (skipping a margin at both ends), scales them down, tiles them
//! into a grid image written next to the video, and records a
//! [`CatalogEntry`] pointing at it. Decoding goes through FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! ## Quick Start
//!
//! ### Process a Catalog
//!
//! ```no_run
//! use framegrid::{CatalogOptions, CatalogProcessor};
//!
//! let report = CatalogProcessor::new(CatalogOptions::new())
//!     .process("input_data.xlsx", "output_data.json")
//!     .unwrap();
//! for (path, error) in report.failures() {
//!     eprintln!("skipped {}: {error}", path.display());
//! }
//! ```
//!
//! ### Build One Contact Sheet
//!
//! ```no_run
//! use framegrid::{FrameSampler, SamplerOptions};
//!
//! let frames = FrameSampler::new(SamplerOptions::new())
//!     .sample("input.mp4", 16)
//!     .unwrap();
//! let sheet = framegrid::resolve(&frames, 4).unwrap();
//! sheet.save_jpeg("input_preview.jpg", 95).unwrap();
//! ```
//!
//! ### Inspect a Layout Without Decoding
//!
//! ```
//! use framegrid::{SamplingPlan, resolve_layout};
//!
//! let plan = SamplingPlan::new(100, 16, 5).unwrap();
//! assert_eq!(plan.positions().len(), 16);
//!
//! let layout = resolve_layout(plan.positions().len(), 4).unwrap();
//! assert_eq!((layout.columns(), layout.rows()), (4, 4));
//! ```
//!
//! ## Features
//!
//! - **Uniform sampling**: a percentage trimmed at each end, even spacing
//!   over the rest, indices clamped to the last frame
//! - **Grid resolution**: nearest dividing column count, larger on a tie,
//!   with a logged fallback when nothing nearby divides
//! - **Catalog input**: CSV or spreadsheet (`.xlsx`, `.xls`, `.ods`, ...)
//!   with a `filepath` column
//! - **Fault isolation**: a bad video is skipped and reported, the rest of
//!   the catalog still gets processed
//! - **Per-video timeout, progress and cancellation**
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod catalog;
pub mod configuration;
pub mod entry;
pub mod error;
pub mod ffmpeg;
pub mod grid;
pub mod metadata;
pub mod processor;
pub mod progress;
pub mod sampler;
mod utilities;
pub mod video;

pub use catalog::{FILEPATH_COLUMN, read_catalog, read_entries, write_entries};
pub use configuration::{CatalogOptions, OutputEncoding, SamplerOptions};
pub use entry::{CatalogEntry, normalize_path, preview_path, video_name};
pub use error::FramegridError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use grid::{ContactSheet, GridLayout, resolve, resolve_layout};
pub use metadata::VideoMetadata;
pub use processor::{CatalogProcessor, EntryOutcome, ProcessingReport};
pub use progress::{CancellationToken, ProgressCallback, ProgressInfo};
pub use sampler::{FrameSampler, SamplingPlan};
pub use video::{FfmpegOpener, FrameSource, SourceOpener, VideoFile};
