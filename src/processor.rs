//! Catalog processing.
//!
//! [`CatalogProcessor`] drives a full pass over a catalog: for every listed
//! video it samples frames, composes a contact sheet, writes it next to the
//! video, and records a [`CatalogEntry`]. A video that fails at any step is
//! skipped and the pass continues; the failure is kept in the
//! [`ProcessingReport`] and logged. Only catalog-level problems (unreadable
//! input, unwritable output, cancellation) abort the pass.
//!
//! ```no_run
//! use framegrid::{CatalogOptions, CatalogProcessor};
//!
//! let processor = CatalogProcessor::new(CatalogOptions::new());
//! let report = processor.process("input_data.xlsx", "output_data.json")?;
//! println!("{} written, {} skipped", report.processed(), report.skipped());
//! # Ok::<(), framegrid::FramegridError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
};

use crate::{
    catalog::{read_catalog, write_entries},
    configuration::CatalogOptions,
    entry::{CatalogEntry, preview_path, video_name},
    error::FramegridError,
    grid,
    progress::ProgressTracker,
    sampler::FrameSampler,
    video::{FfmpegOpener, SourceOpener},
};

/// What happened to one catalog row.
#[derive(Debug)]
pub struct EntryOutcome {
    /// The video path as listed in the catalog.
    pub path: PathBuf,
    /// The recorded entry, or why the video was skipped.
    pub result: Result<CatalogEntry, FramegridError>,
}

/// Per-row results of a catalog pass, in catalog order.
#[derive(Debug, Default)]
pub struct ProcessingReport {
    outcomes: Vec<EntryOutcome>,
}

impl ProcessingReport {
    pub fn outcomes(&self) -> &[EntryOutcome] {
        &self.outcomes
    }

    /// Entries of the successfully processed videos, in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.result.as_ref().ok())
    }

    /// Skipped videos with the reason each was skipped.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &FramegridError)> {
        self.outcomes.iter().filter_map(|outcome| {
            outcome
                .result
                .as_ref()
                .err()
                .map(|error| (outcome.path.as_path(), error))
        })
    }

    pub fn processed(&self) -> usize {
        self.entries().count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.len() - self.processed()
    }

    pub fn into_entries(self) -> Vec<CatalogEntry> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| outcome.result.ok())
            .collect()
    }
}

/// Builds contact sheets and catalog entries for every video of a catalog.
#[derive(Clone)]
pub struct CatalogProcessor {
    options: CatalogOptions,
    sampler: FrameSampler,
    opener: Arc<dyn SourceOpener>,
}

impl Debug for CatalogProcessor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CatalogProcessor")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Default for CatalogProcessor {
    fn default() -> Self {
        Self::new(CatalogOptions::default())
    }
}

impl CatalogProcessor {
    /// Create a processor that opens videos with FFmpeg.
    pub fn new(options: CatalogOptions) -> Self {
        Self {
            sampler: FrameSampler::new(options.sampler),
            options,
            opener: Arc::new(FfmpegOpener),
        }
    }

    /// Open videos through `opener` instead of FFmpeg.
    #[must_use]
    pub fn with_opener(mut self, opener: Arc<dyn SourceOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Run a full pass: read `input`, process every listed video, and write
    /// the entries of the successful ones to `output`.
    ///
    /// The output is written even if every video was skipped.
    ///
    /// # Errors
    ///
    /// Errors from [`read_catalog`] and [`write_entries`], and
    /// [`FramegridError::Cancelled`] if the cancellation token fired. Per
    /// video failures are never returned here; see
    /// [`ProcessingReport::failures`].
    pub fn process<P, Q>(&self, input: P, output: Q) -> Result<ProcessingReport, FramegridError>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let paths = read_catalog(input)?;
        let report = self.process_paths(&paths)?;

        let entries: Vec<CatalogEntry> = report.entries().cloned().collect();
        write_entries(output, &entries, self.options.output_encoding)?;

        log::info!(
            "Catalog pass finished: {} processed, {} skipped",
            report.processed(),
            report.skipped()
        );
        Ok(report)
    }

    /// Process already loaded video paths without touching an output store.
    pub fn process_paths(&self, paths: &[PathBuf]) -> Result<ProcessingReport, FramegridError> {
        let mut tracker =
            ProgressTracker::new(self.options.progress.clone(), Some(paths.len() as u64));

        let mut outcomes = Vec::with_capacity(paths.len());
        for path in paths {
            if self.options.is_cancelled() {
                break;
            }
            outcomes.push(self.handle(path, &mut tracker));
        }

        // A token fired during the last entry leaves a complete pass.
        if outcomes.len() < paths.len() {
            log::warn!("Catalog pass cancelled after {} entries", outcomes.len());
            return Err(FramegridError::Cancelled);
        }

        Ok(ProcessingReport { outcomes })
    }

    /// Sample, compose and write the contact sheet of a single video.
    ///
    /// Ignores the configured timeout.
    pub fn process_video(&self, path: &Path) -> Result<CatalogEntry, FramegridError> {
        self.render(path, &AtomicBool::new(false))
    }

    /// Nothing is written once `abandoned` is set.
    fn render(&self, path: &Path, abandoned: &AtomicBool) -> Result<CatalogEntry, FramegridError> {
        let frames = self
            .sampler
            .sample_with(self.opener.as_ref(), path, self.options.sample_count)?;
        let sheet = grid::resolve(&frames, self.options.columns)?;
        drop(frames);

        if abandoned.load(Ordering::Acquire) {
            log::debug!("Dropping contact sheet of abandoned {}", path.display());
            return Err(FramegridError::Cancelled);
        }

        let image_path = preview_path(path, &self.options.preview_suffix);
        sheet.save_jpeg(&image_path, self.options.jpeg_quality)?;

        Ok(CatalogEntry::new(video_name(path), &image_path))
    }

    fn handle(&self, path: &Path, tracker: &mut ProgressTracker) -> EntryOutcome {
        log::info!("Processing {}", path.display());
        let result = self.run_with_timeout(path);

        match &result {
            Ok(entry) => log::info!("Wrote {} for {}", entry.image, path.display()),
            Err(error) => log::warn!("Skipping {}: {error}", path.display()),
        }

        tracker.advance(Some(path.to_path_buf()));

        EntryOutcome {
            path: path.to_path_buf(),
            result,
        }
    }

    /// Run [`process_video`](CatalogProcessor::process_video) on a worker
    /// thread when a timeout is configured. A worker that overruns is
    /// flagged as abandoned: it may keep decoding in the background, but
    /// does not write a contact sheet once the flag is set.
    fn run_with_timeout(&self, path: &Path) -> Result<CatalogEntry, FramegridError> {
        let Some(limit) = self.options.timeout else {
            return self.process_video(path);
        };

        let (sender, receiver) = mpsc::channel();
        let abandoned = Arc::new(AtomicBool::new(false));
        let worker = self.clone();
        let worker_abandoned = Arc::clone(&abandoned);
        let owned_path = path.to_path_buf();
        thread::Builder::new()
            .name("framegrid-entry".to_string())
            .spawn(move || {
                let _ = sender.send(worker.render(&owned_path, &worker_abandoned));
            })?;

        match receiver.recv_timeout(limit) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => {
                abandoned.store(true, Ordering::Release);
                Err(FramegridError::Timeout {
                    path: path.to_path_buf(),
                    limit,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(FramegridError::WorkerFailed(path.to_path_buf()))
            }
        }
    }
}
