//! Progress reporting and cancellation for catalog processing.
//!
//! A [`ProgressCallback`] receives a [`ProgressInfo`] snapshot after every
//! catalog entry, whether it succeeded or was skipped. A
//! [`CancellationToken`] is checked before each entry is started.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framegrid::{CatalogOptions, CatalogProcessor, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(percentage) = info.percentage {
//!             println!("{percentage:.1}% ({}/{:?})", info.current, info.total);
//!         }
//!     }
//! }
//!
//! let options = CatalogOptions::new().with_progress(Arc::new(PrintProgress));
//! let report = CatalogProcessor::new(options).process("input.csv", "output.json")?;
//! # Ok::<(), framegrid::FramegridError>(())
//! ```

use std::{
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::{Duration, Instant},
};

/// A snapshot of catalog processing progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// How many entries have been handled so far.
    pub current: u64,
    /// Total entries in the catalog, if known.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since processing started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// The video that was just handled.
    pub current_path: Option<PathBuf>,
}

/// Trait for receiving progress updates.
///
/// Implementations must be [`Send`] and [`Sync`] because entries may be
/// processed on a worker thread when a per-video timeout is set.
pub trait ProgressCallback: Send + Sync {
    /// Called once per handled catalog entry.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Cooperative cancellation token backed by an [`AtomicBool`].
///
/// Clones share state, so one clone can be handed to a signal handler or
/// another thread while the processor checks the other.
///
/// ```
/// use framegrid::CancellationToken;
///
/// let token = CancellationToken::new();
/// let shared = token.clone();
/// shared.cancel();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, non-cancelled token.
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request cancellation. All clones observe it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks timing and emits progress callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(callback: Arc<dyn ProgressCallback>, total: Option<u64>) -> Self {
        Self {
            callback,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one handled entry and report it.
    pub(crate) fn advance(&mut self, path: Option<PathBuf>) {
        self.current += 1;

        let elapsed = self.start_time.elapsed();
        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);
        let estimated_remaining = self.total.map(|total| {
            let remaining = total.saturating_sub(self.current);
            let per_item = elapsed / self.current as u32;
            per_item * remaining as u32
        });

        self.callback.on_progress(&ProgressInfo {
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_path: path,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct Recorder(Mutex<Vec<ProgressInfo>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn tracker_reports_every_entry() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), Some(4));

        tracker.advance(Some(PathBuf::from("a.mp4")));
        tracker.advance(None);

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].current, 1);
        assert_eq!(seen[0].percentage, Some(25.0));
        assert_eq!(seen[0].current_path, Some(PathBuf::from("a.mp4")));
        assert_eq!(seen[1].current, 2);
        assert_eq!(seen[1].percentage, Some(50.0));
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let mut tracker = ProgressTracker::new(recorder.clone(), None);
        tracker.advance(None);

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen[0].percentage, None);
        assert!(seen[0].estimated_remaining.is_none());
    }
}
