//! Progress tracking and cancellation for a batch run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use crate::processing::{ImageEntry, ItemFailure, ResizeOutcome};

/// Lifecycle of one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum BatchState {
    Idle,
    Enumerating,
    Processing { completed: usize, total: usize },
    Completed,
    Cancelled,
}

impl BatchState {
    /// True once the run can no longer change
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl Default for BatchState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Shared cancellation switch, cheap to clone across threads
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that the batch stop before its next image
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Hooks invoked synchronously from the batch loop.
///
/// Every hook runs on the thread driving the batch, between images.
pub trait BatchObserver {
    /// The batch moved to a new state
    fn on_state(&mut self, _state: BatchState) {}

    /// An image is about to be opened
    fn on_item_started(&mut self, _entry: &ImageEntry) {}

    /// An image was written, or failed with `failure`
    fn on_item_finished(&mut self, _entry: &ImageEntry, _failure: Option<&ItemFailure>) {}

    /// `completed` images out of `total` have been attempted
    fn on_progress(&mut self, completed: usize, total: usize);

    /// Polled before each image
    fn is_cancelled(&mut self) -> bool {
        false
    }
}

/// Observer built from a progress closure and a cancellation predicate
pub struct FnObserver<P, C> {
    on_progress: P,
    is_cancelled: C,
}

impl<P, C> FnObserver<P, C>
where
    P: FnMut(usize, usize),
    C: FnMut() -> bool,
{
    pub fn new(on_progress: P, is_cancelled: C) -> Self {
        Self {
            on_progress,
            is_cancelled,
        }
    }
}

impl<P, C> BatchObserver for FnObserver<P, C>
where
    P: FnMut(usize, usize),
    C: FnMut() -> bool,
{
    fn on_progress(&mut self, completed: usize, total: usize) {
        (self.on_progress)(completed, total);
    }

    fn is_cancelled(&mut self) -> bool {
        (self.is_cancelled)()
    }
}

/// Current progress state
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProgressState {
    pub state: BatchState,
    pub total_files: usize,
    pub completed_files: usize,
    pub failed_files: usize,
    pub current_file: Option<String>,
    pub elapsed_time: Duration,
    pub estimated_remaining: Option<Duration>,
}

impl ProgressState {
    /// Images attempted so far, successful or not
    pub fn attempted(&self) -> usize {
        self.completed_files + self.failed_files
    }

    pub fn completion_percentage(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        (self.attempted() as f64 / self.total_files as f64) * 100.0
    }

    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed_time.as_secs_f64();
        if secs > 0.0 {
            self.attempted() as f64 / secs
        } else {
            0.0
        }
    }

    /// Get human-readable completion status
    pub fn status_text(&self) -> String {
        match self.state {
            BatchState::Idle => "Idle".to_string(),
            BatchState::Enumerating => "Listing images".to_string(),
            BatchState::Completed => "Completed".to_string(),
            BatchState::Cancelled => {
                format!("Cancelled after {}/{} files", self.attempted(), self.total_files)
            }
            BatchState::Processing { .. } => match &self.current_file {
                Some(current) => format!(
                    "Processing: {} ({}/{})",
                    current,
                    self.attempted() + 1,
                    self.total_files
                ),
                None => format!("{}/{} files processed", self.attempted(), self.total_files),
            },
        }
    }

    /// Get estimated time remaining as human-readable string
    pub fn eta_text(&self) -> String {
        match self.estimated_remaining {
            Some(duration) => {
                let seconds = duration.as_secs();
                if seconds < 60 {
                    format!("{}s", seconds)
                } else if seconds < 3600 {
                    format!("{}m {}s", seconds / 60, seconds % 60)
                } else {
                    format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
                }
            }
            None => "Unknown".to_string(),
        }
    }

    /// Get processing speed as human-readable string
    pub fn speed_text(&self) -> String {
        let files_per_second = self.files_per_second();
        if files_per_second >= 1.0 {
            format!("{:.1} files/sec", files_per_second)
        } else if files_per_second > 0.0 {
            format!("{:.1} sec/file", 1.0 / files_per_second)
        } else {
            "Unknown".to_string()
        }
    }
}

/// Records state transitions and timing as a batch runs
#[derive(Debug, Default)]
pub struct ProgressTracker {
    state: ProgressState,
    start_time: Option<Instant>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current progress state
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    /// Time since the batch left `Idle`
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    /// Fold a finished outcome into the tracked counters
    pub fn finish(&mut self, outcome: &ResizeOutcome) {
        self.state.completed_files = outcome.processed;
        self.state.failed_files = outcome.failures.len();
        self.update_timing();

        info!(
            "Batch finished: {}/{} files resized in {:.2}s{}",
            outcome.processed,
            outcome.total,
            self.state.elapsed_time.as_secs_f64(),
            if outcome.cancelled { " (cancelled)" } else { "" }
        );
    }

    fn update_timing(&mut self) {
        let elapsed = self.elapsed();
        self.state.elapsed_time = elapsed;

        let attempted = self.state.attempted();
        self.state.estimated_remaining = if attempted > 0 && self.state.total_files > attempted {
            let remaining = self.state.total_files - attempted;
            let per_file = elapsed.as_secs_f64() / attempted as f64;
            Some(Duration::from_secs_f64(remaining as f64 * per_file))
        } else {
            None
        };
    }
}

impl BatchObserver for ProgressTracker {
    fn on_state(&mut self, state: BatchState) {
        if state == BatchState::Enumerating {
            self.start_time = Some(Instant::now());
            self.state = ProgressState::default();
        }
        if let BatchState::Processing { total, .. } = state {
            self.state.total_files = total;
        }
        if state.is_finished() {
            self.state.current_file = None;
        }
        self.state.state = state;
        self.update_timing();
    }

    fn on_item_started(&mut self, entry: &ImageEntry) {
        self.state.current_file = Some(entry.file_name.clone());
    }

    fn on_item_finished(&mut self, entry: &ImageEntry, failure: Option<&ItemFailure>) {
        self.state.current_file = None;
        if failure.is_some() {
            self.state.failed_files += 1;
        } else {
            self.state.completed_files += 1;
        }
        debug!("Finished {} (success: {})", entry.file_name, failure.is_none());
    }

    fn on_progress(&mut self, completed: usize, total: usize) {
        self.state.total_files = total;
        self.update_timing();
        debug!("Progress {}/{} (eta {})", completed, total, self.state.eta_text());
    }
}
