//! Progress tracking for export operations
//!
//! Shows a spinner with the number of rows written and pages scanned while a
//! long export runs. The total is never known up front because the pipeline
//! does not issue a count query.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

/// Progress tracker for export operations
pub struct ProgressTracker {
    /// Number of rows written so far
    rows: AtomicU64,
    /// Start time of the operation
    start_time: Instant,
    /// Spinner (optional, can be disabled)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a new progress tracker
    ///
    /// # Arguments
    /// * `enable_bar` - Whether to display a spinner on stderr
    pub fn new(enable_bar: bool) -> Self {
        let bar = enable_bar.then(|| {
            let bar = ProgressBar::new_spinner();
            let style = ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} orders exported {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner());
            bar.set_style(style);
            bar
        });

        Self {
            rows: AtomicU64::new(0),
            start_time: Instant::now(),
            bar,
        }
    }

    /// A tracker that only counts
    pub fn hidden() -> Self {
        Self::new(false)
    }

    /// Update progress after a page has been processed
    ///
    /// # Arguments
    /// * `rows` - Total rows written so far
    /// * `pages` - Total pages fetched so far
    pub fn update(&self, rows: u64, pages: u32) {
        self.rows.store(rows, Ordering::Relaxed);

        if let Some(ref bar) = self.bar {
            bar.set_position(rows);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = rows as f64 / elapsed;
                bar.set_message(format!("({pages} pages, {speed:.0} rows/sec)"));
            }
        }
    }

    /// Rows reported by the last update
    pub fn rows(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    /// Finish and clear the spinner
    pub fn finish(&self) {
        debug!(
            "Progress finished at {} rows after {:.1}s",
            self.rows(),
            self.start_time.elapsed().as_secs_f64()
        );
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_tracker_counts_without_bar() {
        let tracker = ProgressTracker::hidden();
        tracker.update(250, 3);
        assert_eq!(tracker.rows(), 250);
        tracker.finish();
    }
}
