//! Terminal progress for the load step.

use std::path::Path;

use anirec_ingest::LoadObserver;
use indicatif::{ProgressBar, ProgressStyle};

/// Number of files between progress bar updates.
pub const PROGRESS_CADENCE: usize = 10;

/// Load observer drawing an `indicatif` bar that advances every [`PROGRESS_CADENCE`] files.
pub struct ProgressReporter {
    bar: ProgressBar,
    cadence: usize,
    pending: u64,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::new(0), PROGRESS_CADENCE)
    }

    /// A reporter that tracks progress without drawing anything.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden(), PROGRESS_CADENCE)
    }

    fn with_bar(bar: ProgressBar, cadence: usize) -> Self {
        let style = ProgressStyle::with_template(
            "  Loading    {bar:40.cyan/blue} {pos}/{len} files [{elapsed_precise}]",
        )
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self {
            bar,
            cadence: cadence.max(1),
            pending: 0,
        }
    }

    /// Files reflected on the bar so far.
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadObserver for ProgressReporter {
    fn on_start(&mut self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.set_position(0);
        self.pending = 0;
    }

    fn on_batch_loaded(&mut self, index: usize, _path: &Path, _rows: usize) {
        self.pending += 1;
        if (index + 1) % self.cadence == 0 {
            self.bar.inc(self.pending);
            self.pending = 0;
        }
    }

    fn on_finish(&mut self) {
        self.bar.inc(self.pending);
        self.pending = 0;
        self.bar.finish_and_clear();
    }
}
