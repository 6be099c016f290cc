//! Progress reporting for generation runs.
//!
//! The scheduler and batch processor report through the [`ProgressSink`]
//! trait so a host can drive whatever progress UI it has. Two
//! implementations ship with the crate: [`NoopProgress`] for headless
//! runs, and [`ConsoleProgress`], an `indicatif` bar for terminal
//! embedders.
//!
//! Set the `SMARTFIELDS_NO_PROGRESS` environment variable to suppress the
//! console bar in CI or scripted runs.

use std::sync::Mutex;

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};

/// Receives progress callbacks during a generation run.
///
/// Callbacks fire from the scheduler's serial settlement step (never
/// concurrently for one run), but batches report from interleaved tasks,
/// so implementations must be `Send + Sync`. No return value is consumed.
pub trait ProgressSink: Send + Sync {
    /// A run over `total` units (fields, or notes for batches) is starting.
    fn begin(&self, total: usize);

    /// One unit finished (generated, skipped, or failed).
    fn node_resolved(&self, completed: usize, total: usize);

    /// The run is over; tear down any UI.
    fn finish(&self);
}

/// A sink that ignores every callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn begin(&self, _total: usize) {}
    fn node_resolved(&self, _completed: usize, _total: usize) {}
    fn finish(&self) {}
}

fn is_progress_disabled() -> bool {
    std::env::var("SMARTFIELDS_NO_PROGRESS").is_ok()
}

/// A terminal progress bar for generation runs.
#[derive(Default)]
pub struct ConsoleProgress {
    bar: Mutex<Option<IndicatifBar>>,
}

impl ConsoleProgress {
    /// Create an idle console sink; the bar appears at `begin`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressSink for ConsoleProgress {
    fn begin(&self, total: usize) {
        let bar = if is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new(total as u64);
            let style = IndicatifStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
                .unwrap_or_else(|_| IndicatifStyle::default_bar())
                .progress_chars("█▓░");
            bar.set_style(style);
            bar.set_message("Generating...");
            bar
        };
        *self.bar.lock().unwrap() = Some(bar);
    }

    fn node_resolved(&self, completed: usize, _total: usize) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.set_position(completed as u64);
        }
    }

    fn finish(&self) {
        if let Some(bar) = self.bar.lock().unwrap().take() {
            bar.finish_and_clear();
        }
    }
}
