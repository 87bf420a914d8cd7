//! Progress bar for download runs.

use indicatif::{ProgressBar, ProgressStyle};

use mediadl_core::{MediaItem, Outcome};

/// Progress bar over the planned items; a no-op when disabled.
pub(crate) struct ProgressReporter {
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    pub(crate) fn new(enabled: bool, total: usize) -> Self {
        if !enabled {
            return Self { bar: None };
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::with_template("{bar:30} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        Self { bar: Some(bar) }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.bar.is_some()
    }

    pub(crate) fn record(&self, outcome: &Outcome<MediaItem>) {
        let Some(bar) = &self.bar else {
            return;
        };
        let label = match outcome {
            Outcome::Success { .. } => "downloaded",
            Outcome::Skipped { .. } => "skipped",
            Outcome::Failed { .. } => "failed",
        };
        bar.set_message(format!("{label} {}", outcome.item().id));
        bar.inc(1);
    }

    pub(crate) fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}
