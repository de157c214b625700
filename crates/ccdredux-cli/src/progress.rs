use anyhow::Result;
use ccdredux_core::pipeline::{PipelineStage, ProgressReporter};
use indicatif::{ProgressBar, ProgressStyle};

/// Drives a single terminal progress bar from orchestrator events.
///
/// The prefix shows the current night, the message the current stage.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    /// A hidden bar when `quiet`, so verbose log lines are not interleaved
    /// with redraws.
    pub fn new(quiet: bool) -> Result<Self> {
        let bar = if quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(0)
        };
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix:>16} {msg:22} [{bar:30}] {pos}/{len}")?
                .progress_chars("=> "),
        );
        Ok(Self { bar })
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl ProgressReporter for BarReporter {
    fn begin_night(&self, name: &str, index: usize, total: usize) {
        self.bar
            .set_prefix(format!("[{}/{}] {}", index + 1, total, name));
    }

    fn begin_stage(&self, stage: PipelineStage, total_items: Option<usize>) {
        self.bar.set_length(total_items.unwrap_or(0) as u64);
        self.bar.set_position(0);
        self.bar.set_message(stage.to_string());
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}
