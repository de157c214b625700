use std::path::PathBuf;

use crate::error::ReduxError;
use crate::master::MasterOrigin;

/// Pipeline processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Discovering,
    MasterDark,
    MasterFlat,
    Calibrating,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Discovering => write!(f, "Discovering frames"),
            Self::MasterDark => write!(f, "Building master dark"),
            Self::MasterFlat => write!(f, "Building master flat"),
            Self::Calibrating => write!(f, "Calibrating"),
        }
    }
}

/// Thread-safe progress reporting for the pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// Processing of night `index` (zero-based) out of `total` has started.
    fn begin_night(&self, _name: &str, _index: usize, _total: usize) {}

    /// A new pipeline stage has started. `total_items` is the number of
    /// work items in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: PipelineStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, the orchestrator's default.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Outcome of one `Orchestrator::run`.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub nights: Vec<NightReport>,
}

impl RunSummary {
    pub fn failed_nights(&self) -> usize {
        self.nights
            .iter()
            .filter(|n| matches!(n.status, NightStatus::Failed(_)))
            .count()
    }

    pub fn frames_written(&self) -> usize {
        self.nights
            .iter()
            .filter_map(|n| match &n.status {
                NightStatus::Done { objects, .. } => Some(objects),
                _ => None,
            })
            .flatten()
            .map(ObjectReport::written)
            .sum()
    }

    pub fn is_success(&self) -> bool {
        self.failed_nights() == 0
    }
}

#[derive(Debug)]
pub struct NightReport {
    pub name: String,
    pub status: NightStatus,
}

#[derive(Debug)]
pub enum NightStatus {
    /// No darks or no flats; nothing was written.
    Skipped,
    Done {
        dark: MasterOrigin,
        flat: MasterOrigin,
        objects: Vec<ObjectReport>,
    },
    Failed(ReduxError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectReport {
    pub name: String,
    pub output_dir: PathBuf,
    pub outcome: ObjectOutcome,
}

impl ObjectReport {
    pub fn written(&self) -> usize {
        match self.outcome {
            ObjectOutcome::AlreadyCalibrated => 0,
            ObjectOutcome::Calibrated { written, .. } | ObjectOutcome::Aborted { written, .. } => {
                written
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectOutcome {
    /// The output directory was already populated; nothing was touched.
    AlreadyCalibrated,
    /// Every frame was processed. `skipped` counts frames left out because
    /// of a missing exposure or, under `SkipFrame`, a shape mismatch.
    Calibrated { written: usize, skipped: usize },
    /// A shape mismatch stopped the loop after `written` frames.
    Aborted { written: usize, reason: String },
}
