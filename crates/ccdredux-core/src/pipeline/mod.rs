pub mod config;
mod orchestrator;
mod types;

pub use config::{CalibrationConfig, ReduxConfig, ShapeMismatchPolicy};
pub use orchestrator::Orchestrator;
pub use types::{
    NightReport, NightStatus, NoOpReporter, ObjectOutcome, ObjectReport, PipelineStage,
    ProgressReporter, RunSummary,
};
