use std::path::Path;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::cache::{dir_is_populated, ensure_dir};
use crate::calibrate::{flat_correct, subtract_dark};
use crate::consts::{CAL_FRAMES_DIR, CAL_FRAME_PREFIX, CAL_OBJECT_PREFIX, MASTER_FRAMES_DIR};
use crate::error::{ReduxError, Result};
use crate::frame::Frame;
use crate::io::fits::{read_fits, write_fits};
use crate::master::{build_master_dark, build_master_flat};
use crate::night::{discover_nights, NightBatch, ObjectDir};

use super::config::{ReduxConfig, ShapeMismatchPolicy};
use super::types::{
    NightReport, NightStatus, NoOpReporter, ObjectOutcome, ObjectReport, PipelineStage,
    ProgressReporter, RunSummary,
};

/// Drives a full reduction run over every night under the input root.
///
/// Nights are processed one after another in name order. A failing night is
/// recorded in the summary and the run moves on to the next one.
pub struct Orchestrator {
    config: ReduxConfig,
    reporter: Arc<dyn ProgressReporter>,
}

impl Orchestrator {
    pub fn new(config: ReduxConfig) -> Self {
        Self {
            config,
            reporter: Arc::new(NoOpReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn config(&self) -> &ReduxConfig {
        &self.config
    }

    /// Process every night. Only an unreadable input root is an error here;
    /// per-night failures end up in the returned summary.
    pub fn run(&self) -> Result<RunSummary> {
        let nights = discover_nights(&self.config.input)?;
        info!(
            count = nights.len(),
            input = %self.config.input.display(),
            output = %self.config.output.display(),
            "Found night directories"
        );

        let mut summary = RunSummary::default();
        for (index, night_dir) in nights.iter().enumerate() {
            let name = night_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.reporter.begin_night(&name, index, nights.len());

            let status = match self.process_night(night_dir) {
                Ok(status) => status,
                Err(e) => {
                    error!(night = %name, error = %e, "Night failed");
                    NightStatus::Failed(e)
                }
            };
            summary.nights.push(NightReport { name, status });
        }
        Ok(summary)
    }

    /// Reduce one night: build or load its masters, then calibrate each
    /// object directory that has not been calibrated yet.
    pub fn process_night(&self, night_dir: &Path) -> Result<NightStatus> {
        self.reporter.begin_stage(PipelineStage::Discovering, None);
        let batch = NightBatch::discover(night_dir)?;
        self.reporter.finish_stage();

        info!(
            night = %batch.name,
            bias = batch.bias.len(),
            darks = batch.darks.len(),
            flats = batch.flats.len(),
            objects = batch.objects.len(),
            lights = batch.light_frame_count(),
            "Discovered night"
        );
        if !batch.has_calibration_frames() {
            warn!(night = %batch.name, "No dark or flat frames, skipping night");
            return Ok(NightStatus::Skipped);
        }

        let night_out = self.config.output.join(&batch.name);
        let master_dir = night_out.join(MASTER_FRAMES_DIR);
        ensure_dir(&master_dir)?;

        self.reporter
            .begin_stage(PipelineStage::MasterDark, Some(batch.darks.len()));
        let dark = build_master_dark(&batch.darks, &master_dir, &self.config.masters)?;
        self.reporter.finish_stage();

        self.reporter
            .begin_stage(PipelineStage::MasterFlat, Some(batch.flats.len()));
        let flat = build_master_flat(
            &batch.flats,
            &dark.frame,
            &master_dir,
            &self.config.masters,
        )?;
        self.reporter.finish_stage();

        // Both masters may come from disk, so they are not known to agree yet.
        if flat.frame.shape() != dark.frame.shape() {
            return Err(ReduxError::ShapeMismatch {
                expected: dark.frame.shape(),
                found: flat.frame.shape(),
            });
        }

        let cal_root = night_out.join(CAL_FRAMES_DIR);
        let mut objects = Vec::with_capacity(batch.objects.len());
        for object in &batch.objects {
            objects.push(self.calibrate_object(object, &cal_root, &dark.frame, &flat.frame)?);
        }

        Ok(NightStatus::Done {
            dark: dark.origin,
            flat: flat.origin,
            objects,
        })
    }

    /// Calibrate every light frame of one object into
    /// `cal_root/cal_<object>/cal-<file name>`.
    ///
    /// A populated output directory counts as done and is left untouched.
    pub fn calibrate_object(
        &self,
        object: &ObjectDir,
        cal_root: &Path,
        dark: &Frame,
        flat: &Frame,
    ) -> Result<ObjectReport> {
        let output_dir = cal_root.join(format!("{CAL_OBJECT_PREFIX}{}", object.name));
        let report = |outcome| ObjectReport {
            name: object.name.clone(),
            output_dir: output_dir.clone(),
            outcome,
        };

        ensure_dir(&output_dir)?;
        if dir_is_populated(&output_dir)? {
            info!(object = %object.name, "Already calibrated, skipping");
            return Ok(report(ObjectOutcome::AlreadyCalibrated));
        }

        info!(object = %object.name, frames = object.frames.len(), "Calibrating object");
        self.reporter
            .begin_stage(PipelineStage::Calibrating, Some(object.frames.len()));

        let mut written = 0;
        let mut skipped = 0;
        for (i, path) in object.frames.iter().enumerate() {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let light = read_fits(path)?;

            if light.shape() != dark.shape() {
                let mismatch = ReduxError::ShapeMismatch {
                    expected: dark.shape(),
                    found: light.shape(),
                };
                match self.config.calibration.on_shape_mismatch {
                    ShapeMismatchPolicy::AbortObject => {
                        warn!(
                            object = %object.name,
                            file = %file_name,
                            error = %mismatch,
                            "Frame does not match masters, stopping object"
                        );
                        self.reporter.finish_stage();
                        return Ok(report(ObjectOutcome::Aborted {
                            written,
                            reason: format!("{file_name}: {mismatch}"),
                        }));
                    }
                    ShapeMismatchPolicy::SkipFrame => {
                        warn!(
                            object = %object.name,
                            file = %file_name,
                            error = %mismatch,
                            "Frame does not match masters, skipping"
                        );
                        skipped += 1;
                        self.reporter.advance(i + 1);
                        continue;
                    }
                }
            }

            if let Err(e) = light.exposure_seconds("light frame") {
                warn!(object = %object.name, file = %file_name, error = %e, "Skipping frame");
                skipped += 1;
                self.reporter.advance(i + 1);
                continue;
            }

            let calibrated = flat_correct(&subtract_dark(&light, dark)?, flat)?;
            let out_path = output_dir.join(format!("{CAL_FRAME_PREFIX}{file_name}"));
            write_fits(&calibrated, &out_path)?;
            debug!(path = %out_path.display(), "Calibrated frame written");

            written += 1;
            self.reporter.advance(i + 1);
        }
        self.reporter.finish_stage();

        info!(object = %object.name, written, skipped, "Object calibrated");
        Ok(report(ObjectOutcome::Calibrated { written, skipped }))
    }
}
