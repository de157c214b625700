use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ccdredux_core::master::MasterConfig;
use ccdredux_core::pipeline::{CalibrationConfig, Orchestrator, ReduxConfig, ShapeMismatchPolicy};
use ccdredux_core::stack::CombineMethod;

use crate::logging::{self, LOG_FILENAME};
use crate::progress::BarReporter;
use crate::summary::{print_run_config, print_run_summary};

/// Exit status when at least one night failed.
const NIGHT_FAILURE_EXIT: u8 = 2;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CombineArg {
    Median,
    Mean,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ShapeMismatchArg {
    AbortObject,
    SkipFrame,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input root holding one directory per night
    #[arg(short, long, default_value = ".")]
    pub input: PathBuf,

    /// Output root for master and calibrated frames
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Pipeline config file (TOML), used instead of the options below
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Divide the master flat by its own median
    #[arg(long)]
    pub normalize_flat: bool,

    /// Pixel combination for master frames
    #[arg(long, value_enum, default_value = "median")]
    pub combine: CombineArg,

    /// What to do with a light frame whose shape differs from the masters
    #[arg(long, value_enum, default_value = "abort-object")]
    pub on_shape_mismatch: ShapeMismatchArg,

    /// Do not write redux.log into the output root
    #[arg(long)]
    pub no_log_file: bool,
}

pub fn run(args: &RunArgs, verbose: bool) -> Result<ExitCode> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid pipeline config")?
    } else {
        build_config_from_args(args)
    };

    std::fs::create_dir_all(&config.output).with_context(|| {
        format!("Failed to create output directory {}", config.output.display())
    })?;
    let log_file = (!args.no_log_file).then(|| config.output.join(LOG_FILENAME));
    logging::init(verbose, log_file.as_deref())?;

    print_run_config(&config, log_file.as_deref());

    let reporter = Arc::new(BarReporter::new(verbose)?);
    let orchestrator = Orchestrator::new(config).with_reporter(reporter.clone());
    let summary = orchestrator.run().with_context(|| {
        format!(
            "Failed to read input directory {}",
            orchestrator.config().input.display()
        )
    })?;
    reporter.finish();

    print_run_summary(&summary);

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(NIGHT_FAILURE_EXIT))
    }
}

fn build_config_from_args(args: &RunArgs) -> ReduxConfig {
    let combine = match args.combine {
        CombineArg::Median => CombineMethod::Median,
        CombineArg::Mean => CombineMethod::Mean,
    };
    let on_shape_mismatch = match args.on_shape_mismatch {
        ShapeMismatchArg::AbortObject => ShapeMismatchPolicy::AbortObject,
        ShapeMismatchArg::SkipFrame => ShapeMismatchPolicy::SkipFrame,
    };

    ReduxConfig {
        input: args.input.clone(),
        output: args.output.clone(),
        masters: MasterConfig {
            combine,
            normalize_flat: args.normalize_flat,
        },
        calibration: CalibrationConfig { on_shape_mismatch },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            input: PathBuf::from("raw"),
            output: PathBuf::from("out"),
            config: None,
            normalize_flat: false,
            combine: CombineArg::Median,
            on_shape_mismatch: ShapeMismatchArg::AbortObject,
            no_log_file: false,
        }
    }

    #[test]
    fn defaults_match_library_defaults() {
        let config = build_config_from_args(&args());
        assert_eq!(config.masters, MasterConfig::default());
        assert_eq!(config.calibration, CalibrationConfig::default());
        assert_eq!(config.input, PathBuf::from("raw"));
        assert_eq!(config.output, PathBuf::from("out"));
    }

    #[test]
    fn flags_map_onto_config() {
        let config = build_config_from_args(&RunArgs {
            normalize_flat: true,
            combine: CombineArg::Mean,
            on_shape_mismatch: ShapeMismatchArg::SkipFrame,
            ..args()
        });
        assert!(config.masters.normalize_flat);
        assert_eq!(config.masters.combine, CombineMethod::Mean);
        assert_eq!(
            config.calibration.on_shape_mismatch,
            ShapeMismatchPolicy::SkipFrame
        );
    }
}
