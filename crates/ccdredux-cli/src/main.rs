mod commands;
mod logging;
mod progress;
mod summary;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ccdredux",
    about = "Reduce raw CCD frames: master darks and flats, calibrated lights"
)]
#[command(version, args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: commands::run::RunArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calibrate every night under the input root (the default)
    Run(commands::run::RunArgs),
    /// Show FITS file metadata
    Info(commands::info::InfoArgs),
    /// Print or save the default configuration as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Run(args)) => commands::run::run(args, cli.verbose),
        Some(Commands::Info(args)) => {
            logging::init(cli.verbose, None)?;
            commands::info::run(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(Commands::Config(args)) => {
            commands::config::run(args)?;
            Ok(ExitCode::SUCCESS)
        }
        None => commands::run::run(&cli.run, cli.verbose),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::commands::run::{CombineArg, ShapeMismatchArg};

    #[test]
    fn bare_invocation_defaults_to_current_dir() {
        let cli = Cli::try_parse_from(["ccdredux"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.run.input, PathBuf::from("."));
        assert_eq!(cli.run.output, PathBuf::from("."));
        assert!(!cli.run.normalize_flat);
        assert!(!cli.verbose);
    }

    #[test]
    fn short_path_flags() {
        let cli = Cli::try_parse_from(["ccdredux", "-i", "raw", "-o", "reduced"]).unwrap();
        assert_eq!(cli.run.input, PathBuf::from("raw"));
        assert_eq!(cli.run.output, PathBuf::from("reduced"));
    }

    #[test]
    fn run_subcommand_takes_same_flags() {
        let cli = Cli::try_parse_from([
            "ccdredux",
            "run",
            "--input",
            "raw",
            "--combine",
            "mean",
            "--on-shape-mismatch",
            "skip-frame",
            "--normalize-flat",
            "-v",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.input, PathBuf::from("raw"));
                assert!(matches!(args.combine, CombineArg::Mean));
                assert!(matches!(args.on_shape_mismatch, ShapeMismatchArg::SkipFrame));
                assert!(args.normalize_flat);
            }
            other => panic!("unexpected command: {other:?}"),
        }
        assert!(cli.verbose);
    }

    #[test]
    fn info_requires_file() {
        assert!(Cli::try_parse_from(["ccdredux", "info"]).is_err());
        let cli = Cli::try_parse_from(["ccdredux", "info", "dark.fit"]).unwrap();
        match cli.command {
            Some(Commands::Info(args)) => assert_eq!(args.file, PathBuf::from("dark.fit")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_output_flag() {
        let cli = Cli::try_parse_from(["ccdredux", "config", "-o", "redux.toml"]).unwrap();
        match cli.command {
            Some(Commands::Config(args)) => {
                assert_eq!(args.output, Some(PathBuf::from("redux.toml")))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_combine_method_rejected() {
        assert!(Cli::try_parse_from(["ccdredux", "--combine", "sigma"]).is_err());
    }

    #[test]
    fn top_level_flags_conflict_with_subcommand() {
        assert!(Cli::try_parse_from(["ccdredux", "-i", "raw", "info", "a.fit"]).is_err());
    }
}
