use std::path::Path;

use ccdredux_core::master::MasterOrigin;
use ccdredux_core::pipeline::{NightStatus, ObjectOutcome, ReduxConfig, RunSummary};
use console::Style;

struct Styles {
    title: Style,
    header: Style,
    label: Style,
    value: Style,
    method: Style,
    disabled: Style,
    path: Style,
    ok: Style,
    warn: Style,
    error: Style,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Style::new().cyan().bold(),
            header: Style::new().cyan().bold(),
            label: Style::new().dim(),
            value: Style::new().bold().white(),
            method: Style::new().green(),
            disabled: Style::new().dim().yellow(),
            path: Style::new().underlined(),
            ok: Style::new().green(),
            warn: Style::new().yellow(),
            error: Style::new().red().bold(),
        }
    }
}

pub fn print_run_config(config: &ReduxConfig, log_file: Option<&Path>) {
    let s = Styles::new();

    println!();
    println!("  {}", s.title.apply_to("CCD Reduction"));
    println!("  {}", s.title.apply_to("\u{2550}".repeat(13)));
    println!();

    println!(
        "  {:<14}{}",
        s.label.apply_to("Input"),
        s.path.apply_to(config.input.display())
    );
    println!(
        "  {:<14}{}",
        s.label.apply_to("Output"),
        s.path.apply_to(config.output.display())
    );
    match log_file {
        Some(path) => println!(
            "  {:<14}{}",
            s.label.apply_to("Log"),
            s.path.apply_to(path.display())
        ),
        None => println!(
            "  {:<14}{}",
            s.label.apply_to("Log"),
            s.disabled.apply_to("disabled")
        ),
    }
    println!();

    println!("  {}", s.header.apply_to("Master Frames"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Combine"),
        s.method.apply_to(config.masters.combine)
    );
    if config.masters.normalize_flat {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Flat"),
            s.value.apply_to("normalized to median 1")
        );
    } else {
        println!(
            "    {:<12}{}",
            s.label.apply_to("Flat"),
            s.disabled.apply_to("not normalized")
        );
    }
    println!();

    println!("  {}", s.header.apply_to("Calibration"));
    println!(
        "    {:<12}{}",
        s.label.apply_to("Mismatch"),
        s.method.apply_to(config.calibration.on_shape_mismatch)
    );
    println!();
}

pub fn print_run_summary(summary: &RunSummary) {
    let s = Styles::new();

    println!();
    println!("  {}", s.header.apply_to("Results"));
    if summary.nights.is_empty() {
        println!("    {}", s.disabled.apply_to("no night directories found"));
    }

    for night in &summary.nights {
        match &night.status {
            NightStatus::Skipped => println!(
                "    {:<20}{}",
                s.value.apply_to(&night.name),
                s.disabled.apply_to("skipped (no darks or flats)")
            ),
            NightStatus::Failed(e) => println!(
                "    {:<20}{}",
                s.value.apply_to(&night.name),
                s.error.apply_to(format!("failed: {e}"))
            ),
            NightStatus::Done {
                dark,
                flat,
                objects,
            } => {
                println!(
                    "    {:<20}{}",
                    s.value.apply_to(&night.name),
                    s.label.apply_to(format!(
                        "dark {}, flat {}",
                        origin_label(*dark),
                        origin_label(*flat)
                    ))
                );
                for object in objects {
                    let outcome = match &object.outcome {
                        ObjectOutcome::AlreadyCalibrated => {
                            s.disabled.apply_to("already calibrated".to_string())
                        }
                        ObjectOutcome::Calibrated { written, skipped: 0 } => {
                            s.ok.apply_to(format!("{written} frame(s)"))
                        }
                        ObjectOutcome::Calibrated { written, skipped } => s
                            .warn
                            .apply_to(format!("{written} frame(s), {skipped} skipped")),
                        ObjectOutcome::Aborted { written, reason } => s
                            .warn
                            .apply_to(format!("stopped after {written} frame(s): {reason}")),
                    };
                    println!("      {:<18}{}", s.label.apply_to(&object.name), outcome);
                }
            }
        }
    }
    println!();

    let failed = summary.failed_nights();
    let totals = format!(
        "{} night(s), {} frame(s) written",
        summary.nights.len(),
        summary.frames_written()
    );
    if failed == 0 {
        println!("  {}", s.ok.apply_to(totals));
    } else {
        println!(
            "  {} {}",
            s.warn.apply_to(totals),
            s.error.apply_to(format!("{failed} night(s) failed"))
        );
    }
    println!();
}

fn origin_label(origin: MasterOrigin) -> &'static str {
    match origin {
        MasterOrigin::Built => "built",
        MasterOrigin::Loaded => "cached",
    }
}
