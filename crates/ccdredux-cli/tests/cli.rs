use std::fs;
use std::path::Path;

use assert_cmd::Command;
use ccdredux_core::frame::Frame;
use ccdredux_core::io::write_fits;
use ndarray::Array2;
use predicates::prelude::*;

fn write_frame(path: &Path, value: f32, exposure: f64) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let frame = Frame::new(Array2::from_elem((8, 8), value), Some(exposure));
    write_fits(&frame, path).unwrap();
}

fn populate_night(root: &Path, night: &str) {
    let dir = root.join(night);
    for i in 0..3 {
        write_frame(&dir.join(format!("dark/dark_{i}.fit")), 10.0, 60.0);
        write_frame(&dir.join(format!("flat/flat_{i}.fit")), 200.0, 10.0);
        write_frame(&dir.join(format!("m42/light_{i}.fit")), 500.0, 60.0);
    }
}

fn ccdredux() -> Command {
    Command::cargo_bin("ccdredux").expect("Binary exists")
}

#[test]
fn run_calibrates_night_and_writes_log() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate_night(input.path(), "2024-03-01");

    ccdredux()
        .arg("-i")
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("3 frame(s) written"));

    let cal_dir = output.path().join("2024-03-01/cal_frames/cal_m42");
    assert_eq!(fs::read_dir(cal_dir).unwrap().count(), 3);
    assert!(output
        .path()
        .join("2024-03-01/master_frames/master-flat.fit")
        .is_file());

    let log = fs::read_to_string(output.path().join("redux.log")).unwrap();
    assert!(log.contains("Master frame written"));
}

#[test]
fn failed_night_exits_with_status_2() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate_night(input.path(), "bad");
    fs::write(input.path().join("bad/dark/dark_0.fit"), b"garbage").unwrap();

    ccdredux()
        .args(["run", "--no-log-file", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(output.path())
        .assert()
        .code(2)
        .stdout(predicate::str::contains("1 night(s) failed"));

    assert!(!output.path().join("redux.log").exists());
}

#[test]
fn missing_input_root_is_fatal() {
    let output = tempfile::tempdir().unwrap();

    ccdredux()
        .arg("-i")
        .arg(output.path().join("absent"))
        .arg("-o")
        .arg(output.path())
        .arg("--no-log-file")
        .assert()
        .code(1);
}

#[test]
fn config_prints_default_toml() {
    ccdredux()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("on_shape_mismatch = \"abort-object\""))
        .stdout(predicate::str::contains("combine = \"median\""));
}

#[test]
fn info_shows_dimensions_and_exposure() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("light.fit");
    write_frame(&path, 1.0, 45.0);

    ccdredux()
        .arg("info")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Dimensions:  8x8"))
        .stdout(predicate::str::contains("Exposure:    45 s"));
}
