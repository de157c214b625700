#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;

use ccdredux_core::frame::Frame;
use ccdredux_core::io::write_fits;

pub const SHAPE: (usize, usize) = (10, 10);

pub const DARK_EXPOSURE: f64 = 60.0;
pub const FLAT_EXPOSURE: f64 = 30.0;
pub const LIGHT_EXPOSURE: f64 = 60.0;

/// Per-file pixel levels of the synthetic night. Medians: dark 11, flat 210.
pub const DARK_LEVELS: [f32; 3] = [10.0, 12.0, 11.0];
pub const FLAT_LEVELS: [f32; 3] = [210.0, 200.0, 220.0];
pub const LIGHT_LEVELS: [f32; 3] = [500.0, 600.0, 700.0];

pub fn constant_frame(shape: (usize, usize), value: f32, exposure: Option<f64>) -> Frame {
    Frame::new(Array2::from_elem(shape, value), exposure)
}

/// Frame whose pixel at (r, c) is `base + r * cols + c`.
pub fn ramp_frame(shape: (usize, usize), base: f32, exposure: Option<f64>) -> Frame {
    let data = Array2::from_shape_fn(shape, |(r, c)| base + (r * shape.1 + c) as f32);
    Frame::new(data, exposure)
}

pub fn write_constant(path: &Path, shape: (usize, usize), value: f32, exposure: Option<f64>) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    write_fits(&constant_frame(shape, value, exposure), path).unwrap();
}

/// Lay out `<root>/<night>/{dark,flat,target}` with three frames each.
pub fn populate_night(root: &Path, night: &str) -> PathBuf {
    let night_dir = root.join(night);
    for (i, level) in DARK_LEVELS.iter().enumerate() {
        let path = night_dir.join("dark").join(format!("dark_{i:03}.fit"));
        write_constant(&path, SHAPE, *level, Some(DARK_EXPOSURE));
    }
    for (i, level) in FLAT_LEVELS.iter().enumerate() {
        let path = night_dir.join("flat").join(format!("Flat_{i:03}.fits"));
        write_constant(&path, SHAPE, *level, Some(FLAT_EXPOSURE));
    }
    for (i, level) in LIGHT_LEVELS.iter().enumerate() {
        let path = night_dir.join("target").join(format!("light_{i:03}.fit"));
        write_constant(&path, SHAPE, *level, Some(LIGHT_EXPOSURE));
    }
    night_dir
}

/// Value every calibrated pixel of the synthetic night should hold.
pub fn expected_calibrated(light: f32) -> f32 {
    let dark = 11.0f32;
    let flat = 210.0 - dark * (FLAT_EXPOSURE / DARK_EXPOSURE) as f32;
    (light - dark) / flat
}

pub fn sorted_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    files.sort();
    files
}

/// One 80-byte header record with a value in fixed format.
pub fn card(keyword: &str, value: &str) -> Vec<u8> {
    let line = format!("{keyword:<8}= {value:>20}");
    let mut record = line.into_bytes();
    record.resize(80, b' ');
    record
}

/// Hand-assembled 16-bit FITS file with the given extra header records.
pub fn build_int16_fits(
    width: usize,
    height: usize,
    pixels: &[i16],
    extra_cards: &[Vec<u8>],
) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend(card("SIMPLE", "T"));
    buf.extend(card("BITPIX", "16"));
    buf.extend(card("NAXIS", "2"));
    buf.extend(card("NAXIS1", &width.to_string()));
    buf.extend(card("NAXIS2", &height.to_string()));
    for extra in extra_cards {
        buf.extend_from_slice(extra);
    }
    let mut end = b"END".to_vec();
    end.resize(80, b' ');
    buf.extend(end);
    let header_len = buf.len().div_ceil(2880) * 2880;
    buf.resize(header_len, b' ');

    for v in pixels {
        buf.extend_from_slice(&v.to_be_bytes());
    }
    let total = buf.len().div_ceil(2880) * 2880;
    buf.resize(total, 0);
    buf
}
