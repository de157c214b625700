//! Master dark and master flat synthesis with build-or-load caching.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cache::{artifact_exists, ensure_dir};
use crate::calibrate::{normalize_flat, subtract_dark};
use crate::consts::{MASTER_DARK_FILENAME, MASTER_FLAT_FILENAME};
use crate::error::{ReduxError, Result};
use crate::frame::Frame;
use crate::io::fits::{read_fits, write_fits};
use crate::stack::{combine, CombineMethod};

/// How master frames are combined and post-processed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterConfig {
    pub combine: CombineMethod,
    /// Divide the dark-subtracted master flat by its own median.
    pub normalize_flat: bool,
}

/// Whether a master was computed in this call or read back from disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MasterOrigin {
    Built,
    Loaded,
}

#[derive(Clone, Debug)]
pub struct MasterFrame {
    pub frame: Frame,
    pub path: PathBuf,
    pub origin: MasterOrigin,
}

pub fn master_dark_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MASTER_DARK_FILENAME)
}

pub fn master_flat_path(output_dir: &Path) -> PathBuf {
    output_dir.join(MASTER_FLAT_FILENAME)
}

/// Combine `darks` into `output_dir/master-dark.fit`, or load that file if it
/// already exists.
pub fn build_master_dark(
    darks: &[PathBuf],
    output_dir: &Path,
    config: &MasterConfig,
) -> Result<MasterFrame> {
    if darks.is_empty() {
        return Err(ReduxError::InsufficientFrames { kind: "dark" });
    }
    let path = master_dark_path(output_dir);
    if let Some(cached) = load_cached(&path)? {
        return Ok(cached);
    }

    let frames = read_all(darks)?;
    let master = combine(&frames, config.combine)?;
    save_built(master, path, "dark")
}

/// Combine `flats`, subtract `master_dark` scaled to the flats' own exposure,
/// and optionally normalize. Cached at `output_dir/master-flat.fit`.
pub fn build_master_flat(
    flats: &[PathBuf],
    master_dark: &Frame,
    output_dir: &Path,
    config: &MasterConfig,
) -> Result<MasterFrame> {
    if flats.is_empty() {
        return Err(ReduxError::InsufficientFrames { kind: "flat" });
    }
    let path = master_flat_path(output_dir);
    if let Some(cached) = load_cached(&path)? {
        return Ok(cached);
    }

    let frames = read_all(flats)?;
    let combined = combine(&frames, config.combine)?;
    let mut master = subtract_dark(&combined, master_dark)?;
    if config.normalize_flat {
        master = normalize_flat(&master)?;
    }
    save_built(master, path, "flat")
}

fn load_cached(path: &Path) -> Result<Option<MasterFrame>> {
    if !artifact_exists(path) {
        return Ok(None);
    }
    info!(path = %path.display(), "Master frame exists, loading");
    let frame = read_fits(path)?;
    Ok(Some(MasterFrame {
        frame,
        path: path.to_path_buf(),
        origin: MasterOrigin::Loaded,
    }))
}

fn read_all(paths: &[PathBuf]) -> Result<Vec<Frame>> {
    debug!(files = ?paths, "Reading frames");
    paths.iter().map(|p| read_fits(p)).collect()
}

fn save_built(frame: Frame, path: PathBuf, kind: &str) -> Result<MasterFrame> {
    if let Some(dir) = path.parent() {
        ensure_dir(dir)?;
    }
    write_fits(&frame, &path)?;
    info!(kind, path = %path.display(), "Master frame written");
    Ok(MasterFrame {
        frame,
        path,
        origin: MasterOrigin::Built,
    })
}
