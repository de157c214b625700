//! Discovery of observation nights and the frames inside them.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cache::is_partial;
use crate::classify::{classify_dir, is_fits_name, is_output_dir, matches_category, FrameCategory};
use crate::error::Result;

/// Light frames of one target within a night.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectDir {
    pub name: String,
    pub path: PathBuf,
    pub frames: Vec<PathBuf>,
}

/// Every frame of one observation night, grouped by category.
///
/// Rebuilt from the filesystem on each run; all lists are sorted by path.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NightBatch {
    pub name: String,
    pub path: PathBuf,
    pub bias: Vec<PathBuf>,
    pub darks: Vec<PathBuf>,
    pub flats: Vec<PathBuf>,
    pub objects: Vec<ObjectDir>,
}

impl NightBatch {
    pub fn discover(night_dir: &Path) -> Result<Self> {
        let mut batch = Self {
            name: dir_name(night_dir),
            path: night_dir.to_path_buf(),
            ..Self::default()
        };

        for sub in sorted_dirs(night_dir)? {
            let name = dir_name(&sub);
            if is_output_dir(&name) {
                continue;
            }
            let category = classify_dir(&name);
            let frames = frame_files(&sub, &category)?;
            debug!(night = %batch.name, %category, count = frames.len(), "Found frames");

            match category {
                FrameCategory::Bias => batch.bias.extend(frames),
                FrameCategory::Dark => batch.darks.extend(frames),
                FrameCategory::Flat => batch.flats.extend(frames),
                FrameCategory::Object(name) => batch.objects.push(ObjectDir {
                    name,
                    path: sub,
                    frames,
                }),
            }
        }

        batch.bias.sort();
        batch.darks.sort();
        batch.flats.sort();
        Ok(batch)
    }

    /// True if the night can be reduced: at least one dark and one flat.
    pub fn has_calibration_frames(&self) -> bool {
        !self.darks.is_empty() && !self.flats.is_empty()
    }

    pub fn light_frame_count(&self) -> usize {
        self.objects.iter().map(|o| o.frames.len()).sum()
    }
}

/// Night directories directly under `input_root`, sorted by name.
pub fn discover_nights(input_root: &Path) -> Result<Vec<PathBuf>> {
    sorted_dirs(input_root)
}

fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn frame_files(dir: &Path, category: &FrameCategory) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || is_partial(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !is_fits_name(name) {
            debug!(file = %path.display(), "Ignoring non-FITS file");
        } else if matches_category(category, name) {
            files.push(path);
        } else {
            debug!(file = %path.display(), %category, "Ignoring file without category keyword");
        }
    }
    files.sort();
    Ok(files)
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
