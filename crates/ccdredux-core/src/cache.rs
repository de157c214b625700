//! Filesystem-backed artifact cache.
//!
//! Outputs live at deterministic paths, so "is this already computed" is a
//! question about the filesystem alone. These predicates never read or write
//! image data.

use std::fs;
use std::path::Path;

use crate::consts::PARTIAL_SUFFIX;
use crate::error::Result;

/// True if a finished artifact exists at `path`.
pub fn artifact_exists(path: &Path) -> bool {
    path.is_file()
}

/// True for a file still being written (or left behind by a killed run).
pub fn is_partial(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == PARTIAL_SUFFIX)
}

/// True if `dir` exists and contains at least one finished entry.
/// Leftover `*.partial` files do not count.
pub fn dir_is_populated(dir: &Path) -> Result<bool> {
    if !dir.is_dir() {
        return Ok(false);
    }
    for entry in fs::read_dir(dir)? {
        if !is_partial(&entry?.path()) {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Create `dir` and its parents. An existing directory is not an error.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}
