use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReduxError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid FITS file '{path}': {reason}")]
    InvalidFits { path: PathBuf, reason: String },

    #[error("Unsupported BITPIX: {0}")]
    UnsupportedBitpix(i64),

    #[error("Shape mismatch: expected {}x{}, found {}x{}", expected.0, expected.1, found.0, found.1)]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("No {kind} frames supplied")]
    InsufficientFrames { kind: &'static str },

    #[error("No usable exposure time on {0}")]
    ExposureMissing(String),

    #[error("Flat median is {median}, cannot normalize")]
    DegenerateFlat { median: f32 },
}

impl ReduxError {
    pub(crate) fn invalid_fits(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidFits {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReduxError>;
