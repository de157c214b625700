use std::fmt;

use ndarray::Array2;

use crate::error::{ReduxError, Result};
use crate::io::header::FitsHeader;

/// A single CCD image in physical units.
///
/// Operations never mutate a frame in place; every calibration step
/// returns a new `Frame`.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    /// Pixel data, row-major, shape = (height, width)
    pub data: Array2<f32>,
    /// Exposure time in seconds, if the source carried one
    pub exposure: Option<f64>,
    pub unit: PixelUnit,
    /// Non-structural header cards carried through to output files
    pub header: FitsHeader,
}

impl Frame {
    pub fn new(data: Array2<f32>, exposure: Option<f64>) -> Self {
        Self {
            data,
            exposure,
            unit: PixelUnit::Adu,
            header: FitsHeader::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    /// (height, width), the same order as `Array2::dim`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Build a new frame from `data` that inherits this frame's metadata.
    pub fn derive(&self, data: Array2<f32>) -> Self {
        Self {
            data,
            exposure: self.exposure,
            unit: self.unit,
            header: self.header.clone(),
        }
    }

    /// Exposure time usable as a scaling numerator: finite and non-negative.
    pub fn exposure_seconds(&self, role: &str) -> Result<f64> {
        match self.exposure {
            Some(t) if t.is_finite() && t >= 0.0 => Ok(t),
            _ => Err(ReduxError::ExposureMissing(role.to_string())),
        }
    }

    pub(crate) fn ensure_same_shape(&self, other: &Frame) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(ReduxError::ShapeMismatch {
                expected: other.shape(),
                found: self.shape(),
            });
        }
        Ok(())
    }
}

/// Physical unit of pixel values. The pipeline works in ADU throughout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PixelUnit {
    #[default]
    Adu,
}

impl PixelUnit {
    /// Parse a `BUNIT` value; unknown units are not representable.
    pub fn from_bunit(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "adu" | "adus" | "count" | "counts" => Some(Self::Adu),
            _ => None,
        }
    }
}

impl fmt::Display for PixelUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adu => write!(f, "adu"),
        }
    }
}
