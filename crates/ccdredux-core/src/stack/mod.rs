pub mod mean;
pub mod median;

use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ReduxError, Result};
use crate::frame::Frame;

pub use mean::mean_stack;
pub use median::{median_of, median_stack};

/// Pixel-wise combination rule for building master frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombineMethod {
    /// Robust against cosmic rays and hot pixels in individual exposures.
    #[default]
    Median,
    Mean,
}

impl fmt::Display for CombineMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Median => write!(f, "Median"),
            Self::Mean => write!(f, "Mean"),
        }
    }
}

/// Combine a stack of same-shape frames into one.
pub fn combine(frames: &[Frame], method: CombineMethod) -> Result<Frame> {
    match method {
        CombineMethod::Median => median_stack(frames),
        CombineMethod::Mean => mean_stack(frames),
    }
}

/// Validate a stack and return its common (height, width).
fn check_stack(frames: &[Frame]) -> Result<(usize, usize)> {
    let first = frames
        .first()
        .ok_or(ReduxError::InsufficientFrames { kind: "input" })?;
    for frame in &frames[1..] {
        frame.ensure_same_shape(first)?;
    }
    Ok(first.shape())
}

/// Wrap combined pixel data with metadata inherited from the first frame.
fn stacked_frame(frames: &[Frame], data: Array2<f32>, method: CombineMethod) -> Frame {
    let first = &frames[0];
    let disagreeing = frames
        .iter()
        .filter(|f| f.exposure != first.exposure)
        .count();
    if disagreeing > 0 {
        warn!(
            disagreeing,
            exposure = ?first.exposure,
            "Combined frames have different exposure times, keeping the first"
        );
    }

    let mut result = first.derive(data);
    result
        .header
        .add_history(&format!("{} combined {} frames", method, frames.len()));
    result
}
