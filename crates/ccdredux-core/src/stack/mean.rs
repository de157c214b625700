use ndarray::Array2;

use crate::error::Result;
use crate::frame::Frame;

use super::{check_stack, stacked_frame, CombineMethod};

/// Combine frames by computing the mean at each pixel.
pub fn mean_stack(frames: &[Frame]) -> Result<Frame> {
    let (h, w) = check_stack(frames)?;
    let n = frames.len() as f32;

    let mut sum = Array2::<f32>::zeros((h, w));
    for frame in frames {
        sum += &frame.data;
    }
    sum /= n;

    Ok(stacked_frame(frames, sum, CombineMethod::Mean))
}
