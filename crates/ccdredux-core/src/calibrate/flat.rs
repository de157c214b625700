use crate::error::{ReduxError, Result};
use crate::frame::Frame;
use crate::stack::median_of;

/// Divide a dark-subtracted frame by a flat field, pixel by pixel.
///
/// The flat is used as given; normalize it once with [`normalize_flat`] when
/// building the master so the result keeps the input's flux scale.
pub fn flat_correct(frame: &Frame, flat: &Frame) -> Result<Frame> {
    frame.ensure_same_shape(flat)?;

    let mut result = frame.derive(&frame.data / &flat.data);
    result.header.add_history("flat corrected");
    Ok(result)
}

/// Median of all pixels in a frame.
pub fn frame_median(frame: &Frame) -> f32 {
    let mut values: Vec<f32> = frame.data.iter().copied().collect();
    median_of(&mut values)
}

/// Scale a flat so that its median is 1.
pub fn normalize_flat(flat: &Frame) -> Result<Frame> {
    let median = frame_median(flat);
    if !median.is_finite() || median <= 0.0 {
        return Err(ReduxError::DegenerateFlat { median });
    }

    let mut result = flat.derive(&flat.data / median);
    result
        .header
        .add_history(&format!("normalized by median {median}"));
    Ok(result)
}
