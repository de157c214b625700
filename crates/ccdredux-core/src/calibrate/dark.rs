use tracing::debug;

use crate::error::{ReduxError, Result};
use crate::frame::Frame;

/// Ratio of the target exposure to the dark exposure.
///
/// Exactly 1.0 when the exposures are equal, so unscaled subtraction is
/// bit-exact.
pub fn dark_scale(frame: &Frame, dark: &Frame) -> Result<f64> {
    let data_exposure = frame.exposure_seconds("frame")?;
    let dark_exposure = match dark.exposure {
        Some(t) if t.is_finite() && t > 0.0 => t,
        _ => return Err(ReduxError::ExposureMissing("dark".into())),
    };

    if data_exposure == dark_exposure {
        Ok(1.0)
    } else {
        Ok(data_exposure / dark_exposure)
    }
}

/// Subtract a dark frame scaled to the target's exposure time:
/// `frame - dark * (frame.exposure / dark.exposure)`.
pub fn subtract_dark(frame: &Frame, dark: &Frame) -> Result<Frame> {
    frame.ensure_same_shape(dark)?;
    let scale = dark_scale(frame, dark)?;

    let data = if scale == 1.0 {
        &frame.data - &dark.data
    } else {
        let factor = scale as f32;
        &frame.data - &(&dark.data * factor)
    };
    debug!(scale, "Dark subtracted");

    let mut result = frame.derive(data);
    result
        .header
        .add_history(&format!("dark subtracted, scale {scale:.6}"));
    Ok(result)
}
