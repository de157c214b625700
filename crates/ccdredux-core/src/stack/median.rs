use ndarray::Array2;
use rayon::prelude::*;

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::Result;
use crate::frame::Frame;

use super::{check_stack, stacked_frame, CombineMethod};

/// Combine frames by taking the median at each pixel position.
///
/// Uses `select_nth_unstable` for O(n) median without full sort.
/// Parallelizes at the row level for images >= 256x256.
pub fn median_stack(frames: &[Frame]) -> Result<Frame> {
    let (h, w) = check_stack(frames)?;
    let n = frames.len();

    let data = if h * w >= PARALLEL_PIXEL_THRESHOLD && n > 1 {
        let rows: Vec<Vec<f32>> = (0..h)
            .into_par_iter()
            .map(|row| {
                let mut pixel_values = vec![0.0f32; n];
                (0..w)
                    .map(|col| {
                        for (i, frame) in frames.iter().enumerate() {
                            pixel_values[i] = frame.data[[row, col]];
                        }
                        median_of(&mut pixel_values)
                    })
                    .collect()
            })
            .collect();

        let mut result = Array2::<f32>::zeros((h, w));
        for (row, row_data) in rows.into_iter().enumerate() {
            for (col, val) in row_data.into_iter().enumerate() {
                result[[row, col]] = val;
            }
        }
        result
    } else {
        let mut result = Array2::<f32>::zeros((h, w));
        let mut pixel_values = vec![0.0f32; n];
        for ((row, col), out) in result.indexed_iter_mut() {
            for (i, frame) in frames.iter().enumerate() {
                pixel_values[i] = frame.data[[row, col]];
            }
            *out = median_of(&mut pixel_values);
        }
        result
    };

    Ok(stacked_frame(frames, data, CombineMethod::Median))
}

/// Median of a slice, reordering it in place. Even counts average the two
/// middle values.
pub fn median_of(values: &mut [f32]) -> f32 {
    let n = values.len();
    match n {
        0 => f32::NAN,
        1 => values[0],
        _ if n % 2 == 1 => {
            let mid = n / 2;
            *values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b)).1
        }
        _ => {
            let mid = n / 2;
            values.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            let upper = values[mid];
            let lower = *values[..mid]
                .select_nth_unstable_by(mid - 1, |a, b| a.total_cmp(b))
                .1;
            (lower + upper) / 2.0
        }
    }
}
