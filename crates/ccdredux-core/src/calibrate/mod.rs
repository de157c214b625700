//! Per-pixel calibration primitives.

pub mod dark;
pub mod flat;

pub use dark::{dark_scale, subtract_dark};
pub use flat::{flat_correct, frame_median, normalize_flat};
