//! Name-based classification of the input directory tree.

use std::fmt;

use crate::consts::{CAL_FRAMES_DIR, MASTER_FRAMES_DIR};

/// What a subdirectory of a night holds.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FrameCategory {
    Bias,
    Dark,
    Flat,
    Object(String),
}

impl FrameCategory {
    /// The word calibration file names must contain, if any.
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Bias => Some("bias"),
            Self::Dark => Some("dark"),
            Self::Flat => Some("flat"),
            Self::Object(_) => None,
        }
    }
}

impl fmt::Display for FrameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bias => write!(f, "bias"),
            Self::Dark => write!(f, "dark"),
            Self::Flat => write!(f, "flat"),
            Self::Object(name) => write!(f, "object '{name}'"),
        }
    }
}

/// Classify a night subdirectory by name, case-insensitively.
pub fn classify_dir(name: &str) -> FrameCategory {
    match name.to_ascii_lowercase().as_str() {
        "bias" => FrameCategory::Bias,
        "dark" => FrameCategory::Dark,
        "flat" => FrameCategory::Flat,
        _ => FrameCategory::Object(name.to_string()),
    }
}

/// Directories the pipeline itself writes into a night.
pub fn is_output_dir(name: &str) -> bool {
    name == MASTER_FRAMES_DIR || name == CAL_FRAMES_DIR
}

/// Position of the `.fit` suffix (`.fit`, `.fits`, `.fit.gz`, ...) in a
/// lowercased file name.
fn fits_suffix_start(lower: &str) -> Option<usize> {
    lower.rfind(".fit")
}

/// True for file names matching `*.fit*`, any case.
pub fn is_fits_name(file_name: &str) -> bool {
    fits_suffix_start(&file_name.to_ascii_lowercase()).is_some()
}

/// True if `file_name` is a frame of `category`.
///
/// Calibration frames must carry the category word ahead of the FITS suffix
/// (`*dark*.fit*`); object frames only need the suffix.
pub fn matches_category(category: &FrameCategory, file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    let Some(suffix) = fits_suffix_start(&lower) else {
        return false;
    };
    match category.keyword() {
        Some(word) => lower[..suffix].contains(word),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calibration_dirs_any_case() {
        assert_eq!(classify_dir("bias"), FrameCategory::Bias);
        assert_eq!(classify_dir("Dark"), FrameCategory::Dark);
        assert_eq!(classify_dir("FLAT"), FrameCategory::Flat);
    }

    #[test]
    fn everything_else_is_an_object() {
        assert_eq!(
            classify_dir("NGC 1300"),
            FrameCategory::Object("NGC 1300".into())
        );
        assert_eq!(
            classify_dir("darks"),
            FrameCategory::Object("darks".into())
        );
    }

    #[test]
    fn fits_suffixes() {
        assert!(is_fits_name("a.fit"));
        assert!(is_fits_name("a.fits"));
        assert!(is_fits_name("a.FITS"));
        assert!(is_fits_name("a.fit.gz"));
        assert!(!is_fits_name("a.txt"));
        assert!(!is_fits_name("fits"));
    }

    #[test]
    fn calibration_files_need_keyword() {
        assert!(matches_category(&FrameCategory::Dark, "dark_001.fit"));
        assert!(matches_category(&FrameCategory::Dark, "M31-Dark-60s.fits"));
        assert!(!matches_category(&FrameCategory::Dark, "flat_001.fit"));
        assert!(!matches_category(&FrameCategory::Dark, "dark_001.txt"));
        assert!(matches_category(&FrameCategory::Flat, "FLAT3.FIT"));
        assert!(matches_category(&FrameCategory::Bias, "bias-1.fits"));
    }

    #[test]
    fn keyword_must_precede_suffix() {
        assert!(!matches_category(&FrameCategory::Flat, "a.fit.flat"));
    }

    #[test]
    fn object_files_need_only_suffix() {
        let object = FrameCategory::Object("m31".into());
        assert!(matches_category(&object, "light_0001.fit"));
        assert!(!matches_category(&object, "notes.md"));
    }

    #[test]
    fn output_dirs_are_reserved() {
        assert!(is_output_dir("master_frames"));
        assert!(is_output_dir("cal_frames"));
        assert!(!is_output_dir("m31"));
    }
}
