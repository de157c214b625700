use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::master::MasterConfig;

/// Everything the orchestrator needs for one run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReduxConfig {
    /// Directory holding one subdirectory per observation night.
    pub input: PathBuf,
    /// Root of the per-night output trees. May equal `input`.
    pub output: PathBuf,
    #[serde(default)]
    pub masters: MasterConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl Default for ReduxConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            output: PathBuf::from("."),
            masters: MasterConfig::default(),
            calibration: CalibrationConfig::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    pub on_shape_mismatch: ShapeMismatchPolicy,
}

/// What to do when a light frame's shape differs from the masters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeMismatchPolicy {
    /// Stop calibrating the rest of the object's frames.
    #[default]
    AbortObject,
    /// Skip only the offending frame.
    SkipFrame,
}

impl fmt::Display for ShapeMismatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbortObject => write!(f, "abort object"),
            Self::SkipFrame => write!(f, "skip frame"),
        }
    }
}
