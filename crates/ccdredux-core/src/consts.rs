/// Minimum pixel count (h*w) to use row-level Rayon parallelism.
pub const PARALLEL_PIXEL_THRESHOLD: usize = 65_536;

/// FITS logical record size in bytes.
pub const FITS_BLOCK_SIZE: usize = 2880;

/// FITS header card size in bytes.
pub const FITS_CARD_SIZE: usize = 80;

/// File name of the cached master dark inside a night's master directory.
pub const MASTER_DARK_FILENAME: &str = "master-dark.fit";

/// File name of the cached master flat inside a night's master directory.
pub const MASTER_FLAT_FILENAME: &str = "master-flat.fit";

/// Per-night output directory holding the master frames.
pub const MASTER_FRAMES_DIR: &str = "master_frames";

/// Per-night output directory holding one `cal_<object>` directory per target.
pub const CAL_FRAMES_DIR: &str = "cal_frames";

/// Prefix of a calibrated object directory.
pub const CAL_OBJECT_PREFIX: &str = "cal_";

/// Prefix of a calibrated frame file name.
pub const CAL_FRAME_PREFIX: &str = "cal-";

/// Suffix appended to a file while it is being written.
pub const PARTIAL_SUFFIX: &str = "partial";

/// Header keywords searched, in order, for the exposure time in seconds.
pub const EXPOSURE_KEYWORDS: [&str; 2] = ["EXPOSURE", "EXPTIME"];
