pub mod fits;
pub mod header;

pub use fits::{read_fits, read_fits_info, write_fits, FitsInfo};
pub use header::{FitsHeader, HeaderCard, HeaderValue};
