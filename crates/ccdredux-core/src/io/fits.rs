//! Primary-HDU FITS codec.
//!
//! Only what the reduction pipeline needs: a single 2-D image in the primary
//! HDU, any standard BITPIX on read, 32-bit float on write. Extensions after
//! the primary data unit are ignored.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use byteorder::{BigEndian, ByteOrder};
use memmap2::Mmap;
use ndarray::Array2;
use tracing::{debug, warn};

use crate::consts::{EXPOSURE_KEYWORDS, FITS_BLOCK_SIZE, FITS_CARD_SIZE, PARTIAL_SUFFIX};
use crate::error::{ReduxError, Result};
use crate::frame::{Frame, PixelUnit};
use crate::io::header::{FitsHeader, HeaderCard, HeaderValue};

/// Keywords owned by `Frame` fields rather than its header.
const FRAME_KEYWORDS: [&str; 3] = ["BUNIT", "EXPOSURE", "EXPTIME"];

/// Layout of the primary HDU, as described by its header.
#[derive(Clone, Debug)]
pub struct FitsInfo {
    pub bitpix: i64,
    pub width: usize,
    pub height: usize,
    /// Every card of the primary header, structural ones included.
    pub header: FitsHeader,
    /// Size of the header unit in bytes (a multiple of 2880).
    pub header_len: usize,
}

impl FitsInfo {
    pub fn bytes_per_pixel(&self) -> usize {
        (self.bitpix.unsigned_abs() / 8) as usize
    }

    /// Size of the data unit in bytes, without padding. `None` if it does
    /// not fit in `usize`.
    pub fn data_len(&self) -> Option<usize> {
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.bytes_per_pixel())
    }

    pub fn exposure(&self) -> Option<f64> {
        EXPOSURE_KEYWORDS
            .iter()
            .find_map(|key| self.header.get_f64(key))
    }
}

/// Read only the header of a FITS file.
pub fn read_fits_info(path: &Path) -> Result<FitsInfo> {
    let mmap = map_file(path)?;
    parse_info(&mmap, path)
}

/// Read the primary image of a FITS file into a `Frame`.
pub fn read_fits(path: &Path) -> Result<Frame> {
    let mmap = map_file(path)?;
    decode_fits(&mmap, path)
}

/// Decode an in-memory FITS file. `path` is only used for error messages.
pub fn decode_fits(bytes: &[u8], path: &Path) -> Result<Frame> {
    let info = parse_info(bytes, path)?;

    let start = info.header_len;
    let end = info
        .data_len()
        .and_then(|len| start.checked_add(len))
        .ok_or_else(|| ReduxError::invalid_fits(path, "image size overflows"))?;
    if bytes.len() < end {
        return Err(ReduxError::invalid_fits(
            path,
            format!(
                "data truncated: expected at least {} bytes, got {}",
                end,
                bytes.len()
            ),
        ));
    }

    let bscale = info.header.get_f64("BSCALE").unwrap_or(1.0);
    let bzero = info.header.get_f64("BZERO").unwrap_or(0.0);
    let values = decode_pixels(&bytes[start..end], info.bitpix, bscale, bzero)?;

    let data = Array2::from_shape_vec((info.height, info.width), values)
        .map_err(|e| ReduxError::invalid_fits(path, e.to_string()))?;

    let unit = match info.header.get_str("BUNIT") {
        Some(bunit) => PixelUnit::from_bunit(bunit).unwrap_or_else(|| {
            warn!(path = %path.display(), bunit, "Unknown BUNIT, treating pixels as ADU");
            PixelUnit::Adu
        }),
        None => PixelUnit::Adu,
    };

    let mut header = FitsHeader::new();
    for card in info.header.cards() {
        if !card.is_structural() && !is_frame_keyword(card) {
            header.push(card.clone());
        }
    }

    debug!(
        path = %path.display(),
        width = info.width,
        height = info.height,
        bitpix = info.bitpix,
        "Read FITS frame"
    );

    Ok(Frame {
        data,
        exposure: info.exposure(),
        unit,
        header,
    })
}

/// Write a frame as a 32-bit float FITS file.
///
/// The file is written under a temporary name and renamed into place, so
/// `path` either holds a complete file or does not exist.
pub fn write_fits(frame: &Frame, path: &Path) -> Result<()> {
    let partial = partial_path(path);
    let result = write_file(&encode_fits(frame), &partial)
        .and_then(|()| fs::rename(&partial, path).map_err(ReduxError::from));
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

/// Encode a frame into FITS bytes (header and data unit, both padded).
pub fn encode_fits(frame: &Frame) -> Vec<u8> {
    let (h, w) = frame.shape();

    let mut cards = vec![
        HeaderCard::new("SIMPLE", HeaderValue::Logical(true)),
        HeaderCard::new("BITPIX", HeaderValue::Integer(-32)),
        HeaderCard::new("NAXIS", HeaderValue::Integer(2)),
        HeaderCard::new("NAXIS1", HeaderValue::Integer(w as i64)),
        HeaderCard::new("NAXIS2", HeaderValue::Integer(h as i64)),
        HeaderCard::new("BUNIT", HeaderValue::Text(frame.unit.to_string())),
    ];
    if let Some(exposure) = frame.exposure {
        for key in ["EXPTIME", "EXPOSURE"] {
            cards.push(HeaderCard::new(key, HeaderValue::Real(exposure)));
        }
    }
    cards.extend(
        frame
            .header
            .cards()
            .iter()
            .filter(|card| !card.is_structural() && !is_frame_keyword(card))
            .cloned(),
    );

    let header_records = cards.len() + 1;
    let header_len = padded_len(header_records * FITS_CARD_SIZE);
    let data_len = padded_len(h * w * 4);

    let mut buf = Vec::with_capacity(header_len + data_len);
    for card in &cards {
        buf.extend_from_slice(&card.to_record());
    }
    let mut end = [b' '; FITS_CARD_SIZE];
    end[..3].copy_from_slice(b"END");
    buf.extend_from_slice(&end);
    buf.resize(header_len, b' ');

    let mut pixel = [0u8; 4];
    for &value in frame.data.iter() {
        BigEndian::write_f32(&mut pixel, value);
        buf.extend_from_slice(&pixel);
    }
    buf.resize(header_len + data_len, 0);
    buf
}

fn is_frame_keyword(card: &HeaderCard) -> bool {
    card.value.is_some()
        && FRAME_KEYWORDS
            .iter()
            .any(|k| card.keyword.eq_ignore_ascii_case(k))
}

fn write_file(bytes: &[u8], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(FITS_BLOCK_SIZE) * FITS_BLOCK_SIZE
}

fn map_file(path: &Path) -> Result<Mmap> {
    let file = File::open(path)?;
    let len = file.metadata()?.len() as usize;
    if len < FITS_BLOCK_SIZE {
        return Err(ReduxError::invalid_fits(
            path,
            format!("file too small for a FITS header ({len} bytes)"),
        ));
    }
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(mmap)
}

fn parse_info(bytes: &[u8], path: &Path) -> Result<FitsInfo> {
    let mut header = FitsHeader::new();
    let mut records = 0;
    let mut found_end = false;

    for record in bytes.chunks_exact(FITS_CARD_SIZE) {
        records += 1;
        match HeaderCard::parse(record) {
            Some(card) => header.push(card),
            None => {
                found_end = true;
                break;
            }
        }
    }
    if !found_end {
        return Err(ReduxError::invalid_fits(path, "missing END card"));
    }

    let simple = header.cards().first().filter(|c| c.keyword == "SIMPLE");
    if simple.and_then(|c| c.value.as_ref()).and_then(HeaderValue::as_bool) != Some(true) {
        return Err(ReduxError::invalid_fits(path, "first card is not SIMPLE = T"));
    }

    let required = |key: &str| {
        header
            .get_i64(key)
            .ok_or_else(|| ReduxError::invalid_fits(path, format!("missing {key}")))
    };
    let bitpix = required("BITPIX")?;
    let naxis = required("NAXIS")?;

    let planes = match naxis {
        2 => 1,
        3 => required("NAXIS3")?,
        n => {
            return Err(ReduxError::invalid_fits(
                path,
                format!("expected a 2-D image, NAXIS = {n}"),
            ))
        }
    };
    if planes != 1 {
        return Err(ReduxError::invalid_fits(
            path,
            format!("expected a single image plane, NAXIS3 = {planes}"),
        ));
    }

    let width = required("NAXIS1")?;
    let height = required("NAXIS2")?;
    if width <= 0 || height <= 0 {
        return Err(ReduxError::invalid_fits(
            path,
            format!("invalid dimensions {width}x{height}"),
        ));
    }

    let overflow = || {
        ReduxError::invalid_fits(path, format!("image size {width}x{height} overflows"))
    };
    let info = FitsInfo {
        bitpix,
        width: usize::try_from(width).map_err(|_| overflow())?,
        height: usize::try_from(height).map_err(|_| overflow())?,
        header,
        header_len: padded_len(records * FITS_CARD_SIZE),
    };
    if info
        .data_len()
        .and_then(|len| len.checked_add(info.header_len))
        .is_none()
    {
        return Err(overflow());
    }
    Ok(info)
}

fn decode_pixels(raw: &[u8], bitpix: i64, bscale: f64, bzero: f64) -> Result<Vec<f32>> {
    let identity = bscale == 1.0 && bzero == 0.0;
    let scale = |v: f64| (bzero + bscale * v) as f32;

    let values: Vec<f32> = match bitpix {
        8 => raw.iter().map(|&v| scale(v as f64)).collect(),
        16 => {
            let mut buf = vec![0i16; raw.len() / 2];
            BigEndian::read_i16_into(raw, &mut buf);
            buf.into_iter().map(|v| scale(v as f64)).collect()
        }
        32 => {
            let mut buf = vec![0i32; raw.len() / 4];
            BigEndian::read_i32_into(raw, &mut buf);
            buf.into_iter().map(|v| scale(v as f64)).collect()
        }
        64 => {
            let mut buf = vec![0i64; raw.len() / 8];
            BigEndian::read_i64_into(raw, &mut buf);
            buf.into_iter().map(|v| scale(v as f64)).collect()
        }
        -32 => {
            let mut buf = vec![0f32; raw.len() / 4];
            BigEndian::read_f32_into(raw, &mut buf);
            if identity {
                buf
            } else {
                buf.into_iter().map(|v| scale(v as f64)).collect()
            }
        }
        -64 => {
            let mut buf = vec![0f64; raw.len() / 8];
            BigEndian::read_f64_into(raw, &mut buf);
            buf.into_iter().map(scale).collect()
        }
        other => return Err(ReduxError::UnsupportedBitpix(other)),
    };
    Ok(values)
}
