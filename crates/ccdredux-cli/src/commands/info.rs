use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ccdredux_core::io::read_fits_info;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Input FITS file
    pub file: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let info = read_fits_info(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    println!("File:        {}", args.file.display());
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("BITPIX:      {}", info.bitpix);
    match info.exposure() {
        Some(t) => println!("Exposure:    {} s", t),
        None => println!("Exposure:    (none)"),
    }
    if let Some(unit) = info.header.get_str("BUNIT") {
        println!("Unit:        {}", unit);
    }
    if let Some(object) = info.header.get_str("OBJECT") {
        println!("Object:      {}", object);
    }
    println!("Header:      {} cards", info.header.len());

    if let Some(len) = info.data_len() {
        let data_mb = len as f64 / (1024.0 * 1024.0);
        println!("Data size:   {:.1} MB", data_mb);
    }

    for line in info.header.history() {
        println!("History:     {}", line);
    }

    Ok(())
}
