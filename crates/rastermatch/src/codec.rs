//! Raster file <-> raw RGBA buffer adapter.
//!
//! The comparison engine only ever sees flat RGBA buffers; this module is
//! the boundary where files become buffers and back. Any format the
//! `image` crate can decode is accepted; output format follows the file
//! extension (PNG in practice).

use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageReader, RgbaImage};

/// A decoded raster: flat row-major RGBA samples plus dimensions.
#[derive(Debug)]
pub struct RawImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Decode an image file into a flat RGBA buffer.
pub fn load_rgba(path: &Path) -> Result<RawImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?
        .decode()
        .with_context(|| format!("failed to decode image: {}", path.display()))?
        .to_rgba8();

    let (width, height) = img.dimensions();
    Ok(RawImage {
        width,
        height,
        data: img.into_raw(),
    })
}

/// Write a flat RGBA buffer as an image file.
pub fn save_rgba(path: &Path, data: &[u8], width: u32, height: u32) -> Result<()> {
    let img = RgbaImage::from_raw(width, height, data.to_vec())
        .context("diff buffer does not match the image dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to write image: {}", path.display()))?;
    Ok(())
}
