//! Image loading and texture conversion

use anyhow::{Context, Result};
use ctr_common::PixelFormat;
use ctr_common::formats::build_cgfx;
use ctr_common::packing::rgba8_to_bgr565;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::path::Path;

/// Banner texture size expected by the HOME Menu
pub const BANNER_WIDTH: u32 = 256;
pub const BANNER_HEIGHT: u32 = 128;

/// Load an image as RGBA8, resampling with Lanczos3 when the size differs
pub fn load_rgba(path: &Path, width: u32, height: u32) -> Result<RgbaImage> {
    let img = image::open(path)
        .with_context(|| format!("Failed to load image: {}", path.display()))?
        .to_rgba8();

    if img.dimensions() == (width, height) {
        return Ok(img);
    }

    tracing::debug!(
        "Resizing {} from {}x{} to {}x{}",
        path.display(),
        img.width(),
        img.height(),
        width,
        height
    );
    Ok(imageops::resize(&img, width, height, FilterType::Lanczos3))
}

/// Linear RGBA8 banner pixels, flipped so row 0 is the bottom of the image
pub fn banner_pixels(path: &Path) -> Result<Vec<u8>> {
    let img = load_rgba(path, BANNER_WIDTH, BANNER_HEIGHT)?;
    Ok(imageops::flip_vertical(&img).into_raw())
}

/// Linear BGR565 icon pixels at `size`×`size`
pub fn icon_pixels(path: &Path, size: u32) -> Result<Vec<u8>> {
    let img = load_rgba(path, size, size)?;
    Ok(rgba8_to_bgr565(img.as_raw()))
}

/// Build a CGFX from an image file at the requested size
pub fn texture_cgfx(path: &Path, width: u32, height: u32) -> Result<Vec<u8>> {
    if width % 8 != 0 || height % 8 != 0 {
        anyhow::bail!(
            "Texture size {}x{} must be a multiple of 8 in both dimensions",
            width,
            height
        );
    }
    let img = load_rgba(path, width, height)?;
    let pixels = imageops::flip_vertical(&img).into_raw();
    let cgfx = build_cgfx(&pixels, width, height, PixelFormat::Rgba8)
        .with_context(|| format!("Failed to build CGFX from {}", path.display()))?;
    tracing::debug!("CGFX: {}x{}, {} bytes", width, height, cgfx.len());
    Ok(cgfx)
}

/// Convert an image file to a standalone `.cgfx`
pub fn convert_image(input: &Path, output: &Path, width: u32, height: u32) -> Result<()> {
    let cgfx = texture_cgfx(input, width, height)?;
    std::fs::write(output, &cgfx)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    tracing::info!("Wrote {} bytes to {}", cgfx.len(), output.display());
    Ok(())
}
