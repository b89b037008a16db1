//! Minimal CGFX texture container
//!
//! Only what the banner needs: a single uncompressed RGBA8 texture.
//!
//! # Layout
//!
//! ```text
//! 0x00: "CGFX"
//! 0x04: byte-order mark 0xFEFF (u16)
//! 0x06: header size 0x18 (u16)
//! 0x08: version 0x00060000 (u32)
//! 0x0C: file size (u32)
//! 0x10: block count 1 (u32)
//! 0x14: "DATA", block size (u32)
//! 0x1C: "DICT", entry count 1 (u32)
//! 0x24: "IMG\0", width (u16), height (u16), format 0x2800 (u32)
//! 0x30: 8×8-tiled RGBA8 pixels
//! ```

use super::writer::BlockWriter;
use super::{BYTE_ORDER_MARK, read_magic, read_u16, read_u32};
use crate::error::{CtrError, Result};
use crate::tiling::{PixelFormat, TILE_SIZE, tile};

pub const CGFX_MAGIC: &[u8; 4] = b"CGFX";
pub const CGFX_HEADER_SIZE_FIELD: u16 = 0x18;
pub const CGFX_VERSION: u32 = 0x0006_0000;
/// Texture format code for RGBA8
pub const TEXTURE_FORMAT_RGBA8: u32 = 0x2800;
/// Offset of the DATA block
pub const CGFX_DATA_OFFSET: usize = 0x14;
/// Offset of the first pixel byte
pub const CGFX_PIXEL_OFFSET: usize = 0x30;

/// Build a CGFX holding one texture
///
/// `pixels` is linear row-major RGBA8; it is tiled on the way in.
///
/// # Errors
/// - `UnsupportedFormat` for any format other than RGBA8
/// - `Format` when the dimensions are not multiples of 8 or do not match the
///   buffer length
pub fn build_cgfx(pixels: &[u8], width: u32, height: u32, format: PixelFormat) -> Result<Vec<u8>> {
    if format != PixelFormat::Rgba8 {
        return Err(CtrError::unsupported(format!(
            "CGFX textures must be RGBA8, got {}",
            format.name()
        )));
    }
    if width == 0 || height == 0 || width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(CtrError::format(format!("invalid texture size {}x{}", width, height)));
    }
    let (w, h) = (width as usize, height as usize);
    if w % TILE_SIZE != 0 || h % TILE_SIZE != 0 {
        return Err(CtrError::format(format!(
            "texture size {}x{} is not a multiple of {}",
            width, height, TILE_SIZE
        )));
    }
    if pixels.len() != format.buffer_len(w, h) {
        return Err(CtrError::format(format!(
            "expected {} bytes of RGBA8 for {}x{}, got {}",
            format.buffer_len(w, h),
            width,
            height,
            pixels.len()
        )));
    }

    let mut out = BlockWriter::new();
    out.write_magic(CGFX_MAGIC);
    out.write_u16(BYTE_ORDER_MARK);
    out.write_u16(CGFX_HEADER_SIZE_FIELD);
    out.write_u32(CGFX_VERSION);
    let file_size = out.reserve_u32();
    out.write_u32(1);

    let data_start = out.position();
    out.write_magic(b"DATA");
    let data_size = out.reserve_u32();
    out.write_magic(b"DICT");
    out.write_u32(1);
    out.write_magic(b"IMG\0");
    out.write_u16(width as u16);
    out.write_u16(height as u16);
    out.write_u32(TEXTURE_FORMAT_RGBA8);
    out.write_bytes(&tile(pixels, w, h, format));

    let end = out.position();
    out.patch_u32(data_size, (end - data_start) as u32);
    out.patch_u32(file_size, end as u32);
    out.finish()
}

/// Header fields of a CGFX built by [`build_cgfx`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CgfxHeader {
    pub version: u32,
    pub file_size: u32,
    pub data_size: u32,
    pub width: u16,
    pub height: u16,
    pub format: u32,
}

impl CgfxHeader {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if read_magic(bytes, 0)? != *CGFX_MAGIC || read_u16(bytes, 4)? != BYTE_ORDER_MARK {
            return None;
        }
        if read_magic(bytes, CGFX_DATA_OFFSET)? != *b"DATA" {
            return None;
        }
        Some(Self {
            version: read_u32(bytes, 0x08)?,
            file_size: read_u32(bytes, 0x0C)?,
            data_size: read_u32(bytes, 0x18)?,
            width: read_u16(bytes, 0x28)?,
            height: read_u16(bytes, 0x2A)?,
            format: read_u32(bytes, 0x2C)?,
        })
    }

    /// Tiled pixel bytes following the header
    pub fn pixels<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        let len = self.width as usize * self.height as usize * 4;
        bytes.get(CGFX_PIXEL_OFFSET..CGFX_PIXEL_OFFSET + len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tiling::untile;

    fn gradient(width: usize, height: usize) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            for x in 0..width {
                rgba.extend_from_slice(&[x as u8, y as u8, (x ^ y) as u8, 255]);
            }
        }
        rgba
    }

    #[test]
    fn test_build_banner_sized_texture() {
        let pixels = gradient(256, 128);
        let bytes = build_cgfx(&pixels, 256, 128, PixelFormat::Rgba8).unwrap();

        assert_eq!(bytes.len(), CGFX_PIXEL_OFFSET + 256 * 128 * 4);
        let header = CgfxHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.version, CGFX_VERSION);
        assert_eq!(header.file_size as usize, bytes.len());
        assert_eq!(header.data_size as usize, bytes.len() - CGFX_DATA_OFFSET);
        assert_eq!((header.width, header.height), (256, 128));
        assert_eq!(header.format, TEXTURE_FORMAT_RGBA8);
        assert_eq!(&bytes[0x1C..0x20], b"DICT");
        assert_eq!(&bytes[0x24..0x28], b"IMG\0");

        let tiled = header.pixels(&bytes).unwrap();
        assert_eq!(untile(tiled, 256, 128, PixelFormat::Rgba8), pixels);
    }

    #[test]
    fn test_rejects_bgr565() {
        let result = build_cgfx(&[0; 128], 8, 8, PixelFormat::Bgr565);
        assert!(matches!(result, Err(CtrError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert!(matches!(
            build_cgfx(&[0; 12 * 8 * 4], 12, 8, PixelFormat::Rgba8),
            Err(CtrError::Format(_))
        ));
        assert!(matches!(
            build_cgfx(&[0; 10], 8, 8, PixelFormat::Rgba8),
            Err(CtrError::Format(_))
        ));
        assert!(matches!(
            build_cgfx(&[], 0, 8, PixelFormat::Rgba8),
            Err(CtrError::Format(_))
        ));
    }

    #[test]
    fn test_header_rejects_other_magic() {
        assert_eq!(CgfxHeader::from_bytes(b"CWAV\xFF\xFE"), None);
    }
}
