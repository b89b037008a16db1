//! Colour packing for 16-bit 3DS textures
//!
//! The 3DS calls this format BGR565 (or RGB565 depending on the document);
//! the packed value carries red in the top five bits:
//!
//! ```text
//! bit 15..11: red (5)   bit 10..5: green (6)   bit 4..0: blue (5)
//! ```
//!
//! Stored little-endian. Alpha is dropped.

/// Pack an 8-bit colour into a BGR565 value, rounding to the nearest level
#[inline]
pub fn pack_bgr565(r: u8, g: u8, b: u8) -> u16 {
    let r5 = (r as u16 * 31 + 127) / 255;
    let g6 = (g as u16 * 63 + 127) / 255;
    let b5 = (b as u16 * 31 + 127) / 255;
    (r5 << 11) | (g6 << 5) | b5
}

/// Expand a BGR565 value back to 8-bit channels
#[inline]
pub fn unpack_bgr565(value: u16) -> [u8; 3] {
    let r5 = (value >> 11) & 0x1F;
    let g6 = (value >> 5) & 0x3F;
    let b5 = value & 0x1F;
    [
        ((r5 * 255 + 15) / 31) as u8,
        ((g6 * 255 + 31) / 63) as u8,
        ((b5 * 255 + 15) / 31) as u8,
    ]
}

/// Convert linear RGBA8 pixels to linear BGR565 bytes (2 bytes per pixel)
///
/// Trailing bytes that do not form a whole pixel are ignored.
pub fn rgba8_to_bgr565(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len() / 2);
    for px in rgba.chunks_exact(4) {
        out.extend_from_slice(&pack_bgr565(px[0], px[1], px[2]).to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_primaries() {
        assert_eq!(pack_bgr565(255, 0, 0), 0xF800);
        assert_eq!(pack_bgr565(0, 255, 0), 0x07E0);
        assert_eq!(pack_bgr565(0, 0, 255), 0x001F);
        assert_eq!(pack_bgr565(255, 255, 255), 0xFFFF);
        assert_eq!(pack_bgr565(0, 0, 0), 0x0000);
    }

    #[test]
    fn test_pack_rounds() {
        // 128 * 31 / 255 = 15.56 -> 16
        assert_eq!(pack_bgr565(128, 0, 0) >> 11, 16);
        // 4 * 31 / 255 = 0.49 -> 0
        assert_eq!(pack_bgr565(4, 0, 0), 0);
    }

    #[test]
    fn test_unpack_extremes() {
        assert_eq!(unpack_bgr565(0xFFFF), [255, 255, 255]);
        assert_eq!(unpack_bgr565(0x0000), [0, 0, 0]);
        assert_eq!(unpack_bgr565(0xF800), [255, 0, 0]);
    }

    #[test]
    fn test_rgba8_to_bgr565_little_endian() {
        let rgba = [255, 0, 0, 255, 0, 0, 255, 0];
        assert_eq!(rgba8_to_bgr565(&rgba), vec![0x00, 0xF8, 0x1F, 0x00]);
    }

    #[test]
    fn test_rgba8_to_bgr565_ignores_alpha() {
        assert_eq!(
            rgba8_to_bgr565(&[10, 20, 30, 0]),
            rgba8_to_bgr565(&[10, 20, 30, 255])
        );
    }
}
