//! 8×8 tile swizzling
//!
//! 3DS GPU textures store pixels in 8×8 tiles. Tiles are laid out in
//! row-major order across the image and pixels are row-major inside each
//! tile:
//!
//! ```text
//! linear (16×8)            tiled
//! row 0: A0..A7 B0..B7     tile 0: A0..A7 (row 0) .. A56..A63 (row 7)
//! row 1: A8..AF B8..BF     tile 1: B0..B7 (row 0) .. B56..B63 (row 7)
//! ```
//!
//! Tiling is a pure reordering: output length equals input length.

/// Tile edge length in pixels
pub const TILE_SIZE: usize = 8;

/// Pixel layouts handled by the tiler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4 bytes per pixel, R G B A
    Rgba8,
    /// 2 bytes per pixel, packed 5-6-5 (see [`crate::packing`])
    Bgr565,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgba8 => 4,
            PixelFormat::Bgr565 => 2,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            PixelFormat::Rgba8 => "RGBA8",
            PixelFormat::Bgr565 => "BGR565",
        }
    }

    /// Byte length of a `width × height` buffer in this format
    pub const fn buffer_len(self, width: usize, height: usize) -> usize {
        width * height * self.bytes_per_pixel()
    }
}

/// Reorder a linear buffer into 8×8 tiles
///
/// `width` and `height` must be multiples of 8 and `src` must hold exactly
/// `width * height` pixels; callers validate this before tiling.
pub fn tile(src: &[u8], width: usize, height: usize, format: PixelFormat) -> Vec<u8> {
    let mut dst = vec![0u8; src.len()];
    swizzle(src, &mut dst, width, height, format, Direction::Tile);
    dst
}

/// Inverse of [`tile`]: reorder 8×8 tiles back into linear rows
pub fn untile(src: &[u8], width: usize, height: usize, format: PixelFormat) -> Vec<u8> {
    let mut dst = vec![0u8; src.len()];
    swizzle(src, &mut dst, width, height, format, Direction::Untile);
    dst
}

#[derive(Clone, Copy)]
enum Direction {
    Tile,
    Untile,
}

fn swizzle(
    src: &[u8],
    dst: &mut [u8],
    width: usize,
    height: usize,
    format: PixelFormat,
    direction: Direction,
) {
    debug_assert!(width % TILE_SIZE == 0 && height % TILE_SIZE == 0);
    debug_assert_eq!(src.len(), format.buffer_len(width, height));

    let bpp = format.bytes_per_pixel();
    let row_bytes = TILE_SIZE * bpp;
    let tiles_x = width / TILE_SIZE;

    for tile_y in 0..height / TILE_SIZE {
        for tile_x in 0..tiles_x {
            let tile_index = tile_y * tiles_x + tile_x;
            for y in 0..TILE_SIZE {
                // A tile row is 8 contiguous pixels on both sides
                let linear = ((tile_y * TILE_SIZE + y) * width + tile_x * TILE_SIZE) * bpp;
                let tiled = (tile_index * TILE_SIZE * TILE_SIZE + y * TILE_SIZE) * bpp;
                let (from, to) = match direction {
                    Direction::Tile => (linear, tiled),
                    Direction::Untile => (tiled, linear),
                };
                dst[to..to + row_bytes].copy_from_slice(&src[from..from + row_bytes]);
            }
        }
    }
}
