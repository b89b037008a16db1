//! ctr-lz11: LZ11 compression for Nintendo 3DS data
//!
//! LZ11 is the LZ77 variant used by the 3DS system software for banners and
//! other compressed blobs. Compression here is a greedy longest-match search
//! over a 4 KiB window; decompression accepts any valid LZ11 stream.
//!
//! # Stream Format
//!
//! ```text
//! Header (4 bytes):
//!   0x00: 0x11 (type tag)
//!   0x01: uncompressed size (u24 LE)
//!   Sizes above 0xFFFFFF store 0 here and follow with a u32 LE size.
//!
//! Blocks (repeat until the output is complete):
//!   indicator (u8) - bit 7-i set when token i is a back-reference
//!   up to 8 tokens:
//!     literal:   1 byte
//!     reference: 2, 3 or 4 bytes (see below)
//! ```
//!
//! # Reference Tokens
//!
//! `D` is `displacement - 1` (12 bits), `L` the biased length.
//!
//! | Length | Bytes | Layout |
//! |--------|-------|--------|
//! | 3..=16 | 2 | `LLLL DDDD` `DDDDDDDD`, `L = length - 1` |
//! | 17..=272 | 3 | `0000 LLLL` `LLLL DDDD` `DDDDDDDD`, `L = length - 0x11` |
//! | 273..=65808 | 4 | `0001 LLLL` `LLLLLLLL` `LLLL DDDD` `DDDDDDDD`, `L = length - 0x111` |
//!
//! The compressor never emits matches longer than [`MAX_MATCH_LENGTH`], so
//! the 4-byte form only appears for the longest possible match.
//!
//! # Usage
//!
//! ```
//! use ctr_lz11::{compress, decompress};
//!
//! let data = b"banner banner banner banner".to_vec();
//! let packed = compress(&data);
//! assert_eq!(packed[0], 0x11);
//! assert_eq!(decompress(&packed).unwrap(), data);
//! ```

mod compress;
mod decompress;

pub use compress::compress;
pub use decompress::{Token, TokenReader, decompress, tokens, uncompressed_size};

// =============================================================================
// Constants
// =============================================================================

/// Type tag in the first header byte
pub const LZ11_MAGIC: u8 = 0x11;

/// Size of the basic header (tag + u24 size)
pub const LZ11_HEADER_SIZE: usize = 4;

/// Largest size that fits the u24 header field
pub const MAX_SHORT_SIZE: usize = 0xFF_FFFF;

/// Sliding window size (maximum displacement)
pub const WINDOW_SIZE: usize = 4096;

/// Shortest match worth encoding as a reference
pub const MIN_MATCH_LENGTH: usize = 3;

/// Longest match the compressor searches for
pub const MAX_MATCH_LENGTH: usize = 273;

// =============================================================================
// Error Type
// =============================================================================

/// Errors that can occur during LZ11 decompression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz11Error {
    /// First byte is not 0x11
    InvalidMagic(u8),
    /// Stream ended before the declared size was produced
    TruncatedData,
    /// Back-reference points before the start of the output
    InvalidDisplacement { displacement: usize, position: usize },
}

impl core::fmt::Display for Lz11Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Lz11Error::InvalidMagic(tag) => {
                write!(f, "invalid LZ11 tag 0x{:02X} (expected 0x11)", tag)
            }
            Lz11Error::TruncatedData => write!(f, "truncated LZ11 data"),
            Lz11Error::InvalidDisplacement {
                displacement,
                position,
            } => write!(
                f,
                "back-reference displacement {} exceeds output position {}",
                displacement, position
            ),
        }
    }
}

impl std::error::Error for Lz11Error {}

// =============================================================================
// Tests
// =============================================================================
