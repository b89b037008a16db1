//! 3DS container formats
//!
//! Writers produce little-endian byte buffers; the matching header readers
//! exist for inspection and tests. Every size and offset that depends on a
//! payload is written as a placeholder and backpatched by [`BlockWriter`].

pub mod cbmd;
pub mod cgfx;
pub mod cwav;
pub mod smdh;
pub mod writer;

pub use cbmd::{CbmdContents, CbmdHeader, build_banner, build_cbmd, cbmd_flags, open_banner};
pub use cgfx::{CgfxHeader, build_cgfx};
pub use cwav::{
    CwavEncoding, CwavLayout, CwavSettings, build_cwav, cwav_from_wav, decode_cwav, write_cwav,
};
pub use smdh::{AppTitle, Language, SMDH_SIZE, Smdh, SmdhHeader};
pub use writer::{BlockWriter, Placeholder, Reference};

/// Byte-order mark written by every container (little-endian)
pub const BYTE_ORDER_MARK: u16 = 0xFEFF;

pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> Option<u16> {
    let b = bytes.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([b[0], b[1]]))
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
    let b = bytes.get(offset..offset + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub(crate) fn read_magic(bytes: &[u8], offset: usize) -> Option<[u8; 4]> {
    let b = bytes.get(offset..offset + 4)?;
    Some([b[0], b[1], b[2], b[3]])
}
