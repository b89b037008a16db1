//! CBMD banner container and `.bnr` wrapping
//!
//! # Layout
//!
//! ```text
//! 0x00: "CBMD"
//! 0x04: version 0 (u32)
//! 0x08: flags (u32), see [`cbmd_flags`]
//! 0x0C: reserved (0x14 bytes)
//! 0x20: CGFX payload, if present
//!       CWAV payload, if present
//! ```
//!
//! A `.bnr` is either the raw CBMD or its LZ11 compression.

use super::writer::BlockWriter;
use super::{read_magic, read_u32};
use crate::error::{CtrError, Result};

pub const CBMD_MAGIC: &[u8; 4] = b"CBMD";
pub const CBMD_HEADER_SIZE: usize = 0x20;

/// Presence flags stored at offset 0x08
pub mod cbmd_flags {
    pub const CGFX_PRESENT: u32 = 1 << 0;
    pub const CWAV_PRESENT: u32 = 1 << 1;
}

/// Concatenate the banner payloads behind a CBMD header
///
/// A `None` or empty payload is treated as absent and leaves its flag clear.
pub fn build_cbmd(cgfx: Option<&[u8]>, cwav: Option<&[u8]>) -> Result<Vec<u8>> {
    let cgfx = cgfx.filter(|data| !data.is_empty());
    let cwav = cwav.filter(|data| !data.is_empty());

    let mut w = BlockWriter::new();
    w.write_magic(CBMD_MAGIC);
    w.write_u32(0);
    let flags_slot = w.reserve_u32();
    w.write_zeros(CBMD_HEADER_SIZE - w.position());

    let mut flags = 0;
    if let Some(cgfx) = cgfx {
        w.write_bytes(cgfx);
        flags |= cbmd_flags::CGFX_PRESENT;
    }
    if let Some(cwav) = cwav {
        w.write_bytes(cwav);
        flags |= cbmd_flags::CWAV_PRESENT;
    }
    w.patch_u32(flags_slot, flags);

    w.finish()
}

/// Produce the final `.bnr` bytes, LZ11-compressed when `compress` is set
pub fn build_banner(cbmd: Vec<u8>, compress: bool) -> Vec<u8> {
    if compress {
        ctr_lz11::compress(&cbmd)
    } else {
        cbmd
    }
}

/// Undo [`build_banner`]: decompress if needed and check for a CBMD
///
/// # Errors
/// `Lz11` for a corrupt compressed banner, `Format` if the result is not a
/// CBMD
pub fn open_banner(bytes: &[u8]) -> Result<Vec<u8>> {
    let cbmd = if bytes.first() == Some(&ctr_lz11::LZ11_MAGIC) {
        ctr_lz11::decompress(bytes)?
    } else {
        bytes.to_vec()
    };
    if read_magic(&cbmd, 0) != Some(*CBMD_MAGIC) {
        return Err(CtrError::format("banner does not contain a CBMD"));
    }
    Ok(cbmd)
}

/// Fixed CBMD header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CbmdHeader {
    pub version: u32,
    pub flags: u32,
}

impl CbmdHeader {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < CBMD_HEADER_SIZE || read_magic(bytes, 0)? != *CBMD_MAGIC {
            return None;
        }
        Some(Self {
            version: read_u32(bytes, 0x04)?,
            flags: read_u32(bytes, 0x08)?,
        })
    }

    pub fn has_cgfx(&self) -> bool {
        self.flags & cbmd_flags::CGFX_PRESENT != 0
    }

    pub fn has_cwav(&self) -> bool {
        self.flags & cbmd_flags::CWAV_PRESENT != 0
    }
}

/// A CBMD split back into its payloads
#[derive(Debug, Clone, Copy)]
pub struct CbmdContents<'a> {
    pub header: CbmdHeader,
    pub cgfx: Option<&'a [u8]>,
    pub cwav: Option<&'a [u8]>,
}

impl<'a> CbmdContents<'a> {
    /// Split using the file-size field each payload carries at 0x0C
    pub fn parse(bytes: &'a [u8]) -> Option<Self> {
        let header = CbmdHeader::from_bytes(bytes)?;
        let mut rest = &bytes[CBMD_HEADER_SIZE..];
        let cgfx = split_payload(&mut rest, header.has_cgfx())?;
        let cwav = split_payload(&mut rest, header.has_cwav())?;
        Some(Self { header, cgfx, cwav })
    }
}

fn split_payload<'a>(rest: &mut &'a [u8], present: bool) -> Option<Option<&'a [u8]>> {
    if !present {
        return Some(None);
    }
    let current: &'a [u8] = *rest;
    let size = read_u32(current, 0x0C)? as usize;
    let payload = current.get(..size)?;
    *rest = &current[size..];
    Some(Some(payload))
}
