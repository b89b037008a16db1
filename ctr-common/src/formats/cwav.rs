//! CWAV audio container
//!
//! # Layout
//!
//! ```text
//! Header (0x2C bytes):
//!   0x00: "CWAV"
//!   0x04: byte-order mark 0xFEFF (u16)
//!   0x06: header size field 0x0200 (u16)
//!   0x08: version 0 (u32)
//!   0x0C: file size (u32)
//!   0x10: block count 2 (u16), reserved (u16)
//!   0x14: INFO reference (magic, offset, size)
//!   0x20: DATA reference (magic, offset, size)
//!
//! INFO block (at 0x2C):
//!   "INFO", block size (u32)
//!   encoding (u16), loop flag (u8), reserved (u8)
//!   sample rate (u32), loop start (u32), loop end (u32)
//!   IMA-ADPCM only: 16 × i16 coefficients (zero),
//!                   pred_scale (u16), yn1 (u16), yn2 (u16)
//!   zero padding to a 0x20 boundary
//!
//! DATA block:
//!   "DATA", block size (u32), 0x18 reserved bytes
//!   payload, zero padding to a 0x20 boundary
//! ```
//!
//! Block sizes include their padding, so the header, INFO and DATA sizes
//! add up to the file size.

use std::io::{Read, Seek};

use ctr_adpcm::{AdpcmState, decode_adpcm, encode_adpcm};

use super::writer::{BlockWriter, Reference};
use super::{BYTE_ORDER_MARK, read_magic, read_u16, read_u32};
use crate::error::{CtrError, Result};
use crate::wav::read_mono_pcm16;

pub const CWAV_MAGIC: &[u8; 4] = b"CWAV";
pub const INFO_MAGIC: &[u8; 4] = b"INFO";
pub const DATA_MAGIC: &[u8; 4] = b"DATA";

/// Value of the header-size field (not the actual header length)
pub const CWAV_HEADER_SIZE_FIELD: u16 = 0x0200;
/// Actual header length; the INFO block starts here
pub const CWAV_HEADER_LEN: usize = 0x2C;
pub const CWAV_BLOCK_ALIGNMENT: usize = 0x20;
/// DATA magic, size and reserved bytes before the payload
pub const DATA_HEADER_LEN: usize = 0x20;

const ADPCM_COEFFICIENT_COUNT: usize = 16;

/// Sample encoding stored in the INFO block
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CwavEncoding {
    Pcm8 = 0,
    Pcm16 = 1,
    ImaAdpcm = 2,
}

impl CwavEncoding {
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            0 => Some(CwavEncoding::Pcm8),
            1 => Some(CwavEncoding::Pcm16),
            2 => Some(CwavEncoding::ImaAdpcm),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            CwavEncoding::Pcm8 => "PCM8",
            CwavEncoding::Pcm16 => "PCM16",
            CwavEncoding::ImaAdpcm => "IMA-ADPCM",
        }
    }
}

/// Loop and encoding options for a CWAV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CwavSettings {
    pub looping: bool,
    pub loop_start: u32,
    /// `0` while looping means the end of the clip
    pub loop_end: u32,
    pub encoding: CwavEncoding,
}

impl Default for CwavSettings {
    fn default() -> Self {
        Self {
            looping: false,
            loop_start: 0,
            loop_end: 0,
            encoding: CwavEncoding::Pcm16,
        }
    }
}

impl CwavSettings {
    pub fn with_encoding(encoding: CwavEncoding) -> Self {
        Self {
            encoding,
            ..Self::default()
        }
    }

    pub fn looped(mut self, loop_start: u32, loop_end: u32) -> Self {
        self.looping = true;
        self.loop_start = loop_start;
        self.loop_end = loop_end;
        self
    }
}

/// Encode mono samples and wrap them in a CWAV
pub fn build_cwav(sample_rate: u32, samples: &[i16], settings: &CwavSettings) -> Result<Vec<u8>> {
    let (payload, state): (Vec<u8>, Option<AdpcmState>) = match settings.encoding {
        CwavEncoding::Pcm8 => (samples.iter().map(|&s| (s >> 8) as u8).collect(), None),
        CwavEncoding::Pcm16 => (samples.iter().flat_map(|s| s.to_le_bytes()).collect(), None),
        CwavEncoding::ImaAdpcm => {
            let (data, state) = encode_adpcm(samples);
            (data, Some(state))
        }
    };
    write_cwav(sample_rate, samples.len() as u32, settings, &payload, state)
}

/// Write a CWAV around an already encoded payload
///
/// # Errors
/// `InvalidState` when the encoding is IMA-ADPCM and no final codec state
/// is supplied
pub fn write_cwav(
    sample_rate: u32,
    sample_count: u32,
    settings: &CwavSettings,
    payload: &[u8],
    adpcm_state: Option<AdpcmState>,
) -> Result<Vec<u8>> {
    let mut w = BlockWriter::new();

    w.write_magic(CWAV_MAGIC);
    w.write_u16(BYTE_ORDER_MARK);
    w.write_u16(CWAV_HEADER_SIZE_FIELD);
    w.write_u32(0);
    let file_size = w.reserve_u32();
    w.write_u16(2);
    w.write_u16(0);
    let info_ref = w.reserve_reference();
    let data_ref = w.reserve_reference();

    // INFO
    let info_start = w.position();
    w.write_magic(INFO_MAGIC);
    let info_size = w.reserve_u32();
    w.write_u16(settings.encoding as u16);
    w.write_u8(settings.looping as u8);
    w.write_u8(0);
    w.write_u32(sample_rate);

    let (loop_start, loop_end) = match (settings.looping, settings.loop_end) {
        (false, _) => (0, sample_count),
        (true, 0) => (settings.loop_start, sample_count),
        (true, end) => (settings.loop_start, end),
    };
    w.write_u32(loop_start);
    w.write_u32(loop_end);

    if settings.encoding == CwavEncoding::ImaAdpcm {
        let state = adpcm_state.ok_or_else(|| {
            CtrError::InvalidState("IMA-ADPCM CWAV needs the encoder's final state".into())
        })?;
        w.write_zeros(ADPCM_COEFFICIENT_COUNT * 2);
        w.write_u16(state.pred_scale());
        w.write_u16(state.yn1());
        w.write_u16(0);
    }
    w.align(CWAV_BLOCK_ALIGNMENT);
    let info_len = w.position() - info_start;
    w.patch_u32(info_size, info_len as u32);

    // DATA
    let data_start = w.position();
    w.write_magic(DATA_MAGIC);
    let data_size = w.reserve_u32();
    w.write_zeros(DATA_HEADER_LEN - 8);
    w.write_bytes(payload);
    w.align(CWAV_BLOCK_ALIGNMENT);
    let data_len = w.position() - data_start;
    w.patch_u32(data_size, data_len as u32);

    w.patch_u32(file_size, w.position() as u32);
    w.patch_reference(info_ref, &Reference::new(INFO_MAGIC, info_start, info_len));
    w.patch_reference(data_ref, &Reference::new(DATA_MAGIC, data_start, data_len));

    w.finish()
}

/// Parse a 16-bit PCM WAV, downmix it to mono and build a CWAV
pub fn cwav_from_wav<R: Read + Seek>(reader: R, settings: &CwavSettings) -> Result<Vec<u8>> {
    let (format, samples) = read_mono_pcm16(reader)?;
    build_cwav(format.sample_rate, &samples, settings)
}

/// Parsed CWAV header and INFO block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CwavLayout {
    pub file_size: u32,
    pub info: Reference,
    pub data: Reference,
    pub info_size: u32,
    pub data_size: u32,
    pub encoding: CwavEncoding,
    pub looping: bool,
    pub sample_rate: u32,
    pub loop_start: u32,
    pub loop_end: u32,
    /// `(pred_scale, yn1)` for IMA-ADPCM streams
    pub adpcm_context: Option<(u16, u16)>,
}

impl CwavLayout {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if read_magic(bytes, 0)? != *CWAV_MAGIC || read_u16(bytes, 4)? != BYTE_ORDER_MARK {
            return None;
        }

        let info = Reference::from_bytes(bytes.get(0x14..0x20)?)?;
        let data = Reference::from_bytes(bytes.get(0x20..0x2C)?)?;
        let i = info.offset as usize;
        if read_magic(bytes, i)? != *INFO_MAGIC
            || read_magic(bytes, data.offset as usize)? != *DATA_MAGIC
        {
            return None;
        }

        let encoding = CwavEncoding::from_u16(read_u16(bytes, i + 8)?)?;
        let adpcm_context = if encoding == CwavEncoding::ImaAdpcm {
            let context = i + 0x18 + ADPCM_COEFFICIENT_COUNT * 2;
            Some((read_u16(bytes, context)?, read_u16(bytes, context + 2)?))
        } else {
            None
        };

        Some(Self {
            file_size: read_u32(bytes, 0x0C)?,
            info,
            data,
            info_size: read_u32(bytes, i + 4)?,
            data_size: read_u32(bytes, data.offset as usize + 4)?,
            encoding,
            looping: *bytes.get(i + 10)? != 0,
            sample_rate: read_u32(bytes, i + 12)?,
            loop_start: read_u32(bytes, i + 16)?,
            loop_end: read_u32(bytes, i + 20)?,
            adpcm_context,
        })
    }

    /// Payload bytes, including any trailing block padding
    pub fn payload<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        let start = self.data.offset as usize + DATA_HEADER_LEN;
        let end = self.data.offset as usize + self.data_size as usize;
        bytes.get(start..end)
    }
}

/// Decode a CWAV back to mono samples
///
/// Non-looping clips store their exact length as the loop end. For looping
/// clips the length is derived from the payload, so block padding shows up
/// as trailing silence.
pub fn decode_cwav(bytes: &[u8]) -> Result<(CwavLayout, Vec<i16>)> {
    let layout =
        CwavLayout::from_bytes(bytes).ok_or_else(|| CtrError::format("not a CWAV file"))?;
    let payload = layout
        .payload(bytes)
        .ok_or_else(|| CtrError::format("CWAV DATA block extends past end of file"))?;

    let derived = match layout.encoding {
        CwavEncoding::Pcm8 => payload.len(),
        CwavEncoding::Pcm16 => payload.len() / 2,
        CwavEncoding::ImaAdpcm => payload.len().saturating_sub(ctr_adpcm::ADPCM_HEADER_SIZE) * 2,
    };
    let count = if layout.looping {
        derived
    } else {
        (layout.loop_end as usize).min(derived)
    };

    let samples = match layout.encoding {
        CwavEncoding::Pcm8 => payload[..count]
            .iter()
            .map(|&b| ((b as i8) as i16) << 8)
            .collect(),
        CwavEncoding::Pcm16 => crate::wav::pcm16_samples(&payload[..count * 2]),
        CwavEncoding::ImaAdpcm => decode_adpcm(payload, count)?,
    };
    Ok((layout, samples))
}
