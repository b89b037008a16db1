//! SMDH icon and title metadata
//!
//! # Layout
//!
//! ```text
//! 0x0000: "SMDH", version (u16), reserved (u16)
//! 0x0008: 16 titles × 0x200 bytes, each:
//!           short description  0x80 bytes UTF-16LE
//!           long description  0x100 bytes UTF-16LE
//!           publisher          0x80 bytes UTF-16LE
//! 0x2008: age ratings (16 bytes)
//! 0x2018: region lock (u32)
//! 0x201C: match-maker ids (12 bytes)
//! 0x2028: flags (u32)
//! 0x202C: EULA version (u16), reserved (u16)
//! 0x2030: optimal banner animation frame (u32)
//! 0x2034: StreetPass id (u32)
//! 0x2038: reserved (8 bytes)
//! 0x2040: small icon, 24×24 BGR565, tiled
//! 0x24C0: large icon, 48×48 BGR565, tiled
//! 0x36C0: end
//! ```

use super::{read_magic, read_u16, read_u32};
use crate::error::{CtrError, Result};
use crate::tiling::{PixelFormat, tile, untile};

pub const SMDH_MAGIC: &[u8; 4] = b"SMDH";
/// Serialized size, always
pub const SMDH_SIZE: usize = 0x36C0;
pub const TITLE_COUNT: usize = 16;

pub const SHORT_DESCRIPTION_SIZE: usize = 0x80;
pub const LONG_DESCRIPTION_SIZE: usize = 0x100;
pub const PUBLISHER_SIZE: usize = 0x80;
const TITLE_SIZE: usize = SHORT_DESCRIPTION_SIZE + LONG_DESCRIPTION_SIZE + PUBLISHER_SIZE;
const TITLES_OFFSET: usize = 0x08;

pub const SMALL_ICON_SIZE: usize = 24;
pub const LARGE_ICON_SIZE: usize = 48;
const SMALL_ICON_OFFSET: usize = 0x2040;
const LARGE_ICON_OFFSET: usize = 0x24C0;

/// Title slots with an assigned language; slots 12..16 are unused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Japanese = 0,
    English = 1,
    French = 2,
    German = 3,
    Italian = 4,
    Spanish = 5,
    SimplifiedChinese = 6,
    Korean = 7,
    Dutch = 8,
    Portuguese = 9,
    Russian = 10,
    TraditionalChinese = 11,
}

impl Language {
    pub const ALL: [Language; 12] = [
        Language::Japanese,
        Language::English,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Spanish,
        Language::SimplifiedChinese,
        Language::Korean,
        Language::Dutch,
        Language::Portuguese,
        Language::Russian,
        Language::TraditionalChinese,
    ];
}

/// One title slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppTitle {
    pub short_description: String,
    pub long_description: String,
    pub publisher: String,
}

/// SMDH builder
///
/// Icons are held as linear BGR565 and tiled during [`to_bytes`](Self::to_bytes).
#[derive(Debug, Clone)]
pub struct Smdh {
    pub version: u16,
    titles: [AppTitle; TITLE_COUNT],
    pub ratings: [u8; 16],
    pub region_lock: u32,
    pub match_maker_ids: [u8; 12],
    pub flags: u32,
    pub eula_version: u16,
    pub optimal_banner_frame: u32,
    pub streetpass_id: u32,
    small_icon: Vec<u8>,
    large_icon: Vec<u8>,
}

impl Default for Smdh {
    fn default() -> Self {
        Self::new()
    }
}

impl Smdh {
    /// Empty titles, zeroed settings and black icons
    pub fn new() -> Self {
        Self {
            version: 0,
            titles: Default::default(),
            ratings: [0; 16],
            region_lock: 0,
            match_maker_ids: [0; 12],
            flags: 0,
            eula_version: 0,
            optimal_banner_frame: 0,
            streetpass_id: 0,
            small_icon: vec![0; PixelFormat::Bgr565.buffer_len(SMALL_ICON_SIZE, SMALL_ICON_SIZE)],
            large_icon: vec![0; PixelFormat::Bgr565.buffer_len(LARGE_ICON_SIZE, LARGE_ICON_SIZE)],
        }
    }

    pub fn title(&self, language: Language) -> &AppTitle {
        &self.titles[language as usize]
    }

    pub fn set_title(
        &mut self,
        language: Language,
        short_description: &str,
        long_description: &str,
        publisher: &str,
    ) {
        self.titles[language as usize] = AppTitle {
            short_description: short_description.to_string(),
            long_description: long_description.to_string(),
            publisher: publisher.to_string(),
        };
    }

    /// Set the same title for every language slot
    pub fn set_all_titles(
        &mut self,
        short_description: &str,
        long_description: &str,
        publisher: &str,
    ) {
        for language in Language::ALL {
            self.set_title(language, short_description, long_description, publisher);
        }
    }

    /// Linear 24×24 BGR565 pixels
    pub fn set_small_icon(&mut self, bgr565: Vec<u8>) {
        self.small_icon = bgr565;
    }

    /// Linear 48×48 BGR565 pixels
    pub fn set_large_icon(&mut self, bgr565: Vec<u8>) {
        self.large_icon = bgr565;
    }

    /// Serialize to exactly [`SMDH_SIZE`] bytes
    ///
    /// # Errors
    /// `Format` if the result is not `0x36C0` bytes, which happens when an
    /// icon buffer has the wrong length
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(SMDH_SIZE);
        out.extend_from_slice(SMDH_MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());

        for title in &self.titles {
            write_utf16(&mut out, &title.short_description, SHORT_DESCRIPTION_SIZE);
            write_utf16(&mut out, &title.long_description, LONG_DESCRIPTION_SIZE);
            write_utf16(&mut out, &title.publisher, PUBLISHER_SIZE);
        }

        out.extend_from_slice(&self.ratings);
        out.extend_from_slice(&self.region_lock.to_le_bytes());
        out.extend_from_slice(&self.match_maker_ids);
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&self.eula_version.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&self.optimal_banner_frame.to_le_bytes());
        out.extend_from_slice(&self.streetpass_id.to_le_bytes());
        out.extend_from_slice(&[0; 8]);

        out.extend_from_slice(&tiled_icon(&self.small_icon, SMALL_ICON_SIZE));
        out.extend_from_slice(&tiled_icon(&self.large_icon, LARGE_ICON_SIZE));

        if out.len() != SMDH_SIZE {
            return Err(CtrError::format(format!(
                "SMDH size is 0x{:X}, expected 0x{:X}",
                out.len(),
                SMDH_SIZE
            )));
        }
        Ok(out)
    }
}

/// Tile an icon of the right size; anything else passes through and trips
/// the size check
fn tiled_icon(linear: &[u8], size: usize) -> Vec<u8> {
    if linear.len() == PixelFormat::Bgr565.buffer_len(size, size) {
        tile(linear, size, size, PixelFormat::Bgr565)
    } else {
        linear.to_vec()
    }
}

/// Write `text` as UTF-16LE into a null-padded field of `field_size` bytes
///
/// Long text is cut so at least one null unit remains, never inside a
/// surrogate pair.
fn write_utf16(out: &mut Vec<u8>, text: &str, field_size: usize) {
    let max_units = field_size / 2 - 1;
    let mut units: Vec<u16> = text.encode_utf16().collect();
    if units.len() > max_units {
        let mut cut = max_units;
        if (0xD800..0xDC00).contains(&units[cut - 1]) {
            cut -= 1;
        }
        units.truncate(cut);
    }

    let start = out.len();
    for unit in units {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    out.resize(start + field_size, 0);
}

fn read_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .take_while(|&u| u != 0)
        .collect();
    String::from_utf16_lossy(&units)
}

/// Fields read back from a serialized SMDH
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmdhHeader {
    pub version: u16,
    pub titles: Vec<AppTitle>,
    pub region_lock: u32,
    pub flags: u32,
    pub eula_version: u16,
    pub optimal_banner_frame: u32,
    pub streetpass_id: u32,
}

impl SmdhHeader {
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != SMDH_SIZE || read_magic(bytes, 0)? != *SMDH_MAGIC {
            return None;
        }

        let titles = (0..TITLE_COUNT)
            .map(|i| {
                let slot = &bytes[TITLES_OFFSET + i * TITLE_SIZE..][..TITLE_SIZE];
                let (short, rest) = slot.split_at(SHORT_DESCRIPTION_SIZE);
                let (long, publisher) = rest.split_at(LONG_DESCRIPTION_SIZE);
                AppTitle {
                    short_description: read_utf16(short),
                    long_description: read_utf16(long),
                    publisher: read_utf16(publisher),
                }
            })
            .collect();

        Some(Self {
            version: read_u16(bytes, 0x04)?,
            titles,
            region_lock: read_u32(bytes, 0x2018)?,
            flags: read_u32(bytes, 0x2028)?,
            eula_version: read_u16(bytes, 0x202C)?,
            optimal_banner_frame: read_u32(bytes, 0x2030)?,
            streetpass_id: read_u32(bytes, 0x2034)?,
        })
    }

    /// Linear 24×24 BGR565 small icon
    pub fn small_icon(bytes: &[u8]) -> Option<Vec<u8>> {
        icon(bytes, SMALL_ICON_OFFSET, SMALL_ICON_SIZE)
    }

    /// Linear 48×48 BGR565 large icon
    pub fn large_icon(bytes: &[u8]) -> Option<Vec<u8>> {
        icon(bytes, LARGE_ICON_OFFSET, LARGE_ICON_SIZE)
    }
}

fn icon(bytes: &[u8], offset: usize, size: usize) -> Option<Vec<u8>> {
    let len = PixelFormat::Bgr565.buffer_len(size, size);
    let tiled = bytes.get(offset..offset + len)?;
    Some(untile(tiled, size, size, PixelFormat::Bgr565))
}
