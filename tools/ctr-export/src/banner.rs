//! Banner (`.bnr`) assembly
//!
//! The texture and the audio clip are independent, so they are converted
//! in parallel and then wrapped in a CBMD.

use anyhow::{Context, Result};
use ctr_common::formats::{CwavEncoding, CwavSettings, build_banner, build_cbmd};
use std::path::Path;

use crate::audio::wav_cwav;
use crate::texture::{BANNER_HEIGHT, BANNER_WIDTH, texture_cgfx};

/// Banner build options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerOptions {
    pub looping: bool,
    pub loop_start: u32,
    /// 0 = end of clip
    pub loop_end: u32,
    /// LZ11-compress the CBMD
    pub compress: bool,
}

impl Default for BannerOptions {
    fn default() -> Self {
        Self {
            looping: false,
            loop_start: 0,
            loop_end: 0,
            compress: true,
        }
    }
}

impl BannerOptions {
    /// Banner audio is always IMA-ADPCM
    pub fn cwav_settings(&self) -> CwavSettings {
        CwavSettings {
            looping: self.looping,
            loop_start: self.loop_start,
            loop_end: self.loop_end,
            encoding: CwavEncoding::ImaAdpcm,
        }
    }
}

/// Build `.bnr` bytes from a banner image and a WAV clip
pub fn build_banner_bytes(image: &Path, audio: &Path, options: &BannerOptions) -> Result<Vec<u8>> {
    let settings = options.cwav_settings();
    let (cgfx, cwav) = rayon::join(
        || texture_cgfx(image, BANNER_WIDTH, BANNER_HEIGHT),
        || wav_cwav(audio, &settings),
    );
    let cgfx = cgfx?;
    let cwav = cwav?;

    let cbmd = build_cbmd(Some(&cgfx), Some(&cwav)).context("Failed to build CBMD")?;
    let cbmd_len = cbmd.len();
    let bnr = build_banner(cbmd, options.compress);
    if options.compress {
        tracing::debug!("LZ11: {} -> {} bytes", cbmd_len, bnr.len());
    }
    Ok(bnr)
}

/// Build a banner and write it to `output`
pub fn convert_banner(
    image: &Path,
    audio: &Path,
    output: &Path,
    options: &BannerOptions,
) -> Result<()> {
    let bnr = build_banner_bytes(image, audio, options)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(output, &bnr)
        .with_context(|| format!("Failed to write banner: {}", output.display()))?;
    tracing::info!("Wrote banner ({} bytes) to {}", bnr.len(), output.display());
    Ok(())
}
