//! WAV loading and CWAV conversion

use anyhow::{Context, Result};
use ctr_common::formats::{CwavSettings, build_cwav};
use ctr_common::wav::{WavFormat, read_mono_pcm16};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Load a 16-bit PCM WAV as mono samples
pub fn load_wav(path: &Path) -> Result<(WavFormat, Vec<i16>)> {
    let file =
        File::open(path).with_context(|| format!("Failed to open WAV: {}", path.display()))?;
    let (format, samples) = read_mono_pcm16(BufReader::new(file))
        .with_context(|| format!("Failed to parse WAV: {}", path.display()))?;

    if format.channels > 1 {
        tracing::warn!(
            "{}: downmixing {} channels to mono",
            path.display(),
            format.channels
        );
    }
    tracing::debug!(
        "{}: {} Hz, {} samples",
        path.display(),
        format.sample_rate,
        samples.len()
    );

    Ok((format, samples))
}

/// Check loop points against the clip length
///
/// A loop end of 0 means the end of the clip.
pub fn validate_loop(settings: &CwavSettings, sample_count: usize) -> Result<()> {
    if !settings.looping {
        return Ok(());
    }
    let end = match settings.loop_end {
        0 => sample_count as u32,
        end => end,
    };
    if end as usize > sample_count {
        anyhow::bail!(
            "Loop end {} is past the end of the clip ({} samples)",
            end,
            sample_count
        );
    }
    if settings.loop_start >= end {
        anyhow::bail!(
            "Loop start {} must come before loop end {}",
            settings.loop_start,
            end
        );
    }
    Ok(())
}

/// Build a CWAV from a WAV file
pub fn wav_cwav(path: &Path, settings: &CwavSettings) -> Result<Vec<u8>> {
    let (format, samples) = load_wav(path)?;
    validate_loop(settings, samples.len())?;
    let cwav = build_cwav(format.sample_rate, &samples, settings)
        .with_context(|| format!("Failed to build CWAV from {}", path.display()))?;
    tracing::debug!(
        "CWAV: {}, {} bytes",
        settings.encoding.name(),
        cwav.len()
    );
    Ok(cwav)
}

/// Convert a WAV file to a standalone `.bcwav`
pub fn convert_wav(input: &Path, output: &Path, settings: &CwavSettings) -> Result<()> {
    let cwav = wav_cwav(input, settings)?;
    std::fs::write(output, &cwav)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    tracing::info!("Wrote {} bytes to {}", cwav.len(), output.display());
    Ok(())
}
