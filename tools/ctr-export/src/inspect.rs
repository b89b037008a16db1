//! Human-readable dumps of banner, icon and container files

use anyhow::{Context, Result};
use ctr_common::formats::{
    CbmdContents, CgfxHeader, CwavLayout, SmdhHeader, cbmd::CBMD_MAGIC, cgfx::CGFX_MAGIC,
    cwav::CWAV_MAGIC, smdh::SMDH_MAGIC,
};
use std::fmt::Write;
use std::path::Path;

/// Describe the file at `path`
pub fn inspect_file(path: &Path) -> Result<String> {
    let data = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    describe(&data)
}

/// Describe an in-memory container, recursing into LZ11 and CBMD payloads
pub fn describe(data: &[u8]) -> Result<String> {
    let mut out = String::new();
    describe_into(&mut out, data, 0)?;
    Ok(out)
}

fn describe_into(out: &mut String, data: &[u8], depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);

    if data.first() == Some(&ctr_lz11::LZ11_MAGIC) {
        let inner = ctr_lz11::decompress(data).context("Invalid LZ11 stream")?;
        writeln!(out, "{}LZ11: {} -> {} bytes", indent, data.len(), inner.len())?;
        return describe_into(out, &inner, depth + 1);
    }

    match data.get(0..4) {
        Some(magic) if magic == CBMD_MAGIC => {
            let contents = CbmdContents::parse(data).context("Malformed CBMD")?;
            writeln!(
                out,
                "{}CBMD: {} bytes, flags 0x{:X} (cgfx: {}, cwav: {})",
                indent,
                data.len(),
                contents.header.flags,
                contents.header.has_cgfx(),
                contents.header.has_cwav()
            )?;
            for payload in [contents.cgfx, contents.cwav].into_iter().flatten() {
                describe_into(out, payload, depth + 1)?;
            }
        }
        Some(magic) if magic == CGFX_MAGIC => {
            let header = CgfxHeader::from_bytes(data).context("Malformed CGFX")?;
            writeln!(
                out,
                "{}CGFX: {}x{}, format 0x{:04X}, {} bytes",
                indent, header.width, header.height, header.format, header.file_size
            )?;
        }
        Some(magic) if magic == CWAV_MAGIC => {
            let layout = CwavLayout::from_bytes(data).context("Malformed CWAV")?;
            writeln!(
                out,
                "{}CWAV: {}, {} Hz, {} bytes",
                indent,
                layout.encoding.name(),
                layout.sample_rate,
                layout.file_size
            )?;
            writeln!(
                out,
                "{}  INFO @ 0x{:X} ({} bytes), DATA @ 0x{:X} ({} bytes)",
                indent, layout.info.offset, layout.info.size, layout.data.offset, layout.data.size
            )?;
            if layout.looping {
                writeln!(
                    out,
                    "{}  loop {}..{}",
                    indent, layout.loop_start, layout.loop_end
                )?;
            } else {
                writeln!(out, "{}  {} samples, no loop", indent, layout.loop_end)?;
            }
            if let Some((pred_scale, yn1)) = layout.adpcm_context {
                writeln!(
                    out,
                    "{}  ADPCM final state: predictor {}, step index {}",
                    indent, pred_scale as i16, yn1
                )?;
            }
        }
        Some(magic) if magic == SMDH_MAGIC => {
            let header = SmdhHeader::from_bytes(data).context("Malformed SMDH")?;
            writeln!(out, "{}SMDH: version {}", indent, header.version)?;
            if let Some(title) = header.titles.get(1) {
                writeln!(out, "{}  title: {}", indent, title.short_description)?;
                writeln!(out, "{}  description: {}", indent, title.long_description)?;
                writeln!(out, "{}  publisher: {}", indent, title.publisher)?;
            }
            writeln!(out, "{}  region lock: 0x{:08X}", indent, header.region_lock)?;
        }
        _ => anyhow::bail!("Unrecognized file format"),
    }

    Ok(())
}
