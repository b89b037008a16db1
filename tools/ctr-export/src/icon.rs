//! SMDH icon assembly

use anyhow::{Context, Result};
use ctr_common::formats::Smdh;
use ctr_common::formats::smdh::{LARGE_ICON_SIZE, SMALL_ICON_SIZE};
use std::path::Path;

use crate::texture::icon_pixels;

/// Title text and settings written to every language slot
#[derive(Debug, Clone, Default)]
pub struct IconMetadata {
    pub title: String,
    pub description: String,
    pub author: String,
    pub region_lock: u32,
}

/// Build SMDH bytes from a large icon and an optional small one
///
/// Without a small icon the large image is downscaled to 24×24.
pub fn build_icon_bytes(
    large: &Path,
    small: Option<&Path>,
    metadata: &IconMetadata,
) -> Result<Vec<u8>> {
    let mut smdh = Smdh::new();
    smdh.set_all_titles(&metadata.title, &metadata.description, &metadata.author);
    smdh.region_lock = metadata.region_lock;
    smdh.set_large_icon(icon_pixels(large, LARGE_ICON_SIZE as u32)?);
    smdh.set_small_icon(icon_pixels(small.unwrap_or(large), SMALL_ICON_SIZE as u32)?);

    smdh.to_bytes().context("Failed to serialize SMDH")
}

/// Build an SMDH and write it to `output`
pub fn convert_icon(
    large: &Path,
    small: Option<&Path>,
    output: &Path,
    metadata: &IconMetadata,
) -> Result<()> {
    let smdh = build_icon_bytes(large, small, metadata)?;
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(output, &smdh)
        .with_context(|| format!("Failed to write icon: {}", output.display()))?;
    tracing::info!("Wrote icon to {}", output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctr_common::formats::{SMDH_SIZE, SmdhHeader};
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_icon_from_large_only() {
        let dir = tempdir().unwrap();
        let large = dir.path().join("icon48.png");
        RgbaImage::from_pixel(48, 48, Rgba([255, 0, 0, 255]))
            .save(&large)
            .unwrap();

        let metadata = IconMetadata {
            title: "Banner Test".into(),
            description: "Builds a banner".into(),
            author: "ctr-banner".into(),
            region_lock: 0x7FFF_FFFF,
        };
        let bytes = build_icon_bytes(&large, None, &metadata).unwrap();
        assert_eq!(bytes.len(), SMDH_SIZE);

        let header = SmdhHeader::from_bytes(&bytes).unwrap();
        assert_eq!(header.titles[1].short_description, "Banner Test");
        assert_eq!(header.titles[11].publisher, "ctr-banner");
        assert_eq!(header.region_lock, 0x7FFF_FFFF);

        let small = SmdhHeader::small_icon(&bytes).unwrap();
        assert_eq!(&small[0..2], &0xF800u16.to_le_bytes());
        let large = SmdhHeader::large_icon(&bytes).unwrap();
        assert!(large.chunks_exact(2).all(|px| px == 0xF800u16.to_le_bytes()));
    }
}
