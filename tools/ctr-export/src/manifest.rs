//! banner.toml manifest parsing
//!
//! One manifest describes at most one banner and one icon. Relative paths
//! are resolved against the manifest's directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::banner::{BannerOptions, convert_banner};
use crate::icon::{IconMetadata, convert_icon};

/// banner.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct BannerManifest {
    #[serde(default)]
    pub output: OutputSection,
    pub banner: Option<BannerSection>,
    pub icon: Option<IconSection>,
}

/// Output configuration section
#[derive(Debug, Default, Deserialize)]
pub struct OutputSection {
    /// Output directory. Default: the manifest's directory
    pub dir: Option<String>,
}

/// Banner section: one image plus one audio clip
#[derive(Debug, Deserialize)]
pub struct BannerSection {
    pub image: String,
    pub audio: String,

    /// LZ11-compress the banner. Default: true
    #[serde(default = "default_compress")]
    pub compress: bool,

    #[serde(default, rename = "loop")]
    pub looping: bool,
    #[serde(default)]
    pub loop_start: u32,
    /// 0 = end of clip
    #[serde(default)]
    pub loop_end: u32,

    #[serde(default = "default_banner_output")]
    pub output: String,
}

/// Icon section
#[derive(Debug, Deserialize)]
pub struct IconSection {
    /// 48×48 icon (resized if needed)
    pub large: String,
    /// 24×24 icon. Default: downscaled `large`
    #[serde(default)]
    pub small: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub region_lock: u32,
    #[serde(default = "default_icon_output")]
    pub output: String,
}

fn default_compress() -> bool {
    true
}

fn default_banner_output() -> String {
    "banner.bnr".to_string()
}

fn default_icon_output() -> String {
    "icon.bin".to_string()
}

impl BannerSection {
    pub fn options(&self) -> BannerOptions {
        BannerOptions {
            looping: self.looping,
            loop_start: self.loop_start,
            loop_end: self.loop_end,
            compress: self.compress,
        }
    }
}

impl IconSection {
    pub fn metadata(&self) -> IconMetadata {
        IconMetadata {
            title: self.title.clone(),
            description: self.description.clone(),
            author: self.author.clone(),
            region_lock: self.region_lock,
        }
    }
}

impl BannerManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse banner.toml")
    }

    /// Check the manifest for missing or inconsistent values
    pub fn validate(&self) -> Result<()> {
        if self.banner.is_none() && self.icon.is_none() {
            anyhow::bail!("Manifest declares neither [banner] nor [icon]");
        }

        if let Some(banner) = &self.banner {
            if banner.image.is_empty() {
                anyhow::bail!("[banner] image path is empty");
            }
            if banner.audio.is_empty() {
                anyhow::bail!("[banner] audio path is empty");
            }
            if banner.output.is_empty() {
                anyhow::bail!("[banner] output path is empty");
            }
            if banner.looping && banner.loop_end != 0 && banner.loop_end <= banner.loop_start {
                anyhow::bail!(
                    "[banner] loop_end ({}) must be greater than loop_start ({})",
                    banner.loop_end,
                    banner.loop_start
                );
            }
        }

        if let Some(icon) = &self.icon {
            if icon.large.is_empty() {
                anyhow::bail!("[icon] large path is empty");
            }
            if icon.small.as_deref() == Some("") {
                anyhow::bail!("[icon] small path is empty");
            }
            if icon.title.is_empty() {
                anyhow::bail!("[icon] title is empty");
            }
            if icon.output.is_empty() {
                anyhow::bail!("[icon] output path is empty");
            }
        }

        Ok(())
    }

    /// Resolve the output directory; a CLI override wins over the manifest
    pub fn output_dir(&self, manifest_dir: &Path, output_override: Option<&Path>) -> PathBuf {
        match (output_override, &self.output.dir) {
            (Some(dir), _) => dir.to_path_buf(),
            (None, Some(dir)) => manifest_dir.join(dir),
            (None, None) => manifest_dir.to_path_buf(),
        }
    }
}

/// Load and validate a manifest
pub fn load_manifest(path: &Path) -> Result<BannerManifest> {
    let manifest = BannerManifest::load(path)?;
    manifest.validate()?;
    Ok(manifest)
}

/// Build everything a manifest declares
///
/// Returns the paths written.
pub fn build_all(
    manifest: &BannerManifest,
    manifest_path: &Path,
    output_override: Option<&Path>,
) -> Result<Vec<PathBuf>> {
    let manifest_dir = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let out_dir = manifest.output_dir(manifest_dir, output_override);
    let mut written = Vec::new();

    if let Some(banner) = &manifest.banner {
        let output = out_dir.join(&banner.output);
        tracing::info!("Building banner {:?}", output);
        convert_banner(
            &manifest_dir.join(&banner.image),
            &manifest_dir.join(&banner.audio),
            &output,
            &banner.options(),
        )?;
        written.push(output);
    }

    if let Some(icon) = &manifest.icon {
        let output = out_dir.join(&icon.output);
        tracing::info!("Building icon {:?}", output);
        let small = icon.small.as_ref().map(|s| manifest_dir.join(s));
        convert_icon(
            &manifest_dir.join(&icon.large),
            small.as_deref(),
            &output,
            &icon.metadata(),
        )?;
        written.push(output);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = BannerManifest::parse(
            r#"
            [output]
            dir = "build"

            [banner]
            image = "banner.png"
            audio = "banner.wav"
            compress = false
            loop = true
            loop_start = 1000
            loop_end = 32000

            [icon]
            large = "icon48.png"
            small = "icon24.png"
            title = "My App"
            description = "Longer description"
            author = "Someone"
            region_lock = 0x7FFFFFFF
            "#,
        )
        .unwrap();
        manifest.validate().unwrap();

        let banner = manifest.banner.as_ref().unwrap();
        assert!(!banner.compress);
        assert!(banner.looping);
        assert_eq!((banner.loop_start, banner.loop_end), (1000, 32000));
        assert_eq!(banner.output, "banner.bnr");

        let icon = manifest.icon.as_ref().unwrap();
        assert_eq!(icon.small.as_deref(), Some("icon24.png"));
        assert_eq!(icon.region_lock, 0x7FFF_FFFF);
        assert_eq!(icon.output, "icon.bin");

        assert_eq!(
            manifest.output_dir(Path::new("/proj"), None),
            PathBuf::from("/proj/build")
        );
        assert_eq!(
            manifest.output_dir(Path::new("/proj"), Some(Path::new("/out"))),
            PathBuf::from("/out")
        );
    }

    #[test]
    fn test_defaults() {
        let manifest = BannerManifest::parse(
            r#"
            [banner]
            image = "b.png"
            audio = "b.wav"
            "#,
        )
        .unwrap();
        manifest.validate().unwrap();

        let banner = manifest.banner.as_ref().unwrap();
        assert!(banner.compress);
        assert!(!banner.looping);
        assert_eq!(banner.loop_end, 0);
        assert!(manifest.icon.is_none());
        assert_eq!(
            manifest.output_dir(Path::new("proj"), None),
            PathBuf::from("proj")
        );
    }

    #[test]
    fn test_validate_rejects_empty_manifest() {
        let manifest = BannerManifest::parse("").unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_loop() {
        let manifest = BannerManifest::parse(
            r#"
            [banner]
            image = "b.png"
            audio = "b.wav"
            loop = true
            loop_start = 500
            loop_end = 100
            "#,
        )
        .unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_title() {
        let manifest = BannerManifest::parse(
            r#"
            [icon]
            large = "i.png"
            title = ""
            "#,
        )
        .unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_parse_error_has_context() {
        let err = BannerManifest::parse("[banner]\nimage = 3").unwrap_err();
        assert!(err.to_string().contains("Failed to parse banner.toml"));
    }
}
