//! ctr-export - 3DS banner export tool
//!
//! Converts PNG/JPEG images and WAV audio to 3DS banner (.bnr), icon (SMDH),
//! texture (.cgfx) and audio (.bcwav) files

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ctr_common::formats::{CwavEncoding, CwavSettings};
use std::path::PathBuf;

use ctr_export::{audio, banner, icon, inspect, manifest, texture};

#[derive(Parser)]
#[command(name = "ctr-export")]
#[command(about = "3DS banner export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the banner and icon declared in a manifest file
    Build {
        /// Path to banner.toml manifest
        #[arg(default_value = "banner.toml")]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate manifest without building
    Check {
        /// Path to banner.toml manifest
        #[arg(default_value = "banner.toml")]
        manifest: PathBuf,
    },

    /// Build a banner (.bnr) from a 256x128 image and a WAV clip
    Banner {
        /// Banner image (PNG/JPG, resized to 256x128)
        image: PathBuf,

        /// Banner audio (16-bit PCM WAV)
        audio: PathBuf,

        /// Output .bnr file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        looping: LoopArgs,

        /// Write the CBMD without LZ11 compression
        #[arg(long)]
        no_compress: bool,
    },

    /// Build an icon (SMDH) from a 48x48 image
    Icon {
        /// Large icon (PNG/JPG, resized to 48x48)
        large: PathBuf,

        /// Small icon (resized to 24x24; default: downscaled large icon)
        #[arg(long)]
        small: Option<PathBuf>,

        /// Short title
        #[arg(long)]
        title: String,

        /// Long description
        #[arg(long, default_value = "")]
        description: String,

        /// Publisher
        #[arg(long, default_value = "")]
        author: String,

        /// Output SMDH file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export a single audio file
    Audio {
        /// Input WAV file
        input: PathBuf,

        /// Output .bcwav file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sample encoding
        #[arg(short, long, value_enum, default_value_t = Encoding::ImaAdpcm)]
        encoding: Encoding,

        #[command(flatten)]
        looping: LoopArgs,
    },

    /// Export a single texture file
    Texture {
        /// Input PNG/JPG file
        input: PathBuf,

        /// Output .cgfx file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Texture width (multiple of 8)
        #[arg(long, default_value_t = texture::BANNER_WIDTH)]
        width: u32,

        /// Texture height (multiple of 8)
        #[arg(long, default_value_t = texture::BANNER_HEIGHT)]
        height: u32,
    },

    /// LZ11-compress a file
    Compress {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Decompress an LZ11 file
    Decompress {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the structure of a banner, icon, CGFX, CWAV or LZ11 file
    Inspect {
        input: PathBuf,
    },
}

#[derive(clap::Args)]
struct LoopArgs {
    /// Loop the audio
    #[arg(long = "loop")]
    looping: bool,

    /// Loop start sample
    #[arg(long, default_value_t = 0)]
    loop_start: u32,

    /// Loop end sample (0 = end of clip)
    #[arg(long, default_value_t = 0)]
    loop_end: u32,
}

#[derive(Clone, Copy, ValueEnum)]
enum Encoding {
    ImaAdpcm,
    Pcm16,
    Pcm8,
}

impl Encoding {
    fn to_cwav(self) -> CwavEncoding {
        match self {
            Encoding::ImaAdpcm => CwavEncoding::ImaAdpcm,
            Encoding::Pcm16 => CwavEncoding::Pcm16,
            Encoding::Pcm8 => CwavEncoding::Pcm8,
        }
    }
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build { manifest, output } => {
            tracing::info!("Building from {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            let written = manifest::build_all(&config, &manifest, output.as_deref())?;
            tracing::info!("Build complete! ({} files)", written.len());
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            manifest::load_manifest(&manifest)?;
            tracing::info!("Manifest is valid!");
        }

        Commands::Banner {
            image,
            audio,
            output,
            looping,
            no_compress,
        } => {
            let output = output.unwrap_or_else(|| image.with_extension("bnr"));
            tracing::info!("Converting {:?} + {:?} -> {:?}", image, audio, output);
            let options = banner::BannerOptions {
                looping: looping.looping,
                loop_start: looping.loop_start,
                loop_end: looping.loop_end,
                compress: !no_compress,
            };
            banner::convert_banner(&image, &audio, &output, &options)?;
            tracing::info!("Done!");
        }

        Commands::Icon {
            large,
            small,
            title,
            description,
            author,
            output,
        } => {
            let output = output.unwrap_or_else(|| large.with_file_name("icon.bin"));
            tracing::info!("Converting {:?} -> {:?}", large, output);
            let metadata = icon::IconMetadata {
                title,
                description,
                author,
                region_lock: 0,
            };
            icon::convert_icon(&large, small.as_deref(), &output, &metadata)?;
            tracing::info!("Done!");
        }

        Commands::Audio {
            input,
            output,
            encoding,
            looping,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("bcwav"));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            let settings = CwavSettings {
                looping: looping.looping,
                loop_start: looping.loop_start,
                loop_end: looping.loop_end,
                encoding: encoding.to_cwav(),
            };
            audio::convert_wav(&input, &output, &settings)?;
            tracing::info!("Done!");
        }

        Commands::Texture {
            input,
            output,
            width,
            height,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("cgfx"));
            tracing::info!("Converting {:?} -> {:?}", input, output);
            texture::convert_image(&input, &output, width, height)?;
            tracing::info!("Done!");
        }

        Commands::Compress { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("lz11"));
            tracing::info!("Compressing {:?} -> {:?}", input, output);
            let data = read(&input)?;
            let packed = ctr_lz11::compress(&data);
            tracing::debug!("LZ11: {} -> {} bytes", data.len(), packed.len());
            write(&output, &packed)?;
            tracing::info!("Done!");
        }

        Commands::Decompress { input, output } => {
            let output = output.unwrap_or_else(|| input.with_extension("bin"));
            tracing::info!("Decompressing {:?} -> {:?}", input, output);
            let data = read(&input)?;
            let unpacked = ctr_lz11::decompress(&data)
                .with_context(|| format!("Failed to decompress {}", input.display()))?;
            write(&output, &unpacked)?;
            tracing::info!("Done!");
        }

        Commands::Inspect { input } => {
            print!("{}", inspect::inspect_file(&input)?);
        }
    }

    Ok(())
}

fn read(path: &std::path::Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

fn write(path: &std::path::Path, data: &[u8]) -> Result<()> {
    std::fs::write(path, data)
        .with_context(|| format!("Failed to write output: {}", path.display()))
}
