//! ctr-export library
//!
//! File-level conversions behind the `ctr-export` binary: image and WAV
//! loading, banner and icon assembly, manifest builds and inspection.

pub mod audio;
pub mod banner;
pub mod icon;
pub mod inspect;
pub mod manifest;
pub mod texture;

pub use banner::{BannerOptions, build_banner_bytes};
pub use icon::{IconMetadata, build_icon_bytes};
pub use manifest::BannerManifest;
