//! ctr-common: 3DS banner and icon building blocks
//!
//! This crate contains:
//! - [`tiling`]: 8×8 GPU tile swizzling for RGBA8 and BGR565 buffers
//! - [`packing`]: RGBA8 to BGR565 colour packing
//! - [`wav`]: RIFF/WAVE reader for uncompressed PCM
//! - [`formats`]: CWAV, CGFX, CBMD and SMDH writers plus header readers
//!
//! Everything works on in-memory buffers. File access, image decoding and
//! logging live in the `ctr-export` tool.

pub mod error;
pub mod formats;
pub mod packing;
pub mod tiling;
pub mod wav;

pub use error::{CtrError, Result};
pub use tiling::PixelFormat;
