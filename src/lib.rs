//! DXT1, DXT3 and DXT5 (BC1 to BC3) block compression.
//!
//! Pixels are tightly packed RGBA8 in raster order. Blocks are stored in
//! raster order as well, 8 bytes each for DXT1 and 16 bytes for DXT3 and DXT5.
//!
//! ```no_run
//! use dxt_squish::{Flags, compress_image, storage_requirements};
//!
//! let (width, height) = (6, 6);
//! let rgba = vec![255u8; width as usize * height as usize * 4];
//! let flags = Flags::DXT1 | Flags::COLOUR_CLUSTER_FIT;
//!
//! let mut blocks = vec![0u8; storage_requirements(width, height, flags)?];
//! compress_image(&rgba, width, height, &mut blocks, flags)?;
//! # Ok::<(), dxt_squish::DxtError>(())
//! ```

pub mod dxt;
pub mod error;
pub mod ffi;

pub use dxt::{
    ColourFitKind, CompressionSettings, Flags, Format, MetricKind, compress, compress_image,
    compress_masked, decompress, decompress_image, fix_flags, storage_requirements,
};
pub use error::{DxtError, Result};
