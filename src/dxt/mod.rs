mod alpha;
mod block;
mod colour_block;
mod colour_set;
pub mod decode;
pub mod encode;
pub mod fit;
mod flags;
mod maths;
mod metric;

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::{DxtError, Result};

pub use block::{compress, compress_masked, decompress};
pub use colour_set::ColourSet;
pub use decode::decompress_image;
pub use encode::compress_image;
pub use flags::{ColourFitKind, CompressionSettings, Flags, MetricKind};
pub use metric::Metric;

/// Pixels per block edge.
pub const BLOCK_DIM: usize = 4;

/// Bytes of RGBA8 data in one 4×4 block.
pub const BLOCK_RGBA_BYTES: usize = BLOCK_DIM * BLOCK_DIM * 4;

/// Block compression formats supported by this crate.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// DXT1 (BC1), colour only
    Dxt1,
    /// DXT3 (BC2), colour plus explicit 4-bit alpha
    Dxt3,
    /// DXT5 (BC3), colour plus interpolated alpha
    Dxt5,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dxt1" | "bc1" => Ok(Self::Dxt1),
            "dxt3" | "bc2" => Ok(Self::Dxt3),
            "dxt5" | "bc3" => Ok(Self::Dxt5),
            _ => Err(format!("unknown format '{s}' (expected dxt1, dxt3 or dxt5)")),
        }
    }
}

impl Format {
    pub const ALL: [Format; 3] = [Format::Dxt1, Format::Dxt3, Format::Dxt5];

    /// Size of one coded block in bytes.
    pub const fn block_byte_size(self) -> usize {
        match self {
            Self::Dxt1 => 8,
            Self::Dxt3 | Self::Dxt5 => 16,
        }
    }

    /// Whether the block carries an alpha sub-block in front of the colour.
    pub const fn has_alpha_block(self) -> bool {
        !matches!(self, Self::Dxt1)
    }

    /// Returns the bytes per row of blocks for the given width.
    ///
    /// Width is rounded up to the nearest multiple of 4.
    pub const fn bytes_per_row(self, width: u32) -> usize {
        width.div_ceil(BLOCK_DIM as u32) as usize * self.block_byte_size()
    }

    /// Returns the byte size required for storing compressed blocks for the given dimensions.
    ///
    /// Width and height are rounded up to the nearest multiple of 4. Fails with
    /// [`DxtError::Overflow`] when the product does not fit in `usize`.
    pub fn blocks_byte_size(self, width: u32, height: u32) -> Result<usize> {
        let block_width = width.div_ceil(BLOCK_DIM as u32) as usize;
        let block_height = height.div_ceil(BLOCK_DIM as u32) as usize;

        block_width
            .checked_mul(block_height)
            .and_then(|count| count.checked_mul(self.block_byte_size()))
            .ok_or(DxtError::Overflow { width, height })
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Dxt1 => "dxt1",
            Self::Dxt3 => "dxt3",
            Self::Dxt5 => "dxt5",
        }
    }
}

/// Normalises a flag mask; see [`Flags::fix`].
pub const fn fix_flags(flags: Flags) -> Flags {
    flags.fix()
}

/// Computes the number of bytes needed to store an image of the given size.
pub fn storage_requirements(width: u32, height: u32, flags: Flags) -> Result<usize> {
    flags.format().blocks_byte_size(width, height)
}

/// Length of a tightly packed RGBA8 buffer for the given dimensions.
pub(crate) fn rgba_byte_size(width: u32, height: u32) -> Result<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
        .ok_or(DxtError::Overflow { width, height })
}
