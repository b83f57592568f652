use rayon::prelude::*;

use crate::dxt::block::compress_into;
use crate::dxt::{BLOCK_DIM, BLOCK_RGBA_BYTES, Flags, rgba_byte_size};
use crate::error::{Result, check_len};

/// Compresses an RGBA8 image into a tightly packed block buffer.
///
/// `rgba` must hold exactly `width * height * 4` bytes and `blocks` exactly
/// [`storage_requirements`](crate::dxt::storage_requirements) bytes. Blocks are
/// laid out in raster order. Tiles that overhang the right or bottom edge are
/// compressed with a mask covering only the pixels inside the image.
pub fn compress_image(
    rgba: &[u8],
    width: u32,
    height: u32,
    blocks: &mut [u8],
    flags: Flags,
) -> Result<()> {
    let flags = flags.fix();
    let format = flags.format();
    check_len("pixel", rgba.len(), rgba_byte_size(width, height)?)?;
    check_len("block", blocks.len(), format.blocks_byte_size(width, height)?)?;

    if width == 0 || height == 0 {
        return Ok(());
    }

    let width = width as usize;
    let height = height as usize;
    let block_width = width.div_ceil(BLOCK_DIM);

    log::debug!(
        "compressing {}x{} image into {} {} blocks",
        width,
        height,
        block_width * height.div_ceil(BLOCK_DIM),
        format
    );

    blocks
        .par_chunks_mut(format.block_byte_size())
        .enumerate()
        .for_each(|(index, block)| {
            let x = (index % block_width) * BLOCK_DIM;
            let y = (index / block_width) * BLOCK_DIM;
            let (tile, mask) = load_tile(rgba, width, height, x, y);
            compress_into(&tile, mask, block, flags);
        });

    Ok(())
}

/// Gathers the in-bounds pixels of the tile at `(x, y)`.
///
/// Returns the tile in raster order and the mask of pixels that were read;
/// lanes outside the image stay zero and are never touched in `rgba`.
fn load_tile(
    rgba: &[u8],
    width: usize,
    height: usize,
    x: usize,
    y: usize,
) -> ([u8; BLOCK_RGBA_BYTES], u16) {
    let mut tile = [0u8; BLOCK_RGBA_BYTES];
    let mut mask = 0u16;

    let columns = (width - x).min(BLOCK_DIM);
    let rows = (height - y).min(BLOCK_DIM);
    for py in 0..rows {
        let src = ((y + py) * width + x) * 4;
        let dst = py * BLOCK_DIM * 4;
        tile[dst..dst + columns * 4].copy_from_slice(&rgba[src..src + columns * 4]);
        for px in 0..columns {
            mask |= 1 << (py * BLOCK_DIM + px);
        }
    }

    (tile, mask)
}
