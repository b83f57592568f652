use rayon::prelude::*;

use crate::dxt::alpha::{decompress_alpha_dxt3, decompress_alpha_dxt5};
use crate::dxt::colour_block::decompress_colour;
use crate::dxt::{BLOCK_DIM, Flags, Format, rgba_byte_size};
use crate::error::{Result, check_len};

trait BlockRgba8Decoder {
    const FORMAT: Format;

    fn decode_block_rgba8(compressed: &[u8], decompressed: &mut [u8; 64]);
}

struct Dxt1Decoder;

impl BlockRgba8Decoder for Dxt1Decoder {
    const FORMAT: Format = Format::Dxt1;

    #[inline(always)]
    fn decode_block_rgba8(compressed: &[u8], decompressed: &mut [u8; 64]) {
        if let Some(colour) = compressed.first_chunk::<8>() {
            decompress_colour(decompressed, colour, true);
        }
    }
}

struct Dxt3Decoder;

impl BlockRgba8Decoder for Dxt3Decoder {
    const FORMAT: Format = Format::Dxt3;

    #[inline(always)]
    fn decode_block_rgba8(compressed: &[u8], decompressed: &mut [u8; 64]) {
        if let Some((alpha, colour)) = split_alpha_colour(compressed) {
            decompress_colour(decompressed, colour, false);
            decompress_alpha_dxt3(decompressed, alpha);
        }
    }
}

struct Dxt5Decoder;

impl BlockRgba8Decoder for Dxt5Decoder {
    const FORMAT: Format = Format::Dxt5;

    #[inline(always)]
    fn decode_block_rgba8(compressed: &[u8], decompressed: &mut [u8; 64]) {
        if let Some((alpha, colour)) = split_alpha_colour(compressed) {
            decompress_colour(decompressed, colour, false);
            decompress_alpha_dxt5(decompressed, alpha);
        }
    }
}

fn split_alpha_colour(compressed: &[u8]) -> Option<(&[u8; 8], &[u8; 8])> {
    let (alpha, rest) = compressed.split_first_chunk::<8>()?;
    Some((alpha, rest.first_chunk::<8>()?))
}

/// Decodes one block; `compressed` must hold exactly one block of `format`.
pub(crate) fn decode_block(format: Format, compressed: &[u8], decompressed: &mut [u8; 64]) {
    match format {
        Format::Dxt1 => Dxt1Decoder::decode_block_rgba8(compressed, decompressed),
        Format::Dxt3 => Dxt3Decoder::decode_block_rgba8(compressed, decompressed),
        Format::Dxt5 => Dxt5Decoder::decode_block_rgba8(compressed, decompressed),
    }
}

/// Decodes one row of blocks into up to four rows of pixels.
///
/// Only pixels inside the image are written; `rgba_rows` holds exactly the
/// image rows covered by this block row.
fn decode_block_row<D: BlockRgba8Decoder>(blocks_row: &[u8], rgba_rows: &mut [u8], width: usize) {
    let row_pitch = width * 4;
    let rows = rgba_rows.len() / row_pitch;
    let mut tile = [0u8; 64];

    for (bx, compressed) in blocks_row
        .chunks_exact(D::FORMAT.block_byte_size())
        .enumerate()
    {
        D::decode_block_rgba8(compressed, &mut tile);

        let x0 = bx * BLOCK_DIM;
        let columns = (width - x0).min(BLOCK_DIM);
        for py in 0..rows.min(BLOCK_DIM) {
            let dst = py * row_pitch + x0 * 4;
            let src = py * BLOCK_DIM * 4;
            rgba_rows[dst..dst + columns * 4].copy_from_slice(&tile[src..src + columns * 4]);
        }
    }
}

fn decompress_rgba8<D: BlockRgba8Decoder>(
    width: u32,
    height: u32,
    blocks_data: &[u8],
    rgba_data: &mut [u8],
) {
    let width = width as usize;
    let output_row_pitch = width * 4; // Always RGBA
    let blocks_row_pitch = D::FORMAT.bytes_per_row(width as u32);

    rgba_data
        .par_chunks_mut(output_row_pitch * BLOCK_DIM)
        .zip(blocks_data.par_chunks(blocks_row_pitch))
        .for_each(|(rgba_rows, blocks_row)| decode_block_row::<D>(blocks_row, rgba_rows, width));

    log::debug!(
        "decoded {} block rows of {}",
        height.div_ceil(BLOCK_DIM as u32),
        D::FORMAT
    );
}

/// Decompresses a tightly packed block buffer into an RGBA8 image.
///
/// `rgba` must hold exactly `width * height * 4` bytes and `blocks` exactly
/// [`storage_requirements`](crate::dxt::storage_requirements) bytes. Pixels of
/// boundary blocks that fall outside the image are discarded.
pub fn decompress_image(
    rgba: &mut [u8],
    width: u32,
    height: u32,
    blocks: &[u8],
    flags: Flags,
) -> Result<()> {
    let format = flags.format();
    check_len("pixel", rgba.len(), rgba_byte_size(width, height)?)?;
    check_len("block", blocks.len(), format.blocks_byte_size(width, height)?)?;

    if width == 0 || height == 0 {
        return Ok(());
    }

    match format {
        Format::Dxt1 => decompress_rgba8::<Dxt1Decoder>(width, height, blocks, rgba),
        Format::Dxt3 => decompress_rgba8::<Dxt3Decoder>(width, height, blocks, rgba),
        Format::Dxt5 => decompress_rgba8::<Dxt5Decoder>(width, height, blocks, rgba),
    }

    Ok(())
}
