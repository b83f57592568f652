//! Per-block driver: flag normalisation, fit dispatch and sub-block layout.
//!
//! DXT3 and DXT5 blocks carry the alpha sub-block in bytes 0..8 and the colour
//! sub-block in bytes 8..16; DXT1 blocks are the 8-byte colour sub-block alone.

use crate::dxt::alpha::{compress_alpha_dxt3, compress_alpha_dxt5};
use crate::dxt::decode::decode_block;
use crate::dxt::fit::{ClusterFit, ColourFit, RangeFit, SingleColourFit};
use crate::dxt::{ColourFitKind, ColourSet, Flags, Format};
use crate::error::{Result, check_len};

/// Compresses a full 4×4 block of RGBA pixels.
///
/// `block` must be exactly the block size of the format selected by `flags`
/// (8 bytes for DXT1, 16 otherwise).
pub fn compress(rgba: &[u8; 64], block: &mut [u8], flags: Flags) -> Result<()> {
    compress_masked(rgba, 0xffff, block, flags)
}

/// Compresses a 4×4 block, fitting only the pixels whose bit is set in `mask`.
///
/// Bit `i` of the mask stands for pixel `i` in raster order. Masked-out
/// pixels do not influence the fit and decode to arbitrary values.
pub fn compress_masked(rgba: &[u8; 64], mask: u16, block: &mut [u8], flags: Flags) -> Result<()> {
    let flags = flags.fix();
    check_len("block", block.len(), flags.format().block_byte_size())?;
    compress_into(rgba, mask, block, flags);
    Ok(())
}

/// Decompresses one block into 16 RGBA pixels.
pub fn decompress(rgba: &mut [u8; 64], block: &[u8], flags: Flags) -> Result<()> {
    let flags = flags.fix();
    check_len("block", block.len(), flags.format().block_byte_size())?;
    decode_block(flags.format(), block, rgba);
    Ok(())
}

/// Writes one block; `flags` must be normalised and `block` correctly sized.
pub(crate) fn compress_into(rgba: &[u8; 64], mask: u16, block: &mut [u8], flags: Flags) {
    let Some((alpha_block, colour_block)) = block.split_last_chunk_mut::<8>() else {
        return;
    };

    let colours = ColourSet::new(rgba, mask, flags);
    let coded = if colours.count() == 1 {
        SingleColourFit::new(&colours, flags).compress()
    } else if flags.fit() == ColourFitKind::Range || colours.count() == 0 {
        RangeFit::new(&colours, flags).compress()
    } else {
        ClusterFit::new(&colours, flags).compress()
    };
    *colour_block = coded;

    match flags.format() {
        Format::Dxt1 => {}
        Format::Dxt3 => alpha_block.copy_from_slice(&compress_alpha_dxt3(rgba, mask)),
        Format::Dxt5 => alpha_block.copy_from_slice(&compress_alpha_dxt5(rgba, mask)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DxtError;
    use rstest::rstest;

    fn uniform(colour: [u8; 4]) -> [u8; 64] {
        let mut rgba = [0u8; 64];
        for pixel in rgba.chunks_exact_mut(4) {
            pixel.copy_from_slice(&colour);
        }
        rgba
    }

    #[test]
    fn test_uniform_block_round_trip() {
        let rgba = uniform([128, 64, 200, 255]);
        let mut block = [0u8; 8];
        compress(&rgba, &mut block, Flags::DXT1 | Flags::COLOUR_CLUSTER_FIT).unwrap();

        let mut decoded = [0u8; 64];
        decompress(&mut decoded, &block, Flags::DXT1).unwrap();
        for pixel in decoded.chunks_exact(4) {
            assert!((pixel[0] as i32 - 128).abs() <= 8);
            assert!((pixel[1] as i32 - 64).abs() <= 4);
            assert!((pixel[2] as i32 - 200).abs() <= 8);
            assert_eq!(pixel[3], 255);
        }
    }

    #[rstest]
    #[case(Flags::DXT1, 8)]
    #[case(Flags::DXT3, 16)]
    #[case(Flags::DXT5, 16)]
    fn test_block_length_is_checked(#[case] flags: Flags, #[case] size: usize) {
        let rgba = uniform([1, 2, 3, 4]);
        let mut short = vec![0u8; size - 1];
        assert_eq!(
            compress(&rgba, &mut short, flags),
            Err(DxtError::SizeMismatch {
                what: "block",
                expected: size,
                actual: size - 1
            })
        );

        let mut decoded = [0u8; 64];
        assert!(decompress(&mut decoded, &vec![0u8; size + 1], flags).is_err());

        let mut block = vec![0u8; size];
        assert!(compress(&rgba, &mut block, flags).is_ok());
        assert!(decompress(&mut decoded, &block, flags).is_ok());
    }

    #[test]
    fn test_alpha_sub_block_comes_first() {
        let rgba = uniform([0, 0, 0, 255]);
        let mut block = [0u8; 16];
        compress(&rgba, &mut block, Flags::DXT3).unwrap();
        assert_eq!(&block[..8], &[0xff; 8]);
        assert_eq!(&block[8..12], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_dxt1_decodes_opaque_and_alpha_formats_keep_alpha() {
        let rgba = uniform([10, 200, 30, 17]);
        let mut decoded = [0u8; 64];

        let mut block = [0u8; 8];
        compress(&rgba, &mut block, Flags::DXT1).unwrap();
        decompress(&mut decoded, &block, Flags::DXT1).unwrap();
        assert!(decoded.chunks_exact(4).all(|pixel| pixel[3] == 255));

        let mut block = [0u8; 16];
        compress(&rgba, &mut block, Flags::DXT3).unwrap();
        decompress(&mut decoded, &block, Flags::DXT3).unwrap();
        assert!(decoded.chunks_exact(4).all(|pixel| pixel[3] == 17));

        compress(&rgba, &mut block, Flags::DXT5).unwrap();
        decompress(&mut decoded, &block, Flags::DXT5).unwrap();
        assert!(decoded.chunks_exact(4).all(|pixel| pixel[3] == 17));
    }

    #[test]
    fn test_fully_masked_block_is_total() {
        let rgba = uniform([90, 90, 90, 90]);
        let mut block = [0xaau8; 16];
        compress_masked(&rgba, 0, &mut block, Flags::DXT5).unwrap();
        assert_eq!(&block[10..12], &[0, 0]);
    }

    #[test]
    fn test_range_fit_flag_is_honoured() {
        let mut rgba = uniform([255, 0, 0, 255]);
        for pixel in rgba.chunks_exact_mut(4).skip(8) {
            pixel.copy_from_slice(&[0, 0, 255, 255]);
        }

        for flags in [Flags::COLOUR_RANGE_FIT, Flags::COLOUR_CLUSTER_FIT] {
            let mut block = [0u8; 8];
            compress(&rgba, &mut block, flags).unwrap();
            let mut decoded = [0u8; 64];
            decompress(&mut decoded, &block, flags).unwrap();
            assert_eq!(decoded, rgba);
        }
    }
}
