//! DXT colour sub-block (8 bytes):
//!
//! - bytes 0..2: endpoint 0, RGB565 little-endian
//! - bytes 2..4: endpoint 1, RGB565 little-endian
//! - bytes 4..8: 16 2-bit indices, byte `4 + row`, pixel `x` at bits `2x..2x+2`
//!
//! In 4-colour mode (endpoint 0 > endpoint 1, or any non-DXT1 block) the
//! palette is:
//! - 0: endpoint 0
//! - 1: endpoint 1
//! - 2: (2*endpoint0 + endpoint1) / 3
//! - 3: (endpoint0 + 2*endpoint1) / 3
//!
//! DXT1 blocks with endpoint 0 <= endpoint 1 use 3-colour mode: entry 2 is
//! the midpoint and entry 3 is transparent black.

use glam::Vec3;

/// Quantises a colour on the 0–255 scale to a 565 word.
///
/// Red occupies bits 11..16, green bits 5..11 and blue bits 0..5.
pub fn pack_565(colour: Vec3) -> u16 {
    let r = quantise(colour.x, 31);
    let g = quantise(colour.y, 63);
    let b = quantise(colour.z, 31);
    (r << 11) | (g << 5) | b
}

#[inline]
fn quantise(value: f32, limit: u16) -> u16 {
    let scaled = value / 255.0 * limit as f32 + 0.5;
    (scaled.max(0.0) as u16).min(limit)
}

/// Expands a 565 word to 8 bits per channel by bit replication.
pub fn unpack_565(word: u16) -> [u8; 3] {
    let r = ((word >> 11) & 0x1f) as u8;
    let g = ((word >> 5) & 0x3f) as u8;
    let b = (word & 0x1f) as u8;
    [expand_5(r), expand_6(g), expand_5(b)]
}

#[inline]
pub const fn expand_5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

#[inline]
pub const fn expand_6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

/// Packs 16 2-bit indices, four per byte, row by row.
pub fn pack_indices(indices: &[u8; 16]) -> [u8; 4] {
    let mut packed = [0u8; 4];
    for (byte, row) in packed.iter_mut().zip(indices.chunks_exact(4)) {
        *byte = (row[0] & 3) | ((row[1] & 3) << 2) | ((row[2] & 3) << 4) | ((row[3] & 3) << 6);
    }
    packed
}

pub fn unpack_indices(packed: [u8; 4]) -> [u8; 16] {
    let mut indices = [0u8; 16];
    for (row, byte) in indices.chunks_exact_mut(4).zip(packed) {
        for (x, index) in row.iter_mut().enumerate() {
            *index = (byte >> (2 * x)) & 3;
        }
    }
    indices
}

/// Decoded RGBA palette for a pair of endpoint words.
pub fn palette(a: u16, b: u16, is_dxt1: bool) -> [[u8; 4]; 4] {
    let c = unpack_565(a);
    let d = unpack_565(b);
    let three_colour = is_dxt1 && a <= b;

    let mut codes = [[0u8, 0, 0, 255]; 4];
    for channel in 0..3 {
        let (c, d) = (c[channel] as u16, d[channel] as u16);
        codes[0][channel] = c as u8;
        codes[1][channel] = d as u8;
        if three_colour {
            codes[2][channel] = ((c + d) / 2) as u8;
            codes[3][channel] = 0;
        } else {
            codes[2][channel] = ((2 * c + d) / 3) as u8;
            codes[3][channel] = ((c + 2 * d) / 3) as u8;
        }
    }
    if three_colour {
        codes[3][3] = 0;
    }

    codes
}

/// Writes a 4-colour block.
///
/// The endpoints are ordered so that the block decodes in 4-colour mode: when
/// `a < b` they are swapped and the indices remapped, when `a == b` every
/// index is zeroed.
pub fn write_colour_block4(a: u16, b: u16, indices: &[u8; 16]) -> [u8; 8] {
    let (a, b, remapped) = if a < b {
        (b, a, (*indices).map(|index| (index ^ 1) & 3))
    } else if a == b {
        (a, b, [0u8; 16])
    } else {
        (a, b, *indices)
    };

    let mut block = [0u8; 8];
    block[0..2].copy_from_slice(&a.to_le_bytes());
    block[2..4].copy_from_slice(&b.to_le_bytes());
    block[4..8].copy_from_slice(&pack_indices(&remapped));
    block
}

/// Decodes a colour sub-block into 16 RGBA pixels.
pub fn decompress_colour(rgba: &mut [u8; 64], block: &[u8; 8], is_dxt1: bool) {
    let a = u16::from_le_bytes([block[0], block[1]]);
    let b = u16::from_le_bytes([block[2], block[3]]);
    let codes = palette(a, b, is_dxt1);
    let indices = unpack_indices([block[4], block[5], block[6], block[7]]);

    for (pixel, &index) in rgba.chunks_exact_mut(4).zip(indices.iter()) {
        pixel.copy_from_slice(&codes[index as usize]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_565_primaries() {
        assert_eq!(pack_565(Vec3::new(255.0, 0.0, 0.0)), 0xF800);
        assert_eq!(pack_565(Vec3::new(0.0, 255.0, 0.0)), 0x07E0);
        assert_eq!(pack_565(Vec3::new(0.0, 0.0, 255.0)), 0x001F);
        assert_eq!(pack_565(Vec3::splat(255.0)), 0xFFFF);
        assert_eq!(pack_565(Vec3::splat(-20.0)), 0x0000);
        assert_eq!(pack_565(Vec3::splat(300.0)), 0xFFFF);
    }

    #[test]
    fn test_unpack_565_replicates_bits() {
        assert_eq!(unpack_565(0xFFFF), [255, 255, 255]);
        assert_eq!(unpack_565(0x0000), [0, 0, 0]);
        assert_eq!(unpack_565(0b10000_100000_10000), [132, 130, 132]);
    }

    #[test]
    fn test_565_round_trip_for_every_word() {
        for word in 0..=u16::MAX {
            let [r, g, b] = unpack_565(word);
            assert_eq!(pack_565(Vec3::new(r as f32, g as f32, b as f32)), word);
        }
    }

    #[test]
    fn test_index_packing_layout() {
        let mut indices = [0u8; 16];
        indices[1] = 3;
        indices[4] = 2;
        indices[15] = 1;
        let packed = pack_indices(&indices);
        assert_eq!(packed, [0b0000_1100, 0b0000_0010, 0, 0b0100_0000]);
        assert_eq!(unpack_indices(packed), indices);
    }

    #[test]
    fn test_write_swaps_when_first_endpoint_is_smaller() {
        let indices = [0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3];
        let block = write_colour_block4(0x0000, 0xFFFF, &indices);
        assert_eq!(u16::from_le_bytes([block[0], block[1]]), 0xFFFF);
        assert_eq!(u16::from_le_bytes([block[2], block[3]]), 0x0000);
        assert_eq!(
            unpack_indices([block[4], block[5], block[6], block[7]]),
            [1, 0, 3, 2, 1, 0, 3, 2, 1, 0, 3, 2, 1, 0, 3, 2]
        );

        let mut decoded = [0u8; 64];
        decompress_colour(&mut decoded, &block, true);
        assert_eq!(&decoded[0..4], &[0, 0, 0, 255]);
        assert_eq!(&decoded[4..8], &[255, 255, 255, 255]);
        assert_eq!(&decoded[8..12], &[85, 85, 85, 255]);
        assert_eq!(&decoded[12..16], &[170, 170, 170, 255]);
    }

    #[test]
    fn test_write_equal_endpoints_zeroes_indices() {
        let block = write_colour_block4(0x1234, 0x1234, &[2; 16]);
        assert_eq!(&block[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_dxt1_three_colour_mode() {
        let mut block = [0u8; 8];
        block[0..2].copy_from_slice(&0x0000u16.to_le_bytes());
        block[2..4].copy_from_slice(&0xFFFFu16.to_le_bytes());
        block[4..8].copy_from_slice(&pack_indices(&[2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0, 1]));

        let mut decoded = [0u8; 64];
        decompress_colour(&mut decoded, &block, true);
        assert_eq!(&decoded[0..4], &[127, 127, 127, 255]);
        assert_eq!(&decoded[4..8], &[0, 0, 0, 0]);

        decompress_colour(&mut decoded, &block, false);
        assert_eq!(&decoded[0..4], &[85, 85, 85, 255]);
        assert_eq!(&decoded[4..8], &[170, 170, 170, 255]);
    }
}
