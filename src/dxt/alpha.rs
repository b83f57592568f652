//! Alpha sub-blocks (8 bytes each).
//!
//! DXT3 stores sixteen explicit 4-bit samples: pixel `2i` in the low nibble
//! of byte `i`, pixel `2i + 1` in the high nibble.
//!
//! DXT5 stores two 8-bit endpoints in bytes 0 and 1 followed by sixteen 3-bit
//! indices packed LSB-first as two little-endian 24-bit groups of eight.
//! When `alpha0 > alpha1` the codebook is the endpoints plus six interpolants;
//! otherwise it is the endpoints plus four interpolants, 0 and 255.

#[inline]
fn is_visible(mask: u16, pixel: usize) -> bool {
    mask & (1 << pixel) != 0
}

#[inline]
fn alpha_of(rgba: &[u8; 64], pixel: usize) -> u8 {
    rgba[4 * pixel + 3]
}

/// Quantises every visible alpha to 4 bits; masked pixels store zero.
pub fn compress_alpha_dxt3(rgba: &[u8; 64], mask: u16) -> [u8; 8] {
    let mut block = [0u8; 8];
    for (i, byte) in block.iter_mut().enumerate() {
        let mut quant = [0u8; 2];
        for (half, q) in quant.iter_mut().enumerate() {
            let pixel = 2 * i + half;
            if is_visible(mask, pixel) {
                let alpha = alpha_of(rgba, pixel) as f32 * (15.0 / 255.0);
                *q = ((alpha + 0.5) as u8).min(15);
            }
        }
        *byte = quant[0] | (quant[1] << 4);
    }
    block
}

pub fn decompress_alpha_dxt3(rgba: &mut [u8; 64], block: &[u8; 8]) {
    for (i, &quant) in block.iter().enumerate() {
        let lo = quant & 0x0f;
        let hi = quant >> 4;
        rgba[4 * (2 * i) + 3] = lo | (lo << 4);
        rgba[4 * (2 * i + 1) + 3] = hi | (hi << 4);
    }
}

/// Widens `[min, max]` so that it spans at least `steps`.
fn fix_range(min: &mut i32, max: &mut i32, steps: i32) {
    if *max - *min < steps {
        *max = (*min + steps).min(255);
    }
    if *max - *min < steps {
        *min = (*max - steps).max(0);
    }
}

/// Codebook for the 5-interpolant mode: endpoints, 4 interpolants, 0, 255.
fn codebook5(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let (a0, a1) = (alpha0 as u32, alpha1 as u32);
    let mut codes = [alpha0, alpha1, 0, 0, 0, 0, 0, 255];
    for i in 1..5 {
        codes[1 + i as usize] = (((5 - i) * a0 + i * a1) / 5) as u8;
    }
    codes
}

/// Codebook for the 7-interpolant mode: endpoints and 6 interpolants.
fn codebook7(alpha0: u8, alpha1: u8) -> [u8; 8] {
    let (a0, a1) = (alpha0 as u32, alpha1 as u32);
    let mut codes = [alpha0, alpha1, 0, 0, 0, 0, 0, 0];
    for i in 1..7 {
        codes[1 + i as usize] = (((7 - i) * a0 + i * a1) / 7) as u8;
    }
    codes
}

/// Picks the nearest code per visible pixel and returns the squared error.
fn fit_codes(rgba: &[u8; 64], mask: u16, codes: &[u8; 8], indices: &mut [u8; 16]) -> u32 {
    let mut err = 0;
    for (pixel, index) in indices.iter_mut().enumerate() {
        if !is_visible(mask, pixel) {
            *index = 0;
            continue;
        }

        let value = alpha_of(rgba, pixel) as i32;
        let mut least = u32::MAX;
        for (j, &code) in codes.iter().enumerate() {
            let dist = (value - code as i32).unsigned_abs().pow(2);
            if dist < least {
                least = dist;
                *index = j as u8;
            }
        }
        err += least;
    }
    err
}

/// Packs sixteen 3-bit indices into 6 bytes.
pub fn pack_alpha_indices(indices: &[u8; 16]) -> [u8; 6] {
    let mut packed = [0u8; 6];
    for (group, dest) in indices.chunks_exact(8).zip(packed.chunks_exact_mut(3)) {
        let value = group
            .iter()
            .enumerate()
            .fold(0u32, |acc, (j, &index)| acc | (((index & 7) as u32) << (3 * j)));
        dest.copy_from_slice(&value.to_le_bytes()[..3]);
    }
    packed
}

pub fn unpack_alpha_indices(packed: &[u8; 6]) -> [u8; 16] {
    let mut indices = [0u8; 16];
    for (group, src) in indices.chunks_exact_mut(8).zip(packed.chunks_exact(3)) {
        let value = u32::from_le_bytes([src[0], src[1], src[2], 0]);
        for (j, index) in group.iter_mut().enumerate() {
            *index = ((value >> (3 * j)) & 7) as u8;
        }
    }
    indices
}

fn write_alpha_block(alpha0: u8, alpha1: u8, indices: &[u8; 16]) -> [u8; 8] {
    let mut block = [0u8; 8];
    block[0] = alpha0;
    block[1] = alpha1;
    block[2..8].copy_from_slice(&pack_alpha_indices(indices));
    block
}

/// Writes a 5-interpolant block, keeping `alpha0 <= alpha1`.
fn write_alpha_block5(alpha0: u8, alpha1: u8, indices: &[u8; 16]) -> [u8; 8] {
    if alpha0 > alpha1 {
        let swapped = (*indices).map(|index| match index {
            0 => 1,
            1 => 0,
            2..=5 => 7 - index,
            _ => index,
        });
        write_alpha_block(alpha1, alpha0, &swapped)
    } else {
        write_alpha_block(alpha0, alpha1, indices)
    }
}

/// Writes a 7-interpolant block, keeping `alpha0 > alpha1`.
fn write_alpha_block7(alpha0: u8, alpha1: u8, indices: &[u8; 16]) -> [u8; 8] {
    if alpha0 < alpha1 {
        let swapped = (*indices).map(|index| match index {
            0 => 1,
            1 => 0,
            _ => 9 - index,
        });
        write_alpha_block(alpha1, alpha0, &swapped)
    } else {
        write_alpha_block(alpha0, alpha1, indices)
    }
}

/// Fits both DXT5 codebooks to the visible alphas and keeps the better one.
pub fn compress_alpha_dxt5(rgba: &[u8; 64], mask: u16) -> [u8; 8] {
    let mut min5 = 255i32;
    let mut max5 = 0i32;
    let mut min7 = 255i32;
    let mut max7 = 0i32;

    for pixel in (0..16).filter(|&pixel| is_visible(mask, pixel)) {
        let value = alpha_of(rgba, pixel) as i32;

        min7 = min7.min(value);
        max7 = max7.max(value);
        if value != 0 {
            min5 = min5.min(value);
        }
        if value != 255 {
            max5 = max5.max(value);
        }
    }

    if min5 > max5 {
        min5 = max5;
    }
    if min7 > max7 {
        min7 = max7;
    }

    fix_range(&mut min5, &mut max5, 5);
    fix_range(&mut min7, &mut max7, 7);

    let codes5 = codebook5(min5 as u8, max5 as u8);
    let codes7 = codebook7(min7 as u8, max7 as u8);

    let mut indices5 = [0u8; 16];
    let mut indices7 = [0u8; 16];
    let err5 = fit_codes(rgba, mask, &codes5, &mut indices5);
    let err7 = fit_codes(rgba, mask, &codes7, &mut indices7);

    if err5 <= err7 {
        write_alpha_block5(min5 as u8, max5 as u8, &indices5)
    } else {
        write_alpha_block7(min7 as u8, max7 as u8, &indices7)
    }
}

/// The codebook a decoder derives from the two endpoint bytes.
pub fn alpha_codebook(alpha0: u8, alpha1: u8) -> [u8; 8] {
    if alpha0 <= alpha1 {
        codebook5(alpha0, alpha1)
    } else {
        codebook7(alpha0, alpha1)
    }
}

pub fn decompress_alpha_dxt5(rgba: &mut [u8; 64], block: &[u8; 8]) {
    let codes = alpha_codebook(block[0], block[1]);
    let indices = unpack_alpha_indices(&[block[2], block[3], block[4], block[5], block[6], block[7]]);

    for (pixel, &index) in indices.iter().enumerate() {
        rgba[4 * pixel + 3] = codes[index as usize];
    }
}
