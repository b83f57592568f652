//! C ABI exports.
//!
//! Buffer lengths are never passed in; they follow from the dimensions and
//! the format selected by the flags, exactly as the safe API would demand.
//! Status-returning functions yield [`SQUISH_OK`] or one of the negative codes
//! below.

use std::ffi::c_int;
use std::slice;

use crate::dxt::{self, BLOCK_RGBA_BYTES, Flags};
use crate::error::DxtError;

pub const SQUISH_OK: c_int = 0;
/// A required pointer was null.
pub const SQUISH_NULL_POINTER: c_int = -1;
/// The image is too large for its storage size to be addressed.
pub const SQUISH_OVERFLOW: c_int = -2;
/// A derived buffer length disagreed with the dimensions.
pub const SQUISH_SIZE_MISMATCH: c_int = -3;
/// A width or height was negative.
pub const SQUISH_INVALID_DIMENSIONS: c_int = -4;

fn flags_from(flags: c_int) -> Flags {
    bytemuck::cast(flags as u32)
}

fn status(result: crate::Result<()>) -> c_int {
    match result {
        Ok(()) => SQUISH_OK,
        Err(DxtError::Overflow { .. }) => SQUISH_OVERFLOW,
        Err(DxtError::SizeMismatch { .. }) => SQUISH_SIZE_MISMATCH,
    }
}

fn dimensions(width: c_int, height: c_int) -> Option<(u32, u32)> {
    Some((u32::try_from(width).ok()?, u32::try_from(height).ok()?))
}

/// Normalises a flag mask.
#[unsafe(no_mangle)]
pub extern "C" fn squish_fix_flags(flags: c_int) -> c_int {
    dxt::fix_flags(flags_from(flags)).bits() as c_int
}

/// Compresses 16 RGBA pixels into one block.
///
/// # Safety
/// - `rgba` must point to 64 readable bytes
/// - `block` must point to 8 (DXT1) or 16 (DXT3, DXT5) writable bytes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn squish_compress(rgba: *const u8, block: *mut u8, flags: c_int) -> c_int {
    unsafe { squish_compress_masked(rgba, 0xffff, block, flags) }
}

/// Compresses the pixels of one block selected by the low 16 bits of `mask`.
///
/// # Safety
/// Same requirements as [`squish_compress`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn squish_compress_masked(
    rgba: *const u8,
    mask: c_int,
    block: *mut u8,
    flags: c_int,
) -> c_int {
    if rgba.is_null() || block.is_null() {
        return SQUISH_NULL_POINTER;
    }

    let flags = flags_from(flags);
    let rgba = unsafe { &*(rgba as *const [u8; BLOCK_RGBA_BYTES]) };
    let block = unsafe { slice::from_raw_parts_mut(block, flags.format().block_byte_size()) };

    status(dxt::compress_masked(rgba, mask as u16, block, flags))
}

/// Decompresses one block into 16 RGBA pixels.
///
/// # Safety
/// - `rgba` must point to 64 writable bytes
/// - `block` must point to 8 (DXT1) or 16 (DXT3, DXT5) readable bytes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn squish_decompress(rgba: *mut u8, block: *const u8, flags: c_int) -> c_int {
    if rgba.is_null() || block.is_null() {
        return SQUISH_NULL_POINTER;
    }

    let flags = flags_from(flags);
    let rgba = unsafe { &mut *(rgba as *mut [u8; BLOCK_RGBA_BYTES]) };
    let block = unsafe { slice::from_raw_parts(block, flags.format().block_byte_size()) };

    status(dxt::decompress(rgba, block, flags))
}

/// Bytes needed for the compressed image, or -1 when the size cannot be
/// represented.
#[unsafe(no_mangle)]
pub extern "C" fn squish_get_storage_requirements(
    width: c_int,
    height: c_int,
    flags: c_int,
) -> c_int {
    let flags = flags_from(flags);
    dimensions(width, height)
        .and_then(|(width, height)| dxt::storage_requirements(width, height, flags).ok())
        .and_then(|size| c_int::try_from(size).ok())
        .unwrap_or(-1)
}

/// Compresses a `width`×`height` RGBA8 image.
///
/// # Safety
/// - `rgba` must point to `width * height * 4` readable bytes
/// - `blocks` must point to `squish_get_storage_requirements(width, height, flags)`
///   writable bytes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn squish_compress_image(
    rgba: *const u8,
    width: c_int,
    height: c_int,
    blocks: *mut u8,
    flags: c_int,
) -> c_int {
    if rgba.is_null() || blocks.is_null() {
        return SQUISH_NULL_POINTER;
    }
    let Some((width, height)) = dimensions(width, height) else {
        return SQUISH_INVALID_DIMENSIONS;
    };

    let flags = flags_from(flags);
    let (rgba_len, blocks_len) = match image_lengths(width, height, flags) {
        Ok(lengths) => lengths,
        Err(err) => return status(Err(err)),
    };

    let rgba = unsafe { slice::from_raw_parts(rgba, rgba_len) };
    let blocks = unsafe { slice::from_raw_parts_mut(blocks, blocks_len) };

    status(dxt::compress_image(rgba, width, height, blocks, flags))
}

/// Decompresses a `width`×`height` image of blocks into RGBA8 pixels.
///
/// # Safety
/// - `rgba` must point to `width * height * 4` writable bytes
/// - `blocks` must point to `squish_get_storage_requirements(width, height, flags)`
///   readable bytes
#[unsafe(no_mangle)]
pub unsafe extern "C" fn squish_decompress_image(
    rgba: *mut u8,
    width: c_int,
    height: c_int,
    blocks: *const u8,
    flags: c_int,
) -> c_int {
    if rgba.is_null() || blocks.is_null() {
        return SQUISH_NULL_POINTER;
    }
    let Some((width, height)) = dimensions(width, height) else {
        return SQUISH_INVALID_DIMENSIONS;
    };

    let flags = flags_from(flags);
    let (rgba_len, blocks_len) = match image_lengths(width, height, flags) {
        Ok(lengths) => lengths,
        Err(err) => return status(Err(err)),
    };

    let rgba = unsafe { slice::from_raw_parts_mut(rgba, rgba_len) };
    let blocks = unsafe { slice::from_raw_parts(blocks, blocks_len) };

    status(dxt::decompress_image(rgba, width, height, blocks, flags))
}

fn image_lengths(width: u32, height: u32, flags: Flags) -> crate::Result<(usize, usize)> {
    Ok((
        dxt::rgba_byte_size(width, height)?,
        dxt::storage_requirements(width, height, flags)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ptr;

    #[test]
    fn test_fix_flags() {
        assert_eq!(squish_fix_flags(0), 0x29);
        assert_eq!(squish_fix_flags(0x104), 0x2c);
        assert_eq!(squish_fix_flags(squish_fix_flags(0x1ff)), squish_fix_flags(0x1ff));
    }

    #[test]
    fn test_storage_requirements() {
        assert_eq!(squish_get_storage_requirements(16, 32, 1), 256);
        assert_eq!(squish_get_storage_requirements(15, 30, 4), 512);
        assert_eq!(squish_get_storage_requirements(-1, 4, 1), -1);
        assert_eq!(squish_get_storage_requirements(c_int::MAX, c_int::MAX, 4), -1);
    }

    #[test]
    fn test_null_pointers_are_rejected() {
        let mut block = [0u8; 16];
        let mut rgba = [0u8; 64];
        unsafe {
            assert_eq!(squish_compress(ptr::null(), block.as_mut_ptr(), 4), SQUISH_NULL_POINTER);
            assert_eq!(squish_decompress(rgba.as_mut_ptr(), ptr::null(), 4), SQUISH_NULL_POINTER);
            assert_eq!(
                squish_compress_image(ptr::null(), 4, 4, block.as_mut_ptr(), 4),
                SQUISH_NULL_POINTER
            );
            assert_eq!(
                squish_decompress_image(rgba.as_mut_ptr(), -4, 4, block.as_ptr(), 4),
                SQUISH_INVALID_DIMENSIONS
            );
        }
    }

    #[test]
    fn test_block_round_trip_matches_safe_api() {
        let rgba: [u8; 64] = std::array::from_fn(|i| (i * 7) as u8);
        let flags = (Flags::DXT5 | Flags::COLOUR_RANGE_FIT).bits() as c_int;

        let mut block = [0u8; 16];
        let mut expected = [0u8; 16];
        unsafe {
            assert_eq!(squish_compress(rgba.as_ptr(), block.as_mut_ptr(), flags), SQUISH_OK);
        }
        dxt::compress(&rgba, &mut expected, flags_from(flags)).unwrap();
        assert_eq!(block, expected);

        let mut decoded = [0u8; 64];
        let mut expected_pixels = [0u8; 64];
        unsafe {
            assert_eq!(squish_decompress(decoded.as_mut_ptr(), block.as_ptr(), flags), SQUISH_OK);
        }
        dxt::decompress(&mut expected_pixels, &block, flags_from(flags)).unwrap();
        assert_eq!(decoded, expected_pixels);
    }

    #[test]
    fn test_image_round_trip() {
        let (width, height) = (5, 3);
        let rgba: Vec<u8> = (0..width * height * 4).map(|v| (v * 3) as u8).collect();
        let size = squish_get_storage_requirements(width, height, 1) as usize;
        let mut blocks = vec![0u8; size];
        let mut decoded = vec![0u8; rgba.len()];

        unsafe {
            assert_eq!(
                squish_compress_image(rgba.as_ptr(), width, height, blocks.as_mut_ptr(), 1),
                SQUISH_OK
            );
            assert_eq!(
                squish_decompress_image(decoded.as_mut_ptr(), width, height, blocks.as_ptr(), 1),
                SQUISH_OK
            );
        }

        let mut expected = vec![0u8; rgba.len()];
        dxt::decompress_image(&mut expected, 5, 3, &blocks, Flags::DXT1).unwrap();
        assert_eq!(decoded, expected);
    }
}
