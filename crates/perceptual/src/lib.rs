//! # Average-hash image fingerprints
//!
//! This crate computes the 8x8 average-hash (aHash) fingerprint used to
//! recognize known sponsor banners. It is the lowest layer of the detection
//! pipeline and is deliberately pure: a fingerprint is a function of
//! `(image bytes, region)` with no I/O, no clocks, and no global state.
//!
//! ## Contract
//!
//! - [`average_hash`] decodes the bytes, crops the requested [`Region`],
//!   converts the crop to single-channel grayscale, resamples it to a fixed
//!   8x8 grid, and emits one bit per sample (`1` if the sample is at or
//!   above the mean) in row-major order, most significant bit first.
//! - Region math is deterministic and must match exactly between
//!   signature-creation time and match time, otherwise Hamming distances
//!   between fingerprints are meaningless.
//! - Fingerprints are native `u64` values; hex (16 lowercase chars) is only
//!   a storage/API encoding, never an arithmetic representation.
//!
//! Invariant: hashing the same bytes with the same region twice yields a
//! bit-identical fingerprint.

use image::imageops::{self, FilterType};

mod error;
mod region;

pub use crate::error::PerceptualError;
pub use crate::region::{CropRect, Region};

/// Side length of the resample grid. 8x8 = 64 samples = 64 bits.
const GRID: u32 = 8;

/// Compute the 64-bit average-hash fingerprint of one region of an image.
pub fn average_hash(bytes: &[u8], region: Region) -> Result<u64, PerceptualError> {
    let decoded = image::load_from_memory(bytes)?;
    let rect = region.resolve(decoded.width(), decoded.height())?;

    let crop = decoded.crop_imm(rect.x, rect.y, rect.width, rect.height);
    let gray = crop.to_luma8();
    // Exact 8x8 resample, ignoring aspect ratio: every cell of the grid is
    // one sample regardless of the crop's shape.
    let samples = imageops::resize(&gray, GRID, GRID, FilterType::Triangle);

    let sum: u32 = samples.pixels().map(|p| u32::from(p.0[0])).sum();
    let mean = f64::from(sum) / f64::from(GRID * GRID);

    let mut bits = 0u64;
    for pixel in samples.pixels() {
        bits = (bits << 1) | u64::from(f64::from(pixel.0[0]) >= mean);
    }
    Ok(bits)
}

/// Hamming distance between two fingerprints: popcount of their XOR, 0..=64.
#[inline]
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Render a fingerprint as the 16-character lowercase hex form used in the
/// signature file and API payloads.
pub fn to_hex(hash: u64) -> String {
    format!("{hash:016x}")
}

/// Parse a 16-character hex fingerprint back into a `u64`.
pub fn from_hex(hex: &str) -> Result<u64, PerceptualError> {
    let trimmed = hex.trim();
    if trimmed.len() != 16 {
        return Err(PerceptualError::InvalidHex(hex.to_string()));
    }
    u64::from_str_radix(trimmed, 16).map_err(|_| PerceptualError::InvalidHex(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Luma};

    /// Encode a grayscale gradient image of the given size as PNG bytes.
    fn gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::ImageBuffer::from_fn(width, height, |x, _y| {
            Luma([(x * 255 / width.max(1)) as u8])
        });
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageFormat::Png,
            )
            .unwrap();
        out
    }

    /// A half-black / half-white vertical split.
    fn split_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::ImageBuffer::from_fn(width, height, |x, _y| {
            Luma([if x < width / 2 { 0u8 } else { 255u8 }])
        });
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageFormat::Png,
            )
            .unwrap();
        out
    }

    #[test]
    fn hashing_is_idempotent() {
        let png = gradient_png(64, 32);
        let a = average_hash(&png, Region::Whole).unwrap();
        let b = average_hash(&png, Region::Whole).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn split_image_hashes_to_half_set_bits() {
        // Left half black, right half white: each row resamples to 4 zero
        // bits followed by 4 one bits.
        let png = split_png(80, 40);
        let hash = average_hash(&png, Region::Whole).unwrap();
        assert_eq!(hash.count_ones(), 32);
        assert_eq!(hash, 0x0f0f_0f0f_0f0f_0f0f);
    }

    /// A top-to-bottom gradient, structurally orthogonal to `gradient_png`.
    fn vertical_gradient_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::ImageBuffer::from_fn(width, height, |_x, y| {
            Luma([(y * 255 / height.max(1)) as u8])
        });
        let mut out = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(
                &mut std::io::Cursor::new(&mut out),
                image::ImageFormat::Png,
            )
            .unwrap();
        out
    }

    #[test]
    fn orthogonal_gradients_diverge() {
        let horizontal = average_hash(&gradient_png(64, 32), Region::Whole).unwrap();
        let vertical = average_hash(&vertical_gradient_png(64, 32), Region::Whole).unwrap();
        assert_ne!(horizontal, vertical);
        // Bright-half bits flip axis: rows vs columns.
        assert_eq!(vertical, 0x0000_0000_ffff_ffff);
    }

    #[test]
    fn undecodable_bytes_fail_with_decode_error() {
        let err = average_hash(b"not an image", Region::Whole).unwrap_err();
        assert!(matches!(err, PerceptualError::Decode(_)));
    }

    #[test]
    fn empty_rect_fails_with_empty_region() {
        let png = gradient_png(10, 10);
        let err = average_hash(
            &png,
            Region::Rect {
                x: 50,
                y: 50,
                w: 5,
                h: 5,
            },
        )
        .unwrap_err();
        assert!(matches!(err, PerceptualError::EmptyRegion { .. }));
    }

    #[test]
    fn hamming_identity_symmetry_bounds() {
        let png = gradient_png(64, 32);
        let a = average_hash(&png, Region::Whole).unwrap();
        let b = average_hash(&vertical_gradient_png(64, 32), Region::Whole).unwrap();

        assert_eq!(hamming(a, a), 0);
        assert_eq!(hamming(a, b), hamming(b, a));
        assert!(hamming(a, b) <= 64);
        assert_eq!(hamming(0, u64::MAX), 64);
    }

    #[test]
    fn hex_roundtrip() {
        let hash = 0x0f0f_0f0f_0f0f_0f0fu64;
        let hex = to_hex(hash);
        assert_eq!(hex, "0f0f0f0f0f0f0f0f");
        assert_eq!(from_hex(&hex).unwrap(), hash);
    }

    #[test]
    fn hex_rejects_wrong_length_and_garbage() {
        assert!(from_hex("abc").is_err());
        assert!(from_hex("zzzzzzzzzzzzzzzz").is_err());
        assert!(from_hex("0f0f0f0f0f0f0f0f0f").is_err());
    }
}
