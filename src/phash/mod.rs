//! Perceptual image hashing and the distances defined over it.
//!
//! The hash is the classic DCT construction: grayscale, shrink to 32×32,
//! transform, keep the 8×8 low-frequency block, drop the DC coefficient
//! (overall brightness), and threshold the remaining 63 coefficients
//! against their median. The result is a 63-bit word in a `u64`; the top
//! bit is always zero.
//!
//! Two hashes compare by Hamming distance; two frame-hash sequences by the
//! mean per-frame Hamming distance. Both satisfy the triangle inequality,
//! which is what lets the BK-tree prune its search.

pub mod dct;

use image::imageops::FilterType;
use image::GrayImage;
use std::path::Path;
use thiserror::Error;

/// Number of information bits in a perceptual hash.
pub const PHASH_BITS: usize = 63;

/// Distance reported for an empty frame-hash sequence. Greater than any
/// configured threshold, so such records never join a group.
pub const EMPTY_SEQUENCE_DISTANCE: u32 = u32::MAX;

/// Errors that can occur while computing an image hash.
#[derive(Debug, Error)]
pub enum PhashError {
    /// Failed to open or decode the image.
    #[error("Failed to load image {0}: {1}")]
    Load(String, #[source] image::ImageError),
}

/// Compute the perceptual hash of an image file.
///
/// Decodes via the `image` crate, converting whatever the container holds
/// to 8-bit grayscale first.
pub fn hash_image_file(path: &Path) -> Result<u64, PhashError> {
    let img = image::open(path).map_err(|e| PhashError::Load(path.display().to_string(), e))?;
    Ok(hash_gray_image(&img.to_luma8()))
}

/// Compute the perceptual hash of an already-decoded grayscale image.
#[must_use]
pub fn hash_gray_image(img: &GrayImage) -> u64 {
    let small = image::imageops::resize(img, dct::SIZE as u32, dct::SIZE as u32, FilterType::Triangle);

    let mut block = [0.0f32; dct::SIZE * dct::SIZE];
    for (i, pixel) in small.pixels().enumerate() {
        block[i] = f32::from(pixel.0[0]);
    }

    let freq = dct::forward_2d(&block);

    // Top-left 8x8 block, row-major, minus the DC term.
    let mut coeffs = [0.0f32; PHASH_BITS];
    let mut idx = 0;
    for row in 0..8 {
        for col in 0..8 {
            if row == 0 && col == 0 {
                continue;
            }
            coeffs[idx] = freq[row * dct::SIZE + col];
            idx += 1;
        }
    }

    let median = median_of(&coeffs);

    let mut hash = 0u64;
    for (i, &coeff) in coeffs.iter().enumerate() {
        if coeff > median {
            hash |= 1 << (PHASH_BITS - 1 - i);
        }
    }
    hash
}

/// Median of the 63 coefficients by selection (expected linear time).
fn median_of(coeffs: &[f32; PHASH_BITS]) -> f32 {
    let mut scratch = *coeffs;
    let mid = PHASH_BITS / 2;
    let (_, median, _) = scratch.select_nth_unstable_by(mid, f32::total_cmp);
    *median
}

/// Hamming distance between two hashes.
#[inline]
#[must_use]
pub fn hamming(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Mean per-frame Hamming distance between two frame-hash sequences,
/// rounded to the nearest integer.
///
/// Only the common prefix (`min(len(a), len(b))` frames) is compared; an
/// empty sequence on either side yields [`EMPTY_SEQUENCE_DISTANCE`].
#[must_use]
pub fn mean_frame_distance(a: &[u64], b: &[u64]) -> u32 {
    let frames = a.len().min(b.len());
    if frames == 0 {
        return EMPTY_SEQUENCE_DISTANCE;
    }

    let total: u32 = a.iter().zip(b.iter()).map(|(&x, &y)| hamming(x, y)).sum();
    ((f64::from(total)) / (frames as f64)).round() as u32
}
