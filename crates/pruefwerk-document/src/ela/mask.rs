// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Deviation masks — thresholding an ELA map into candidate tamper pixels and
// cleaning speckle noise out of the result with a morphological opening.

use image::{GrayImage, Luma};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use tracing::{debug, instrument};

use super::engine::ElaMap;

const FOREGROUND: u8 = 255;
const BACKGROUND: u8 = 0;

/// Binary per-pixel map. Every pixel is exactly 0 or 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviationMask(GrayImage);

impl DeviationMask {
    /// Binarise an arbitrary grayscale image (`> 127` is foreground).
    pub fn binarize(gray: &GrayImage) -> Self {
        let (width, height) = gray.dimensions();
        Self(GrayImage::from_fn(width, height, |x, y| {
            binary(gray.get_pixel(x, y).0[0] > 127)
        }))
    }

    /// An all-background mask.
    pub fn empty(width: u32, height: u32) -> Self {
        Self(GrayImage::new(width, height))
    }

    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.0.dimensions()
    }

    pub fn is_foreground(&self, x: u32, y: u32) -> bool {
        self.0.get_pixel(x, y).0[0] == FOREGROUND
    }

    /// Mark a pixel as foreground or background.
    pub fn set(&mut self, x: u32, y: u32, foreground: bool) {
        self.0.put_pixel(x, y, binary(foreground));
    }

    /// Number of foreground pixels.
    pub fn foreground_count(&self) -> u64 {
        self.0.pixels().filter(|p| p.0[0] == FOREGROUND).count() as u64
    }

    /// Fraction of the mask that is foreground (0.0 for an empty mask).
    pub fn coverage(&self) -> f64 {
        let total = u64::from(self.width()) * u64::from(self.height());
        if total == 0 {
            return 0.0;
        }
        self.foreground_count() as f64 / total as f64
    }

    pub fn as_gray(&self) -> &GrayImage {
        &self.0
    }
}

fn binary(foreground: bool) -> Luma<u8> {
    Luma([if foreground { FOREGROUND } else { BACKGROUND }])
}

/// Mark every pixel whose strongest ELA channel exceeds `threshold`.
#[instrument(skip(ela), fields(width = ela.width(), height = ela.height(), threshold))]
pub fn threshold(ela: &ElaMap, threshold: u8) -> DeviationMask {
    let mask = DeviationMask(GrayImage::from_fn(ela.width(), ela.height(), |x, y| {
        binary(ela.level(x, y) > threshold)
    }));
    debug!(coverage = mask.coverage(), "Deviation mask thresholded");
    mask
}

/// Morphological opening: erode then dilate with a disk of `kernel_radius`.
///
/// Foreground blobs smaller than the disk disappear; larger ones come back at
/// roughly their original extent. Pixels beyond the image edge neither block
/// erosion nor feed dilation. A radius of 0 returns the input unchanged.
#[instrument(skip(mask), fields(width = mask.width(), height = mask.height(), kernel_radius))]
pub fn clean(mask: &DeviationMask, kernel_radius: u8) -> DeviationMask {
    let binary = DeviationMask::binarize(mask.as_gray());
    if kernel_radius == 0 {
        return binary;
    }

    let disk = Mask::disk(kernel_radius);
    let eroded = grayscale_erode(binary.as_gray(), &disk);
    let opened = grayscale_dilate(&eroded, &disk);

    let cleaned = DeviationMask::binarize(&opened);
    debug!(
        before = binary.foreground_count(),
        after = cleaned.foreground_count(),
        "Morphological opening applied"
    );
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn block_mask(width: u32, height: u32, x0: u32, y0: u32, size: u32) -> DeviationMask {
        let mut mask = DeviationMask::empty(width, height);
        for y in y0..y0 + size {
            for x in x0..x0 + size {
                mask.set(x, y, true);
            }
        }
        mask
    }

    #[test]
    fn threshold_uses_strongest_channel() {
        let original = RgbImage::from_pixel(3, 1, Rgb([0, 0, 0]));
        let mut shifted = original.clone();
        shifted.put_pixel(0, 0, Rgb([0, 0, 100]));
        shifted.put_pixel(1, 0, Rgb([5, 0, 0]));
        let ela = ElaMap::from_difference(&original, &shifted).unwrap();

        let mask = threshold(&ela, 20);
        assert!(mask.is_foreground(0, 0));
        assert!(!mask.is_foreground(1, 0));
        assert!(!mask.is_foreground(2, 0));
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let original = RgbImage::from_pixel(2, 1, Rgb([0, 0, 0]));
        let mut shifted = original.clone();
        shifted.put_pixel(0, 0, Rgb([255, 0, 0]));
        shifted.put_pixel(1, 0, Rgb([20, 0, 0]));
        let ela = ElaMap::from_difference(&original, &shifted).unwrap();

        let mask = threshold(&ela, 20);
        assert!(mask.is_foreground(0, 0));
        assert!(!mask.is_foreground(1, 0));
    }

    #[test]
    fn masks_only_hold_zero_or_full() {
        let gray = GrayImage::from_fn(16, 1, |x, _| Luma([(x * 16) as u8]));
        let mask = DeviationMask::binarize(&gray);
        assert!(mask.as_gray().pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));
        assert!(!mask.is_foreground(7, 0));
        assert!(mask.is_foreground(8, 0));
    }

    #[test]
    fn opening_removes_speckles_and_keeps_blocks() {
        let mut mask = block_mask(60, 60, 20, 20, 16);
        mask.set(5, 5, true);
        mask.set(50, 8, true);
        mask.set(51, 8, true);

        let cleaned = clean(&mask, 2);
        assert!(!cleaned.is_foreground(5, 5));
        assert!(!cleaned.is_foreground(50, 8));
        assert!(cleaned.is_foreground(28, 28));
        assert!(cleaned.is_foreground(20, 28));
        assert!(cleaned.foreground_count() > 200);
        assert!(cleaned.foreground_count() <= 256);
    }

    #[test]
    fn opening_is_idempotent() {
        let mut mask = block_mask(64, 64, 10, 12, 20);
        for i in 0..10 {
            mask.set(40 + i * 2, 50, true);
        }
        mask.set(3, 60, true);

        let once = clean(&mask, 2);
        let twice = clean(&once, 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn zero_radius_only_binarizes() {
        let mut mask = DeviationMask::empty(10, 10);
        mask.set(4, 4, true);
        assert_eq!(clean(&mask, 0), mask);
    }

    #[test]
    fn empty_mask_stays_empty() {
        let cleaned = clean(&DeviationMask::empty(30, 20), 2);
        assert_eq!(cleaned.foreground_count(), 0);
        assert_eq!(cleaned.coverage(), 0.0);
    }
}
