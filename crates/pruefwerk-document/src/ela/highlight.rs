// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Colour-band highlight detection. Selects pixels inside an HSV window and
// runs them through the same opening and region extraction as the ELA mask.
// Applied to an ELA map, the default window picks out strongly coloured
// error, which is where pasted colour content tends to show.

use image::RgbImage;
use pruefwerk_core::error::Result;
use pruefwerk_core::{HsvBounds, SuspiciousRegion};
use tracing::{debug, instrument};

use super::mask::{DeviationMask, clean};
use super::regions::extract_regions;
use crate::image::processor::ensure_non_empty;

/// Convert 8-bit RGB to HSV with every component on a 0-255 scale.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let [r, g, b] = rgb.map(f32::from);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let value = max;
    if max == min {
        return [0, 0, value as u8];
    }

    let chroma = max - min;
    let saturation = chroma / max;
    let rc = (max - r) / chroma;
    let gc = (max - g) / chroma;
    let bc = (max - b) / chroma;
    let sector = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    let hue = (sector / 6.0).rem_euclid(1.0);

    [
        (hue * 255.0).round().min(255.0) as u8,
        (saturation * 255.0).round().min(255.0) as u8,
        value as u8,
    ]
}

/// Foreground wherever the pixel's HSV lies inside `bounds`.
pub fn hsv_band_mask(image: &RgbImage, bounds: &HsvBounds) -> DeviationMask {
    let mut mask = DeviationMask::empty(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        if bounds.contains(rgb_to_hsv(pixel.0)) {
            mask.set(x, y, true);
        }
    }
    mask
}

/// Locate and outline areas of `image` whose colour falls inside `bounds`.
#[instrument(skip(image, bounds), fields(width = image.width(), height = image.height()))]
pub fn detect_highlighted_areas(
    image: &RgbImage,
    bounds: &HsvBounds,
    kernel_radius: u8,
    min_area: u32,
) -> Result<(Vec<SuspiciousRegion>, RgbImage)> {
    ensure_non_empty(image)?;
    let mask = hsv_band_mask(image, bounds);
    debug!(coverage = mask.coverage(), "HSV band mask built");
    let cleaned = clean(&mask, kernel_radius);
    extract_regions(image, &cleaned, min_area)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn primaries_convert_to_expected_hues() {
        assert_eq!(rgb_to_hsv([255, 0, 0]), [0, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 255, 0]), [85, 255, 255]);
        assert_eq!(rgb_to_hsv([0, 0, 255]), [170, 255, 255]);
    }

    #[test]
    fn greys_have_no_saturation() {
        assert_eq!(rgb_to_hsv([128, 128, 128]), [0, 0, 128]);
        assert_eq!(rgb_to_hsv([0, 0, 0]), [0, 0, 0]);
    }

    #[test]
    fn coloured_patch_on_grey_is_detected() {
        let mut image = RgbImage::from_pixel(80, 80, Rgb([30, 30, 30]));
        for y in 20..40 {
            for x in 30..50 {
                image.put_pixel(x, y, Rgb([200, 40, 40]));
            }
        }

        let (regions, annotated) =
            detect_highlighted_areas(&image, &HsvBounds::default(), 2, 50).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!((regions[0].x, regions[0].y), (30, 20));
        assert_eq!((regions[0].width, regions[0].height), (20, 20));
        assert_ne!(annotated, image);
    }

    #[test]
    fn flat_grey_yields_nothing() {
        let image = RgbImage::from_pixel(50, 50, Rgb([90, 90, 90]));
        let (regions, annotated) =
            detect_highlighted_areas(&image, &HsvBounds::default(), 2, 50).unwrap();
        assert!(regions.is_empty());
        assert_eq!(annotated, image);
    }
}
