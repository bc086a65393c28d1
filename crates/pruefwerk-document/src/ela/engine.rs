// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error Level Analysis — recompress a page through JPEG and measure how far
// each pixel moved. Uniformly-saved content moves little and evenly; pasted
// or re-saved regions move more, and the rescaling below makes that visible.

use image::{Rgb, RgbImage};
use pruefwerk_core::error::{ForensicsError, Result};
use tracing::{debug, info, instrument};

use crate::image::processor::{ensure_non_empty, jpeg_round_trip};

/// Per-pixel, per-channel recompression error, rescaled so the largest
/// observed deviation maps to 255.
#[derive(Debug, Clone, PartialEq)]
pub struct ElaMap {
    image: RgbImage,
    /// Largest raw channel difference before rescaling (0 if the page
    /// survived recompression unchanged).
    max_diff: u8,
    /// Brightness factor applied to the raw differences.
    scale: f32,
}

impl ElaMap {
    /// Build the map from an original page and its recompressed counterpart.
    ///
    /// Exposed so callers with their own codec can reuse the rescaling.
    pub fn from_difference(original: &RgbImage, recompressed: &RgbImage) -> Result<Self> {
        ensure_non_empty(original)?;
        if original.dimensions() != recompressed.dimensions() {
            return Err(ForensicsError::ImageError(format!(
                "recompressed image is {:?}, original is {:?}",
                recompressed.dimensions(),
                original.dimensions()
            )));
        }

        let (width, height) = original.dimensions();
        let mut diff = RgbImage::new(width, height);
        let mut max_diff = 0u8;
        for ((out, a), b) in diff
            .pixels_mut()
            .zip(original.pixels())
            .zip(recompressed.pixels())
        {
            let channels = [
                a.0[0].abs_diff(b.0[0]),
                a.0[1].abs_diff(b.0[1]),
                a.0[2].abs_diff(b.0[2]),
            ];
            max_diff = max_diff.max(channels[0]).max(channels[1]).max(channels[2]);
            *out = Rgb(channels);
        }

        let scale = 255.0 / f32::from(max_diff.max(1));
        if max_diff > 0 {
            for pixel in diff.pixels_mut() {
                for channel in pixel.0.iter_mut() {
                    *channel = (f32::from(*channel) * scale).round().min(255.0) as u8;
                }
            }
        }

        Ok(Self {
            image: diff,
            max_diff,
            scale,
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn max_diff(&self) -> u8 {
        self.max_diff
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Borrow the rescaled difference image.
    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    /// Representative scalar for a pixel: the maximum of its three channels.
    pub fn level(&self, x: u32, y: u32) -> u8 {
        let Rgb([r, g, b]) = *self.image.get_pixel(x, y);
        r.max(g).max(b)
    }
}

/// Run Error Level Analysis on a page at the given JPEG `quality` (1-100).
#[instrument(skip(page), fields(width = page.width(), height = page.height(), quality))]
pub fn compute_ela(page: &RgbImage, quality: u8) -> Result<ElaMap> {
    ensure_non_empty(page)?;
    if !(1..=100).contains(&quality) {
        return Err(ForensicsError::InvalidConfig(format!(
            "ELA quality must be in 1..=100, got {}",
            quality
        )));
    }

    let recompressed = jpeg_round_trip(page, quality)?;
    let ela = ElaMap::from_difference(page, &recompressed)?;

    debug!(max_diff = ela.max_diff, scale = ela.scale, "Error levels rescaled");
    info!("Error level analysis complete");
    Ok(ela)
}
