// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Side-by-side comparison images ("original | annotated") for reviewers.

use image::imageops::{self, FilterType};
use image::RgbImage;
use pruefwerk_core::error::Result;
use tracing::{debug, instrument};

use super::processor::ensure_non_empty;

/// Place `left` and `right` next to each other on one canvas.
///
/// Both images are scaled (aspect preserved, Lanczos3) to the taller of the
/// two heights before pasting.
#[instrument(skip_all, fields(left = ?left.dimensions(), right = ?right.dimensions()))]
pub fn side_by_side(left: &RgbImage, right: &RgbImage) -> Result<RgbImage> {
    ensure_non_empty(left)?;
    ensure_non_empty(right)?;

    let height = left.height().max(right.height());
    let left = scale_to_height(left, height);
    let right = scale_to_height(right, height);

    let mut canvas = RgbImage::new(left.width() + right.width(), height);
    imageops::replace(&mut canvas, &left, 0, 0);
    imageops::replace(&mut canvas, &right, i64::from(left.width()), 0);

    debug!(
        width = canvas.width(),
        height = canvas.height(),
        "Comparison image composed"
    );
    Ok(canvas)
}

fn scale_to_height(image: &RgbImage, height: u32) -> RgbImage {
    if image.height() == height {
        return image.clone();
    }
    let width = (f64::from(image.width()) * f64::from(height) / f64::from(image.height()))
        .round()
        .max(1.0) as u32;
    imageops::resize(image, width, height, FilterType::Lanczos3)
}
