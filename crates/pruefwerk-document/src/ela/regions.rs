// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Region extraction — label 8-connected foreground components of a deviation
// mask, keep the ones big enough to matter, and outline them on a copy of the
// page.

use std::collections::HashMap;

use image::{Luma, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use imageproc::region_labelling::{Connectivity, connected_components};
use pruefwerk_core::SuspiciousRegion;
use pruefwerk_core::error::{ForensicsError, Result};
use tracing::{debug, info, instrument};

use super::mask::DeviationMask;

/// Outline colour for suspicious regions.
pub const OUTLINE_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);

/// Outline thickness in pixels, growing inward from the bounding box.
pub const OUTLINE_WIDTH: u32 = 2;

/// Bounding box and pixel count accumulated while scanning one component.
#[derive(Debug, Clone, Copy)]
struct ComponentStats {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
    area: u32,
}

impl ComponentStats {
    fn new(x: u32, y: u32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
            area: 0,
        }
    }

    fn add(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.area += 1;
    }

    fn to_region(self) -> SuspiciousRegion {
        SuspiciousRegion {
            x: self.min_x,
            y: self.min_y,
            width: self.max_x - self.min_x + 1,
            height: self.max_y - self.min_y + 1,
            area: self.area,
        }
    }
}

/// Find connected foreground components with more than `min_area` pixels and
/// outline each on a copy of `original`.
///
/// Regions come back in the order their first pixel is met in a row-major
/// scan. With no surviving components the returned image is an untouched
/// copy of `original`.
#[instrument(skip(original, mask), fields(width = mask.width(), height = mask.height(), min_area))]
pub fn extract_regions(
    original: &RgbImage,
    mask: &DeviationMask,
    min_area: u32,
) -> Result<(Vec<SuspiciousRegion>, RgbImage)> {
    if original.dimensions() != mask.dimensions() {
        return Err(ForensicsError::DimensionMismatch {
            page_width: original.width(),
            page_height: original.height(),
            mask_width: mask.width(),
            mask_height: mask.height(),
        });
    }

    let components = label_components(mask);
    let total = components.len();
    let regions: Vec<SuspiciousRegion> = components
        .into_iter()
        .filter(|stats| stats.area > min_area)
        .map(ComponentStats::to_region)
        .collect();

    let mut annotated = original.clone();
    for region in &regions {
        draw_outline(&mut annotated, region);
    }

    debug!(components = total, kept = regions.len(), "Components filtered by area");
    info!(regions = regions.len(), "Suspicious regions extracted");
    Ok((regions, annotated))
}

/// Label the mask and collect per-component stats in first-seen order.
fn label_components(mask: &DeviationMask) -> Vec<ComponentStats> {
    let labels = connected_components(mask.as_gray(), Connectivity::Eight, Luma([0u8]));

    let mut index_of: HashMap<u32, usize> = HashMap::new();
    let mut stats: Vec<ComponentStats> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label.0[0];
        if label == 0 {
            continue;
        }
        let idx = *index_of.entry(label).or_insert_with(|| {
            stats.push(ComponentStats::new(x, y));
            stats.len() - 1
        });
        stats[idx].add(x, y);
    }
    stats
}

fn draw_outline(image: &mut RgbImage, region: &SuspiciousRegion) {
    for inset in 0..OUTLINE_WIDTH {
        let width = region.width.saturating_sub(2 * inset);
        let height = region.height.saturating_sub(2 * inset);
        if width == 0 || height == 0 {
            break;
        }
        let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32)
            .of_size(width, height);
        draw_hollow_rect_mut(image, rect, OUTLINE_COLOUR);
    }
}
