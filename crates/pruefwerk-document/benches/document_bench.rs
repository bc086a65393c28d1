// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the pruefwerk-document crate: the full page
// analysis pipeline and the revision text diff.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgb, RgbImage};

use pruefwerk_document::ForensicAnalyzer;
use pruefwerk_document::pdf::unified_diff;

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// ELA, thresholding, opening, labelling and highlight detection on a
/// 200x200 synthetic page: a smooth gradient with a pasted high-contrast
/// block from (60, 60) to (120, 110).
fn bench_analyze_page(c: &mut Criterion) {
    let mut page = RgbImage::from_fn(200, 200, |x, y| {
        Rgb([((x + y) / 2) as u8, 128, (200 - y) as u8])
    });
    for y in 60..110 {
        for x in 60..120 {
            let v = if (x / 3 + y / 3) % 2 == 0 { 20 } else { 235 };
            page.put_pixel(x, y, Rgb([v, v, 255 - v]));
        }
    }
    let analyzer = ForensicAnalyzer::default();

    c.bench_function("analyze_page (200x200)", |b| {
        b.iter(|| {
            let analysis = analyzer.analyze_page(black_box(&page));
            black_box(analysis.map(|a| a.regions.len()).unwrap_or_default());
        });
    });
}

/// Unified diff of two 2000-line texts differing in every tenth line.
fn bench_unified_diff(c: &mut Criterion) {
    let old: String = (0..2000).map(|i| format!("line {}\n", i)).collect();
    let new: String = (0..2000)
        .map(|i| {
            if i % 10 == 0 {
                format!("changed {}\n", i)
            } else {
                format!("line {}\n", i)
            }
        })
        .collect();

    c.bench_function("unified_diff (2000 lines, 10% changed)", |b| {
        b.iter(|| black_box(unified_diff(black_box(&old), black_box(&new), "Version 1", "Version 2")));
    });
}

criterion_group!(benches, bench_analyze_page, bench_unified_diff);
criterion_main!(benches);
