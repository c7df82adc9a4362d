// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the codesnap-scene crate. Benchmarks the layout
// normalizer on a synthetic oversampled text raster — the dominant raster
// cost after rasterization itself.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{Rgba, RgbaImage};

use codesnap_core::config::LayoutRules;
use codesnap_render::RasterImage;
use codesnap_scene::{normalize, round_to_multiple};

/// Build a raster resembling a rasterized snippet: transparent ground with
/// an opaque block of "text" offset from the top-left corner.
fn synthetic_raster(width: u32, height: u32) -> RasterImage {
    let mut image = RgbaImage::new(width, height);
    for y in 40..height - 200 {
        for x in 30..width / 2 {
            image.put_pixel(x, y, Rgba([240, 240, 240, 255]));
        }
    }
    RasterImage::new(image)
}

fn bench_normalize(c: &mut Criterion) {
    let rules = LayoutRules::default();
    let raster = synthetic_raster(1600, 800);

    c.bench_function("normalize (1600x800)", |b| {
        b.iter(|| {
            let cloned = black_box(raster.clone());
            let result = normalize(cloned, &rules).unwrap();
            black_box(result);
        });
    });
}

fn bench_rounding(c: &mut Criterion) {
    c.bench_function("round_to_multiple sweep", |b| {
        b.iter(|| {
            let mut acc = 0u32;
            for n in 1..600u32 {
                acc = acc.wrapping_add(round_to_multiple(black_box(n), 80));
            }
            black_box(acc);
        });
    });
}

criterion_group!(benches, bench_normalize, bench_rounding);
criterion_main!(benches);
