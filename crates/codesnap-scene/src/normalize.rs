// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Layout normalizer — the deterministic numeric stage between the raw raster
// and the scene compositor. Every step is order-sensitive; the arithmetic is
// pinned by the tests below because it is directly observable in the output
// image height.

use image::imageops::{self, FilterType};
use tracing::{debug, instrument};

use codesnap_core::config::LayoutRules;
use codesnap_core::{LayoutMetrics, Result, SnapError};
use codesnap_render::RasterImage;

/// Normalize the oversampled text raster and compute the canvas height.
///
/// 1. Downscale to `floor(w/2) - 1` by `floor(h/2) - 1` with Catmull-Rom
///    filtering. The minus-one-pixel offset makes the resampled text
///    slightly crisper and is part of the template.
/// 2. Trim mostly-transparent margins (fuzz tolerance, not exact zero).
/// 3. Reset the virtual page origin left behind by the trim.
/// 4. Add the fixed bottom padding.
/// 5. Clamp to the template's height bounds.
/// 6. Quantize to the height step.
#[instrument(skip(image, rules), fields(width = image.width(), height = image.height()))]
pub fn normalize(image: RasterImage, rules: &LayoutRules) -> Result<(RasterImage, LayoutMetrics)> {
    let image = downscale_half(image);
    let mut image = trim_transparent(image, rules.trim_fuzz)?;
    image.reset_page();

    let mut text_height = image.height() + rules.bottom_padding;
    text_height = text_height.clamp(rules.min_height, rules.max_height);
    let canvas_height = round_to_multiple(text_height, rules.height_step);

    debug!(
        trimmed_width = image.width(),
        trimmed_height = image.height(),
        text_height,
        canvas_height,
        "layout normalized"
    );

    Ok((
        image,
        LayoutMetrics {
            text_height,
            canvas_height,
        },
    ))
}

/// Halve the raster with a one-pixel undershoot on both axes.
fn downscale_half(image: RasterImage) -> RasterImage {
    let target_width = (image.width() / 2).saturating_sub(1).max(1);
    let target_height = (image.height() / 2).saturating_sub(1).max(1);
    let resized = imageops::resize(
        image.as_rgba(),
        target_width,
        target_height,
        FilterType::CatmullRom,
    );
    RasterImage::new(resized)
}

/// Trim the mostly-transparent border.
///
/// The border of a rasterized page is fully transparent, so the fuzzy
/// colour-distance test collapses to an alpha threshold: a pixel is content
/// when its alpha fraction exceeds the fuzz tolerance. The crop offset is
/// recorded as the image's page origin, exactly like the raster library the
/// template was built with.
fn trim_transparent(image: RasterImage, fuzz: f32) -> Result<RasterImage> {
    let rgba = image.as_rgba();
    let threshold = fuzz.clamp(0.0, 1.0) * 255.0;

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut found = false;

    for (x, y, pixel) in rgba.enumerate_pixels() {
        if f32::from(pixel.0[3]) > threshold {
            found = true;
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }

    if !found {
        return Err(SnapError::Image(
            "trimmed raster contains no visible ink".into(),
        ));
    }

    let width = max_x - min_x + 1;
    let height = max_y - min_y + 1;
    let cropped = imageops::crop_imm(rgba, min_x, min_y, width, height).to_image();

    let mut trimmed = RasterImage::new(cropped);
    trimmed.set_origin((i64::from(min_x), i64::from(min_y)));
    Ok(trimmed)
}

/// Quantize `n` to a multiple of `step`.
///
/// Exact multiples pass through; everything else is `step * round((n +
/// step/2) / step)` with ties rounding away from zero. Despite the template's
/// historical "round up" naming this is round-to-nearest arithmetic, and the
/// literal behavior is preserved because it decides the output image height.
pub fn round_to_multiple(n: u32, step: u32) -> u32 {
    if step == 0 || n % step == 0 {
        return n;
    }
    let quotient = (f64::from(n) + f64::from(step) / 2.0) / f64::from(step);
    (quotient.round() as u32) * step
}
