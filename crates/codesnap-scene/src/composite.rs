// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scene compositor — layers the normalized text block and the two fade
// overlays onto the background mockup at the template's fixed offsets, then
// crops to final size.

use image::imageops;
use tracing::{debug, instrument};

use codesnap_core::config::SceneGeometry;
use codesnap_core::{Result, SnapError};
use codesnap_render::RasterImage;

use crate::assets::SceneAssets;

/// Build the final scene.
///
/// The background is cloned per call — assets are template resources and must
/// never accumulate composited state between invocations. Output dimensions
/// are exactly `crop_width` by `canvas_height + height_margin`.
#[instrument(skip(text_image, assets, geometry), fields(canvas_height))]
pub fn compose_scene(
    text_image: RasterImage,
    canvas_height: u32,
    assets: &SceneAssets,
    geometry: &SceneGeometry,
) -> Result<RasterImage> {
    let mut canvas = assets.background().clone();

    let (origin_x, origin_y) = text_image.origin();
    imageops::overlay(
        &mut canvas,
        text_image.as_rgba(),
        geometry.text_offset_x + origin_x,
        geometry.text_offset_y + origin_y,
    );

    let crop_height = canvas_height + geometry.height_margin;
    if canvas.width() < geometry.crop_width || canvas.height() < crop_height {
        return Err(SnapError::Image(format!(
            "background asset is {}x{}, smaller than the {}x{} crop",
            canvas.width(),
            canvas.height(),
            geometry.crop_width,
            crop_height,
        )));
    }

    let mut scene = RasterImage::new(
        imageops::crop_imm(&canvas, 0, 0, geometry.crop_width, crop_height).to_image(),
    );
    scene.reset_page();

    imageops::overlay(scene.as_rgba_mut(), assets.right_fade(), geometry.right_fade_x, 0);
    imageops::overlay(
        scene.as_rgba_mut(),
        assets.bottom_fade(),
        0,
        i64::from(canvas_height + geometry.bottom_fade_margin),
    );

    debug!(
        width = scene.width(),
        height = scene.height(),
        "scene composited"
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn small_geometry() -> SceneGeometry {
        SceneGeometry {
            text_offset_x: 2,
            text_offset_y: 3,
            crop_width: 100,
            height_margin: 24,
            right_fade_x: 80,
            bottom_fade_margin: 14,
        }
    }

    fn small_assets() -> SceneAssets {
        let background = RgbaImage::from_pixel(120, 80, Rgba([0, 128, 0, 255]));
        let right_fade = RgbaImage::from_pixel(20, 64, Rgba([0, 0, 255, 255]));
        let bottom_fade = RgbaImage::from_pixel(100, 10, Rgba([255, 255, 0, 255]));
        SceneAssets::from_images(background, right_fade, bottom_fade)
    }

    fn red_text(width: u32, height: u32) -> RasterImage {
        RasterImage::new(RgbaImage::from_pixel(width, height, Rgba([255, 0, 0, 255])))
    }

    #[test]
    fn scene_has_the_template_dimensions() {
        let scene = compose_scene(red_text(10, 5), 40, &small_assets(), &small_geometry()).unwrap();
        assert_eq!(scene.width(), 100);
        assert_eq!(scene.height(), 64);
        assert_eq!(scene.origin(), (0, 0));
    }

    #[test]
    fn text_lands_at_the_fixed_offset() {
        let scene = compose_scene(red_text(10, 5), 40, &small_assets(), &small_geometry()).unwrap();
        assert_eq!(scene.as_rgba().get_pixel(2, 3).0, [255, 0, 0, 255]);
        assert_eq!(scene.as_rgba().get_pixel(1, 3).0, [0, 128, 0, 255]);
        assert_eq!(scene.as_rgba().get_pixel(2, 2).0, [0, 128, 0, 255]);
    }

    #[test]
    fn fades_cover_the_edges() {
        let scene = compose_scene(red_text(10, 5), 40, &small_assets(), &small_geometry()).unwrap();
        // Right fade sits at x = 80.
        assert_eq!(scene.as_rgba().get_pixel(85, 0).0, [0, 0, 255, 255]);
        assert_eq!(scene.as_rgba().get_pixel(79, 0).0, [0, 128, 0, 255]);
        // Bottom fade sits at y = canvas_height + 14 = 54.
        assert_eq!(scene.as_rgba().get_pixel(0, 54).0, [255, 255, 0, 255]);
        assert_eq!(scene.as_rgba().get_pixel(0, 53).0, [0, 128, 0, 255]);
    }

    #[test]
    fn semi_transparent_text_blends_over_the_background() {
        let text = RasterImage::new(RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 128])));
        let scene = compose_scene(text, 40, &small_assets(), &small_geometry()).unwrap();
        let blended = scene.as_rgba().get_pixel(3, 4);
        // Half red over green: both channels present, fully opaque.
        assert!(blended.0[0] > 100);
        assert!(blended.0[1] > 40);
        assert_eq!(blended.0[3], 255);
    }

    #[test]
    fn assets_are_not_mutated_between_calls() {
        let assets = small_assets();
        let geometry = small_geometry();
        compose_scene(red_text(10, 5), 40, &assets, &geometry).unwrap();
        // The background must still be pristine after a composite.
        assert_eq!(assets.background().get_pixel(2, 3).0, [0, 128, 0, 255]);
    }

    #[test]
    fn undersized_background_is_an_error() {
        let background = RgbaImage::from_pixel(50, 50, Rgba([0, 128, 0, 255]));
        let assets = SceneAssets::from_images(
            background,
            RgbaImage::new(20, 64),
            RgbaImage::new(100, 10),
        );
        let result = compose_scene(red_text(10, 5), 40, &assets, &small_geometry());
        assert!(matches!(result, Err(SnapError::Image(_))));
    }

    #[test]
    fn default_template_yields_the_1800_wide_scene() {
        use codesnap_core::config::LayoutRules;
        let geometry = SceneGeometry::default();
        let assets = SceneAssets::builtin(&geometry, &LayoutRules::default());
        for canvas_height in [160u32, 320, 560] {
            let scene =
                compose_scene(red_text(60, 30), canvas_height, &assets, &geometry).unwrap();
            assert_eq!(scene.width(), 1800);
            assert_eq!(scene.height(), canvas_height + 240);
        }
    }
}
