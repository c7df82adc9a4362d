// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scene assets — the background mockup and the two fade overlays. Loaded
// once per pipeline, never mutated afterwards; the compositor clones what it
// needs per invocation so no composited state leaks between snapshots.

use std::path::Path;

use image::{Rgba, RgbaImage};
use tracing::{info, instrument};

use codesnap_core::config::{AssetPaths, LayoutRules, SceneGeometry};
use codesnap_core::{Result, SnapError};

/// The three read-only template images.
///
/// Safe for concurrent read-only access across invocations.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    background: RgbaImage,
    right_fade: RgbaImage,
    bottom_fade: RgbaImage,
}

impl SceneAssets {
    /// Load the configured template images, or synthesize the built-in
    /// template when any path is missing.
    #[instrument(skip(paths, scene, layout))]
    pub fn load(paths: &AssetPaths, scene: &SceneGeometry, layout: &LayoutRules) -> Result<Self> {
        let (Some(background), Some(right_fade), Some(bottom_fade)) = (
            paths.background.as_deref(),
            paths.right_fade.as_deref(),
            paths.bottom_fade.as_deref(),
        ) else {
            info!("scene asset paths not configured; using built-in template");
            return Ok(Self::builtin(scene, layout));
        };

        let assets = Self {
            background: load_image(background)?,
            right_fade: load_image(right_fade)?,
            bottom_fade: load_image(bottom_fade)?,
        };
        info!(
            background_w = assets.background.width(),
            background_h = assets.background.height(),
            "scene assets loaded"
        );
        Ok(assets)
    }

    /// Synthesize a neutral template: a solid dark card plus alpha-gradient
    /// fades toward the card colour. Stands in for the shipped mockup art so
    /// the pipeline works out of the box.
    pub fn builtin(scene: &SceneGeometry, layout: &LayoutRules) -> Self {
        let card = Rgba([34u8, 39, 46, 255]);
        let full_height = layout.max_height + scene.height_margin;

        let background = RgbaImage::from_pixel(scene.crop_width, full_height, card);

        let fade_width = scene
            .crop_width
            .saturating_sub(scene.right_fade_x.max(0) as u32)
            .max(1);
        let right_fade = RgbaImage::from_fn(fade_width, full_height, |x, _| {
            let alpha = (x as f32 / (fade_width - 1).max(1) as f32 * 255.0) as u8;
            Rgba([card.0[0], card.0[1], card.0[2], alpha])
        });

        let fade_height = scene
            .height_margin
            .saturating_sub(scene.bottom_fade_margin)
            .max(1);
        let bottom_fade = RgbaImage::from_fn(scene.crop_width, fade_height, |_, y| {
            let alpha = (y as f32 / (fade_height - 1).max(1) as f32 * 255.0) as u8;
            Rgba([card.0[0], card.0[1], card.0[2], alpha])
        });

        Self {
            background,
            right_fade,
            bottom_fade,
        }
    }

    /// Wrap pre-decoded images; used by tests and embedding callers.
    pub fn from_images(background: RgbaImage, right_fade: RgbaImage, bottom_fade: RgbaImage) -> Self {
        Self {
            background,
            right_fade,
            bottom_fade,
        }
    }

    pub fn background(&self) -> &RgbaImage {
        &self.background
    }

    pub fn right_fade(&self) -> &RgbaImage {
        &self.right_fade
    }

    pub fn bottom_fade(&self) -> &RgbaImage {
        &self.bottom_fade
    }
}

fn load_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path)
        .map_err(|err| SnapError::Asset(format!("failed to open {}: {}", path.display(), err)))?;
    Ok(image.to_rgba8())
}
