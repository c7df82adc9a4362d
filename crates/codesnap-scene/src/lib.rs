// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// codesnap-scene — Raster post-processing for the Codesnap renderer.
//
// Provides the deterministic layout normalizer (downscale, trim, clamp,
// quantize), the fixed-template scene compositor (background, text block,
// fade overlays, crop), and the local PNG encoder.

pub mod assets;
pub mod composite;
pub mod encode;
pub mod normalize;

pub use assets::SceneAssets;
pub use composite::compose_scene;
pub use encode::{decode_dimensions, encode_png};
pub use normalize::{normalize, round_to_multiple};
