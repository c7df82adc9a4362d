// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// codesnap-render — Vector document composition and rasterization.
//
// `document` embeds styled fragments into the fixed-template page layout
// (monospace lines on a transparent ground, oversized geometry so nothing
// ever wraps); `raster` renders the first page into an RGBA raster at double
// the nominal resolution.

pub mod document;
pub mod raster;

pub use document::{RenderedDocument, RenderedPage, compose};
pub use raster::{FontAssets, RasterImage, rasterize};
