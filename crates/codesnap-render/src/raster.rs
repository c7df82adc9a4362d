// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Rasterizer — renders page 0 of the vector document into an RGBA raster at
// double the nominal resolution. The oversampling is required for acceptable
// glyph kerning and antialiasing; the later downscale sharpens it back.

use std::path::PathBuf;
use std::sync::Arc;

use image::{Rgba, RgbaImage};
use tracing::{debug, info, instrument};
use usvg::fontdb;

use codesnap_core::config::PageGeometry;
use codesnap_core::{Result, SnapError};

use crate::document::RenderedDocument;

/// Load-once font database shared by every invocation.
///
/// Configured font files are loaded first so the template family resolves to
/// them; system fonts fill in fallback coverage. The database is immutable
/// after construction and safe to share across concurrent invocations.
#[derive(Clone)]
pub struct FontAssets {
    database: Arc<fontdb::Database>,
    family: String,
}

impl FontAssets {
    #[instrument(skip(font_files), fields(files = font_files.len()))]
    pub fn load(font_files: &[PathBuf], family: &str) -> Result<Self> {
        let mut database = fontdb::Database::new();
        for path in font_files {
            database.load_font_file(path).map_err(|err| {
                SnapError::Asset(format!("failed to load font {}: {}", path.display(), err))
            })?;
        }
        database.load_system_fonts();
        info!(fonts = database.len(), family, "font database ready");
        Ok(Self {
            database: Arc::new(database),
            family: family.to_string(),
        })
    }

    pub fn database(&self) -> Arc<fontdb::Database> {
        Arc::clone(&self.database)
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn font_count(&self) -> usize {
        self.database.len()
    }
}

/// An RGBA raster plus a virtual page origin.
///
/// The origin models the page offset left behind by the trim stage; resetting
/// it to `(0, 0)` is an explicit step so downstream compositing math never
/// inherits stale coordinates. Ownership passes stage to stage — the pixel
/// buffer is never shared.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: RgbaImage,
    origin: (i64, i64),
}

impl RasterImage {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            origin: (0, 0),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn origin(&self) -> (i64, i64) {
        self.origin
    }

    pub fn set_origin(&mut self, origin: (i64, i64)) {
        self.origin = origin;
    }

    /// Reset the virtual page offset to `(0, 0)`.
    pub fn reset_page(&mut self) {
        self.origin = (0, 0);
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.image
    }

    pub fn as_rgba_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.image
    }
}

/// Rasterize page 0 of the document.
///
/// Later pages are overflow and are deliberately ignored. Fails with a
/// terminal `Rasterization` error when the document has no pages or page 0
/// does not parse.
#[instrument(skip(document, fonts, page), fields(pages = document.page_count()))]
pub fn rasterize(
    document: &RenderedDocument,
    fonts: &FontAssets,
    page: &PageGeometry,
) -> Result<RasterImage> {
    let first = document
        .first_page()
        .ok_or_else(|| SnapError::Rasterization("document has no pages".into()))?;

    let mut options = usvg::Options::default();
    options.dpi = page.dpi;
    options.font_family = fonts.family().to_string();
    options.fontdb = fonts.database();

    let tree = usvg::Tree::from_str(first.svg(), &options)
        .map_err(|err| SnapError::Rasterization(format!("malformed page: {err}")))?;

    let scale = page.raster_scale;
    let width = (document.width() as f32 * scale).round() as u32;
    let height = (document.height() as f32 * scale).round() as u32;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
        SnapError::Rasterization(format!("cannot allocate {width}x{height} pixmap"))
    })?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // tiny-skia keeps premultiplied alpha; the raster pipeline wants straight
    // RGBA with the ground fully transparent outside glyph ink.
    let mut image = RgbaImage::new(width, height);
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels().iter()) {
        let color = src.demultiply();
        *dst = Rgba([color.red(), color.green(), color.blue(), color.alpha()]);
    }

    debug!(width, height, "page rasterized");
    Ok(RasterImage::new(image))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{RenderedDocument, RenderedPage};

    fn page_geometry(width: u32, height: u32) -> PageGeometry {
        PageGeometry {
            width,
            height,
            clip_height: height,
            dpi: 72.0,
            raster_scale: 2.0,
        }
    }

    fn rect_document(width: u32, height: u32) -> RenderedDocument {
        let svg = format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" \
             viewBox=\"0 0 {width} {height}\">\
             <rect x=\"10\" y=\"10\" width=\"30\" height=\"20\" fill=\"#ff0000\"/></svg>"
        );
        RenderedDocument::new(vec![RenderedPage::for_tests(0, svg)], width, height)
    }

    fn fonts() -> FontAssets {
        FontAssets::load(&[], "monospace").unwrap()
    }

    #[test]
    fn rasterizes_at_double_scale() {
        let document = rect_document(100, 50);
        let raster = rasterize(&document, &fonts(), &page_geometry(100, 50)).unwrap();
        assert_eq!(raster.width(), 200);
        assert_eq!(raster.height(), 100);
        assert_eq!(raster.origin(), (0, 0));
    }

    #[test]
    fn ink_is_opaque_and_ground_transparent() {
        let document = rect_document(100, 50);
        let raster = rasterize(&document, &fonts(), &page_geometry(100, 50)).unwrap();
        // Centre of the rect, in doubled coordinates.
        let ink = raster.as_rgba().get_pixel(50, 40);
        assert_eq!(ink.0[3], 255);
        assert_eq!(ink.0[0], 255);
        // Outside the rect.
        let ground = raster.as_rgba().get_pixel(2, 2);
        assert_eq!(ground.0[3], 0);
    }

    #[test]
    fn empty_document_is_a_rasterization_error() {
        let document = RenderedDocument::new(Vec::new(), 100, 50);
        let result = rasterize(&document, &fonts(), &page_geometry(100, 50));
        assert!(matches!(result, Err(SnapError::Rasterization(_))));
    }

    #[test]
    fn malformed_page_is_a_rasterization_error() {
        let document = RenderedDocument::new(
            vec![RenderedPage::for_tests(0, "not an svg page".into())],
            100,
            50,
        );
        let result = rasterize(&document, &fonts(), &page_geometry(100, 50));
        assert!(matches!(result, Err(SnapError::Rasterization(_))));
    }

    #[test]
    fn origin_can_be_set_and_reset() {
        let mut raster = RasterImage::new(RgbaImage::new(4, 4));
        raster.set_origin((7, 9));
        assert_eq!(raster.origin(), (7, 9));
        raster.reset_page();
        assert_eq!(raster.origin(), (0, 0));
    }
}
