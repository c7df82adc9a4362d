// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Snapshot configuration. Every constant of the visual template lives here —
// the palette, page geometry, layout arithmetic, and scene offsets are
// configuration data, not hardcoded logic, so deployments can override them.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::TokenClass;

/// Complete configuration for one snapshot pipeline instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotConfig {
    pub theme: ThemeConfig,
    pub page: PageGeometry,
    pub layout: LayoutRules,
    pub scene: SceneGeometry,
    pub assets: AssetPaths,
    pub detection: DetectionConfig,
    pub compression: CompressionConfig,
}

/// Visual theme applied by the document compositor: monospace typography and
/// the token-class colour table (a modified a11y-dark palette).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Font family requested for all code text.
    pub font_family: String,
    /// Font size in logical page units.
    pub font_size: f32,
    /// Height of one line box in logical page units.
    pub line_height: f32,
    /// Tab stops, in columns.
    pub tab_width: usize,
    /// Default foreground for unclassified text.
    pub foreground: String,
    pub palette: Palette,
}

impl ThemeConfig {
    /// Foreground colour for a token class. `Plain` text uses the theme
    /// foreground rather than a palette entry.
    pub fn color(&self, class: TokenClass) -> &str {
        match class {
            TokenClass::Plain => &self.foreground,
            TokenClass::Comment => &self.palette.comment,
            TokenClass::VariableTag => &self.palette.variable_tag,
            TokenClass::NumericBuiltin => &self.palette.numeric_builtin,
            TokenClass::Attribute => &self.palette.attribute,
            TokenClass::Str => &self.palette.string,
            TokenClass::TitleSection => &self.palette.title_section,
            TokenClass::Keyword => &self.palette.keyword,
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            font_family: "Roboto Mono".into(),
            font_size: 25.0,
            line_height: 30.0,
            tab_width: 4,
            foreground: "#f8f8f2".into(),
            palette: Palette::default(),
        }
    }
}

/// One foreground colour per token class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Palette {
    pub comment: String,
    pub variable_tag: String,
    pub numeric_builtin: String,
    pub attribute: String,
    pub string: String,
    pub title_section: String,
    pub keyword: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            comment: "#d4d0ab".into(),
            variable_tag: "#ffa07a".into(),
            numeric_builtin: "#f5ab35".into(),
            attribute: "#ffd700".into(),
            string: "#abe338".into(),
            title_section: "#00e0e0".into(),
            keyword: "#dcc6e0".into(),
        }
    }
}

/// Page geometry for the vector document. The page is deliberately much wider
/// and taller than any visible output so the renderer can never introduce line
/// breaks the source code didn't have; the clip window bounds what is visible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page width in logical units.
    pub width: u32,
    /// Page height in logical units.
    pub height: u32,
    /// Height of the visible text window; content below is clipped.
    pub clip_height: u32,
    /// Nominal render resolution in units per inch.
    pub dpi: f32,
    /// Oversampling factor applied during rasterization (2.0 ⇒ 144 units/inch
    /// at the nominal 72).
    pub raster_scale: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 3999,
            height: 999,
            clip_height: 535,
            dpi: 72.0,
            raster_scale: 2.0,
        }
    }
}

/// Deterministic layout arithmetic for the normalizer stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRules {
    /// Fuzz tolerance for the transparent-border trim, as a fraction of the
    /// full colour-distance range.
    pub trim_fuzz: f32,
    /// Fixed padding added below the trimmed text block, in pixels.
    pub bottom_padding: u32,
    /// Lower clamp bound for the canvas height.
    pub min_height: u32,
    /// Upper clamp bound for the canvas height.
    pub max_height: u32,
    /// Canvas heights are quantized to multiples of this step.
    pub height_step: u32,
}

impl Default for LayoutRules {
    fn default() -> Self {
        Self {
            trim_fuzz: 0.3,
            bottom_padding: 5,
            min_height: 160,
            max_height: 560,
            height_step: 80,
        }
    }
}

/// Fixed offsets and crop size for the scene compositor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneGeometry {
    /// Where the text block lands on the background mockup.
    pub text_offset_x: i64,
    pub text_offset_y: i64,
    /// Final scene width.
    pub crop_width: u32,
    /// Added to the canvas height to produce the final scene height.
    pub height_margin: u32,
    /// X position of the right-edge fade overlay.
    pub right_fade_x: i64,
    /// The bottom fade sits at `canvas_height + bottom_fade_margin`.
    pub bottom_fade_margin: u32,
}

impl Default for SceneGeometry {
    fn default() -> Self {
        Self {
            text_offset_x: 82,
            text_offset_y: 159,
            crop_width: 1800,
            height_margin: 240,
            right_fade_x: 1500,
            bottom_fade_margin: 140,
        }
    }
}

/// Paths to the template assets. Any missing image path switches the scene
/// to the built-in synthesized template; an empty font list falls back to
/// system fonts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPaths {
    pub background: Option<PathBuf>,
    pub right_fade: Option<PathBuf>,
    pub bottom_fade: Option<PathBuf>,
    pub font_files: Vec<PathBuf>,
}

impl AssetPaths {
    /// True when all three scene images are configured.
    pub fn has_scene_images(&self) -> bool {
        self.background.is_some() && self.right_fade.is_some() && self.bottom_fade.is_some()
    }
}

/// Bounds for language autodetection. Detection only ever considers the
/// allow-listed grammars, and only reads a bounded prefix of the input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Candidate grammars, by syntect token (name or file extension).
    pub languages: Vec<String>,
    /// Number of lines scored per candidate.
    pub max_lines: usize,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            languages: vec![
                "php".into(),
                "javascript".into(),
                "css".into(),
                "bash".into(),
                "html".into(),
                "yaml".into(),
                "json".into(),
                "sql".into(),
            ],
            max_lines: 50,
        }
    }
}

/// External lossless-compression settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    pub enabled: bool,
    pub api_key: String,
    /// Shrink endpoint of the compression service.
    pub endpoint: String,
    /// Upper bound on each HTTP call.
    pub timeout_secs: u64,
}

impl CompressionConfig {
    /// The external call is only attempted when enabled and keyed.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.api_key.is_empty()
    }
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            endpoint: "https://api.tinify.com/shrink".into(),
            timeout_secs: 20,
        }
    }
}
