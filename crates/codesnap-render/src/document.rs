// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document compositor — embeds a styled fragment stream into the fixed page
// template and produces a paginated vector document (one SVG description per
// page). Only page 0 is meaningful downstream; later pages hold overflow.

use std::fmt::Write as _;

use tracing::{debug, instrument};

use codesnap_core::config::{PageGeometry, ThemeConfig};
use codesnap_core::{Result, SnapError, StyledDocument, TokenClass};

/// One page of the rendered document.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    index: usize,
    svg: String,
}

impl RenderedPage {
    #[cfg(test)]
    pub(crate) fn for_tests(index: usize, svg: String) -> Self {
        Self { index, svg }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The page's SVG description.
    pub fn svg(&self) -> &str {
        &self.svg
    }
}

/// The paginated vector document. Owned by a single pipeline invocation and
/// discarded after rasterization; nothing here touches the filesystem.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pages: Vec<RenderedPage>,
    width: u32,
    height: u32,
}

impl RenderedDocument {
    pub(crate) fn new(pages: Vec<RenderedPage>, width: u32, height: u32) -> Self {
        Self {
            pages,
            width,
            height,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The only page the rest of the pipeline looks at.
    pub fn first_page(&self) -> Option<&RenderedPage> {
        self.pages.first()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

/// A laid-out line: merged same-class runs, tabs already expanded.
struct StyledLine {
    spans: Vec<(String, TokenClass)>,
}

impl StyledLine {
    fn is_empty(&self) -> bool {
        self.spans.iter().all(|(text, _)| text.is_empty())
    }
}

/// Compose the styled document into pages.
///
/// Line-break normalization happens here, in this order, and the order is
/// load-bearing: line endings first, then the blank-line placeholder pass,
/// then the split into forced lines. The placeholder (a non-breaking space on
/// its own line) keeps blank lines from collapsing to zero height in the
/// renderer.
#[instrument(skip(doc, theme, page), fields(fragments = doc.fragments.len()))]
pub fn compose(
    doc: &StyledDocument,
    theme: &ThemeConfig,
    page: &PageGeometry,
) -> Result<RenderedDocument> {
    if theme.line_height <= 0.0 || page.height == 0 || page.width == 0 {
        return Err(SnapError::Render("degenerate page geometry".into()));
    }

    let chars = normalize_line_endings(doc);
    let chars = insert_blank_line_placeholders(chars);
    let lines = split_lines(chars, theme.tab_width);

    let lines_per_page = ((page.height as f32 / theme.line_height) as usize).max(1);
    let pages: Vec<RenderedPage> = lines
        .chunks(lines_per_page)
        .enumerate()
        .map(|(index, chunk)| RenderedPage {
            index,
            svg: page_svg(chunk, theme, page),
        })
        .collect();

    debug!(
        lines = lines.len(),
        pages = pages.len(),
        "document composed"
    );

    Ok(RenderedDocument::new(pages, page.width, page.height))
}

/// Flatten fragments to a per-character style stream with `\r\n` and lone
/// `\r` collapsed to `\n`.
fn normalize_line_endings(doc: &StyledDocument) -> Vec<(char, TokenClass)> {
    let raw: Vec<(char, TokenClass)> = doc
        .fragments
        .iter()
        .flat_map(|fragment| fragment.text.chars().map(|ch| (ch, fragment.class)))
        .collect();

    let mut normalized = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let (ch, class) = raw[i];
        if ch == '\r' {
            normalized.push(('\n', class));
            // Swallow the LF of a CRLF pair.
            if i + 1 < raw.len() && raw[i + 1].0 == '\n' {
                i += 2;
            } else {
                i += 1;
            }
        } else {
            normalized.push((ch, class));
            i += 1;
        }
    }
    normalized
}

/// Replace every `\n\n` pair with `\n`, NBSP, `\n` in a single left-to-right
/// non-overlapping pass — the exact substitution the renderer needs to give
/// blank lines the same height as text lines. Three consecutive newlines
/// therefore yield one placeholder line and one genuinely empty line.
fn insert_blank_line_placeholders(chars: Vec<(char, TokenClass)>) -> Vec<(char, TokenClass)> {
    let mut padded = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i].0 == '\n' && i + 1 < chars.len() && chars[i + 1].0 == '\n' {
            padded.push(('\n', TokenClass::Plain));
            padded.push(('\u{00A0}', TokenClass::Plain));
            padded.push(('\n', TokenClass::Plain));
            i += 2;
        } else {
            padded.push(chars[i]);
            i += 1;
        }
    }
    padded
}

/// Split the stream on forced line breaks, expanding tabs to the next tab
/// stop and merging adjacent same-class characters into spans.
fn split_lines(chars: Vec<(char, TokenClass)>, tab_width: usize) -> Vec<StyledLine> {
    let mut lines = Vec::new();
    let mut spans: Vec<(String, TokenClass)> = Vec::new();
    let mut column = 0usize;

    let mut push_text = |spans: &mut Vec<(String, TokenClass)>, text: &str, class: TokenClass| {
        match spans.last_mut() {
            Some((last, last_class)) if *last_class == class => last.push_str(text),
            _ => spans.push((text.to_string(), class)),
        }
    };

    for (ch, class) in chars {
        match ch {
            '\n' => {
                lines.push(StyledLine {
                    spans: std::mem::take(&mut spans),
                });
                column = 0;
            }
            '\t' => {
                let width = tab_width.max(1);
                let fill = width - (column % width);
                push_text(&mut spans, &" ".repeat(fill), class);
                column += fill;
            }
            _ => {
                push_text(&mut spans, ch.encode_utf8(&mut [0u8; 4]), class);
                column += 1;
            }
        }
    }
    lines.push(StyledLine { spans });
    lines
}

/// Render one page chunk to SVG. The geometry is far wider than any real
/// line so the renderer can never wrap; a clip window bounds what is visible.
fn page_svg(lines: &[StyledLine], theme: &ThemeConfig, page: &PageGeometry) -> String {
    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = page.width,
        h = page.height,
    );
    let _ = write!(
        svg,
        "<defs><clipPath id=\"snippet-clip\"><rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"/></clipPath></defs>",
        page.width, page.clip_height,
    );
    let _ = write!(
        svg,
        "<g clip-path=\"url(#snippet-clip)\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.foreground,
    );

    for (row, line) in lines.iter().enumerate() {
        if line.is_empty() {
            continue;
        }
        let baseline = row as f32 * theme.line_height + theme.font_size;
        let _ = write!(svg, "<text x=\"0\" y=\"{baseline}\" xml:space=\"preserve\">");
        for (text, class) in &line.spans {
            if *class == TokenClass::Plain {
                let _ = write!(svg, "<tspan>{}</tspan>", escape_xml(text));
            } else {
                let _ = write!(
                    svg,
                    "<tspan fill=\"{}\">{}</tspan>",
                    theme.color(*class),
                    escape_xml(text)
                );
            }
        }
        svg.push_str("</text>");
    }

    svg.push_str("</g></svg>");
    svg
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
