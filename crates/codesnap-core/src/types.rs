// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Codesnap snapshot pipeline.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Result, SnapError};

/// Unique identifier for one snapshot invocation.
///
/// Output file names are derived from this value so that concurrent
/// invocations can never collide. Callers with a natural slug (a post slug,
/// a document id) should use that instead; this type covers the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotId(String);

impl SnapshotId {
    /// Content-derived identifier: the leading 16 hex digits of the SHA-256
    /// of the snippet text. Stable across runs for identical input.
    pub fn derive(code: &str) -> Self {
        let digest = Sha256::digest(code.as_bytes());
        Self(hex::encode(&digest[..8]))
    }

    /// Random identifier for callers without a content basis.
    pub fn random() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The snippet handed in by the host collaborator. Immutable once built;
/// construction rejects blank code so no pipeline stage ever runs for it.
#[derive(Debug, Clone)]
pub struct SnippetInput {
    code: String,
    language_hint: Option<String>,
}

impl SnippetInput {
    pub fn new(code: impl Into<String>, language_hint: Option<String>) -> Result<Self> {
        let code = code.into();
        if code.trim().is_empty() {
            return Err(SnapError::EmptyInput);
        }
        let language_hint = language_hint.filter(|hint| !hint.trim().is_empty());
        Ok(Self {
            code,
            language_hint,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn language_hint(&self) -> Option<&str> {
        self.language_hint.as_deref()
    }
}

/// Syntax category used to pick a highlight colour. Exactly the seven
/// classes of the visual template, plus unstyled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenClass {
    Plain,
    Comment,
    /// Variables, markup tags, selectors, regexps.
    VariableTag,
    /// Numbers, literals, built-ins, types, parameters.
    NumericBuiltin,
    /// Markup attribute names.
    Attribute,
    Str,
    /// Function/class names and section headings.
    TitleSection,
    Keyword,
}

/// One styled run of text. Fragments never contain an interior line break;
/// a line terminator, when present, is the fragment's final characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledFragment {
    pub text: String,
    pub class: TokenClass,
}

/// Highlighter output: the resolved language plus the styled fragment
/// sequence. Concatenating all fragment texts reproduces the (entity-decoded)
/// input exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyledDocument {
    pub detected_language: String,
    pub fragments: Vec<StyledFragment>,
}

/// Heights computed by the layout normalizer, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMetrics {
    /// Trimmed text-block height plus bottom padding, clamped.
    pub text_height: u32,
    /// `text_height` quantized to the height step; drives the scene crop.
    pub canvas_height: u32,
}

/// How the final bytes were produced. The external service degrading to the
/// local encoder is an expected, visible outcome — not a swallowed error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionOutcome {
    /// Compression was not configured; local encoding used.
    Disabled,
    /// The external service supplied the artifact bytes.
    Compressed,
    /// The external call failed and the local encoding was used instead.
    LocalFallback { reason: String },
}

impl CompressionOutcome {
    pub fn is_compressed(&self) -> bool {
        matches!(self, Self::Compressed)
    }
}

/// The finished snapshot: encoded image bytes plus their decoded pixel
/// dimensions. The sole external-facing output of the pipeline.
#[derive(Debug, Clone)]
pub struct FinalArtifact {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub compression: CompressionOutcome,
}

impl FinalArtifact {
    /// Container format of `bytes`.
    pub fn format(&self) -> &'static str {
        "png"
    }

    /// MIME type for media registration by the caller.
    pub fn mime_type(&self) -> &'static str {
        "image/png"
    }
}
