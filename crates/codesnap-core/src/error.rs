// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Codesnap.

use thiserror::Error;

/// Top-level error type for all Codesnap operations.
///
/// Every variant except `CompressionService` is terminal for the invocation
/// that raised it: the pipeline aborts and returns no artifact. A
/// `CompressionService` failure is recovered by falling back to the locally
/// encoded PNG and is never surfaced to the caller as a pipeline error.
#[derive(Debug, Error)]
pub enum SnapError {
    // -- Input errors --
    #[error("code snippet is empty")]
    EmptyInput,

    // -- Highlighting errors --
    #[error("highlighting failed: {0}")]
    Highlight(String),

    // -- Rendering errors --
    #[error("document rendering failed: {0}")]
    Render(String),

    #[error("rasterization failed: {0}")]
    Rasterization(String),

    #[error("image processing failed: {0}")]
    Image(String),

    // -- Asset errors --
    #[error("asset loading failed: {0}")]
    Asset(String),

    // -- External compression (recovered, never terminal) --
    #[error("compression service error: {0}")]
    CompressionService(String),

    // -- I/O and serialization --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SnapError>;
