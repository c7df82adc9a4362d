// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// codesnap-highlight — Syntax highlighting for the Codesnap renderer.
//
// Turns raw snippet text into a `StyledDocument`: entity-decodes pre-encoded
// content, resolves the grammar from the caller's hint or a bounded
// autodetection allow-list, and emits styled fragments whose boundaries
// preserve the original line breaks.

mod classify;
mod detect;
mod highlighter;

pub use highlighter::Highlighter;
