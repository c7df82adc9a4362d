// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// codesnap-pipeline — The snapshot pipeline itself.
//
// Wires the stages strictly sequentially (highlight → compose → rasterize →
// normalize → composite → encode), runs the optional external compression
// call with its local fallback, and provides the artifact file-output
// helpers that keep snapshot generation idempotent for callers.

mod output;
mod pipeline;
mod tinify;

pub use output::SnapshotWriter;
pub use pipeline::SnapshotPipeline;
pub use tinify::CompressionClient;
