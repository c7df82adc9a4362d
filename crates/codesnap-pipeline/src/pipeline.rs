// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The snapshot pipeline: strictly sequential stage chain from snippet text
// to finished PNG artifact. Each stage's output is the sole input of the
// next; the only branch is the compression fallback at the very end.

use std::time::Instant;

use tracing::{debug, info, instrument, warn};

use codesnap_core::{
    CompressionOutcome, FinalArtifact, Result, SnapshotConfig, SnippetInput,
};
use codesnap_highlight::Highlighter;
use codesnap_render::{FontAssets, compose, rasterize};
use codesnap_scene::{SceneAssets, compose_scene, decode_dimensions, encode_png, normalize};

use crate::tinify::CompressionClient;

/// One configured snapshot pipeline.
///
/// Construction loads the read-only assets (grammar set, fonts, scene
/// images) once; `generate` may then be called concurrently — every
/// invocation works on its own intermediate buffers.
pub struct SnapshotPipeline {
    config: SnapshotConfig,
    highlighter: Highlighter,
    fonts: FontAssets,
    assets: SceneAssets,
    compressor: Option<CompressionClient>,
}

impl SnapshotPipeline {
    pub fn new(config: SnapshotConfig) -> Result<Self> {
        let fonts = FontAssets::load(&config.assets.font_files, &config.theme.font_family)?;
        let assets = SceneAssets::load(&config.assets, &config.scene, &config.layout)?;
        let compressor = if config.compression.is_active() {
            Some(CompressionClient::new(config.compression.clone())?)
        } else {
            None
        };
        let highlighter = Highlighter::new(config.detection.clone());

        info!(
            fonts = fonts.font_count(),
            compression = compressor.is_some(),
            "snapshot pipeline ready"
        );
        Ok(Self {
            config,
            highlighter,
            fonts,
            assets,
            compressor,
        })
    }

    /// Generate a snapshot artifact for one snippet.
    pub fn generate(&self, input: &SnippetInput) -> Result<FinalArtifact> {
        self.run(input, None)
    }

    /// Generate with a caller-supplied deadline. The deadline is honored at
    /// minimum by the external compression stage; an exhausted deadline
    /// degrades compression to the local fallback rather than failing.
    pub fn generate_with_deadline(
        &self,
        input: &SnippetInput,
        deadline: Instant,
    ) -> Result<FinalArtifact> {
        self.run(input, Some(deadline))
    }

    // Failure logs carry the language hint and code length, never the code.
    #[instrument(
        skip(self, input, deadline),
        fields(code_len = input.code().len(), hint = input.language_hint().unwrap_or(""))
    )]
    fn run(&self, input: &SnippetInput, deadline: Option<Instant>) -> Result<FinalArtifact> {
        self.stages(input, deadline)
            .inspect_err(|err| warn!(error = %err, "snapshot generation failed"))
    }

    fn stages(&self, input: &SnippetInput, deadline: Option<Instant>) -> Result<FinalArtifact> {
        let styled = self
            .highlighter
            .highlight(input.code(), input.language_hint())?;
        debug!(language = styled.detected_language.as_str(), "snippet highlighted");

        let document = compose(&styled, &self.config.theme, &self.config.page)?;
        let raster = rasterize(&document, &self.fonts, &self.config.page)?;
        let (text_image, metrics) = normalize(raster, &self.config.layout)?;
        let scene = compose_scene(
            text_image,
            metrics.canvas_height,
            &self.assets,
            &self.config.scene,
        )?;

        let local = encode_png(&scene)?;
        // The network call must not keep raster buffers alive.
        drop(scene);

        let (bytes, compression) = match &self.compressor {
            None => (local, CompressionOutcome::Disabled),
            Some(compressor) => match compressor.compress(&local, deadline) {
                Ok(compressed) => (compressed, CompressionOutcome::Compressed),
                Err(err) => {
                    warn!(error = %err, "compression service failed; using local encoding");
                    (
                        local,
                        CompressionOutcome::LocalFallback {
                            reason: err.to_string(),
                        },
                    )
                }
            },
        };

        let (width, height) = decode_dimensions(&bytes)?;
        info!(
            width,
            height,
            canvas_height = metrics.canvas_height,
            compressed = compression.is_compressed(),
            "snapshot generated"
        );
        Ok(FinalArtifact {
            bytes,
            width,
            height,
            compression,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesnap_core::SnapError;

    fn fonts_available() -> bool {
        FontAssets::load(&[], "monospace")
            .map(|fonts| fonts.font_count() > 0)
            .unwrap_or(false)
    }

    fn sample_input() -> SnippetInput {
        SnippetInput::new(
            "<?php\nfunction hello() {\n    return \"world\";\n}\n",
            Some("php".into()),
        )
        .unwrap()
    }

    #[test]
    fn empty_input_never_reaches_the_pipeline() {
        assert!(matches!(
            SnippetInput::new("   ", None),
            Err(SnapError::EmptyInput)
        ));
    }

    #[test]
    fn generation_is_deterministic_without_compression() {
        if !fonts_available() {
            return;
        }
        let pipeline = SnapshotPipeline::new(SnapshotConfig::default()).unwrap();
        let input = sample_input();

        let first = pipeline.generate(&input).unwrap();
        let second = pipeline.generate(&input).unwrap();

        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.compression, CompressionOutcome::Disabled);
    }

    #[test]
    fn artifact_has_the_template_dimensions() {
        if !fonts_available() {
            return;
        }
        let pipeline = SnapshotPipeline::new(SnapshotConfig::default()).unwrap();
        let artifact = pipeline.generate(&sample_input()).unwrap();

        assert_eq!(artifact.width, 1800);
        assert!(artifact.height >= 160 + 240);
        assert!(artifact.height <= 560 + 240);
        assert_eq!((artifact.height - 240) % 80, 0);
        assert_eq!(artifact.format(), "png");
    }

    #[test]
    fn failed_compression_falls_back_to_local_bytes() {
        if !fonts_available() {
            return;
        }
        let mut config = SnapshotConfig::default();
        config.compression.enabled = true;
        config.compression.api_key = "test-key".into();
        config.compression.endpoint = "http://127.0.0.1:9/shrink".into();
        config.compression.timeout_secs = 1;

        let with_compression = SnapshotPipeline::new(config).unwrap();
        let without = SnapshotPipeline::new(SnapshotConfig::default()).unwrap();
        let input = sample_input();

        let fallback = with_compression.generate(&input).unwrap();
        let local = without.generate(&input).unwrap();

        assert!(matches!(
            fallback.compression,
            CompressionOutcome::LocalFallback { .. }
        ));
        assert_eq!(fallback.bytes, local.bytes);
        assert_eq!(fallback.width, 1800);
    }

    #[test]
    fn exhausted_deadline_degrades_to_local_encoding() {
        if !fonts_available() {
            return;
        }
        let mut config = SnapshotConfig::default();
        config.compression.enabled = true;
        config.compression.api_key = "test-key".into();
        config.compression.endpoint = "http://127.0.0.1:9/shrink".into();
        config.compression.timeout_secs = 1;

        let pipeline = SnapshotPipeline::new(config).unwrap();
        let artifact = pipeline
            .generate_with_deadline(&sample_input(), Instant::now())
            .unwrap();

        match artifact.compression {
            CompressionOutcome::LocalFallback { ref reason } => {
                assert!(reason.contains("deadline"), "reason: {reason}")
            }
            ref other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(artifact.width, 1800);
    }
}
