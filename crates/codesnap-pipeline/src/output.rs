// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Artifact file output. Keeps the snapshot naming contract callers rely on
// for idempotence: `<slug>.png` for locally encoded artifacts,
// `<slug>-min.png` for service-compressed ones, and an exists-check covering
// both so a snapshot is never generated twice for the same slug.

use std::path::{Path, PathBuf};

use tracing::{info, instrument};

use codesnap_core::{FinalArtifact, Result};

/// Writes finished artifacts into an output directory.
pub struct SnapshotWriter {
    dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// True when an artifact for this slug already exists in either form.
    /// Callers should check this before invoking the pipeline at all.
    pub fn exists(&self, slug: &str) -> bool {
        self.plain_path(slug).is_file() || self.compressed_path(slug).is_file()
    }

    /// Write the artifact, creating the output directory if needed.
    #[instrument(skip(self, artifact), fields(bytes = artifact.bytes.len()))]
    pub fn write(&self, artifact: &FinalArtifact, slug: &str) -> Result<PathBuf> {
        let path = if artifact.compression.is_compressed() {
            self.compressed_path(slug)
        } else {
            self.plain_path(slug)
        };

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(&path, &artifact.bytes)?;
        info!(
            path = %path.display(),
            width = artifact.width,
            height = artifact.height,
            "snapshot written"
        );
        Ok(path)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn plain_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.png"))
    }

    fn compressed_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}-min.png"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codesnap_core::CompressionOutcome;

    fn artifact(compression: CompressionOutcome) -> FinalArtifact {
        FinalArtifact {
            bytes: vec![0x89, b'P', b'N', b'G'],
            width: 1800,
            height: 400,
            compression,
        }
    }

    #[test]
    fn local_artifacts_get_the_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        let path = writer
            .write(&artifact(CompressionOutcome::Disabled), "my-post")
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "my-post.png");
        assert!(path.is_file());
    }

    #[test]
    fn compressed_artifacts_get_the_min_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        let path = writer
            .write(&artifact(CompressionOutcome::Compressed), "my-post")
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "my-post-min.png");
    }

    #[test]
    fn fallback_artifacts_use_the_plain_name() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        let path = writer
            .write(
                &artifact(CompressionOutcome::LocalFallback {
                    reason: "quota".into(),
                }),
                "my-post",
            )
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "my-post.png");
    }

    #[test]
    fn exists_covers_both_name_forms() {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::new(dir.path());
        assert!(!writer.exists("my-post"));

        writer
            .write(&artifact(CompressionOutcome::Compressed), "my-post")
            .unwrap();
        assert!(writer.exists("my-post"));
        assert!(!writer.exists("other-post"));
    }

    #[test]
    fn missing_directory_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("uploads").join("2026").join("08");
        let writer = SnapshotWriter::new(&nested);
        let path = writer
            .write(&artifact(CompressionOutcome::Disabled), "deep")
            .unwrap();
        assert!(path.is_file());
    }
}
