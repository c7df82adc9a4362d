// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Codesnap — command-line driver.
//
// Reads a source file, runs the snapshot pipeline, and writes the resulting
// PNG next to an idempotence check: an existing artifact for the slug is
// never regenerated.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use codesnap_core::{SnapshotConfig, SnapshotId, SnippetInput};
use codesnap_pipeline::{SnapshotPipeline, SnapshotWriter};

#[derive(Debug, Parser)]
#[command(name = "codesnap", about = "Render a source-code snippet into a PNG snapshot card")]
struct Args {
    /// Source file to render.
    #[arg(long)]
    input: PathBuf,

    /// Language hint (grammar name or file extension). Autodetected when
    /// omitted.
    #[arg(long)]
    lang: Option<String>,

    /// Output directory for the artifact.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Artifact slug; defaults to a content-derived identifier.
    #[arg(long)]
    slug: Option<String>,

    /// JSON pipeline configuration file; defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable external compression with this API key.
    #[arg(long)]
    tinify_key: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config: SnapshotConfig = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("cannot read config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("cannot parse config {}", path.display()))?
        }
        None => SnapshotConfig::default(),
    };
    if let Some(key) = args.tinify_key {
        config.compression.enabled = true;
        config.compression.api_key = key;
    }

    let code = std::fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let input = SnippetInput::new(code, args.lang)?;

    let slug = args
        .slug
        .unwrap_or_else(|| SnapshotId::derive(input.code()).to_string());
    let writer = SnapshotWriter::new(&args.out);
    if writer.exists(&slug) {
        tracing::info!(slug = %slug, "artifact already exists; nothing to do");
        return Ok(());
    }

    let pipeline = SnapshotPipeline::new(config)?;
    let artifact = pipeline.generate(&input)?;
    let path = writer.write(&artifact, &slug)?;

    println!("{}", path.display());
    Ok(())
}
