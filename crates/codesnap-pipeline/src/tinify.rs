// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External lossless-compression client (Tinify-style shrink API): upload the
// PNG, then download the compressed result. One attempt, no retries — any
// failure here is recovered by the caller's local-encode fallback.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use codesnap_core::config::CompressionConfig;
use codesnap_core::{Result, SnapError};

/// Shrink-endpoint response body.
#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: ShrinkOutput,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    url: String,
}

/// Blocking HTTP client for the compression service.
///
/// Every call is bounded by the configured timeout and, when present, the
/// caller's deadline — whichever is tighter. The client holds no image state;
/// buffers are borrowed only for the duration of the upload.
pub struct CompressionClient {
    client: Client,
    config: CompressionConfig,
}

impl CompressionClient {
    pub fn new(config: CompressionConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| {
                SnapError::CompressionService(format!("failed to build HTTP client: {err}"))
            })?;
        Ok(Self { client, config })
    }

    /// Compress `png` through the external service, returning the compressed
    /// bytes. All failure modes map to `CompressionService`; the caller turns
    /// that into a local-encode fallback rather than a pipeline error.
    #[instrument(skip(self, png, deadline), fields(upload_bytes = png.len()))]
    pub fn compress(&self, png: &[u8], deadline: Option<Instant>) -> Result<Vec<u8>> {
        let budget = self.remaining_budget(deadline)?;

        let response = self
            .client
            .post(&self.config.endpoint)
            .basic_auth("api", Some(&self.config.api_key))
            .timeout(budget)
            .body(png.to_vec())
            .send()
            .map_err(|err| SnapError::CompressionService(format!("shrink request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnapError::CompressionService(format!(
                "shrink request rejected: {status}"
            )));
        }

        let body = response.text().map_err(|err| {
            SnapError::CompressionService(format!("shrink response unreadable: {err}"))
        })?;
        let shrink: ShrinkResponse = serde_json::from_str(&body).map_err(|err| {
            SnapError::CompressionService(format!("shrink response malformed: {err}"))
        })?;
        debug!(output_url = shrink.output.url.as_str(), "shrink accepted");

        // The result download gets whatever budget the upload left over.
        let budget = self.remaining_budget(deadline)?;
        let result = self
            .client
            .get(&shrink.output.url)
            .basic_auth("api", Some(&self.config.api_key))
            .timeout(budget)
            .send()
            .map_err(|err| SnapError::CompressionService(format!("result download failed: {err}")))?;

        let status = result.status();
        if !status.is_success() {
            return Err(SnapError::CompressionService(format!(
                "result download rejected: {status}"
            )));
        }

        let bytes = result.bytes().map_err(|err| {
            SnapError::CompressionService(format!("result body unreadable: {err}"))
        })?;
        debug!(compressed_bytes = bytes.len(), "compression complete");
        Ok(bytes.to_vec())
    }

    /// Tighter of the configured timeout and the caller's remaining deadline.
    fn remaining_budget(&self, deadline: Option<Instant>) -> Result<Duration> {
        let configured = Duration::from_secs(self.config.timeout_secs);
        let Some(deadline) = deadline else {
            return Ok(configured);
        };
        match deadline.checked_duration_since(Instant::now()) {
            Some(remaining) if !remaining.is_zero() => Ok(configured.min(remaining)),
            _ => Err(SnapError::CompressionService(
                "deadline exhausted before the compression call".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: &str) -> CompressionConfig {
        CompressionConfig {
            enabled: true,
            api_key: "test-key".into(),
            endpoint: endpoint.into(),
            timeout_secs: 1,
        }
    }

    #[test]
    fn unreachable_service_is_a_compression_error() {
        let client = CompressionClient::new(config("http://127.0.0.1:9/shrink")).unwrap();
        let result = client.compress(b"png bytes", None);
        assert!(matches!(result, Err(SnapError::CompressionService(_))));
    }

    #[test]
    fn exhausted_deadline_short_circuits_without_network() {
        let client = CompressionClient::new(config("http://127.0.0.1:9/shrink")).unwrap();
        let deadline = Instant::now();
        let result = client.compress(b"png bytes", Some(deadline));
        match result {
            Err(SnapError::CompressionService(reason)) => {
                assert!(reason.contains("deadline"), "reason: {reason}")
            }
            other => panic!("expected compression error, got {other:?}"),
        }
    }

    #[test]
    fn live_deadline_tightens_the_timeout() {
        let client = CompressionClient::new(config("http://127.0.0.1:9/shrink")).unwrap();
        let budget = client
            .remaining_budget(Some(Instant::now() + Duration::from_millis(100)))
            .unwrap();
        assert!(budget <= Duration::from_millis(100));
    }
}
