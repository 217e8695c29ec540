use crate::api::streaming::{read_generate_stream, Completion, StreamOptions};
use crate::api::InferenceError;
use crate::models::GenerateRequest;
use colored::*;
use std::io::Write;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    /// Budget for the `/api/tags` liveness probe.
    pub probe_timeout: Duration,
    /// Budget for the whole generate call, body included.
    pub request_timeout: Duration,
    /// Longest allowed gap between two streamed chunks.
    pub chunk_timeout: Duration,
    pub verbose: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(120),
            chunk_timeout: Duration::from_secs(60),
            verbose: false,
        }
    }
}

/// Client for a locally hosted Ollama-compatible server.
///
/// Every call is a single attempt: there are no retries, and any failure
/// ends the attempt with an [`InferenceError`].
pub struct OllamaClient {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl OllamaClient {
    pub fn new(settings: ClientSettings) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.probe_timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client, settings }
    }

    pub fn base_url(&self) -> &str {
        self.settings.base_url.trim_end_matches('/')
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// Liveness check against `GET /api/tags`.
    pub async fn probe(&self) -> Result<(), InferenceError> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .timeout(self.settings.probe_timeout)
            .send()
            .await
            .map_err(|e| InferenceError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(InferenceError::Unavailable(format!(
                "probe answered {}",
                response.status()
            )))
        }
    }

    /// Stream `POST /api/generate`, echoing fragments to `out` after `speaker`.
    pub async fn generate<W: Write>(
        &self,
        request: &GenerateRequest,
        speaker: &str,
        out: &mut W,
    ) -> Result<Completion, InferenceError> {
        let request_timeout = self.settings.request_timeout;
        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(request)
            .timeout(request_timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    InferenceError::Timeout(request_timeout)
                } else {
                    InferenceError::Network(e)
                }
            })?;

        if self.settings.verbose {
            eprintln!(
                "{}",
                format!("[veo] Response status: {}", response.status()).dimmed()
            );
        }

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(InferenceError::Status { status, message });
        }

        let options = StreamOptions {
            speaker,
            chunk_timeout: self.settings.chunk_timeout,
            request_timeout,
            verbose: self.settings.verbose,
        };
        read_generate_stream(Box::pin(response.bytes_stream()), &options, out).await
    }

    /// Probe, then generate. The generate call is never made when the probe fails.
    pub async fn ask<W: Write>(
        &self,
        request: &GenerateRequest,
        speaker: &str,
        out: &mut W,
    ) -> Result<Completion, InferenceError> {
        self.probe().await?;
        if self.settings.verbose {
            eprintln!(
                "{}",
                format!("[veo] {} is up, using model {}", self.base_url(), request.model)
                    .dimmed()
            );
        }
        self.generate(request, speaker, out).await
    }
}
