//! Ollama generation client using the native `/api/generate` endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::GenerationClient;
use crate::error::GenerationError;

/// Request body for `/api/generate`.
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

/// Subset of the `/api/generate` response this client reads.
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
}

/// HTTP client for an Ollama generation backend.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
}

impl OllamaGenerator {
    /// Create a client for the Ollama server at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| {
                GenerationError::Request(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GenerationClient for OllamaGenerator {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(format!("Ollama request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            GenerationError::MalformedResponse(format!("Failed to parse Ollama response: {}", e))
        })?;

        tracing::debug!(
            model,
            prompt_eval_count = parsed.prompt_eval_count,
            eval_count = parsed.eval_count,
            latency = ?start.elapsed(),
            "Generation completed"
        );

        Ok(parsed.response)
    }
}
