//! Embedding providers used by the document store.
//!
//! The store embeds text internally; nothing outside the store module ever
//! handles a raw vector. Supports Ollama (local HTTP) and a deterministic
//! hash embedder that needs no external service.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;

/// Vector dimension of the hash embedder.
pub const HASH_DIMENSION: usize = 384;

/// Embedding provider selection
#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingProvider {
    Ollama,
    Hash,
}

/// Configuration for the embedding provider
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub base_url: String,
    pub dimension: usize,
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: EmbeddingProvider::Hash,
            model: "nomic-embed-text".to_string(),
            base_url: "http://localhost:11434".to_string(),
            dimension: HASH_DIMENSION,
            timeout_seconds: 30,
        }
    }
}

impl EmbeddingConfig {
    /// Resolve the embedding configuration from environment variables.
    ///
    /// `EMBEDDING_PROVIDER` selects `ollama` or `hash`; anything else, or
    /// nothing, falls back to the hash embedder so the service runs without
    /// an embedding backend. `EMBEDDING_MODEL`, `EMBEDDING_BASE_URL` and
    /// `VECTOR_DIMENSION` override the per-provider defaults.
    /// `default_base_url` is used when `EMBEDDING_BASE_URL` is unset,
    /// so the embedder follows the generation backend host by default.
    pub fn from_env(default_base_url: &str) -> Self {
        let provider = match std::env::var("EMBEDDING_PROVIDER")
            .ok()
            .filter(|p| !p.is_empty())
        {
            Some(p) => match p.to_lowercase().as_str() {
                "ollama" => EmbeddingProvider::Ollama,
                "hash" => EmbeddingProvider::Hash,
                other => {
                    tracing::warn!(
                        "Unknown EMBEDDING_PROVIDER '{}', falling back to hash embedder",
                        other
                    );
                    EmbeddingProvider::Hash
                }
            },
            None => EmbeddingProvider::Hash,
        };

        let default_dim = match provider {
            EmbeddingProvider::Ollama => 768,
            EmbeddingProvider::Hash => HASH_DIMENSION,
        };

        let model = std::env::var("EMBEDDING_MODEL")
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "nomic-embed-text".to_string());

        let base_url = std::env::var("EMBEDDING_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| default_base_url.to_string());

        let dimension = std::env::var("VECTOR_DIMENSION")
            .ok()
            .and_then(|d| d.parse::<usize>().ok())
            .unwrap_or(default_dim);

        Self {
            provider,
            model,
            base_url,
            dimension,
            timeout_seconds: 30,
        }
    }
}

/// Turns text into a fixed-dimension vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate the embedding for `text`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError>;

    /// Dimension of vectors produced by this embedder.
    fn dimension(&self) -> usize;
}

/// Ollama embedding client using the native `/api/embed` endpoint
pub struct OllamaEmbedder {
    client: reqwest::Client,
    model: String,
    base_url: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| StoreError::Embedding {
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dimension: config.dimension,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let url = format!("{}/api/embed", self.base_url);

        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| StoreError::Embedding {
                reason: format!("Ollama request failed: {e}"),
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp.text().await.unwrap_or_default();
            return Err(StoreError::Embedding {
                reason: format!("Ollama returned {status}: {body_text}"),
            });
        }

        let json: serde_json::Value =
            resp.json().await.map_err(|e| StoreError::Embedding {
                reason: format!("Failed to parse Ollama response: {e}"),
            })?;

        let row = json
            .get("embeddings")
            .and_then(|v| v.as_array())
            .and_then(|rows| rows.first())
            .and_then(|row| row.as_array())
            .ok_or_else(|| StoreError::Embedding {
                reason: "Missing 'embeddings' field in Ollama response".to_string(),
            })?;

        row.iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| StoreError::Embedding {
                        reason: "Invalid float in embedding".to_string(),
                    })
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic embedder derived from the text bytes, L2-normalized.
///
/// Identical text always embeds identically, so a stored document is its
/// own nearest neighbor. Not a semantic embedding; it exists so the
/// service and its mock-mode tests run with no external dependencies.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, StoreError> {
        let text_bytes = text.as_bytes();
        if text_bytes.is_empty() {
            return Ok(vec![0.0; self.dimension]);
        }

        let mut embedding = vec![0.0; self.dimension];
        for (i, val) in embedding.iter_mut().enumerate() {
            let byte_val = text_bytes[i % text_bytes.len()];
            *val = (byte_val as f32 / 255.0) * 2.0 - 1.0;
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build the configured embedder.
pub fn create_embedder(config: &EmbeddingConfig) -> Result<Arc<dyn Embedder>, StoreError> {
    match config.provider {
        EmbeddingProvider::Ollama => {
            tracing::info!(
                model = %config.model,
                url = %config.base_url,
                dimension = config.dimension,
                "Using Ollama embedder"
            );
            Ok(Arc::new(OllamaEmbedder::new(config)?))
        }
        EmbeddingProvider::Hash => {
            tracing::info!(
                dimension = config.dimension,
                "Using deterministic hash embedder"
            );
            Ok(Arc::new(HashEmbedder::new(config.dimension)))
        }
    }
}
