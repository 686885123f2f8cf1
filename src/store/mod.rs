//! Document storage over an embedded vector database.
//!
//! The store owns both halves of retrieval: embedding text and
//! nearest-neighbor search over the persisted collection. Callers pass
//! text in and get text back.

pub mod embedding;
pub mod lance;

use async_trait::async_trait;

use crate::error::StoreError;

pub use embedding::{
    create_embedder, Embedder, EmbeddingConfig, EmbeddingProvider, HashEmbedder, OllamaEmbedder,
};
pub use lance::{LanceStore, LanceStoreConfig};

/// A unit of stored knowledge.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub text: String,
}

/// Persistent document storage with nearest-neighbor retrieval.
///
/// Implementations embed text internally; callers never see a vector.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Open or create the backing collection. Get-or-create: safe to call
    /// repeatedly and across process restarts.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Insert `text` under the caller-supplied `id`. No uniqueness check.
    async fn add(&self, id: &str, text: &str) -> Result<(), StoreError>;

    /// Return up to `limit` documents nearest to `query`, nearest first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Document>, StoreError>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize, StoreError>;
}
