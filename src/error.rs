//! Error types for the RAG service

use thiserror::Error;

/// Top-level service error type
#[derive(Error, Debug, Clone)]
pub enum ServiceError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Document store errors
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Storage backend error: {reason}")]
    Backend { reason: String },

    #[error("Embedding failed: {reason}")]
    Embedding { reason: String },

    #[error("Store not initialized: call initialize() first")]
    NotInitialized,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Generation backend errors
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Generation backend returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}
