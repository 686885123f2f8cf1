//! Request and response payloads for the HTTP API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Question text.
    pub q: String,
}

/// Response body for `POST /query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// Retrieved context (mock mode) or generated answer.
    pub answer: String,
}

/// Request body for `POST /add`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddRequest {
    /// Document text to insert.
    pub text: String,
}

/// Response body for `POST /add`.
///
/// Insertion failures are reported in the body under an HTTP success
/// status, so both shapes serialize from this one type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AddResponse {
    Success {
        status: String,
        message: String,
        id: String,
    },
    Error {
        status: String,
        /// Existing clients match on this exact truncated key.
        messa: String,
    },
}

impl AddResponse {
    pub fn success(id: String) -> Self {
        Self::Success {
            status: "success".to_string(),
            message: "Content added to knowledge base".to_string(),
            id,
        }
    }

    pub fn error(description: String) -> Self {
        Self::Error {
            status: "error".to_string(),
            messa: description,
        }
    }
}

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error body for failed `/query` requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}
