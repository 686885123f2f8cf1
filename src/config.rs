//! Process configuration resolved from environment variables.
//!
//! `MODEL_NAME` is read once at startup into [`Settings`]. `USE_MOCK_LLM`
//! is intentionally not a settings field: it is re-read on every query so
//! the flag can flip without a restart.

use std::path::PathBuf;

/// Service settings, read once at process start.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Generation backend model identifier.
    pub model_name: String,
    /// Base URL of the Ollama generation backend.
    pub ollama_base_url: String,
    /// Directory holding the vector store data.
    pub data_dir: PathBuf,
    /// Vector collection name.
    pub collection_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_name: "llama3.1:8b".to_string(),
            ollama_base_url: "http://localhost:11434".to_string(),
            data_dir: PathBuf::from("./db"),
            collection_name: "docs".to_string(),
        }
    }
}

impl Settings {
    /// Resolve settings from the process environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(model) = std::env::var("MODEL_NAME") {
            if !model.is_empty() {
                settings.model_name = model;
            }
        }

        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            if !url.is_empty() {
                settings.ollama_base_url = url.trim_end_matches('/').to_string();
            }
        }

        if let Ok(dir) = std::env::var("RAG_DATA_DIR") {
            if !dir.is_empty() {
                settings.data_dir = PathBuf::from(dir);
            }
        }

        settings
    }
}

/// Whether mock mode is enabled for the current request.
///
/// Compares `USE_MOCK_LLM` against the literal `"1"`; any other value or
/// absence disables mock mode.
pub fn mock_llm_enabled() -> bool {
    std::env::var("USE_MOCK_LLM")
        .map(|v| v == "1")
        .unwrap_or(false)
}
