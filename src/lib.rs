//! Minimal retrieval-augmented generation service.
//!
//! Retrieval is a top-1 nearest-neighbor search over an embedded LanceDB
//! collection; generation is delegated to an Ollama backend. The HTTP
//! surface is three operations: `POST /query`, `POST /add`, `GET /health`.
//!
//! The store and the generation client are injected into the request
//! handlers as trait objects, so both can be replaced with fakes in tests.

pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod store;

pub use api::{ApiConfig, ApiServer, AppState};
pub use config::Settings;
pub use error::{GenerationError, ServiceError, StoreError};
