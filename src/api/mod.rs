//! HTTP API surface: three operations over the store and the generator.

pub mod routes;
pub mod server;
pub mod types;

pub use server::{ApiConfig, ApiServer, AppState};
