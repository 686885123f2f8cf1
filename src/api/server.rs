//! HTTP server assembly and startup.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::api::routes;
use crate::config::Settings;
use crate::error::ServiceError;
use crate::llm::GenerationClient;
use crate::store::DocumentStore;

/// Configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address to bind to.
    pub bind_address: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable permissive CORS.
    pub cors_enabled: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8000,
            cors_enabled: true,
        }
    }
}

/// Shared state injected into every handler.
///
/// Collaborators are trait objects so tests can substitute fakes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub generator: Arc<dyn GenerationClient>,
    pub settings: Arc<Settings>,
}

/// The HTTP API server.
pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    pub fn new(config: ApiConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut app = Router::new()
            .route("/query", post(routes::query))
            .route("/add", post(routes::add))
            .route("/health", get(routes::health))
            .layer(TraceLayer::new_for_http());

        if self.config.cors_enabled {
            app = app.layer(CorsLayer::permissive());
        }

        app.with_state(self.state.clone())
    }

    /// Bind and serve until the process is terminated.
    pub async fn serve(self) -> Result<(), ServiceError> {
        let addr = format!("{}:{}", self.config.bind_address, self.config.port);
        let app = self.router();

        tracing::info!("Starting server on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ServiceError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

        axum::serve(listener, app.into_make_service())
            .await
            .map_err(|e| ServiceError::Internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}
