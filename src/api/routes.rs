//! Request handlers for the three service operations.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::api::server::AppState;
use crate::api::types::{
    AddRequest, AddResponse, ErrorResponse, HealthResponse, QueryRequest, QueryResponse,
};
use crate::config;
use crate::error::ServiceError;
use crate::llm::build_prompt;

fn internal_error(err: ServiceError) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

/// `POST /query`: answer a question from the single most relevant document.
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorResponse>)> {
    let results = state
        .store
        .search(&request.q, 1)
        .await
        .map_err(|e| internal_error(e.into()))?;

    let context = results
        .first()
        .map(|doc| doc.text.clone())
        .unwrap_or_default();

    // Read per request so the flag can flip without a restart
    if config::mock_llm_enabled() {
        // Return the retrieved context directly, bypassing generation
        return Ok(Json(QueryResponse { answer: context }));
    }

    let prompt = build_prompt(&context, &request.q);
    let answer = state
        .generator
        .generate(&state.settings.model_name, &prompt)
        .await
        .map_err(|e| internal_error(e.into()))?;

    tracing::info!("query asked: {}", request.q);

    Ok(Json(QueryResponse { answer }))
}

/// `POST /add`: insert new content into the knowledge base.
///
/// Insertion failure is reported in the response body under an HTTP
/// success status, not as an error status.
pub async fn add(
    State(state): State<AppState>,
    Json(request): Json<AddRequest>,
) -> Json<AddResponse> {
    let id = Uuid::new_v4().to_string();

    match state.store.add(&id, &request.text).await {
        Ok(()) => {
            tracing::info!("Added content to knowledge base: {}", id);
            Json(AddResponse::success(id))
        }
        Err(e) => {
            tracing::warn!("Failed to add content: {}", e);
            Json(AddResponse::error(e.to_string()))
        }
    }
}

/// `GET /health`: liveness probe. Does not check collaborators.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}
