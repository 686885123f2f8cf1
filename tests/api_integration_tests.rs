//! End-to-end tests for the HTTP surface.
//!
//! Each test boots the full server on an OS-assigned port and drives it
//! with reqwest. The store is a real embedded LanceDB instance in a temp
//! directory with the deterministic hash embedder; tests that read the
//! mock-mode flag are serialized because the environment is process-global.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ragserve::api::{ApiConfig, ApiServer, AppState};
use ragserve::config::Settings;
use ragserve::error::{GenerationError, StoreError};
use ragserve::llm::GenerationClient;
use ragserve::store::{Document, DocumentStore, HashEmbedder, LanceStore, LanceStoreConfig};
use serial_test::serial;
use tempfile::TempDir;
use tokio::time::timeout;

/// Generator standing in for an unreachable backend.
struct NoopGenerator;

#[async_trait]
impl GenerationClient for NoopGenerator {
    async fn generate(&self, _model: &str, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Request("no backend in tests".to_string()))
    }
}

/// Store standing in for an unavailable backing database.
struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        Ok(())
    }
    async fn add(&self, _id: &str, _text: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend {
            reason: "store unavailable".to_string(),
        })
    }
    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<Document>, StoreError> {
        Err(StoreError::Backend {
            reason: "store unavailable".to_string(),
        })
    }
    async fn count(&self) -> Result<usize, StoreError> {
        Ok(0)
    }
}

async fn lance_state(tmp: &TempDir) -> AppState {
    let store = LanceStore::new(
        LanceStoreConfig {
            data_path: tmp.path().to_path_buf(),
            collection_name: "docs".to_string(),
        },
        Arc::new(HashEmbedder::new(32)),
    )
    .await
    .expect("store should open");
    store.initialize().await.expect("store should initialize");

    AppState {
        store: Arc::new(store),
        generator: Arc::new(NoopGenerator),
        settings: Arc::new(Settings::default()),
    }
}

fn failing_state() -> AppState {
    AppState {
        store: Arc::new(FailingStore),
        generator: Arc::new(NoopGenerator),
        settings: Arc::new(Settings::default()),
    }
}

/// Boot the server on a free port and return its base URL.
async fn start_server(state: AppState) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let server = ApiServer::new(
        ApiConfig {
            bind_address: "127.0.0.1".to_string(),
            port,
            cors_enabled: false,
        },
        state,
    );

    tokio::spawn(async move {
        let _ = server.serve().await;
    });

    // Give the server a moment to bind
    tokio::time::sleep(Duration::from_millis(100)).await;

    format!("http://127.0.0.1:{}", port)
}

async fn post_json(url: String, body: serde_json::Value) -> reqwest::Response {
    let client = reqwest::Client::new();
    timeout(Duration::from_secs(5), client.post(url).json(&body).send())
        .await
        .expect("request timed out")
        .expect("request failed")
}

#[tokio::test]
async fn health_is_ok_even_with_unavailable_collaborators() {
    let base = start_server(failing_state()).await;

    let client = reqwest::Client::new();
    let response = timeout(
        Duration::from_secs(5),
        client.get(format!("{}/health", base)).send(),
    )
    .await
    .expect("request timed out")
    .expect("request failed");

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
#[serial]
async fn add_then_query_round_trip_in_mock_mode() {
    std::env::set_var("USE_MOCK_LLM", "1");

    let tmp = TempDir::new().unwrap();
    let base = start_server(lance_state(&tmp).await).await;

    let response = post_json(
        format!("{}/add", base),
        serde_json::json!({"text": "The sky is blue."}),
    )
    .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Content added to knowledge base");
    assert!(!body["id"].as_str().unwrap().is_empty());

    let response = post_json(
        format!("{}/query", base),
        serde_json::json!({"q": "What color is the sky?"}),
    )
    .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"answer": "The sky is blue."}));
}

#[tokio::test]
#[serial]
async fn mock_query_returns_top1_of_several_documents() {
    std::env::set_var("USE_MOCK_LLM", "1");

    let tmp = TempDir::new().unwrap();
    let base = start_server(lance_state(&tmp).await).await;

    for text in ["Rust is a systems language.", "Bananas are yellow."] {
        let response = post_json(format!("{}/add", base), serde_json::json!({"text": text})).await;
        assert_eq!(response.status(), 200);
    }

    // An exact-text question embeds identically to its document
    let response = post_json(
        format!("{}/query", base),
        serde_json::json!({"q": "Bananas are yellow."}),
    )
    .await;

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["answer"], "Bananas are yellow.");
}

#[tokio::test]
#[serial]
async fn query_empty_collection_returns_empty_answer() {
    std::env::set_var("USE_MOCK_LLM", "1");

    let tmp = TempDir::new().unwrap();
    let base = start_server(lance_state(&tmp).await).await;

    let response = post_json(
        format!("{}/query", base),
        serde_json::json!({"q": "anything"}),
    )
    .await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, serde_json::json!({"answer": ""}));
}

#[tokio::test]
async fn add_returns_distinct_ids_for_identical_text() {
    let tmp = TempDir::new().unwrap();
    let base = start_server(lance_state(&tmp).await).await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = post_json(
            format!("{}/add", base),
            serde_json::json!({"text": "same text"}),
        )
        .await;
        let body: serde_json::Value = response.json().await.unwrap();
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn add_failure_reports_error_in_body_with_success_status() {
    let base = start_server(failing_state()).await;

    let response = post_json(
        format!("{}/add", base),
        serde_json::json!({"text": "doomed"}),
    )
    .await;

    // The error is carried in the body, not the status code
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["messa"].as_str().unwrap().contains("store unavailable"));
    assert!(body.get("message").is_none());
}

#[tokio::test]
async fn query_store_failure_returns_500_with_error_body() {
    let base = start_server(failing_state()).await;

    let response = post_json(
        format!("{}/query", base),
        serde_json::json!({"q": "anything"}),
    )
    .await;

    assert_eq!(response.status(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("store unavailable"));
}
