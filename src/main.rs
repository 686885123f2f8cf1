//! Service entry point: wire up the store, the generator, and the server.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ragserve::api::{ApiConfig, ApiServer, AppState};
use ragserve::config::Settings;
use ragserve::llm::OllamaGenerator;
use ragserve::store::{
    create_embedder, DocumentStore, EmbeddingConfig, LanceStore, LanceStoreConfig,
};

#[derive(Parser)]
#[command(name = "ragserve", version, about = "Retrieval-augmented generation service")]
struct Args {
    /// Address to bind the HTTP server to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// Vector store data directory (overrides RAG_DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let args = Args::parse();

    let mut settings = Settings::from_env();
    if let Some(data_dir) = args.data_dir {
        settings.data_dir = data_dir;
    }
    tracing::info!("Using model: {}", settings.model_name);

    let embedding_config = EmbeddingConfig::from_env(&settings.ollama_base_url);
    let embedder = create_embedder(&embedding_config)?;

    let store = LanceStore::new(
        LanceStoreConfig {
            data_path: settings.data_dir.clone(),
            collection_name: settings.collection_name.clone(),
        },
        embedder,
    )
    .await?;
    store.initialize().await?;

    let document_count = store.count().await?;
    tracing::info!(
        "Collection '{}' ready with {} document(s)",
        settings.collection_name,
        document_count
    );

    let generator = OllamaGenerator::new(&settings.ollama_base_url)?;

    let state = AppState {
        store: Arc::new(store),
        generator: Arc::new(generator),
        settings: Arc::new(settings),
    };

    let server = ApiServer::new(
        ApiConfig {
            bind_address: args.host,
            port: args.port,
            cors_enabled: true,
        },
        state,
    );

    server.serve().await?;

    Ok(())
}
