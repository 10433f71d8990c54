use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roaster::config::{Config, ExtractorBackend};
use roaster::db::create_pool;
use roaster::extraction::{LocalTextExtractor, RemoteTextExtractor, TextExtractor};
use roaster::llm_client::LlmClient;
use roaster::roast::{ChatCompletionBackend, RoastGenerator};
use roaster::routes::build_router;
use roaster::state::AppState;
use roaster::storage::{build_s3_client, S3Storage};
use roaster::store::PgResumeStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roaster API v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgResumeStore::new(db));

    let s3 = build_s3_client(&config).await;
    let storage = Arc::new(S3Storage::new(s3, config.s3_bucket.clone()));
    info!("S3 storage initialized (bucket: {})", config.s3_bucket);

    let extractor: Arc<dyn TextExtractor> = match config.extractor_backend {
        ExtractorBackend::Remote => {
            info!("Text extraction via {}", config.extractor_url);
            Arc::new(RemoteTextExtractor::new(
                config.extractor_url.clone(),
                config.http_timeout,
            ))
        }
        ExtractorBackend::Local => {
            info!("Text extraction in-process");
            Arc::new(LocalTextExtractor)
        }
    };

    let generator = match &config.llm_api_key {
        Some(key) => {
            let llm = LlmClient::new(
                config.llm_provider,
                key.clone(),
                config.llm_model.clone(),
                config.http_timeout,
            );
            info!("LLM client initialized ({}, model: {})", config.llm_provider, llm.model());
            RoastGenerator::new(Arc::new(ChatCompletionBackend::new(
                config.llm_provider.to_string(),
                llm,
            )))
        }
        None => {
            info!(
                "{} not set; roasts will use the canned fallback",
                config.llm_provider.api_key_var()
            );
            RoastGenerator::fallback_only()
        }
    };

    let state = AppState {
        store,
        storage,
        extractor,
        generator,
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
