mod config;
mod db;
mod errors;
mod extraction;
mod llm_client;
mod pipeline;
mod records;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::extraction::catalogue::default_catalogue;
use crate::llm_client::LlmClient;
use crate::pipeline::ResumeProcessor;
use crate::records::PgRecordStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume parser v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgRecordStore::new(db));

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(
        config.anthropic_api_key.clone(),
        config.llm_model.clone(),
    ));
    info!("LLM client initialized (model: {})", llm.model());

    let catalogue = default_catalogue();
    info!("Field catalogue loaded ({} fields)", catalogue.specs().len());

    let settings = config.processor_settings();
    info!(
        "Processor settings: merge_policy={:?} batch_size={} max_workers={} update_max_retries={} max_resume_chars={}",
        settings.merge_policy,
        settings.batch_size,
        settings.max_workers,
        settings.update_max_retries,
        settings.max_resume_chars
    );
    let processor = Arc::new(ResumeProcessor::new(llm, store, catalogue, settings));

    // Build app state
    let state = AppState {
        processor,
        catalogue,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
