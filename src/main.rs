//! Infinite Buttons - a discovery game over a lazily grown tree
//!
//! Every node's children are invented by an LLM the first time anyone opens
//! it and persisted for everyone after. Players walk the tree through an
//! alternating two-phase menu delivered by a chat transport.

mod api;
mod config;
mod db;
mod engine;
mod error;
mod generator;
mod interaction;
mod llm;
mod menu;
mod records;
mod session;
mod store;
#[cfg(test)]
mod testing;
mod tree;

use api::{create_router, AppState};
use config::Config;
use db::Database;
use engine::{DiscoveryEngine, ProductionEngine};
use generator::LlmGenerator;
use llm::LlmConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use store::DatabaseStorage;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "infinite_buttons=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env();

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let llm_config = LlmConfig::from_env();
    let llm = llm::build_service(&llm_config).inspect_err(|e| {
        tracing::error!(error = %e, "No LLM configured. Set LLM_API_KEY (and LLM_BASE_URL).");
    })?;
    tracing::info!(
        provider = ?llm_config.provider,
        model = %llm.model_id(),
        max_attempts = llm_config.max_attempts,
        "LLM generator initialized"
    );

    let generator = LlmGenerator::new(llm, llm_config.max_attempts, llm_config.timeout);
    let engine: ProductionEngine = DiscoveryEngine::new(DatabaseStorage::new(db), generator)
        .with_max_age(config.max_interaction_age);

    if config.secret_token.is_none() {
        tracing::warn!("BOT_SECRET_TOKEN not set; /interactions accepts unauthenticated requests");
    }
    let state = AppState::new(Arc::new(engine), config.secret_token.clone());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Infinite Buttons listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
