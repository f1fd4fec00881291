mod analysis;
mod auth;
mod config;
mod db;
mod errors;
mod history;
mod journey;
mod llm_client;
mod models;
mod questionnaire;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::advisor::GeminiAdvisor;
use crate::auth::SupabaseAuth;
use crate::config::Config;
use crate::db::{check_connection, create_pool};
use crate::history::HistoryStore;
use crate::llm_client::LlmClient;
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

    info!("Starting Aura API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (journey entries)
    let db = create_pool(&config.database_url)?;
    check_connection(&db).await;

    // Open local recommendation history
    let history = Arc::new(HistoryStore::open(&config.history_dir).await?);

    // Initialize LLM client
    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_api_base.clone(),
    );
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let identity = SupabaseAuth::new(
        config.supabase_url.clone(),
        config.supabase_anon_key.clone(),
    );

    // Build app state
    let state = AppState {
        db: db.clone(),
        advisor: Arc::new(GeminiAdvisor::new(llm)),
        identity: Arc::new(identity),
        history: history.clone(),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins to the deployed front end

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down; flushing recommendation history");
    if let Err(e) = history.flush().await {
        error!("Failed to flush recommendation history: {e}");
    }
    db.close().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM, shutting down");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
