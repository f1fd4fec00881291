use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::advisor::SkinAdvisor;
use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::history::HistoryStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Journey entries live here.
    pub db: PgPool,
    /// Pluggable AI backend. Default: GeminiAdvisor.
    pub advisor: Arc<dyn SkinAdvisor>,
    pub identity: Arc<dyn IdentityProvider>,
    /// Opened at startup, flushed on shutdown.
    pub history: Arc<HistoryStore>,
    pub config: Config,
}
