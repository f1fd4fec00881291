use std::time::Duration;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{info, warn};

/// Creates the PostgreSQL pool for the journey table.
///
/// The pool connects lazily so analysis and history keep working while the
/// database is unreachable; journey requests then fail individually.
pub fn create_pool(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect_lazy(database_url)?;
    Ok(pool)
}

/// Logs whether the database answers. Never fails startup.
pub async fn check_connection(pool: &PgPool) {
    info!("Checking PostgreSQL connection...");
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => info!("PostgreSQL connection established"),
        Err(e) => warn!("PostgreSQL unavailable, journey endpoints will fail: {e}"),
    }
}
