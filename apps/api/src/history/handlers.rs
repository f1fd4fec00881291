use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::errors::AppError;
use crate::history::HistoryEntry;
use crate::routes::ConfirmQuery;
use crate::state::AppState;

/// GET /api/v1/history
pub async fn handle_list_history(State(state): State<AppState>) -> Json<Vec<HistoryEntry>> {
    Json(state.history.list().await)
}

/// DELETE /api/v1/history/:id
pub async fn handle_delete_history_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.history.delete(&id).await? {
        info!("Deleted history entry {id}");
    }
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/history?confirm=true
pub async fn handle_clear_history(
    State(state): State<AppState>,
    confirm: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(confirm) = confirm?;
    confirm.require("Clearing all history")?;
    state.history.clear().await?;
    info!("Recommendation history cleared");
    Ok(StatusCode::NO_CONTENT)
}
