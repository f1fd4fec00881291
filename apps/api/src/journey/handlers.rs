use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use base64::Engine;
use serde::Deserialize;
use uuid::Uuid;

use crate::analysis::products::ProductRecommendations;
use crate::analysis::skin::SkinAnalysisResult;
use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::journey::store::{delete_entry, insert_entry, list_entries, NewJourneyEntry};
use crate::models::journey::JourneyEntryRow;
use crate::routes::ConfirmQuery;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJourneyRequest {
    /// Base64 image, optionally as a `data:image/...;base64,` URL.
    pub image_data: String,
    pub analysis_result: SkinAnalysisResult,
    pub recommendations: Option<ProductRecommendations>,
}

/// Strips a data-URL prefix and checks the remainder is non-empty base64.
fn normalize_image_data(raw: &str) -> Result<&str, AppError> {
    let raw = raw.trim();
    let payload = match raw.strip_prefix("data:") {
        Some(rest) => {
            let (meta, data) = rest.split_once(',').ok_or_else(|| {
                AppError::Validation("image_data is not a valid data URL".to_string())
            })?;
            if !meta.starts_with("image/") || !meta.ends_with(";base64") {
                return Err(AppError::Validation(
                    "image_data must be a base64 image".to_string(),
                ));
            }
            data
        }
        None => raw,
    };

    if payload.is_empty() {
        return Err(AppError::Validation("Please upload an image first.".to_string()));
    }
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|_| AppError::Validation("image_data is not valid base64".to_string()))?;
    Ok(payload)
}

/// POST /api/v1/journey
pub async fn handle_create_journey_entry(
    State(state): State<AppState>,
    user: AuthUser,
    payload: Result<Json<CreateJourneyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<JourneyEntryRow>), AppError> {
    let Json(req) = payload?;
    let image_data = normalize_image_data(&req.image_data)?;
    let row = insert_entry(
        &state.db,
        user.id,
        NewJourneyEntry {
            image_data,
            analysis_result: &req.analysis_result,
            recommendations: req.recommendations.as_ref(),
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/v1/journey
pub async fn handle_list_journey(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<JourneyEntryRow>>, AppError> {
    Ok(Json(list_entries(&state.db, user.id).await?))
}

/// DELETE /api/v1/journey/:id?confirm=true
pub async fn handle_delete_journey_entry(
    State(state): State<AppState>,
    user: AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    confirm: Result<Query<ConfirmQuery>, QueryRejection>,
) -> Result<StatusCode, AppError> {
    let Query(confirm) = confirm?;
    confirm.require("Deleting a journey entry")?;
    let Path(id) = id?;
    if !delete_entry(&state.db, id, user.id).await? {
        return Err(AppError::NotFound(format!("Journey entry {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}
