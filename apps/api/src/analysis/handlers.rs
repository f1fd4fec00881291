//! Axum route handlers for the analysis API.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::analysis::location::{Coordinates, GeolocationError, LocationOutcome};
use crate::analysis::products::ProductRecommendations;
use crate::analysis::skin::{ImagePayload, SkinAnalysisResult};
use crate::errors::AppError;
use crate::state::AppState;

pub const NO_IMAGE: &str = "Please upload an image first.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub result: SkinAnalysisResult,
    /// Present when the browser could not provide a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_notice: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationsResponse {
    pub recommendations: ProductRecommendations,
    /// `None` when the result could not be written to local history.
    pub history_entry_id: Option<String>,
}

/// Fields collected from the analysis upload form.
#[derive(Debug, Default)]
struct AnalysisForm {
    image: Option<ImagePayload>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location_error: Option<GeolocationError>,
}

impl AnalysisForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = AnalysisForm::default();

        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "image" => {
                    let mime_type = field
                        .content_type()
                        .map(str::to_string)
                        .unwrap_or_default();
                    if !mime_type.starts_with("image/") {
                        return Err(AppError::Validation(
                            "Unsupported file type. Upload a PNG, JPG, or WEBP image.".to_string(),
                        ));
                    }
                    let bytes = field.bytes().await.map_err(bad_multipart)?;
                    if !bytes.is_empty() {
                        form.image = Some(ImagePayload { mime_type, bytes });
                    }
                }
                "latitude" => form.latitude = parse_coordinate(&name, field.text().await)?,
                "longitude" => form.longitude = parse_coordinate(&name, field.text().await)?,
                "location_error" => {
                    let code = field.text().await.map_err(bad_multipart)?;
                    if !code.trim().is_empty() {
                        form.location_error = Some(GeolocationError::from_code(&code));
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Coordinates are used only as a complete, in-range pair. Anything else
    /// falls back to general advice.
    fn location(&self) -> LocationOutcome {
        let coordinates = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => {
                let coordinates = Coordinates::new(lat, lon);
                if coordinates.is_none() {
                    warn!("Ignoring out-of-range coordinates ({lat}, {lon}) in analysis upload");
                }
                coordinates
            }
            (None, None) => None,
            _ => {
                warn!("Ignoring partial coordinates in analysis upload");
                None
            }
        };
        LocationOutcome::resolve(coordinates, self.location_error)
    }
}

fn bad_multipart(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge("Image exceeds the upload size limit".to_string());
    }
    AppError::Validation(format!("Malformed upload: {e}"))
}

/// A blank or non-numeric value counts as absent.
fn parse_coordinate(
    name: &str,
    text: Result<String, MultipartError>,
) -> Result<Option<f64>, AppError> {
    let text = text.map_err(bad_multipart)?;
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(value) => Ok(Some(value)),
        Err(_) => {
            warn!("Ignoring non-numeric {name} in analysis upload");
            Ok(None)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analysis
///
/// Multipart upload: `image` (required), `latitude` + `longitude` or
/// `location_error` (optional). A location failure never fails the request.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let form = AnalysisForm::read(multipart).await?;
    let image = form
        .image
        .as_ref()
        .ok_or_else(|| AppError::Validation(NO_IMAGE.to_string()))?;
    let location = form.location();

    if let LocationOutcome::Failed(err) = location {
        info!("No location for analysis ({err:?}); using general environmental advice");
    }

    let result = state
        .advisor
        .analyze(image, location.coordinates())
        .await?;

    Ok(Json(AnalysisResponse {
        result,
        location_notice: location.notice(),
    }))
}

/// POST /api/v1/recommendations
///
/// Fetches a product triple for an analysis and records it in local history.
/// A history write failure is logged and does not fail the request.
pub async fn handle_recommendations(
    State(state): State<AppState>,
    payload: Result<Json<SkinAnalysisResult>, JsonRejection>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let Json(analysis) = payload?;
    if analysis.skin_type.trim().is_empty() {
        return Err(AppError::Validation("skinType cannot be empty".to_string()));
    }

    let recommendations = state.advisor.recommend(&analysis).await?;

    let history_entry_id = match state
        .history
        .save(analysis, recommendations.clone())
        .await
    {
        Ok(entry) => Some(entry.id),
        Err(e) => {
            warn!("Could not record recommendation in history: {e}");
            None
        }
    };

    Ok(Json(RecommendationsResponse {
        recommendations,
        history_entry_id,
    }))
}
