use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::products::ProductRecommendations;
use crate::analysis::skin::SkinAnalysisResult;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JourneyEntryRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Base64 image bytes, stored inline.
    pub image_data: String,
    pub created_at: DateTime<Utc>,
    pub analysis_result: Json<SkinAnalysisResult>,
    pub recommendations: Option<Json<ProductRecommendations>>,
}
