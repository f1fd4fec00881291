use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::products::ProductRecommendations;
use crate::analysis::skin::SkinAnalysisResult;
use crate::models::journey::JourneyEntryRow;

/// Values for a new journey entry. The owner is passed separately.
pub struct NewJourneyEntry<'a> {
    pub image_data: &'a str,
    pub analysis_result: &'a SkinAnalysisResult,
    pub recommendations: Option<&'a ProductRecommendations>,
}

pub async fn insert_entry(
    pool: &PgPool,
    user_id: Uuid,
    entry: NewJourneyEntry<'_>,
) -> Result<JourneyEntryRow, sqlx::Error> {
    let row: JourneyEntryRow = sqlx::query_as(
        r#"
        INSERT INTO journey_entries (id, user_id, image_data, analysis_result, recommendations)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, image_data, created_at, analysis_result, recommendations
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(entry.image_data)
    .bind(Json(entry.analysis_result))
    .bind(entry.recommendations.map(Json))
    .fetch_one(pool)
    .await?;

    info!("Inserted journey entry {} for user {user_id}", row.id);
    Ok(row)
}

/// Newest first.
pub async fn list_entries(pool: &PgPool, user_id: Uuid) -> Result<Vec<JourneyEntryRow>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, user_id, image_data, created_at, analysis_result, recommendations
        FROM journey_entries
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Deletes by id and owner. Returns false when no row matched.
pub async fn delete_entry(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM journey_entries WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
