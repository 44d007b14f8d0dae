use crate::commands::detect::public_image_url;
use crate::db::DbPool;
use crate::error::AppResult;
use crate::session::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;
use std::collections::HashMap;

#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub disease_name: String,
    pub confidence: f64,
    pub detected_at: NaiveDateTime,
    pub image_url: String,
}

#[derive(Debug, FromRow)]
struct HistoryRow {
    id: i64,
    disease_name: String,
    confidence: f64,
    detected_at: NaiveDateTime,
    image_path: String,
}

pub async fn detection_history_internal(
    pool: &DbPool,
    user_id: i64,
) -> AppResult<Vec<HistoryEntry>> {
    let rows = sqlx::query_as::<_, HistoryRow>(
        "SELECT id, disease_name, confidence, detected_at, image_path
         FROM detections WHERE user_id = ? ORDER BY detected_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| HistoryEntry {
            id: r.id,
            disease_name: r.disease_name,
            confidence: r.confidence,
            detected_at: r.detected_at,
            image_url: public_image_url(&r.image_path),
        })
        .collect())
}

pub async fn detection_history(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<Vec<HistoryEntry>>> {
    Ok(Json(
        detection_history_internal(&state.pool, user.user_id).await?,
    ))
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_detections: i64,
    pub total_crops: i64,
    pub disease_distribution: HashMap<String, i64>,
}

pub async fn stats_internal(pool: &DbPool, user_id: i64) -> AppResult<StatsResponse> {
    let total_detections: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM detections WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

    let total_crops: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM crops WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    let rows: Vec<(String, i64)> = sqlx::query_as(
        "SELECT disease_name, COUNT(*) FROM detections WHERE user_id = ? GROUP BY disease_name",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(StatsResponse {
        total_detections,
        total_crops,
        disease_distribution: rows.into_iter().collect(),
    })
}

pub async fn stats(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<StatsResponse>> {
    Ok(Json(stats_internal(&state.pool, user.user_id).await?))
}
