use crate::db::{Crop, CropStatus, DbPool};
use crate::error::{AppError, AppResult};
use crate::session::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Extension, State},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddCropRequest {
    pub crop_type: String,
    pub location: Option<String>,
    pub planted_date: Option<String>,
    pub status: Option<CropStatus>,
}

#[derive(Debug, Serialize)]
pub struct AddCropResponse {
    pub success: bool,
    pub crop_id: i64,
}

pub async fn add_crop_internal(
    pool: &DbPool,
    user_id: i64,
    crop_type: &str,
    location: Option<&str>,
    planted_date: Option<NaiveDate>,
    status: CropStatus,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO crops (user_id, crop_type, location, planted_date, status) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(crop_type)
    .bind(location)
    .bind(planted_date)
    .bind(status.as_str())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn add_crop(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<AddCropRequest>,
) -> AppResult<Json<AddCropResponse>> {
    if payload.crop_type.trim().is_empty() {
        return Err(AppError::Validation("crop_type is required".to_string()));
    }

    let planted_date = payload
        .planted_date
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| AppError::Validation(format!("Invalid planted date: {}", e)))
        })
        .transpose()?;

    let crop_id = add_crop_internal(
        &state.pool,
        user.user_id,
        payload.crop_type.trim(),
        payload.location.as_deref(),
        planted_date,
        payload.status.unwrap_or(CropStatus::Healthy),
    )
    .await?;

    Ok(Json(AddCropResponse {
        success: true,
        crop_id,
    }))
}

pub async fn crops_for_user(pool: &DbPool, user_id: i64) -> AppResult<Vec<Crop>> {
    Ok(sqlx::query_as::<_, Crop>(
        "SELECT id, user_id, crop_type, location, planted_date, status
         FROM crops WHERE user_id = ? ORDER BY id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn list_crops(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<Vec<Crop>>> {
    Ok(Json(crops_for_user(&state.pool, user.user_id).await?))
}
