use crate::db::{DbPool, Effectiveness, Treatment, TreatmentType};
use crate::error::{AppError, AppResult};
use crate::session::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct AddTreatmentRequest {
    pub crop_id: i64,
    pub disease_name: Option<String>,
    pub treatment_type: TreatmentType,
    pub treatment_details: Option<String>,
    pub effectiveness: Option<Effectiveness>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AddTreatmentResponse {
    pub success: bool,
    pub treatment_id: i64,
}

async fn require_owned_crop(pool: &DbPool, crop_id: i64, user_id: i64) -> AppResult<()> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM crops WHERE id = ?")
        .bind(crop_id)
        .fetch_optional(pool)
        .await?;
    if owner != Some(user_id) {
        return Err(AppError::Validation("Unknown crop".to_string()));
    }
    Ok(())
}

pub async fn add_treatment_internal(
    pool: &DbPool,
    crop_id: i64,
    disease_name: Option<&str>,
    treatment_type: TreatmentType,
    treatment_details: Option<&str>,
    effectiveness: Option<Effectiveness>,
    notes: Option<&str>,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO treatments (crop_id, disease_name, treatment_type, treatment_details, effectiveness, notes)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(crop_id)
    .bind(disease_name)
    .bind(treatment_type.as_str())
    .bind(treatment_details)
    .bind(effectiveness.map(|e| e.as_str()))
    .bind(notes)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn add_treatment(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(payload): Json<AddTreatmentRequest>,
) -> AppResult<Json<AddTreatmentResponse>> {
    require_owned_crop(&state.pool, payload.crop_id, user.user_id).await?;

    let treatment_id = add_treatment_internal(
        &state.pool,
        payload.crop_id,
        payload.disease_name.as_deref(),
        payload.treatment_type,
        payload.treatment_details.as_deref(),
        payload.effectiveness,
        payload.notes.as_deref(),
    )
    .await?;

    Ok(Json(AddTreatmentResponse {
        success: true,
        treatment_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct TreatmentQuery {
    pub crop_id: i64,
}

pub async fn treatments_for_crop(pool: &DbPool, crop_id: i64) -> AppResult<Vec<Treatment>> {
    Ok(sqlx::query_as::<_, Treatment>(
        "SELECT id, crop_id, disease_name, treatment_type, treatment_details, applied_date, effectiveness, notes
         FROM treatments WHERE crop_id = ? ORDER BY applied_date DESC, id DESC",
    )
    .bind(crop_id)
    .fetch_all(pool)
    .await?)
}

pub async fn list_treatments(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<TreatmentQuery>,
) -> AppResult<Json<Vec<Treatment>>> {
    require_owned_crop(&state.pool, query.crop_id, user.user_id).await?;
    Ok(Json(treatments_for_crop(&state.pool, query.crop_id).await?))
}
