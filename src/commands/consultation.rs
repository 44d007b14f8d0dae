use crate::db::{Consultation, DbPool};
use crate::error::{AppError, AppResult};
use crate::session::SessionUser;
use crate::state::AppState;
use axum::{
    extract::{Extension, State},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ConsultationRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub phone: Option<String>,
    pub crop_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConsultationResponse {
    pub success: bool,
    pub message: String,
}

pub async fn create_consultation_internal(
    pool: &DbPool,
    user_id: Option<i64>,
    name: &str,
    email: &str,
    phone: Option<&str>,
    crop_type: Option<&str>,
    message: &str,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO consultations (user_id, name, email, phone, crop_type, message)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(crop_type)
    .bind(message)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Accepts anonymous submissions; the user link is best-effort from the
/// session when one is present.
pub async fn create_consultation(
    State(state): State<AppState>,
    user: Option<Extension<SessionUser>>,
    Json(payload): Json<ConsultationRequest>,
) -> AppResult<Json<ConsultationResponse>> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.message.trim().is_empty()
    {
        return Err(AppError::Validation(
            "name, email and message are required".to_string(),
        ));
    }

    create_consultation_internal(
        &state.pool,
        user.map(|Extension(u)| u.user_id),
        payload.name.trim(),
        payload.email.trim(),
        payload.phone.as_deref(),
        payload.crop_type.as_deref(),
        &payload.message,
    )
    .await?;

    Ok(Json(ConsultationResponse {
        success: true,
        message: "Consultation request submitted".to_string(),
    }))
}

pub async fn consultations_for_user(pool: &DbPool, user_id: i64) -> AppResult<Vec<Consultation>> {
    Ok(sqlx::query_as::<_, Consultation>(
        "SELECT id, user_id, name, email, phone, crop_type, message, status, created_at
         FROM consultations WHERE user_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn list_consultations(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<Json<Vec<Consultation>>> {
    Ok(Json(
        consultations_for_user(&state.pool, user.user_id).await?,
    ))
}
