use crate::db::DbPool;
use crate::disease_db::{self, DiseaseInfo};
use crate::error::{AppError, AppResult};
use crate::session::SessionUser;
use crate::state::AppState;
use crate::upload;
use axum::{
    extract::{Extension, Multipart, State},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Serialize)]
pub struct DetectResponse {
    pub disease_name: String,
    pub confidence: f64,
    /// Model wall time in seconds.
    pub prediction_time: f64,
    pub disease_info: DiseaseInfo,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_id: Option<i64>,
}

pub fn public_image_url(stored_name: &str) -> String {
    format!("/static/uploads/{}", stored_name)
}

pub async fn record_detection(
    pool: &DbPool,
    user_id: i64,
    crop_id: Option<i64>,
    image_path: &str,
    disease_name: &str,
    confidence: f64,
    notes: Option<&str>,
) -> AppResult<i64> {
    let result = sqlx::query(
        "INSERT INTO detections (user_id, crop_id, image_path, disease_name, confidence, notes)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(crop_id)
    .bind(image_path)
    .bind(disease_name)
    .bind(confidence)
    .bind(notes)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

async fn crop_owned_by(pool: &DbPool, crop_id: i64, user_id: i64) -> AppResult<bool> {
    let owner: Option<i64> = sqlx::query_scalar("SELECT user_id FROM crops WHERE id = ?")
        .bind(crop_id)
        .fetch_optional(pool)
        .await?;
    Ok(owner == Some(user_id))
}

/// Full detection workflow: store the upload, classify it, resolve the
/// advisory, and persist a record when the caller is authenticated.
/// Anonymous callers get the classification back but nothing is saved.
pub async fn detect(
    State(state): State<AppState>,
    user: Option<Extension<SessionUser>>,
    mut multipart: Multipart,
) -> AppResult<Json<DetectResponse>> {
    let mut image: Option<(String, Vec<u8>)> = None;
    let mut crop_id: Option<i64> = None;
    let mut notes: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidUpload(format!("Malformed upload: {}", e)))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidUpload(format!("Failed to read upload: {}", e)))?;
                image = Some((file_name, bytes.to_vec()));
            }
            Some("crop_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::InvalidUpload(format!("Malformed upload: {}", e)))?;
                crop_id = Some(
                    text.parse()
                        .map_err(|_| AppError::Validation("crop_id must be an integer".to_string()))?,
                );
            }
            Some("notes") => {
                notes = field.text().await.ok().filter(|t| !t.is_empty());
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        image.ok_or_else(|| AppError::InvalidUpload("No image provided".to_string()))?;

    let stored_name = upload::store_upload(
        Path::new(&state.config.upload_dir),
        &file_name,
        &bytes,
        state.config.max_upload_bytes,
    )?;

    let classification = state.classifier.classify(&bytes).await?;
    let disease_info = disease_db::lookup(&classification.label).clone();

    let mut detection_id = None;
    if let Some(Extension(user)) = &user {
        if let Some(cid) = crop_id {
            if !crop_owned_by(&state.pool, cid, user.user_id).await? {
                return Err(AppError::Validation("Unknown crop".to_string()));
            }
        }
        let id = record_detection(
            &state.pool,
            user.user_id,
            crop_id,
            &stored_name,
            &classification.label,
            classification.confidence,
            notes.as_deref(),
        )
        .await?;
        detection_id = Some(id);
        tracing::info!(
            user_id = user.user_id,
            detection_id = id,
            label = %classification.label,
            "detection recorded"
        );
    }

    Ok(Json(DetectResponse {
        disease_name: classification.label,
        confidence: classification.confidence,
        prediction_time: classification.elapsed.as_secs_f64(),
        disease_info,
        image_url: public_image_url(&stored_name),
        detection_id,
    }))
}

/// The curated disease knowledge base, as served to the disease-database
/// page.
pub async fn get_diseases() -> Json<HashMap<&'static str, DiseaseInfo>> {
    Json(
        disease_db::entries()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect(),
    )
}
