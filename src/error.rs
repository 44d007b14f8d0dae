use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("{0}")]
    InvalidUpload(String),

    #[error("Uploaded file exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("File could not be decoded as an image")]
    InvalidImage,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Inference backend error: {0}")]
    InferenceFailure(String),

    #[error("Inference timed out after {0}s")]
    InferenceTimeout(u64),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            // reqwest's own deadline; the outer tokio timeout normally fires first
            AppError::InferenceTimeout(0)
        } else {
            AppError::InferenceFailure(e.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Machine-readable reason code included in every error body.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::InvalidUpload(_) => "invalid_upload",
            AppError::PayloadTooLarge(_) => "payload_too_large",
            AppError::InvalidImage => "invalid_image",
            AppError::DuplicateUsername => "duplicate_username",
            AppError::DuplicateEmail => "duplicate_email",
            AppError::InvalidCredentials => "invalid_credentials",
            AppError::Unauthenticated => "unauthenticated",
            AppError::Validation(_) => "validation",
            AppError::InferenceFailure(_) => "inference_failure",
            AppError::InferenceTimeout(_) => "inference_timeout",
            AppError::Database(_) | AppError::Io(_) | AppError::Bcrypt(_) | AppError::Internal(_) => {
                "internal"
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A database error occurred".to_string(),
                )
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A file system error occurred".to_string(),
                )
            }
            AppError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "A password hashing error occurred".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
            AppError::InvalidUpload(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::PayloadTooLarge(_)
            | AppError::InvalidImage
            | AppError::DuplicateUsername
            | AppError::DuplicateEmail
            | AppError::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::InvalidCredentials | AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::InferenceFailure(msg) => {
                tracing::error!("Inference backend failed: {}", msg);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            AppError::InferenceTimeout(_) => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
        };

        let body = Json(json!({
            "success": false,
            "error": error_message,
            "reason": self.reason(),
        }));

        (status, body).into_response()
    }
}
