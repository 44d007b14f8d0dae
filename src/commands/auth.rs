use crate::db::{DbPool, User};
use crate::error::{AppError, AppResult};
use crate::session::{self, SessionUser};
use crate::state::AppState;
use axum::{
    extract::{Extension, State},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
}

/// Translates a storage-layer unique violation into the same duplicate
/// error the client would see on the pre-checked path, so racing
/// registrations observe identical semantics.
fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            let msg = db.message();
            if msg.contains("users.username") {
                return AppError::DuplicateUsername;
            }
            if msg.contains("users.email") {
                return AppError::DuplicateEmail;
            }
        }
    }
    AppError::Database(e)
}

pub async fn register_internal(
    pool: &DbPool,
    username: &str,
    email: &str,
    password: &str,
    location: Option<&str>,
) -> AppResult<i64> {
    let password_hash = hash(password, DEFAULT_COST)?;

    // Single insert; uniqueness is left to the database constraints rather
    // than a check-then-act lookup.
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, location) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(&password_hash)
    .bind(location)
    .execute(pool)
    .await
    .map_err(map_unique_violation)?;

    Ok(result.last_insert_rowid())
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return Err(AppError::Validation(
            "username, email and password are required".to_string(),
        ));
    }

    let user_id = register_internal(
        &state.pool,
        payload.username.trim(),
        payload.email.trim(),
        &payload.password,
        payload.location.as_deref(),
    )
    .await?;

    tracing::info!(user_id, username = %payload.username, "user registered");

    let token = state.sessions.create(SessionUser {
        user_id,
        username: payload.username.trim().to_string(),
    });

    Ok((
        AppendHeaders([(SET_COOKIE, session::session_cookie(&token))]),
        Json(AuthResponse {
            success: true,
            message: "Registration successful".to_string(),
        }),
    ))
}

pub async fn login_internal(pool: &DbPool, username: &str, password: &str) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, username, email, password_hash, location, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::InvalidCredentials)?;

    let valid = verify(password, &user.password_hash)?;
    if !valid {
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let user = login_internal(&state.pool, payload.username.trim(), &payload.password).await?;

    let token = state.sessions.create(SessionUser {
        user_id: user.id,
        username: user.username.clone(),
    });
    tracing::info!(user_id = user.id, username = %user.username, "user logged in");

    Ok((
        AppendHeaders([(SET_COOKIE, session::session_cookie(&token))]),
        Json(AuthResponse {
            success: true,
            message: "Login successful".to_string(),
        }),
    ))
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Clears the session if one exists. Idempotent: calling without a live
/// session still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session::token_from_cookie_header)
    {
        state.sessions.remove(token);
    }

    (
        AppendHeaders([(SET_COOKIE, session::clear_session_cookie())]),
        Json(LogoutResponse { success: true }),
    )
}

#[derive(Debug, Serialize)]
pub struct AuthCheckUser {
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct AuthCheckResponse {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthCheckUser>,
}

pub async fn check_auth_status(user: Option<Extension<SessionUser>>) -> Json<AuthCheckResponse> {
    let user = user.map(|Extension(u)| AuthCheckUser {
        user_id: u.user_id,
        username: u.username,
    });
    Json(AuthCheckResponse {
        logged_in: user.is_some(),
        user,
    })
}
