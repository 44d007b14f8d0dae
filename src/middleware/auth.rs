use crate::error::AppError;
use crate::session::{self, SessionUser};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

/// Endpoints reachable without a session. Detection and consultation still
/// receive the session identity when one is present.
const PUBLIC_ROUTES: &[&str] = &[
    "/api/register",
    "/api/login",
    "/api/logout",
    "/api/detect",
    "/api/consultation",
    "/api/auth/check",
    "/api/diseases",
];

/// Resolves the session cookie into a [`SessionUser`] request extension and
/// rejects session-gated API paths without one.
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(session::token_from_cookie_header)
        .map(str::to_owned);

    if let Some(token) = &token {
        if let Some(user) = state.sessions.get(token) {
            request.extensions_mut().insert::<SessionUser>(user);
        }
    }

    let path = request.uri().path();
    let gated = path.starts_with("/api/") && !PUBLIC_ROUTES.contains(&path);
    if gated && request.extensions().get::<SessionUser>().is_none() {
        return Err(AppError::Unauthenticated);
    }

    Ok(next.run(request).await)
}
