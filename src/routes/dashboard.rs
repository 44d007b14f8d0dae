use crate::commands;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/detections/history",
            get(commands::dashboard::detection_history),
        )
        .route("/api/stats", get(commands::dashboard::stats))
}
