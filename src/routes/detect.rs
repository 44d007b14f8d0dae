use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/detect", post(commands::detect::detect))
        .route("/api/diseases", get(commands::detect::get_diseases))
}
