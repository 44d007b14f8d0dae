use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/add-crop", post(commands::crop::add_crop))
        .route("/api/crops", get(commands::crop::list_crops))
        .route("/api/add-treatment", post(commands::treatment::add_treatment))
        .route("/api/treatments", get(commands::treatment::list_treatments))
}
