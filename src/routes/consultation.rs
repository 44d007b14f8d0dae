use crate::commands;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/consultation",
            post(commands::consultation::create_consultation),
        )
        .route(
            "/api/consultations",
            get(commands::consultation::list_consultations),
        )
}
