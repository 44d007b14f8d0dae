use crate::state::AppState;
use axum::Router;

pub mod auth;
pub mod consultation;
pub mod crop;
pub mod dashboard;
pub mod detect;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(detect::router())
        .merge(crop::router())
        .merge(consultation::router())
        .merge(dashboard::router())
}
