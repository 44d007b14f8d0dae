use std::sync::Arc;

use crate::classifier::Classifier;
use crate::config::Config;
use crate::db::DbPool;
use crate::session::SessionStore;

/// Shared application state. The classifier is constructed once at startup
/// and immutable afterwards; sessions are per-request context looked up by
/// the middleware.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Arc<Config>,
    pub classifier: Arc<dyn Classifier>,
    pub sessions: SessionStore,
}

impl axum::extract::FromRef<AppState> for DbPool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
