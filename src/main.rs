use axum::{extract::DefaultBodyLimit, routing::get, Router};
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod classifier;
mod commands;
mod config;
mod db;
mod disease_db;
mod error;
mod middleware;
mod routes;
mod session;
mod state;
mod upload;

#[cfg(test)]
mod business_logic_tests;
#[cfg(test)]
mod integration_tests;

use classifier::HttpClassifier;
use config::Config;
use session::SessionStore;
use state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Cropguard backend...");

    let config = Arc::new(Config::from_env());

    let pool = match db::init_pool(&config.database_url).await {
        Ok(pool) => {
            tracing::info!("Database connection established");
            if let Err(e) = db::init_database(&pool).await {
                tracing::error!("Failed to initialize schema: {}", e);
                return;
            }
            pool
        }
        Err(e) => {
            tracing::error!("Failed to connect to database: {}", e);
            return;
        }
    };

    // Connected once at startup; immutable behind the trait afterwards.
    let classifier = Arc::new(HttpClassifier::new(
        config.model_url.clone(),
        config.model_api_key.clone(),
        config.inference_timeout,
    ));
    tracing::info!(model_url = %config.model_url, "classifier backend configured");

    if let Err(e) = std::fs::create_dir_all(&config.upload_dir) {
        tracing::error!("Failed to create upload directory: {}", e);
        return;
    }

    let app_state = AppState {
        pool,
        config: config.clone(),
        classifier,
        sessions: SessionStore::new(),
    };

    // Multipart bodies carry boundary overhead beyond the file itself; the
    // handler enforces the configured per-file cap.
    let body_limit = config.max_upload_bytes + 1024 * 1024;

    let app = Router::new()
        .route("/", get(root))
        .merge(routes::create_router())
        .nest_service(
            "/static/uploads",
            ServeDir::new(&config.upload_dir),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::session_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(app_state);

    let addr_str = format!("0.0.0.0:{}", config.port);
    let addr = addr_str.parse::<SocketAddr>().expect("Invalid address");

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn root() -> &'static str {
    "Cropguard is running"
}
