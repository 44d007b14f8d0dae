use std::env;
use std::time::Duration;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub upload_dir: String,
    pub max_upload_bytes: usize,
    pub model_url: String,
    pub model_api_key: Option<String>,
    pub inference_timeout: Duration,
}

const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024; // 16 MiB
const DEFAULT_INFERENCE_TIMEOUT_SECS: u64 = 30;

impl Config {
    pub fn from_env() -> Config {
        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            tracing::warn!("DATABASE_URL not found in env, using local sqlite file");
            "sqlite://data/cropguard.db?mode=rwc".to_string()
        });

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(5000);

        let upload_dir =
            env::var("UPLOAD_DIR").unwrap_or_else(|_| "data/uploads".to_string());

        let max_upload_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let model_url = env::var("MODEL_URL").unwrap_or_else(|_| {
            tracing::warn!("MODEL_URL not set, using local inference server default");
            "http://127.0.0.1:8501/classify".to_string()
        });

        let model_api_key = env::var("MODEL_API_KEY").ok();

        let inference_timeout = Duration::from_secs(
            env::var("INFERENCE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_INFERENCE_TIMEOUT_SECS),
        );

        Config {
            database_url,
            port,
            upload_dir,
            max_upload_bytes,
            model_url,
            model_api_key,
            inference_timeout,
        }
    }
}
