use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::error::{AppError, AppResult};
use crate::upload::ImageFormat;

/// Result of one classification pass.
#[derive(Debug, Clone)]
pub struct Classification {
    pub label: String,
    /// Percentage in [0, 100].
    pub confidence: f64,
    pub elapsed: Duration,
}

/// Boundary to the image-classification model. Implementations must not
/// block the calling task; CPU-bound backends offload internally.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, image: &[u8]) -> AppResult<Classification>;
}

/// Per-class raw score as returned by the inference endpoint.
#[derive(Debug, Deserialize)]
pub struct ClassScore {
    pub label: String,
    pub score: f64,
}

/// Numerically stable softmax.
pub fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Picks the highest-probability class from raw per-class scores and
/// converts its probability to a percentage.
pub fn select_prediction(scores: &[ClassScore]) -> AppResult<(String, f64)> {
    if scores.is_empty() {
        return Err(AppError::InferenceFailure(
            "model returned no class scores".to_string(),
        ));
    }
    let raw: Vec<f64> = scores.iter().map(|c| c.score).collect();
    let probs = softmax(&raw);
    let (best, prob) = scores
        .iter()
        .zip(probs.iter())
        .max_by(|a, b| a.1.total_cmp(b.1))
        .expect("non-empty scores");
    let confidence = (prob * 100.0).clamp(0.0, 100.0);
    Ok((best.label.clone(), confidence))
}

/// Talks to a remote inference service over HTTP. The service receives the
/// raw image bytes and answers with a JSON array of `{label, score}` pairs
/// holding the model's per-class outputs.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(url: String, api_key: Option<String>, timeout: Duration) -> HttpClassifier {
        let client = reqwest::Client::builder()
            .timeout(timeout + Duration::from_secs(5))
            .build()
            .unwrap_or_default();
        HttpClassifier {
            client,
            url,
            api_key,
            timeout,
        }
    }

    async fn request(&self, image: &[u8], mime: &'static str) -> AppResult<Vec<ClassScore>> {
        let mut req = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, mime)
            .body(image.to_vec());
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let res = req.send().await?;
        let status = res.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNPROCESSABLE_ENTITY
        {
            // The backend could not decode the payload as an image.
            return Err(AppError::InvalidImage);
        }
        if !status.is_success() {
            return Err(AppError::InferenceFailure(format!(
                "inference endpoint returned {}",
                status
            )));
        }

        let scores: Vec<ClassScore> = res
            .json()
            .await
            .map_err(|e| AppError::InferenceFailure(format!("malformed model response: {}", e)))?;
        Ok(scores)
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, image: &[u8]) -> AppResult<Classification> {
        let format = ImageFormat::sniff(image).ok_or(AppError::InvalidImage)?;

        let start = Instant::now();
        let scores = tokio::time::timeout(self.timeout, self.request(image, format.mime()))
            .await
            .map_err(|_| AppError::InferenceTimeout(self.timeout.as_secs()))??;

        let (label, confidence) = select_prediction(&scores)?;
        let elapsed = start.elapsed();

        tracing::debug!(%label, confidence, ?elapsed, "classification complete");
        Ok(Classification {
            label,
            confidence,
            elapsed,
        })
    }
}
