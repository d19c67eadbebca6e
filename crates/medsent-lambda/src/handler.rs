//! Request handling: proxy event in, proxy response out.

use std::time::Instant;

use medsent_ai::ModelError;
use medsent_core::{PredictionEntry, SuccessBody};
use tracing::{error, info, warn};

use crate::{HandlerError, ModelCache, ModelLoader, ProxyEvent, ProxyResponse};

/// Serves predictions for one deployed model.
pub struct PredictionService {
    cache: ModelCache,
    model_name: String,
}

impl PredictionService {
    pub fn new(loader: impl ModelLoader + 'static, model_name: impl Into<String>) -> Self {
        Self {
            cache: ModelCache::new(loader),
            model_name: model_name.into(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Answer one invocation. Never fails: errors become 400/500 responses.
    pub async fn handle(&self, event: ProxyEvent) -> ProxyResponse {
        let start = Instant::now();
        match self.predict(&event, start).await {
            Ok(body) => ProxyResponse::json(200, &body),
            Err(e) => {
                let status = e.status();
                if status >= 500 {
                    error!(status, error = %e, "prediction failed");
                } else {
                    warn!(status, error = %e, "rejected request");
                }
                ProxyResponse::error(status, e.to_string())
            }
        }
    }

    async fn predict(&self, event: &ProxyEvent, start: Instant) -> Result<SuccessBody, HandlerError> {
        let request = event.prediction_request()?;
        let texts = request.resolve_texts().ok_or(HandlerError::MissingText)?;

        let classifier = self.cache.get().await?;
        let batch = texts.clone();
        let raw = tokio::task::spawn_blocking(move || {
            let refs: Vec<&str> = batch.iter().map(String::as_str).collect();
            classifier.predict(&refs)
        })
        .await??;

        if raw.len() != texts.len() {
            return Err(ModelError::Inference(format!(
                "model returned {} predictions for {} texts",
                raw.len(),
                texts.len()
            ))
            .into());
        }

        let count = texts.len();
        let entries: Vec<PredictionEntry> = texts
            .into_iter()
            .zip(&raw)
            .map(|(text, pred)| PredictionEntry::from_raw(text, pred))
            .collect();

        let elapsed_ms = start.elapsed().as_millis() as u64;
        info!(count, elapsed_ms, model = %self.model_name, "classified texts");
        SuccessBody::from_entries(entries, self.model_name.as_str(), elapsed_ms)
            .ok_or(HandlerError::MissingText)
    }
}
