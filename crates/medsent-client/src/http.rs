//! HTTP caller with a fixed timeout and retries on transport failures.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use medsent_core::{ResponseView, normalize_response};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::{ClientError, Endpoint};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// How many times to retry a request whose transport failed, and how long
/// to wait in between. HTTP error statuses are answers, not failures, and
/// are never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first.
    pub retries: u32,
    /// The wait before retry `n` is `n * backoff_step`.
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff_step: Duration::from_millis(600),
        }
    }
}

impl RetryPolicy {
    pub fn delay(&self, retry: u32) -> Duration {
        self.backoff_step * retry
    }
}

/// One answered request.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    /// Parsed JSON body, or `{"raw_text": ...}` when the body is not JSON.
    pub data: Value,
    pub status: u16,
    /// Round trip of the attempt that got an answer.
    pub client_elapsed_ms: u64,
    pub attempts: u32,
    pub received_at: DateTime<Utc>,
}

impl CallOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn view(&self) -> ResponseView {
        normalize_response(&self.data)
    }
}

/// POSTs JSON to prediction endpoints.
pub struct EndpointClient {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl EndpointClient {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { client, retry })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Send one review to `endpoint` using its payload shape and API key.
    pub async fn predict(&self, endpoint: &Endpoint, review: &str) -> Result<CallOutcome, ClientError> {
        if review.trim().is_empty() {
            return Err(ClientError::EmptyText);
        }
        let url = endpoint
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| ClientError::MissingUrl(endpoint.name.clone()))?;
        let payload = endpoint.shape.request(review.trim());
        self.call(url, &payload, endpoint.api_key.as_deref()).await
    }

    /// POST `payload` to `url`, sending `api_key` as `x-api-key` when given.
    ///
    /// Any HTTP status is returned as an outcome. Connection errors,
    /// timeouts and broken bodies are retried per the [`RetryPolicy`]; the
    /// last one is returned once retries run out.
    pub async fn call<T>(
        &self,
        url: &str,
        payload: &T,
        api_key: Option<&str>,
    ) -> Result<CallOutcome, ClientError>
    where
        T: Serialize + ?Sized,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let start = Instant::now();
            match self.attempt(url, payload, api_key).await {
                Ok((status, body)) => {
                    let client_elapsed_ms = start.elapsed().as_millis() as u64;
                    info!(url = %url, status, attempt, client_elapsed_ms, "endpoint answered");
                    return Ok(CallOutcome {
                        data: parse_body(body),
                        status,
                        client_elapsed_ms,
                        attempts: attempt,
                        received_at: Utc::now(),
                    });
                }
                Err(e) if attempt <= self.retry.retries => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        url = %url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(source) => {
                    return Err(ClientError::Transport {
                        url: url.to_string(),
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    async fn attempt<T>(
        &self,
        url: &str,
        payload: &T,
        api_key: Option<&str>,
    ) -> Result<(u16, String), reqwest::Error>
    where
        T: Serialize + ?Sized,
    {
        let mut req = self.client.post(url).json(payload);
        if let Some(key) = api_key.filter(|k| !k.is_empty()) {
            req = req.header("x-api-key", key);
        }
        let resp = req.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok((status, body))
    }
}

fn parse_body(body: String) -> Value {
    match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(_) => serde_json::json!({ "raw_text": body }),
    }
}
