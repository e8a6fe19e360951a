//! HTTP client for the local text-generation endpoint (Ollama-compatible)

use crate::config::ModelConfig;
use crate::error::{Result, StoreLensError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Trait for text-generation clients
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a prompt and return the model's raw text output
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

const INITIAL_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 8_000;

/// Execute an async operation with exponential backoff retry on transient
/// failures (connection refused, timeout).
///
/// A well-formed error response from the endpoint is fatal and returned
/// immediately. `max_retries` is the total number of attempts (minimum 1).
pub async fn with_retry<F, Fut, T>(max_retries: u32, operation: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = max_retries.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        match operation().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                if !e.is_transient() || attempt + 1 == attempts {
                    last_err = Some(e);
                    break;
                }

                let backoff_ms =
                    (INITIAL_BACKOFF_MS << attempt.min(16)).min(MAX_BACKOFF_MS);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = attempts,
                    backoff_ms,
                    error = %e,
                    "retrying model request after transient failure"
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }

    // Surface how many attempts a timeout survived
    Err(match last_err {
        Some(StoreLensError::ModelTimeout { .. }) => StoreLensError::ModelTimeout { attempts },
        Some(e) => e,
        None => StoreLensError::Model("all retry attempts exhausted".to_string()),
    })
}

/// Client for an Ollama-style `/api/generate` endpoint
pub struct OllamaClient {
    http_client: reqwest::Client,
    config: ModelConfig,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new client from configuration
    pub fn new(config: ModelConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(StoreLensError::Http)?;

        Ok(Self {
            http_client,
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ModelConfig::default())
    }

    async fn generate_once(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.url.trim_end_matches('/'));
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    StoreLensError::ModelTimeout { attempts: 1 }
                } else if e.is_connect() {
                    StoreLensError::ModelUnavailable(e.to_string())
                } else {
                    StoreLensError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            // The endpoint answered; its error is fatal for this task
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreLensError::Model(format!(
                "model endpoint error (HTTP {}): {}",
                status, body
            )));
        }

        let generated: GenerateResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                StoreLensError::ModelTimeout { attempts: 1 }
            } else {
                StoreLensError::Http(e)
            }
        })?;

        Ok(generated.response)
    }
}

#[async_trait]
impl LlmClient for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            "sending generation request"
        );
        with_retry(self.config.max_retries, || self.generate_once(prompt)).await
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
