#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::EmbeddingConfig;
use crate::embeddings::Embedder;
use crate::{RagError, Result};

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
const EXPONENTIAL_BACKOFF_BASE: u64 = 2;

/// Client for an OpenAI-compatible `/v1/embeddings` endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    base_url: Url,
    model: String,
    api_key: String,
    batch_size: u32,
    dimension: u32,
    agent: ureq::Agent,
    retry_attempts: u32,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiClient {
    /// Create a client from configuration and a resolved API key.
    ///
    /// Key resolution happens at the call site (environment variable named
    /// by the config) so the secret never lives in the config file.
    #[inline]
    pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(RagError::Config(format!(
                "API key from ${} is empty",
                config.api_key_env
            )));
        }

        let base_url = config
            .api_url()
            .map_err(|e| RagError::Config(e.to_string()))?;

        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECONDS)))
            .build()
            .into();

        Ok(Self {
            base_url,
            model: config.model.clone(),
            api_key,
            batch_size: config.batch_size,
            dimension: config.dimension,
            agent,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .into();
        self
    }

    #[inline]
    pub fn with_retry_attempts(mut self, attempts: u32) -> Self {
        self.retry_attempts = attempts;
        self
    }

    /// Generate embeddings for a batch of texts, preserving input order.
    #[inline]
    pub fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut vectors = Vec::with_capacity(texts.len());

        // Split into API-sized batches to stay under request limits.
        for batch in texts.chunks(self.batch_size as usize) {
            let batch_vectors = self.embed_single_batch(batch)?;
            vectors.extend(batch_vectors);
        }

        debug!("Generated {} embeddings total", vectors.len());
        Ok(vectors)
    }

    fn embed_single_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request = EmbeddingsRequest {
            model: self.model.clone(),
            input: texts.to_vec(),
        };

        let url = self
            .base_url
            .join("/v1/embeddings")
            .map_err(|e| RagError::Embedding(format!("Failed to build embeddings URL: {e}")))?;

        let request_json = serde_json::to_string(&request)
            .map_err(|e| RagError::Embedding(format!("Failed to serialize request: {e}")))?;

        let response_text = self.make_request_with_retry(|| {
            self.agent
                .post(url.as_str())
                .header("Content-Type", "application/json")
                .header("Authorization", &format!("Bearer {}", self.api_key))
                .send(&request_json)
                .and_then(|mut resp| resp.body_mut().read_to_string())
        })?;

        self.parse_response(&response_text, texts.len())
    }

    /// Parse and validate an embeddings response body.
    ///
    /// The API reports each vector's input position in an `index` field;
    /// vectors are restored to input order from it rather than trusting the
    /// serialization order, so a permuted response can never misalign a
    /// corpus with its index.
    fn parse_response(&self, body: &str, expected_count: usize) -> Result<Vec<Vec<f32>>> {
        let response: EmbeddingsResponse = serde_json::from_str(body)
            .map_err(|e| RagError::Embedding(format!("Failed to parse response: {e}")))?;

        if response.data.len() != expected_count {
            return Err(RagError::Embedding(format!(
                "Mismatch between request and response counts: {} vs {}",
                expected_count,
                response.data.len()
            )));
        }

        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        for (position, item) in data.iter().enumerate() {
            if item.index != position {
                return Err(RagError::Embedding(format!(
                    "Response is missing an embedding for input {position}"
                )));
            }
            if item.embedding.len() != self.dimension as usize {
                return Err(RagError::Embedding(format!(
                    "Embedding {} has dimension {}, expected {}",
                    position,
                    item.embedding.len(),
                    self.dimension
                )));
            }
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    fn make_request_with_retry<F>(&self, mut request_fn: F) -> Result<String>
    where
        F: FnMut() -> std::result::Result<String, ureq::Error>,
    {
        let mut last_error = None;

        for attempt in 1..=self.retry_attempts {
            debug!("HTTP request attempt {}/{}", attempt, self.retry_attempts);

            match request_fn() {
                Ok(response_text) => {
                    debug!("Request succeeded on attempt {}", attempt);
                    return Ok(response_text);
                }
                Err(error) => {
                    let should_retry = match &error {
                        ureq::Error::StatusCode(status) => {
                            if *status >= 500 || *status == 429 {
                                warn!(
                                    "Retryable HTTP status {}, attempt {}/{}",
                                    status, attempt, self.retry_attempts
                                );
                                true
                            } else {
                                warn!("Client error (status {}), not retrying", status);
                                return Err(RagError::Embedding(format!(
                                    "Embedding API returned HTTP {status}"
                                )));
                            }
                        }
                        ureq::Error::ConnectionFailed
                        | ureq::Error::HostNotFound
                        | ureq::Error::Timeout(_)
                        | ureq::Error::Io(_) => {
                            warn!(
                                "Transport error: {}, attempt {}/{}",
                                error, attempt, self.retry_attempts
                            );
                            true
                        }
                        _ => {
                            warn!("Non-retryable error: {}", error);
                            false
                        }
                    };

                    if !should_retry {
                        return Err(RagError::Embedding(format!("Request failed: {error}")));
                    }

                    last_error = Some(RagError::Embedding(format!("Request error: {error}")));

                    if attempt < self.retry_attempts {
                        let delay_ms = EXPONENTIAL_BACKOFF_BASE.pow(attempt - 1) * 1000;
                        let delay = Duration::from_millis(delay_ms);
                        debug!("Waiting {:?} before retry", delay);
                        std::thread::sleep(delay);
                    }
                }
            }
        }

        error!("All retry attempts failed for request to {}", self.base_url);

        Err(last_error
            .unwrap_or_else(|| RagError::Embedding("Request failed after retries".to_string())))
    }
}

impl Embedder for OpenAiClient {
    #[inline]
    fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.embed_batch(texts)
    }
}
