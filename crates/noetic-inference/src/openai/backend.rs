//! OpenAI-compatible embedding backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, warn};

use noetic_core::defaults::{EMBED_DIMENSION, EMBED_MODEL, EMBED_TIMEOUT_SECS, OPENAI_URL};
use noetic_core::{EmbeddingBackend, Error, Result, Vector};

use super::error::{to_embedding_error, OpenAIErrorCode};
use super::types::*;

/// Default number of retries for rate-limit and server errors.
pub const DEFAULT_MAX_RETRIES: u32 = 2;

/// Base delay between retries; doubled on each attempt.
const RETRY_BASE_DELAY_MS: u64 = 250;

/// Configuration for the OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// Base URL for the API endpoint.
    pub base_url: String,
    /// API key (optional for local endpoints).
    pub api_key: Option<String>,
    pub embed_model: String,
    /// Expected embedding dimension. Responses of any other size are rejected.
    pub embed_dimension: usize,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    /// Send `dimensions` in the request (text-embedding-3 models only).
    pub request_dimensions: bool,
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            base_url: OPENAI_URL.to_string(),
            api_key: None,
            embed_model: EMBED_MODEL.to_string(),
            embed_dimension: EMBED_DIMENSION,
            timeout_seconds: EMBED_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            request_dimensions: false,
        }
    }
}

impl OpenAIConfig {
    /// Read configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            embed_model: std::env::var("OPENAI_EMBED_MODEL").unwrap_or(defaults.embed_model),
            embed_dimension: std::env::var("OPENAI_EMBED_DIM")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.embed_dimension),
            timeout_seconds: std::env::var("EMBED_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.timeout_seconds),
            max_retries: std::env::var("EMBED_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            request_dimensions: std::env::var("OPENAI_REQUEST_DIMENSIONS")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

/// OpenAI-compatible embedding backend.
pub struct OpenAIBackend {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIBackend {
    /// Create a new OpenAI backend with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Embedding(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            op = "init",
            model = %config.embed_model,
            dimension = config.embed_dimension,
            "Initializing OpenAI embedding backend"
        );

        Ok(Self { client, config })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(OpenAIConfig::default())
    }

    pub fn from_env() -> Result<Self> {
        Self::new(OpenAIConfig::from_env())
    }

    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }

    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.bearer_auth(api_key);
        }

        req
    }

    /// One round-trip. Returns the error code alongside failures so the
    /// caller can decide whether to retry.
    async fn request_once(
        &self,
        request: &EmbeddingRequest,
    ) -> std::result::Result<EmbeddingResponse, (OpenAIErrorCode, Error)> {
        let response = self
            .build_request("/embeddings")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let code = if e.is_timeout() || e.is_connect() {
                    OpenAIErrorCode::ServerError
                } else {
                    OpenAIErrorCode::Unknown
                };
                (code, Error::Embedding(format!("Request failed: {}", e)))
            })?;

        let status = response.status();
        if !status.is_success() {
            let (message, error_type) = match response.json::<OpenAIErrorResponse>().await {
                Ok(body) => (body.error.message, body.error.error_type),
                Err(_) => ("Unknown error".to_string(), String::new()),
            };
            let code = OpenAIErrorCode::from_response(status.as_u16(), &error_type);
            return Err((code, to_embedding_error(code, &message)));
        }

        response.json::<EmbeddingResponse>().await.map_err(|e| {
            (
                OpenAIErrorCode::Unknown,
                Error::Embedding(format!("Failed to parse response: {}", e)),
            )
        })
    }
}

#[async_trait]
impl EmbeddingBackend for OpenAIBackend {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vector>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let start = Instant::now();
        let request = EmbeddingRequest {
            model: self.config.embed_model.clone(),
            input: texts.to_vec(),
            encoding_format: Some("float".to_string()),
            dimensions: self
                .config
                .request_dimensions
                .then_some(self.config.embed_dimension),
        };

        let mut attempt = 0;
        let result = loop {
            match self.request_once(&request).await {
                Ok(result) => break result,
                Err((code, err)) if code.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(RETRY_BASE_DELAY_MS << attempt);
                    warn!(
                        subsystem = "inference",
                        component = "openai",
                        op = "embed",
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Retrying embedding request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err((_, err)) => return Err(err),
            }
        };

        if result.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                result.data.len()
            )));
        }

        let mut data = result.data;
        data.sort_by_key(|d| d.index);

        if let Some(bad) = data
            .iter()
            .find(|d| d.embedding.len() != self.config.embed_dimension)
        {
            return Err(Error::Embedding(format!(
                "Expected dimension {}, got {}",
                self.config.embed_dimension,
                bad.embedding.len()
            )));
        }

        let vectors: Vec<Vector> = data
            .into_iter()
            .map(|d| Vector::from(d.embedding))
            .collect();

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "embed",
            model = %self.config.embed_model,
            input_count = texts.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Generated embeddings"
        );
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.config.embed_dimension
    }

    fn model_name(&self) -> &str {
        &self.config.embed_model
    }
}
