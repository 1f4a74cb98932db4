//! Embedding client abstraction and the Google Generative Language adapter.
//!
//! The adapter mirrors the chat client: a thin reqwest wrapper around the
//! provider's documented request/response schema, no retries, no backoff. A
//! missing API key is not validated at startup; it surfaces here the first
//! time an embedding call is attempted.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Maximum number of texts the batch endpoint accepts per request.
const MAX_BATCH_SIZE: usize = 100;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// The embedding API key is absent from the environment.
    #[error("GOOGLE_API_KEY is not set; cannot call the embedding service")]
    MissingApiKey,
    /// Transport-level failure while reaching the provider.
    #[error("Embedding request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Embedding service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status reported by the provider.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Provider response could not be decoded.
    #[error("Malformed embedding response: {0}")]
    InvalidResponse(String),
    /// Provider returned a different number of vectors than inputs.
    #[error("Embedding service returned {actual} vectors for {expected} inputs")]
    CountMismatch {
        /// Number of texts submitted.
        expected: usize,
        /// Number of vectors returned.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Embedding client backed by the Google Generative Language batch endpoint.
pub struct GeminiEmbeddingClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) model: String,
}

impl GeminiEmbeddingClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Self {
        let config = get_config();
        let http = Client::builder()
            .user_agent("docqa/0.1")
            .build()
            .expect("Failed to construct reqwest::Client for embeddings");
        tracing::debug!(
            url = %config.embedding_api_url,
            model = %config.embedding_model,
            has_api_key = config.google_api_key.is_some(),
            "Initialized embedding HTTP client"
        );
        Self {
            http,
            base_url: config.embedding_api_url.clone(),
            api_key: config.google_api_key.clone(),
            model: config.embedding_model.clone(),
        }
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/{}:batchEmbedContents?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            api_key
        )
    }

    async fn embed_batch(
        &self,
        api_key: &str,
        texts: &[String],
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let requests: Vec<Value> = texts
            .iter()
            .map(|text| {
                json!({
                    "model": self.model,
                    "content": { "parts": [{ "text": text }] }
                })
            })
            .collect();

        let response = self
            .http
            .post(self.endpoint(api_key))
            .json(&json!({ "requests": requests }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Embedding request failed");
            return Err(error);
        }

        let payload: BatchEmbedResponse = response.json().await.map_err(|error| {
            EmbeddingClientError::InvalidResponse(format!(
                "failed to decode embedding response: {error}"
            ))
        })?;

        Ok(payload
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect())
    }
}

impl Default for GeminiEmbeddingClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl EmbeddingClient for GeminiEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(EmbeddingClientError::MissingApiKey)?;

        tracing::debug!(model = %self.model, texts = texts.len(), "Generating embeddings");

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_BATCH_SIZE) {
            vectors.extend(self.embed_batch(api_key, batch).await?);
        }

        if vectors.len() != texts.len() {
            return Err(EmbeddingClientError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        Ok(vectors)
    }
}
