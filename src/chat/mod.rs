//! Chat-completion client abstraction and the Groq adapter.
//!
//! Groq exposes an OpenAI-compatible `/v1/chat/completions` endpoint; the
//! adapter issues one non-streaming request per question and extracts the
//! first choice's message content. No retries, no conversation memory. A
//! missing API key surfaces here on first use, not at startup.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors raised by chat-completion providers.
#[derive(Debug, Error)]
pub enum ChatClientError {
    /// The chat API key is absent from the environment.
    #[error("GROQ_API_KEY is not set; cannot call the chat service")]
    MissingApiKey,
    /// Transport-level failure while reaching the provider.
    #[error("Chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("Chat service returned {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status reported by the provider.
        status: StatusCode,
        /// Response body captured for diagnostics.
        body: String,
    },
    /// Provider response could not be decoded.
    #[error("Malformed chat response: {0}")]
    InvalidResponse(String),
    /// Provider returned no message content in any choice.
    #[error("Chat service returned no answer choices")]
    EmptyChoices,
}

/// Interface implemented by chat-completion backends.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Run one prompt through the model and return the answer text.
    async fn complete(&self, prompt: &str) -> Result<String, ChatClientError>;
}

/// Chat client backed by Groq's OpenAI-compatible completion endpoint.
pub struct GroqChatClient {
    pub(crate) http: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) model: String,
}

impl GroqChatClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Self {
        let config = get_config();
        let http = Client::builder()
            .user_agent("docqa/0.1")
            .build()
            .expect("Failed to construct reqwest::Client for chat");
        tracing::debug!(
            url = %config.chat_api_url,
            model = %config.chat_model,
            has_api_key = config.groq_api_key.is_some(),
            "Initialized chat HTTP client"
        );
        Self {
            http,
            base_url: config.chat_api_url.clone(),
            api_key: config.groq_api_key.clone(),
            model: config.chat_model.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}

impl Default for GroqChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatClient for GroqChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, ChatClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ChatClientError::MissingApiKey)?;

        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "user", "content": prompt }
            ]
        });

        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Requesting chat completion");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ChatClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Chat request failed");
            return Err(error);
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            ChatClientError::InvalidResponse(format!("failed to decode chat response: {error}"))
        })?;

        body.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or(ChatClientError::EmptyChoices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn test_client(base_url: String, api_key: Option<&str>) -> GroqChatClient {
        GroqChatClient {
            http: Client::builder()
                .user_agent("docqa-test")
                .build()
                .expect("client"),
            base_url,
            api_key: api_key.map(str::to_string),
            model: "gemma-7b-it".to_string(),
        }
    }

    #[tokio::test]
    async fn complete_extracts_first_choice_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "The sky is blue." } }
                    ]
                }));
            })
            .await;

        let client = test_client(server.base_url(), Some("secret"));
        let answer = client.complete("What color is the sky?").await.expect("answer");

        mock.assert();
        assert_eq!(answer, "The sky is blue.");
    }

    #[tokio::test]
    async fn complete_without_key_fails_before_any_request() {
        let client = test_client("http://127.0.0.1:9".to_string(), None);
        let error = client.complete("question").await.expect_err("missing key");
        assert!(matches!(error, ChatClientError::MissingApiKey));
    }

    #[tokio::test]
    async fn complete_surfaces_error_status_with_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(429).body("rate limit exceeded");
            })
            .await;

        let client = test_client(server.base_url(), Some("secret"));
        let error = client.complete("question").await.expect_err("error status");
        match error {
            ChatClientError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
                assert!(body.contains("rate limit"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn complete_rejects_empty_choices() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let client = test_client(server.base_url(), Some("secret"));
        let error = client.complete("question").await.expect_err("no choices");
        assert!(matches!(error, ChatClientError::EmptyChoices));
    }
}
