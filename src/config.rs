use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default Groq-compatible chat endpoint.
pub const DEFAULT_CHAT_API_URL: &str = "https://api.groq.com/openai";
/// Default Google Generative Language endpoint.
pub const DEFAULT_EMBEDDING_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for Docqa.
///
/// The two API keys are intentionally optional here: a missing key only
/// surfaces as an error when the dependent provider call is attempted, never
/// at startup.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Secret key for the chat-completion provider (`GROQ_API_KEY`).
    pub groq_api_key: Option<String>,
    /// Secret key for the embedding provider (`GOOGLE_API_KEY`).
    pub google_api_key: Option<String>,
    /// Base URL of the chat-completion provider.
    pub chat_api_url: String,
    /// Base URL of the embedding provider.
    pub embedding_api_url: String,
    /// Chat model identifier passed to the provider.
    pub chat_model: String,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Directory scanned for PDFs when no files are named explicitly.
    pub corpus_dir: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters carried over from the previous chunk's tail.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub retrieval_top_k: usize,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            groq_api_key: load_env_optional("GROQ_API_KEY"),
            google_api_key: load_env_optional("GOOGLE_API_KEY"),
            chat_api_url: load_env_optional("CHAT_API_URL")
                .unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_string()),
            embedding_api_url: load_env_optional("EMBEDDING_API_URL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_API_URL.to_string()),
            chat_model: load_env_optional("CHAT_MODEL")
                .unwrap_or_else(|| "gemma-7b-it".to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| "models/embedding-001".to_string()),
            corpus_dir: load_env_optional("CORPUS_DIR")
                .unwrap_or_else(|| "./documents".to_string()),
            chunk_size: parse_env_or("CHUNK_SIZE", 1000)?,
            chunk_overlap: parse_env_or("CHUNK_OVERLAP", 200)?,
            retrieval_top_k: parse_env_or("RETRIEVAL_TOP_K", 4)?,
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_env_or(key: &str, default: usize) -> Result<usize, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
        .map(|parsed| parsed.unwrap_or(default))
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        chat_api_url = %config.chat_api_url,
        embedding_api_url = %config.embedding_api_url,
        chat_model = %config.chat_model,
        embedding_model = %config.embedding_model,
        corpus_dir = %config.corpus_dir,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        retrieval_top_k = config.retrieval_top_k,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_or_returns_default_when_unset() {
        assert_eq!(parse_env_or("DOCQA_TEST_UNSET_VAR", 42).unwrap(), 42);
    }
}
