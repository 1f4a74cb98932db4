//! Core data types and error definitions for the question-answering pipeline.

use crate::{
    chat::ChatClientError, embedding::EmbeddingClientError, index::IndexError,
};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A bounded window of text cut from one page, with its provenance.
///
/// Chunks are immutable once created; adjacent chunks from the same page may
/// overlap in character range.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Chunk text.
    pub text: String,
    /// Path of the PDF the chunk came from.
    pub source_path: PathBuf,
    /// 1-indexed page number within the source file.
    pub page_number: usize,
}

/// Errors produced while splitting pages into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The configured character budget is impossible to satisfy.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Errors emitted by the index build pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Chunking step failed to segment the corpus.
    #[error("Failed to chunk corpus: {0}")]
    Chunking(#[from] ChunkingError),
    /// The corpus produced no usable chunks; nothing to embed or index.
    #[error("No text chunks could be produced from the supplied documents")]
    EmptyCorpus,
    /// Embedding provider failed to produce vectors for the chunks.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Assembling the vector index from chunks and vectors failed.
    #[error("Failed to assemble vector index: {0}")]
    Index(#[from] IndexError),
}

/// Errors emitted while answering a question against a built index.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Embedding provider failed to return a vector for the question.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider returned no vectors for the question.
    #[error("Embedding provider returned no vectors for the question")]
    EmptyEmbedding,
    /// Index lookup rejected the query vector.
    #[error("Vector index rejected the query: {0}")]
    Index(#[from] IndexError),
    /// Retrieval produced no usable context; the chat model is not invoked.
    #[error("Retrieval produced no usable context for the question")]
    EmptyContext,
    /// Chat provider failed to synthesize an answer.
    #[error("Failed to generate answer: {0}")]
    Chat(#[from] ChatClientError),
}

/// Result of answering one question. Recomputed per question, never cached.
#[derive(Debug, Clone)]
pub struct AnswerResult {
    /// Natural-language answer produced by the chat model.
    pub answer_text: String,
    /// Retrieved chunks the answer was grounded in, most similar first.
    pub supporting_chunks: Vec<Chunk>,
    /// Wall-clock duration of the chat-model round trip.
    pub elapsed: Duration,
}
