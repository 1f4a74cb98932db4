//! Question-answering service coordinating chunking, embedding, retrieval, and synthesis.

use crate::{
    chat::{ChatClient, GroqChatClient},
    config::get_config,
    embedding::{EmbeddingClient, GeminiEmbeddingClient},
    index::VectorIndex,
    ingest::PageRecord,
    metrics::{MetricsSnapshot, SessionMetrics},
    qa::{
        chunking::chunk_pages,
        types::{AnswerResult, BuildError, Chunk, QueryError},
    },
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Prompt template used for every question. The model is instructed to answer
/// from the supplied context only, matching the tool's grounding guarantee.
const ANSWER_PROMPT: &str = "\
Answer the questions based on the provided context only.
Please provide the most accurate response based on the question.
<context>
{context}
</context>
Questions: {question}
";

pub(crate) fn build_prompt(context: &str, question: &str) -> String {
    ANSWER_PROMPT
        .replace("{context}", context)
        .replace("{question}", question)
}

/// Coordinates the full pipeline: chunking, embedding, index construction,
/// retrieval, and answer synthesis.
///
/// The service owns long-lived handles to the embedding and chat clients plus
/// the metrics registry, so the interactive front-end and the one-shot CLI
/// path reuse the same components. Construct the service once near process
/// start.
pub struct QaService {
    embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
    chat_client: Box<dyn ChatClient + Send + Sync>,
    metrics: Arc<SessionMetrics>,
}

/// Abstraction over the pipeline used by the session layer and its tests.
#[async_trait]
pub trait QaApi: Send + Sync {
    /// Chunk and embed the extracted pages, returning a freshly built index.
    async fn build_index(&self, pages: &[PageRecord]) -> Result<VectorIndex, BuildError>;

    /// Retrieve context for the question and synthesize an answer.
    async fn answer(
        &self,
        question: &str,
        index: &VectorIndex,
    ) -> Result<AnswerResult, QueryError>;

    /// Retrieve the current metrics snapshot for diagnostics.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl QaService {
    /// Build a new service wired to the configured providers.
    pub fn new() -> Self {
        tracing::info!("Initializing provider clients");
        Self::with_clients(
            Box::new(GeminiEmbeddingClient::new()),
            Box::new(GroqChatClient::new()),
        )
    }

    /// Build a service from explicit clients. Used by tests to inject stubs.
    pub fn with_clients(
        embedding_client: Box<dyn EmbeddingClient + Send + Sync>,
        chat_client: Box<dyn ChatClient + Send + Sync>,
    ) -> Self {
        Self {
            embedding_client,
            chat_client,
            metrics: Arc::new(SessionMetrics::new()),
        }
    }

    /// Chunk, embed, and index the supplied pages as one atomic build.
    ///
    /// On any error the build is abandoned wholesale; no index is returned and
    /// the caller keeps whatever index it previously held.
    pub async fn build_index(&self, pages: &[PageRecord]) -> Result<VectorIndex, BuildError> {
        let config = get_config();
        let chunks = chunk_pages(pages, config.chunk_size, config.chunk_overlap)?;
        if chunks.is_empty() {
            return Err(BuildError::EmptyCorpus);
        }
        tracing::debug!(
            pages = pages.len(),
            chunks = chunks.len(),
            chunk_size = config.chunk_size,
            overlap = config.chunk_overlap,
            "Chunked corpus"
        );

        let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embedding_client.embed(&texts).await?;
        let index = VectorIndex::from_pairs(chunks, vectors)?;

        self.metrics.record_build(index.len() as u64);
        tracing::info!(
            pages = pages.len(),
            chunks = index.len(),
            dimension = index.dimension(),
            "Vector index built"
        );
        Ok(index)
    }

    /// Retrieve the most similar chunks and ask the chat model once.
    ///
    /// Guards: an empty question embedding and an empty retrieved context both
    /// abort before the chat model is invoked.
    pub async fn answer(
        &self,
        question: &str,
        index: &VectorIndex,
    ) -> Result<AnswerResult, QueryError> {
        let config = get_config();
        let query = vec![question.to_string()];
        let mut vectors = self.embedding_client.embed(&query).await?;
        let vector = vectors.pop().ok_or(QueryError::EmptyEmbedding)?;

        let hits = index.search(&vector, config.retrieval_top_k)?;
        let supporting_chunks: Vec<Chunk> = hits.into_iter().map(|hit| hit.chunk).collect();
        let context = supporting_chunks
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        if context.trim().is_empty() {
            return Err(QueryError::EmptyContext);
        }

        let prompt = build_prompt(&context, question);
        let started = Instant::now();
        let answer_text = self.chat_client.complete(&prompt).await?;
        let elapsed = started.elapsed();

        self.metrics.record_question();
        tracing::info!(
            retrieved = supporting_chunks.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Question answered"
        );

        Ok(AnswerResult {
            answer_text,
            supporting_chunks,
            elapsed,
        })
    }

    /// Return the current session metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[async_trait]
impl QaApi for QaService {
    async fn build_index(&self, pages: &[PageRecord]) -> Result<VectorIndex, BuildError> {
        QaService::build_index(self, pages).await
    }

    async fn answer(
        &self,
        question: &str,
        index: &VectorIndex,
    ) -> Result<AnswerResult, QueryError> {
        QaService::answer(self, question, index).await
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        QaService::metrics_snapshot(self)
    }
}
