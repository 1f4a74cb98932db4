//! Question-answering pipeline: chunking, embedding, index build, and answer synthesis.

pub mod chunking;
mod service;
pub mod types;

pub use service::{QaApi, QaService};
pub use types::{AnswerResult, BuildError, Chunk, ChunkingError, QueryError};
