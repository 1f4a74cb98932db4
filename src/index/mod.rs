//! In-memory vector index with brute-force cosine retrieval.
//!
//! One index owns all `(chunk, vector)` pairs for a single corpus build. A
//! rebuild replaces the whole index; nothing is ever merged incrementally, so
//! retrieved chunks always belong to the corpus the user most recently built.

use thiserror::Error;

use crate::qa::types::Chunk;

/// Errors raised while assembling or querying a [`VectorIndex`].
#[derive(Debug, Error)]
pub enum IndexError {
    /// Chunk and vector counts differ; the pairing would be ambiguous.
    #[error("Chunk and vector counts differ: {chunks} chunks, {vectors} vectors")]
    CountMismatch {
        /// Number of chunks supplied.
        chunks: usize,
        /// Number of vectors supplied.
        vectors: usize,
    },
    /// A vector's dimension does not match the rest of the index.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension established by the first vector.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },
    /// An index cannot be built from zero pairs.
    #[error("Cannot build an index from zero vectors")]
    Empty,
}

#[derive(Debug)]
struct IndexEntry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// Immutable similarity index over one corpus build.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimension: usize,
}

/// A retrieved chunk together with its cosine similarity to the query.
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f32,
}

impl VectorIndex {
    /// Assemble an index from parallel chunk and vector sequences.
    ///
    /// Validates that the sequences have equal length, that at least one pair
    /// exists, and that every vector shares the dimension of the first.
    pub fn from_pairs(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Result<Self, IndexError> {
        if chunks.len() != vectors.len() {
            return Err(IndexError::CountMismatch {
                chunks: chunks.len(),
                vectors: vectors.len(),
            });
        }
        let Some(first) = vectors.first() else {
            return Err(IndexError::Empty);
        };
        let dimension = first.len();
        for vector in &vectors {
            if vector.len() != dimension {
                return Err(IndexError::DimensionMismatch {
                    expected: dimension,
                    actual: vector.len(),
                });
            }
        }

        let entries = chunks
            .into_iter()
            .zip(vectors)
            .map(|(chunk, vector)| IndexEntry { chunk, vector })
            .collect();
        Ok(Self { entries, dimension })
    }

    /// Number of chunks held by the index.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no chunks. Always false for a built index.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimension shared by every vector in the index.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `top_k` chunks most similar to the query vector.
    ///
    /// Results are ordered by descending cosine similarity; ties keep
    /// insertion order. The query must match the index dimension.
    pub fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<ScoredChunk>, IndexError> {
        if query.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|entry| ScoredChunk {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(query, &entry.vector),
            })
            .collect();
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
