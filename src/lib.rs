#![deny(missing_docs)]

//! Core library for the Docqa document question-answering tool.

/// Explicit application state and the action dispatcher.
pub mod app;
/// Chat-completion client abstraction and the Groq adapter.
pub mod chat;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and the Gemini adapter.
pub mod embedding;
/// In-memory vector index with cosine-similarity retrieval.
pub mod index;
/// PDF discovery and per-page text extraction.
pub mod ingest;
/// Structured logging and tracing setup.
pub mod logging;
/// Session activity counters.
pub mod metrics;
/// Build and answer orchestration pipeline.
pub mod qa;
/// Interactive terminal front-end.
pub mod ui;
