//! Character-window chunking for extracted pages.
//!
//! Pages are split independently so every chunk keeps its page provenance.
//! Splitting delegates to `semchunk-rs` with a character counter, so chunk
//! boundaries prefer natural separators while respecting a hard character
//! budget. An optional sliding overlap carries the tail of the previous chunk
//! into the next one, trimmed back so the budget still holds.

use semchunk_rs::Chunker;

use crate::ingest::PageRecord;

use super::types::{Chunk, ChunkingError};

/// Split every page into chunks of at most `chunk_size` characters.
///
/// `overlap` characters from the tail of the previous chunk are prepended to
/// each subsequent chunk of the same page. All-whitespace pages yield no
/// chunks; a non-empty page always yields at least one.
pub fn chunk_pages(
    pages: &[PageRecord],
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<Chunk>, ChunkingError> {
    if chunk_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }

    let mut chunks = Vec::new();
    for page in pages {
        for text in chunk_text(&page.text, chunk_size, overlap) {
            chunks.push(Chunk {
                text,
                source_path: page.source_path.clone(),
                page_number: page.page_number,
            });
        }
    }
    Ok(chunks)
}

/// Chunk a single page's text into character-bounded windows.
fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let chunker = Chunker::new(
        chunk_size,
        Box::new(|segment: &str| segment.chars().count()),
    );
    let base_chunks = chunker.chunk(text);
    apply_overlap(base_chunks, chunk_size, overlap)
}

/// Apply a character-limited overlap between the tail of the previous chunk
/// and the current one.
///
/// Ensures the resulting overlapped chunk does not exceed `chunk_size`
/// characters by trimming from the start as needed.
fn apply_overlap(chunks: Vec<String>, chunk_size: usize, overlap: usize) -> Vec<String> {
    if chunks.is_empty() {
        return chunks;
    }

    let effective_overlap = overlap.min(chunk_size.saturating_sub(1));
    if effective_overlap == 0 {
        return chunks;
    }

    let mut overlapped = Vec::with_capacity(chunks.len());
    let mut iter = chunks.into_iter();
    let mut previous = iter
        .next()
        .expect("chunks iterator yielded zero elements despite non-empty guard");
    overlapped.push(previous.clone());

    for current in iter {
        let combined =
            build_overlapped_chunk(&previous, &current, effective_overlap, chunk_size);
        overlapped.push(combined);
        previous = current;
    }

    overlapped
}

fn build_overlapped_chunk(
    previous: &str,
    current: &str,
    overlap: usize,
    chunk_size: usize,
) -> String {
    let tail = char_tail(previous, overlap).trim_start();
    if tail.is_empty() {
        return current.to_string();
    }

    let mut combined = String::with_capacity(tail.len() + current.len() + 1);
    combined.push_str(tail);
    if !ends_with_whitespace(tail) && !starts_with_whitespace(current) {
        combined.push(' ');
    }
    combined.push_str(current);
    trim_to_char_budget(&combined, chunk_size)
}

/// Return the suffix of `text` holding at most `limit` characters.
fn char_tail(text: &str, limit: usize) -> &str {
    let total = text.chars().count();
    if total <= limit {
        return text;
    }
    let skip = total - limit;
    let start = text
        .char_indices()
        .nth(skip)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len());
    &text[start..]
}

/// Drop characters from the front of `text` until it fits the budget.
fn trim_to_char_budget(text: &str, budget: usize) -> String {
    let total = text.chars().count();
    if total <= budget {
        return text.to_string();
    }
    let skip = total - budget;
    let start = text
        .char_indices()
        .nth(skip)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len());
    text[start..].trim_start().to_string()
}

fn starts_with_whitespace(text: &str) -> bool {
    text.chars()
        .next()
        .map(|c| c.is_whitespace())
        .unwrap_or(false)
}

fn ends_with_whitespace(text: &str) -> bool {
    text.chars()
        .next_back()
        .map(|c| c.is_whitespace())
        .unwrap_or(false)
}
