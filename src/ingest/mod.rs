//! PDF corpus ingestion: file discovery and per-page text extraction.
//!
//! Ingestion is batch-or-nothing: a single unreadable file aborts the whole
//! load so a half-extracted corpus can never reach the index build.

mod extract;

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

pub use extract::extract_pages;

/// Errors raised while loading a PDF corpus.
#[derive(Debug, Error)]
pub enum IngestError {
    /// No PDF files were supplied or discovered.
    #[error("No PDF files found to ingest")]
    NoFiles,
    /// The corpus directory could not be traversed.
    #[error("Failed to read corpus directory: {0}")]
    Walk(#[from] walkdir::Error),
    /// Text extraction failed for one of the supplied files.
    #[error("Failed to extract text from {path}: {source}")]
    Extraction {
        /// File that failed to extract.
        path: PathBuf,
        /// Underlying extraction error.
        #[source]
        source: pdf_extract::OutputError,
    },
}

/// One page of extracted text with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRecord {
    /// Plain text extracted from the page.
    pub text: String,
    /// Path of the PDF the page came from.
    pub source_path: PathBuf,
    /// 1-indexed page number within the source file.
    pub page_number: usize,
}

/// Collect every `*.pdf` file under `dir`, sorted by path.
///
/// The extension match is case-insensitive. Returns [`IngestError::NoFiles`]
/// when the walk finds nothing, so callers never hand an empty batch to the
/// extraction step.
pub fn discover_pdf_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
        if is_pdf {
            files.push(path.to_path_buf());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(IngestError::NoFiles);
    }
    tracing::debug!(dir = %dir.display(), files = files.len(), "Discovered PDF corpus");
    Ok(files)
}

/// Extract every page of every supplied file, in file order.
///
/// Any single extraction failure aborts the whole load; no partial page set
/// is ever returned.
pub fn load_corpus(paths: &[PathBuf]) -> Result<Vec<PageRecord>, IngestError> {
    if paths.is_empty() {
        return Err(IngestError::NoFiles);
    }

    let mut pages = Vec::new();
    for path in paths {
        let extracted = extract_pages(path)?;
        tracing::debug!(file = %path.display(), pages = extracted.len(), "Extracted PDF");
        pages.extend(extracted);
    }
    Ok(pages)
}

/// Discover and extract the corpus rooted at `dir` in one step.
pub fn load_directory(dir: &Path) -> Result<Vec<PageRecord>, IngestError> {
    let files = discover_pdf_files(dir)?;
    load_corpus(&files)
}
