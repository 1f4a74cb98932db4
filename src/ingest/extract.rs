//! Per-page text extraction backed by the `pdf-extract` crate.

use std::path::Path;

use super::{IngestError, PageRecord};

/// Extract one [`PageRecord`] per page of the given PDF.
///
/// Page numbers are 1-indexed in document order. Pages whose extracted text is
/// empty are kept; the chunking step decides what to do with them.
pub fn extract_pages(path: &Path) -> Result<Vec<PageRecord>, IngestError> {
    let page_texts =
        pdf_extract::extract_text_by_pages(path).map_err(|source| IngestError::Extraction {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(page_texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| PageRecord {
            text,
            source_path: path.to_path_buf(),
            page_number: index + 1,
        })
        .collect())
}
