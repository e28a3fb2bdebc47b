//! Single-document page helpers
//!
//! Used upstream by ingestion to cut a rendered deck into the single-page
//! artifacts the composer consumes.

use std::fs;
use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::{PdfError, Result};
use crate::merge::PageMerger;

/// Number of pages in the PDF at `path`
pub fn page_count(path: &Path) -> Result<usize> {
    let document = Document::load(path)?;
    Ok(document.get_pages().len())
}

/// Write page `page_index` (zero-based) of `pdf_path` as its own document
///
/// Parent directories of `output_path` are created.
pub fn extract_page(pdf_path: &Path, page_index: usize, output_path: &Path) -> Result<()> {
    let source = Document::load(pdf_path)?;
    let count = source.get_pages().len();
    if page_index >= count {
        return Err(PdfError::PageOutOfRange {
            index: page_index,
            count,
        });
    }

    let mut merger = PageMerger::new();
    merger.push_page(source, page_index)?;
    let mut document = merger.finish();

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    document.save(output_path)?;

    debug!(
        source = %pdf_path.display(),
        page = page_index,
        path = %output_path.display(),
        "Extracted PDF page"
    );
    Ok(())
}
