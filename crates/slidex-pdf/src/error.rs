//! Error types for PDF assembly

use slidex_core::{AssemblyError, CoreError};
use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur while reading or merging PDFs
#[derive(Error, Debug)]
pub enum PdfError {
    /// lopdf could not parse, edit or write a document
    #[error("PDF error: {0}")]
    Lopdf(#[from] lopdf::Error),

    /// Requested page does not exist
    #[error("Page index {index} out of range: document has {count} pages")]
    PageOutOfRange { index: usize, count: usize },

    /// Batch-level assembly failure
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Settings or output path failure
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
