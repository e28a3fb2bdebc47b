//! Error types for PPTX extraction and assembly.

use slidex_core::{AssemblyError, CoreError};
use slidex_opc::OpcError;
use thiserror::Error;

/// Result type for PPTX operations
pub type Result<T> = std::result::Result<T, PptxError>;

/// Errors that can occur while reading or composing presentations
#[derive(Error, Debug)]
pub enum PptxError {
    /// Package could not be read or written
    #[error("Package error: {0}")]
    Package(#[from] OpcError),

    /// The package is not a usable presentation
    #[error("Invalid presentation: {reason}")]
    InvalidPresentation { reason: String },

    /// Requested slide position does not exist
    #[error("Slide index {index} out of range: presentation has {count} slides")]
    SlideIndexOutOfRange { index: usize, count: usize },

    /// A part named by a relationship is absent
    #[error("Missing part: {part}")]
    MissingPart { part: String },

    /// Image decode or encode failure
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Batch-level assembly failure
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Settings or output path failure
    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PptxError {
    /// Create an invalid presentation error
    pub fn invalid_presentation(reason: impl Into<String>) -> Self {
        Self::InvalidPresentation {
            reason: reason.into(),
        }
    }

    /// Create a missing part error
    pub fn missing_part(part: impl Into<String>) -> Self {
        Self::MissingPart { part: part.into() }
    }

    /// Get the error code for diagnostics
    pub fn code(&self) -> &'static str {
        match self {
            Self::Package(_) => "PPTX001",
            Self::InvalidPresentation { .. } => "PPTX002",
            Self::SlideIndexOutOfRange { .. } => "PPTX003",
            Self::MissingPart { .. } => "PPTX004",
            Self::Image(_) => "PPTX005",
            Self::Assembly(AssemblyError::NoSlidesProvided) => "PPTX010",
            Self::Assembly(AssemblyError::NoValidSlides { .. }) => "PPTX011",
            Self::Assembly(AssemblyError::SourceUnavailable { .. }) => "PPTX012",
            Self::Core(_) => "PPTX013",
            Self::Io(_) => "PPTX014",
        }
    }
}
