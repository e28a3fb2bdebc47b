//! Error types for slidex-core

use std::path::PathBuf;

use thiserror::Error;

use crate::reference::SlideId;

/// Errors raised while loading settings or catalogs
#[derive(Error, Debug)]
pub enum CoreError {
    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed settings file
    #[error("Settings parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed slide catalog
    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for slidex-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Assembly-level failures
///
/// Only [`NoSlidesProvided`](Self::NoSlidesProvided) and
/// [`NoValidSlides`](Self::NoValidSlides) ever reach the caller of an
/// assembly; [`SourceUnavailable`](Self::SourceUnavailable) is raised per
/// slide and recorded in the report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    /// The request named no slides at all
    #[error("No slides provided")]
    NoSlidesProvided,

    /// None of the requested slides could be assembled
    #[error("None of the {requested} requested slides could be assembled")]
    NoValidSlides {
        /// Number of ids in the request
        requested: usize,
    },

    /// Neither the standalone slide file nor the source deck could be opened
    #[error("Source for slide '{slide_id}' unavailable (tried {})", display_paths(.tried))]
    SourceUnavailable {
        /// Slide whose source is missing
        slide_id: SlideId,
        /// Paths attempted, in preference order
        tried: Vec<PathBuf>,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
