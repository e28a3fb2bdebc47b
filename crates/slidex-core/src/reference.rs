//! Slide references
//!
//! A [`SlideReference`] names one selectable slide and where its content
//! can be read from. References are read-only once resolved from a
//! metadata store; several may point into the same deck.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Stable identifier of a slide in the metadata store
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlideId(String);

impl SlideId {
    /// Create an id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlideId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SlideId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SlideId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One place a slide's content can be read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideSource {
    /// A single-slide package materialised upstream (the slide is index 0)
    Standalone(PathBuf),
    /// A slide position inside a multi-slide deck
    Deck {
        /// Path of the deck
        path: PathBuf,
        /// Zero-based slide position
        index: usize,
    },
}

impl SlideSource {
    /// File backing this source
    pub fn path(&self) -> &Path {
        match self {
            SlideSource::Standalone(path) => path,
            SlideSource::Deck { path, .. } => path,
        }
    }

    /// Slide position within the file
    pub fn index(&self) -> usize {
        match self {
            SlideSource::Standalone(_) => 0,
            SlideSource::Deck { index, .. } => *index,
        }
    }
}

/// A selectable slide as recorded by the ingestion pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideReference {
    /// Stable unique identifier
    pub slide_id: SlideId,
    /// Path of the original multi-slide deck
    pub deck_path: PathBuf,
    /// Zero-based position of the slide in the deck
    pub slide_index: usize,
    /// Standalone single-slide package, if materialised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_file_path: Option<PathBuf>,
    /// Pre-rendered single-page PDF, if materialised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide_pdf_path: Option<PathBuf>,
    /// Slide title as extracted at ingestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SlideReference {
    /// Reference a slide by deck position
    pub fn new(slide_id: impl Into<SlideId>, deck_path: impl Into<PathBuf>, slide_index: usize) -> Self {
        Self {
            slide_id: slide_id.into(),
            deck_path: deck_path.into(),
            slide_index,
            slide_file_path: None,
            slide_pdf_path: None,
            title: None,
        }
    }

    /// Attach the standalone single-slide package
    pub fn with_slide_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.slide_file_path = Some(path.into());
        self
    }

    /// Attach the rendered single-page PDF
    pub fn with_slide_pdf(mut self, path: impl Into<PathBuf>) -> Self {
        self.slide_pdf_path = Some(path.into());
        self
    }

    /// Attach a title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Canonical sort key: source deck, then position in it
    pub fn ordering_key(&self) -> (&Path, usize) {
        (self.deck_path.as_path(), self.slide_index)
    }

    /// Sources to try, in preference order
    ///
    /// The standalone file comes first because original decks may have been
    /// moved or deleted since ingestion.
    pub fn sources(&self) -> Vec<SlideSource> {
        let mut sources = Vec::with_capacity(2);
        if let Some(path) = &self.slide_file_path {
            sources.push(SlideSource::Standalone(path.clone()));
        }
        sources.push(SlideSource::Deck {
            path: self.deck_path.clone(),
            index: self.slide_index,
        });
        sources
    }
}
