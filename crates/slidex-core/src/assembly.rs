//! Batch policy shared by the PPTX and PDF composers
//!
//! Both composers take an ordered list of slide ids and follow the same
//! rules: an empty request is refused, unknown ids are skipped with a
//! warning, zero survivors is fatal, and per-slide failures only ever show
//! up in the [`AssemblyReport`].

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::warn;

use crate::error::{AssemblyError, Result};
use crate::reference::{SlideId, SlideReference};
use crate::store::MetadataStore;

/// What happened to one requested slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideOutcome {
    /// The slide is in the output
    Assembled,
    /// The metadata store does not know the id
    Unresolved,
    /// Neither the standalone file nor the source deck could be opened
    SourceUnavailable {
        /// Paths attempted, in preference order
        tried: Vec<PathBuf>,
    },
    /// The rendered artifact the composer needs does not exist
    MissingArtifact {
        /// Expected location, if the store recorded one
        path: Option<PathBuf>,
    },
    /// Copying failed for another reason
    Failed {
        /// Human-readable cause
        reason: String,
    },
}

impl SlideOutcome {
    /// Whether the slide made it into the output
    pub fn is_assembled(&self) -> bool {
        matches!(self, SlideOutcome::Assembled)
    }
}

impl From<AssemblyError> for SlideOutcome {
    fn from(err: AssemblyError) -> Self {
        match err {
            AssemblyError::SourceUnavailable { tried, .. } => SlideOutcome::SourceUnavailable { tried },
            other => SlideOutcome::Failed {
                reason: other.to_string(),
            },
        }
    }
}

/// Result of one assembly run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Where the output was written
    pub output_path: PathBuf,
    /// One entry per requested id
    pub outcomes: Vec<(SlideId, SlideOutcome)>,
}

impl AssemblyReport {
    /// Number of slides in the output
    pub fn assembled_count(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_assembled()).count()
    }

    /// Entries for slides that did not make it
    pub fn failures(&self) -> impl Iterator<Item = &(SlideId, SlideOutcome)> {
        self.outcomes.iter().filter(|(_, o)| !o.is_assembled())
    }

    /// Outcome recorded for an id (first occurrence)
    pub fn outcome_for(&self, id: &SlideId) -> Option<&SlideOutcome> {
        self.outcomes
            .iter()
            .find(|(slide_id, _)| slide_id == id)
            .map(|(_, outcome)| outcome)
    }
}

/// References resolved from a request, plus the ids that were not found
#[derive(Debug, Clone)]
pub struct ResolvedBatch {
    /// Resolved references, in request order
    pub references: Vec<SlideReference>,
    /// `Unresolved` outcomes for unknown ids
    pub outcomes: Vec<(SlideId, SlideOutcome)>,
    /// Number of ids in the request
    pub requested: usize,
}

/// Resolve every requested id against the store
///
/// Fails with `NoSlidesProvided` for an empty request and `NoValidSlides`
/// when no id resolves.
pub fn resolve_batch<S: MetadataStore + ?Sized>(
    store: &S,
    ids: &[SlideId],
) -> std::result::Result<ResolvedBatch, AssemblyError> {
    if ids.is_empty() {
        return Err(AssemblyError::NoSlidesProvided);
    }

    let mut references = Vec::with_capacity(ids.len());
    let mut outcomes = Vec::new();

    for id in ids {
        match store.get_slide(id) {
            Some(reference) => references.push(reference),
            None => {
                warn!(slide_id = %id, "Slide not found in metadata store, skipping");
                outcomes.push((id.clone(), SlideOutcome::Unresolved));
            }
        }
    }

    if references.is_empty() {
        return Err(AssemblyError::NoValidSlides {
            requested: ids.len(),
        });
    }

    Ok(ResolvedBatch {
        references,
        outcomes,
        requested: ids.len(),
    })
}

/// Final slide order for an assembly
///
/// With `preserve_order` the request order is kept; otherwise references
/// are stably sorted by source deck and position.
pub fn order_references(mut references: Vec<SlideReference>, preserve_order: bool) -> Vec<SlideReference> {
    if !preserve_order {
        references.sort_by(|a, b| a.ordering_key().cmp(&b.ordering_key()));
    }
    references
}

/// Default output file name: `assembled_<YYYYMMDD_HHMMSS>.<ext>`
pub fn default_output_name(extension: &str, now: DateTime<Local>) -> String {
    format!("assembled_{}.{}", now.format("%Y%m%d_%H%M%S"), extension)
}

/// Output path inside `exports_dir`, creating the directory
///
/// Only the file-name component of a caller-supplied name is used, and the
/// extension is appended when the name has none.
pub fn output_path(
    exports_dir: &Path,
    name: Option<&str>,
    extension: &str,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(exports_dir)?;

    let file_name = name
        .and_then(|n| Path::new(n).file_name())
        .map(|n| {
            let n = PathBuf::from(n);
            if n.extension().is_some() {
                n
            } else {
                n.with_extension(extension)
            }
        })
        .unwrap_or_else(|| PathBuf::from(default_output_name(extension, now)));

    Ok(exports_dir.join(file_name))
}
