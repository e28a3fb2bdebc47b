//! Page-level PDF composition
//!
//! Every slide contributes the first page of its pre-rendered PDF. A slide
//! without a rendered artifact is skipped and reported; the batch rules
//! (empty request, unknown ids, zero survivors) are shared with the PPTX
//! composer.

use std::path::Path;

use chrono::Local;
use lopdf::Document;
use slidex_core::assembly::{self, AssemblyReport, SlideOutcome};
use slidex_core::{AssemblyError, MetadataStore, Settings, SlideId, SlideReference};
use tracing::{error, info, warn};

use crate::error::{PdfError, Result};
use crate::merge::PageMerger;

/// Result of a successful PDF assembly
#[derive(Debug, Clone)]
pub struct PdfAssembly {
    /// Output location and per-slide outcomes
    pub report: AssemblyReport,
    /// Pages in the output document
    pub page_count: usize,
}

/// Assembles pre-rendered slide pages into one PDF
pub struct PdfComposer<'a, S: MetadataStore + ?Sized> {
    store: &'a S,
    settings: &'a Settings,
}

impl<'a, S: MetadataStore + ?Sized> PdfComposer<'a, S> {
    /// Create a composer
    pub fn new(store: &'a S, settings: &'a Settings) -> Self {
        Self { store, settings }
    }

    /// Merge the rendered pages of `slide_ids` into a PDF under the exports directory
    ///
    /// `output_name` defaults to `assembled_<timestamp>.pdf`. Ordering
    /// follows the same rules as the PPTX composer.
    pub fn assemble(
        &self,
        slide_ids: &[SlideId],
        output_name: Option<&str>,
        preserve_order: bool,
    ) -> Result<PdfAssembly> {
        let batch = assembly::resolve_batch(self.store, slide_ids)?;
        let references = assembly::order_references(batch.references, preserve_order);
        info!(slides = references.len(), requested = batch.requested, "Assembling PDF");

        let mut merger = PageMerger::new();
        let mut outcomes = Vec::with_capacity(slide_ids.len());
        for reference in &references {
            let outcome = add_slide(&mut merger, reference);
            outcomes.push((reference.slide_id.clone(), outcome));
        }
        outcomes.extend(batch.outcomes);

        let page_count = merger.page_count();
        if page_count == 0 {
            return Err(AssemblyError::NoValidSlides {
                requested: batch.requested,
            }
            .into());
        }

        let output_path = assembly::output_path(
            &self.settings.storage.exports_dir(),
            output_name,
            "pdf",
            Local::now(),
        )?;
        merger.finish().save(&output_path)?;

        info!(path = %output_path.display(), pages = page_count, "PDF assembled");

        Ok(PdfAssembly {
            report: AssemblyReport {
                output_path,
                outcomes,
            },
            page_count,
        })
    }
}

fn add_slide(merger: &mut PageMerger, reference: &SlideReference) -> SlideOutcome {
    let path = match reference.slide_pdf_path.as_deref() {
        Some(path) if path.exists() => path,
        other => {
            warn!(slide_id = %reference.slide_id, "PDF not found for slide, skipping");
            return SlideOutcome::MissingArtifact {
                path: other.map(Path::to_path_buf),
            };
        }
    };

    match Document::load(path).map_err(PdfError::from).and_then(|doc| merger.push_page(doc, 0)) {
        Ok(()) => SlideOutcome::Assembled,
        Err(e) => {
            error!(slide_id = %reference.slide_id, path = %path.display(), error = %e, "Error adding slide to PDF");
            SlideOutcome::Failed { reason: e.to_string() }
        }
    }
}
