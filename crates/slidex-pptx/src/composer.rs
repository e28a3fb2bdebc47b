//! Presentation composition
//!
//! Drives a whole assembly run: resolve the requested ids, order them,
//! vote on a canvas, then extract and append each slide. A slide that
//! fails is recorded in the report and skipped; only an empty request or a
//! run where nothing survives is an error.

use std::fs;
use std::path::Path;

use chrono::Local;
use slidex_core::assembly::{self, AssemblyReport, SlideOutcome};
use slidex_core::{AssemblyError, CompressionSetting, MetadataStore, Settings, SlideId, SlideReference};
use slidex_opc::Compression;
use tracing::{info, warn};

use crate::builder::PresentationBuilder;
use crate::canvas::TargetCanvas;
use crate::copier::SlideCopyReport;
use crate::error::{PptxError, Result};
use crate::extractor::{FragmentOrigin, SlideFragmentExtractor};
use crate::normalizer::{CanvasSelection, DimensionNormalizer};
use crate::presentation::Presentation;

/// Result of a successful PPTX assembly
#[derive(Debug, Clone)]
pub struct PptxAssembly {
    /// Output location and per-slide outcomes
    pub report: AssemblyReport,
    /// Copy details for every assembled slide, in output order
    pub slide_reports: Vec<(SlideId, SlideCopyReport)>,
    /// How the canvas was chosen
    pub canvas: CanvasSelection,
}

/// Assembles slides from a metadata store into one presentation
pub struct PresentationComposer<'a, S: MetadataStore + ?Sized> {
    store: &'a S,
    settings: &'a Settings,
    extractor: SlideFragmentExtractor,
}

impl<'a, S: MetadataStore + ?Sized> PresentationComposer<'a, S> {
    /// Create a composer
    pub fn new(store: &'a S, settings: &'a Settings) -> Self {
        Self {
            store,
            settings,
            extractor: SlideFragmentExtractor::new(),
        }
    }

    /// Assemble `slide_ids` into a new presentation under the exports directory
    ///
    /// `output_name` defaults to `assembled_<timestamp>.pptx`. With
    /// `preserve_order` slides appear in request order, otherwise sorted by
    /// source deck and position.
    pub fn assemble(
        &self,
        slide_ids: &[SlideId],
        output_name: Option<&str>,
        preserve_order: bool,
    ) -> Result<PptxAssembly> {
        let batch = assembly::resolve_batch(self.store, slide_ids)?;
        let references = assembly::order_references(batch.references, preserve_order);

        let fallback = TargetCanvas::from_settings(&self.settings.assembly);
        let selection = DimensionNormalizer::new(fallback).select_for(&references);
        let mut builder = PresentationBuilder::new(selection.canvas);

        let mut outcomes = Vec::with_capacity(slide_ids.len());
        let mut slide_reports = Vec::new();
        for reference in &references {
            match self.copy_slide(&mut builder, reference) {
                Ok(report) => {
                    outcomes.push((reference.slide_id.clone(), SlideOutcome::Assembled));
                    slide_reports.push((reference.slide_id.clone(), report));
                }
                Err(e) => {
                    warn!(slide_id = %reference.slide_id, error = %e, "Skipping slide");
                    outcomes.push((reference.slide_id.clone(), outcome_for(e)));
                }
            }
        }
        outcomes.extend(batch.outcomes);

        if builder.slide_count() == 0 {
            return Err(AssemblyError::NoValidSlides {
                requested: batch.requested,
            }
            .into());
        }

        let output_path = assembly::output_path(
            &self.settings.storage.exports_dir(),
            output_name,
            "pptx",
            Local::now(),
        )?;

        let slide_count = builder.slide_count();
        let mut package = builder.finish();
        package.set_compression(compression(self.settings.assembly.compression));
        package.save(&output_path)?;

        info!(
            path = %output_path.display(),
            slides = slide_count,
            requested = batch.requested,
            canvas = %selection.canvas,
            "Presentation assembled"
        );

        Ok(PptxAssembly {
            report: AssemblyReport {
                output_path,
                outcomes,
            },
            slide_reports,
            canvas: selection,
        })
    }

    fn copy_slide(&self, builder: &mut PresentationBuilder, reference: &SlideReference) -> Result<SlideCopyReport> {
        let fragment = self.extractor.extract(reference)?;
        Ok(builder.add_slide(&fragment))
    }
}

/// Write slide `slide_index` of a deck as a standalone one-slide presentation
///
/// The output keeps the deck's own canvas (widescreen when it declares
/// none). Parent directories of `output` are created.
pub fn export_slide(deck_path: &Path, slide_index: usize, output: &Path) -> Result<SlideCopyReport> {
    let presentation = Presentation::open(deck_path)?;
    let canvas = presentation.canvas().unwrap_or_default();
    let fragment =
        SlideFragmentExtractor::new().extract_from(presentation, slide_index, deck_path, FragmentOrigin::Deck)?;

    let mut builder = PresentationBuilder::new(canvas);
    let report = builder.add_slide(&fragment);

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    builder.finish().save(output)?;

    info!(
        deck = %deck_path.display(),
        index = slide_index,
        path = %output.display(),
        "Exported slide"
    );
    Ok(report)
}

fn outcome_for(err: PptxError) -> SlideOutcome {
    match err {
        PptxError::Assembly(e) => SlideOutcome::from(e),
        other => SlideOutcome::Failed {
            reason: other.to_string(),
        },
    }
}

fn compression(setting: CompressionSetting) -> Compression {
    match setting {
        CompressionSetting::Deflated => Compression::Deflated,
        CompressionSetting::Stored => Compression::Stored,
    }
}
