//! Slide fragment extraction
//!
//! A [`SlideFragment`] is one slide's shape tree, its background and every
//! relationship the copied XML actually references, together with the
//! opened source it came from. It is built per copy and dropped afterwards.

use std::path::{Path, PathBuf};

use slidex_core::{AssemblyError, SlideReference, SlideSource};
use slidex_opc::xml::XmlElement;
use slidex_opc::{PartName, RelOwner, RelTarget};
use tracing::{debug, warn};

use crate::error::{PptxError, Result};
use crate::kind::RelationshipKind;
use crate::presentation::Presentation;
use crate::remap::collect_references;

/// `p:spTree` children that describe the tree itself rather than a shape
const TREE_PROPERTIES: &[&str] = &["nvGrpSpPr", "grpSpPr", "extLst"];

/// Which kind of source a fragment was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentOrigin {
    /// A materialised single-slide package
    Standalone,
    /// A position inside a multi-slide deck
    Deck,
}

/// One relationship of the source slide
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Owner-local id in the source slide
    pub old_id: String,
    /// Classified kind
    pub kind: RelationshipKind,
    /// Raw relationship type URI
    pub rel_type: String,
    /// Resolved target in the source package
    pub target: RelTarget,
}

/// Self-contained copy unit for one slide
#[derive(Debug)]
pub struct SlideFragment {
    /// Shape elements of `p:spTree`, in document order
    pub shapes: Vec<XmlElement>,
    /// `p:bg`, when the slide overrides its background
    pub background: Option<XmlElement>,
    /// Namespace declarations in scope at the shape tree
    pub namespaces: Vec<(String, String)>,
    /// `mc:Ignorable` prefixes of the source slide
    pub ignorable: Option<String>,
    /// Relationships referenced from the copied XML, first reference first
    pub dependencies: Vec<Dependency>,
    /// Template-chain relationships, never copied
    pub template_links: Vec<Dependency>,
    /// Relationships nothing in the copied XML points at
    pub unreferenced: Vec<Dependency>,
    /// Source slide part
    pub slide_part: PartName,
    /// File the slide was read from
    pub source_path: PathBuf,
    /// Slide position inside `source_path`
    pub slide_index: usize,
    /// Standalone file or deck
    pub origin: FragmentOrigin,
    source: Presentation,
}

impl SlideFragment {
    /// Presentation the fragment was read from
    pub fn source(&self) -> &Presentation {
        &self.source
    }

    /// Number of shapes
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Serialized shape elements, concatenated
    pub fn shapes_xml(&self) -> String {
        let mut out = String::new();
        for shape in &self.shapes {
            shape.write_to_string(&mut out);
        }
        out
    }

    /// Text of the title placeholder, if the slide has one
    pub fn title(&self) -> Option<String> {
        self.shapes.iter().find_map(|shape| {
            let placeholder = shape.descend(&["nvSpPr", "nvPr", "ph"])?;
            match placeholder.attr("type") {
                Some("title") | Some("ctrTitle") => Some(shape_text(shape)),
                _ => None,
            }
        })
    }
}

/// Concatenated `a:t` runs, paragraphs separated by newlines
fn shape_text(shape: &XmlElement) -> String {
    let Some(body) = shape.child("txBody") else {
        return String::new();
    };
    body.elements()
        .filter(|e| e.local_name() == "p")
        .map(|paragraph| {
            let mut text = String::new();
            paragraph.walk(&mut |e| {
                if e.local_name() == "t" {
                    text.push_str(&e.text());
                }
            });
            text
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds [`SlideFragment`]s from slide references
#[derive(Debug, Default, Clone, Copy)]
pub struct SlideFragmentExtractor;

impl SlideFragmentExtractor {
    /// Create an extractor
    pub fn new() -> Self {
        Self
    }

    /// Extract the slide a reference points at
    ///
    /// The standalone file is tried first, then the source deck. Only a
    /// source that cannot be opened moves on to the next candidate; a
    /// source that opens but yields no usable slide is an error of its own.
    pub fn extract(&self, reference: &SlideReference) -> Result<SlideFragment> {
        let mut tried = Vec::new();

        for source in reference.sources() {
            let path = source.path().to_path_buf();
            match Presentation::open(&path) {
                Ok(presentation) => {
                    let origin = match source {
                        SlideSource::Standalone(_) => FragmentOrigin::Standalone,
                        SlideSource::Deck { .. } => FragmentOrigin::Deck,
                    };
                    return self.extract_from(presentation, source.index(), &path, origin);
                }
                Err(e) => {
                    debug!(
                        slide_id = %reference.slide_id,
                        path = %path.display(),
                        error = %e,
                        "Slide source could not be opened"
                    );
                    tried.push(path);
                }
            }
        }

        warn!(slide_id = %reference.slide_id, "No source available for slide");
        Err(AssemblyError::SourceUnavailable {
            slide_id: reference.slide_id.clone(),
            tried,
        }
        .into())
    }

    /// Extract slide `index` of an already opened presentation
    pub fn extract_from(
        &self,
        presentation: Presentation,
        index: usize,
        source_path: &Path,
        origin: FragmentOrigin,
    ) -> Result<SlideFragment> {
        let slide_part = presentation.slide_part(index)?.clone();
        let slide = presentation.slide_xml(index)?;

        let common = slide
            .child("cSld")
            .ok_or_else(|| PptxError::invalid_presentation(format!("{} has no p:cSld", slide_part)))?;
        let tree = common
            .child("spTree")
            .ok_or_else(|| PptxError::invalid_presentation(format!("{} has no p:spTree", slide_part)))?;

        let namespaces = declarations_in_scope(&[&slide, common, tree]);
        let ignorable = slide
            .attributes
            .iter()
            .find(|(key, _)| key.ends_with(":Ignorable"))
            .map(|(_, value)| value.clone());

        let shapes: Vec<XmlElement> = tree
            .elements()
            .filter(|e| !TREE_PROPERTIES.contains(&e.local_name()))
            .cloned()
            .collect();
        let background = common.child("bg").cloned();

        let mut referenced = Vec::new();
        for element in shapes.iter().chain(background.as_ref()) {
            for id in collect_references(element, &namespaces) {
                if !referenced.contains(&id) {
                    referenced.push(id);
                }
            }
        }

        let mut all: Vec<Dependency> = presentation
            .package()
            .relationships(&RelOwner::Part(slide_part.clone()))
            .into_iter()
            .map(|rel| Dependency {
                kind: RelationshipKind::classify(&rel.rel_type),
                old_id: rel.id,
                rel_type: rel.rel_type,
                target: rel.target,
            })
            .collect();

        let mut template_links = Vec::new();
        all.retain(|dep| {
            if dep.kind.is_template_linkage() {
                template_links.push(dep.clone());
                false
            } else {
                true
            }
        });

        let mut dependencies = Vec::new();
        for id in &referenced {
            if let Some(pos) = all.iter().position(|dep| &dep.old_id == id) {
                dependencies.push(all.remove(pos));
            }
        }
        let unreferenced = all;

        debug!(
            slide = %slide_part,
            shapes = shapes.len(),
            dependencies = dependencies.len(),
            skipped = template_links.len() + unreferenced.len(),
            "Extracted slide fragment"
        );

        Ok(SlideFragment {
            shapes,
            background,
            namespaces,
            ignorable,
            dependencies,
            template_links,
            unreferenced,
            slide_part,
            source_path: source_path.to_path_buf(),
            slide_index: index,
            origin,
            source: presentation,
        })
    }
}

/// Declarations of a chain of ancestors, outermost first
fn declarations_in_scope(chain: &[&XmlElement]) -> Vec<(String, String)> {
    let mut in_scope: Vec<(String, String)> = Vec::new();
    for element in chain {
        for (prefix, uri) in element.namespace_declarations() {
            in_scope.retain(|(p, _)| p != prefix);
            in_scope.push((prefix.to_string(), uri.to_string()));
        }
    }
    in_scope
}
