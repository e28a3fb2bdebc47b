//! Relationship kind classification
//!
//! A raw relationship type URI is classified exactly once into a
//! [`RelationshipKind`]; every copy decision downstream is an exhaustive
//! match on the kind.

use std::fmt;

/// What a slide relationship points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    /// Raster or vector picture
    Image,
    /// OLE object or embedded package
    OleObject,
    /// Audio or video
    Media,
    /// Slide layout (template linkage)
    Layout,
    /// Slide master (template linkage)
    Master,
    /// Theme (template linkage)
    Theme,
    /// Notes master (template linkage)
    NotesMaster,
    /// Notes slide
    NotesSlide,
    /// Handout master (template linkage)
    HandoutMaster,
    /// Anything else: charts, diagrams, hyperlinks, tags, ...
    Generic,
}

/// Directory family a copied part is placed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartNamespace {
    /// `/ppt/media/mediaN.ext`
    Media,
    /// `/ppt/embeddings/oleObjectN.ext`
    Embeddings,
    /// `/ppt/other/objectN.ext`
    Other,
}

impl PartNamespace {
    /// Directory of the namespace
    pub fn dir(self) -> &'static str {
        match self {
            PartNamespace::Media => "/ppt/media",
            PartNamespace::Embeddings => "/ppt/embeddings",
            PartNamespace::Other => "/ppt/other",
        }
    }

    /// File stem before the counter
    pub fn stem(self) -> &'static str {
        match self {
            PartNamespace::Media => "media",
            PartNamespace::Embeddings => "oleObject",
            PartNamespace::Other => "object",
        }
    }
}

/// How a relationship's target is carried into the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStrategy {
    /// Decode and re-encode through the image codec
    Reencode,
    /// Copy the blob byte-for-byte under the given namespace
    Verbatim(PartNamespace),
    /// Never copied; the output uses its own template chain
    Skip,
}

impl RelationshipKind {
    /// Classify a relationship type URI
    ///
    /// Matching is on the lowercased last path segment so transitional,
    /// strict and vendor (`http://schemas.microsoft.com/...`) URIs classify
    /// alike.
    pub fn classify(rel_type: &str) -> Self {
        let lower = rel_type.to_ascii_lowercase();
        let name = lower.rsplit('/').next().unwrap_or(&lower);

        match name {
            "slidelayout" => RelationshipKind::Layout,
            "slidemaster" => RelationshipKind::Master,
            "notesmaster" => RelationshipKind::NotesMaster,
            "notesslide" => RelationshipKind::NotesSlide,
            "handoutmaster" => RelationshipKind::HandoutMaster,
            n if n.contains("theme") => RelationshipKind::Theme,
            "image" => RelationshipKind::Image,
            n if n.contains("oleobject") || n == "package" || n.contains("embedding") => {
                RelationshipKind::OleObject
            }
            n if n.contains("media") || n == "video" || n == "audio" => RelationshipKind::Media,
            _ => RelationshipKind::Generic,
        }
    }

    /// Whether this kind links a slide into its template chain
    pub fn is_template_linkage(self) -> bool {
        matches!(
            self,
            RelationshipKind::Layout
                | RelationshipKind::Master
                | RelationshipKind::Theme
                | RelationshipKind::NotesMaster
                | RelationshipKind::NotesSlide
                | RelationshipKind::HandoutMaster
        )
    }

    /// Copy strategy for this kind
    pub fn copy_strategy(self) -> CopyStrategy {
        match self {
            RelationshipKind::Image => CopyStrategy::Reencode,
            RelationshipKind::OleObject => CopyStrategy::Verbatim(PartNamespace::Embeddings),
            RelationshipKind::Media => CopyStrategy::Verbatim(PartNamespace::Media),
            RelationshipKind::Generic => CopyStrategy::Verbatim(PartNamespace::Other),
            RelationshipKind::Layout
            | RelationshipKind::Master
            | RelationshipKind::Theme
            | RelationshipKind::NotesMaster
            | RelationshipKind::NotesSlide
            | RelationshipKind::HandoutMaster => CopyStrategy::Skip,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelationshipKind::Image => "image",
            RelationshipKind::OleObject => "ole-object",
            RelationshipKind::Media => "media",
            RelationshipKind::Layout => "layout",
            RelationshipKind::Master => "master",
            RelationshipKind::Theme => "theme",
            RelationshipKind::NotesMaster => "notes-master",
            RelationshipKind::NotesSlide => "notes-slide",
            RelationshipKind::HandoutMaster => "handout-master",
            RelationshipKind::Generic => "generic",
        };
        f.write_str(name)
    }
}
