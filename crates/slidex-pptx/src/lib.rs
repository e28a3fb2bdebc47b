//! # slidex-pptx
//!
//! Slide extraction and re-assembly for PowerPoint (PPTX) packages.
//!
//! Slides are pulled out of arbitrary source decks as [`SlideFragment`]s
//! (shape tree plus the parts it depends on) and composed into a fresh
//! package that carries its own blank template chain. Relationship ids are
//! remapped on the way in, binary parts are copied under freshly allocated
//! names, and the output canvas is chosen by majority vote across sources.
//!
//! ## Example
//!
//! ```no_run
//! use slidex_core::{InMemoryStore, SlideId, SlideReference, Settings};
//! use slidex_pptx::PresentationComposer;
//!
//! let mut store = InMemoryStore::new();
//! store.insert(SlideReference::new("intro", "decks/kickoff.pptx", 0));
//! store.insert(SlideReference::new("plan", "decks/kickoff.pptx", 3));
//!
//! let settings = Settings::default();
//! let composer = PresentationComposer::new(&store, &settings);
//! let ids = [SlideId::from("intro"), SlideId::from("plan")];
//! let assembly = composer.assemble(&ids, Some("kickoff-short.pptx"), true)?;
//! println!("wrote {}", assembly.report.output_path.display());
//! # Ok::<(), slidex_pptx::PptxError>(())
//! ```

pub mod builder;
pub mod canvas;
pub mod composer;
pub mod copier;
pub mod error;
pub mod extractor;
pub mod image_codec;
pub mod kind;
pub mod normalizer;
pub mod presentation;
pub mod remap;

// Re-exports
pub use builder::PresentationBuilder;
pub use canvas::TargetCanvas;
pub use composer::{export_slide, PptxAssembly, PresentationComposer};
pub use copier::{CopyAction, PartCopier, RelationshipCopy, SlideCopyReport};
pub use error::{PptxError, Result};
pub use extractor::{Dependency, FragmentOrigin, SlideFragment, SlideFragmentExtractor};
pub use kind::{CopyStrategy, PartNamespace, RelationshipKind};
pub use normalizer::{CanvasSelection, DimensionNormalizer};
pub use presentation::Presentation;
pub use remap::RelationshipRemapper;

/// PPTX-related constants
pub mod constants {
    /// EMU per inch
    pub const EMU_PER_INCH: i64 = 914_400;

    /// 16:9 canvas width in EMU (10")
    pub const WIDESCREEN_WIDTH_EMU: i64 = 9_144_000;

    /// 16:9 canvas height in EMU (5.625")
    pub const WIDESCREEN_HEIGHT_EMU: i64 = 5_143_500;

    /// First id handed out in `p:sldIdLst` (ids below 256 are reserved)
    pub const FIRST_SLIDE_ID: u32 = 256;

    /// PresentationML namespace
    pub const NS_PRESENTATION: &str =
        "http://schemas.openxmlformats.org/presentationml/2006/main";

    /// DrawingML namespace
    pub const NS_DRAWING: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

    /// Relationships namespace (transitional)
    pub const NS_RELATIONSHIPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

    /// Relationships namespace (strict)
    pub const NS_RELATIONSHIPS_STRICT: &str =
        "http://purl.oclc.org/ooxml/officeDocument/relationships";

    /// Markup compatibility namespace
    pub const NS_MARKUP_COMPATIBILITY: &str =
        "http://schemas.openxmlformats.org/markup-compatibility/2006";

    /// Main document relationship type
    pub const REL_TYPE_OFFICE_DOCUMENT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

    /// Core properties relationship type
    pub const REL_TYPE_CORE_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";

    /// Extended properties relationship type
    pub const REL_TYPE_EXTENDED_PROPERTIES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

    /// Slide relationship type
    pub const REL_TYPE_SLIDE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

    /// Slide layout relationship type
    pub const REL_TYPE_SLIDE_LAYOUT: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideLayout";

    /// Slide master relationship type
    pub const REL_TYPE_SLIDE_MASTER: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster";

    /// Theme relationship type
    pub const REL_TYPE_THEME: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/theme";

    /// Presentation properties relationship type
    pub const REL_TYPE_PRES_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";

    /// View properties relationship type
    pub const REL_TYPE_VIEW_PROPS: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";

    /// Table styles relationship type
    pub const REL_TYPE_TABLE_STYLES: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";

    /// Image relationship type
    pub const REL_TYPE_IMAGE: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

    /// Hyperlink relationship type
    pub const REL_TYPE_HYPERLINK: &str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

    /// Main presentation part content type
    pub const CT_PRESENTATION: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";

    /// Slide content type
    pub const CT_SLIDE: &str = "application/vnd.openxmlformats-officedocument.presentationml.slide+xml";

    /// Slide layout content type
    pub const CT_SLIDE_LAYOUT: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";

    /// Slide master content type
    pub const CT_SLIDE_MASTER: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";

    /// Theme content type
    pub const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";

    /// Presentation properties content type
    pub const CT_PRES_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";

    /// View properties content type
    pub const CT_VIEW_PROPS: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";

    /// Table styles content type
    pub const CT_TABLE_STYLES: &str =
        "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";

    /// Core properties content type
    pub const CT_CORE_PROPERTIES: &str = "application/vnd.openxmlformats-package.core-properties+xml";

    /// Extended properties content type
    pub const CT_EXTENDED_PROPERTIES: &str =
        "application/vnd.openxmlformats-officedocument.extended-properties+xml";

    /// Content type for embedded OLE objects with no recorded type
    pub const CT_OLE_OBJECT: &str = "application/vnd.openxmlformats-officedocument.oleObject";
}
