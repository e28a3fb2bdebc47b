//! # slidex-pdf
//!
//! Page-level PDF assembly for slidex.
//!
//! Where the PPTX path re-assembles slide XML, this path works on whole
//! rendered pages: each slide's pre-rendered single-page PDF is cut into
//! the output in resolved order. The same helpers split a rendered deck
//! into those single-page artifacts.
//!
//! ## Example
//!
//! ```no_run
//! use slidex_core::{InMemoryStore, Settings, SlideId, SlideReference};
//! use slidex_pdf::PdfComposer;
//!
//! let mut store = InMemoryStore::new();
//! store.insert(
//!     SlideReference::new("intro", "decks/kickoff.pptx", 0)
//!         .with_slide_pdf("storage/slides_pdf/intro.pdf"),
//! );
//!
//! let settings = Settings::default();
//! let assembly = PdfComposer::new(&store, &settings)
//!     .assemble(&[SlideId::from("intro")], None, true)?;
//! println!("{} pages", assembly.page_count);
//! # Ok::<(), slidex_pdf::PdfError>(())
//! ```

pub mod composer;
pub mod error;
pub mod merge;
pub mod pages;

#[cfg(test)]
mod testing;

pub use composer::{PdfAssembly, PdfComposer};
pub use error::{PdfError, Result};
pub use merge::PageMerger;
pub use pages::{extract_page, page_count};
