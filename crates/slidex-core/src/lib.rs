//! # slidex-core
//!
//! Shared building blocks for the slidex assembly pipeline.
//!
//! This crate provides:
//! - The [`SlideReference`] model and the [`MetadataStore`] seam that
//!   resolves slide ids to references
//! - [`Settings`] loaded from TOML, and tracing initialisation
//! - Batch resolution, ordering and output naming used by both the PPTX
//!   and the PDF composer ([`assembly`])
//! - The assembly error taxonomy ([`AssemblyError`])
//!
//! ## Example
//!
//! ```
//! use slidex_core::{assembly, InMemoryStore, SlideId, SlideReference};
//!
//! let mut store = InMemoryStore::new();
//! store.insert(SlideReference::new("intro", "decks/kickoff.pptx", 0).with_title("Welcome"));
//!
//! let batch = assembly::resolve_batch(&store, &[SlideId::from("intro")]).unwrap();
//! assert_eq!(batch.references.len(), 1);
//! ```

pub mod assembly;
pub mod error;
pub mod logging;
pub mod reference;
pub mod settings;
pub mod store;

pub use assembly::{AssemblyReport, ResolvedBatch, SlideOutcome};
pub use error::{AssemblyError, CoreError, Result};
pub use reference::{SlideId, SlideReference, SlideSource};
pub use settings::{AssemblySettings, CompressionSetting, LoggingSettings, Settings, StorageSettings};
pub use store::{InMemoryStore, JsonCatalog, MetadataStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
