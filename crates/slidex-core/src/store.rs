//! Metadata store seam
//!
//! The composers only ever ask "what is slide X?". Persistent storage is
//! somebody else's problem; this module ships an in-memory store and a
//! read-only JSON catalog for embedders and tests.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::reference::{SlideId, SlideReference};

/// Resolves slide ids to references
pub trait MetadataStore {
    /// Look up one slide; `None` when the id is unknown
    fn get_slide(&self, id: &SlideId) -> Option<SlideReference>;
}

impl<T: MetadataStore + ?Sized> MetadataStore for &T {
    fn get_slide(&self, id: &SlideId) -> Option<SlideReference> {
        (**self).get_slide(id)
    }
}

/// HashMap-backed store
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    slides: HashMap<SlideId, SlideReference>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a reference, returning the previous one
    pub fn insert(&mut self, reference: SlideReference) -> Option<SlideReference> {
        self.slides.insert(reference.slide_id.clone(), reference)
    }

    /// Number of slides
    pub fn len(&self) -> usize {
        self.slides.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }
}

impl MetadataStore for InMemoryStore {
    fn get_slide(&self, id: &SlideId) -> Option<SlideReference> {
        self.slides.get(id).cloned()
    }
}

impl FromIterator<SlideReference> for InMemoryStore {
    fn from_iter<I: IntoIterator<Item = SlideReference>>(iter: I) -> Self {
        let mut store = Self::new();
        for reference in iter {
            store.insert(reference);
        }
        store
    }
}

/// Read-only catalog loaded from a JSON array of slide records
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    store: InMemoryStore,
}

impl JsonCatalog {
    /// Load a catalog file
    ///
    /// Relative paths inside the records are resolved against the
    /// catalog's own directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut records: Vec<SlideReference> = serde_json::from_str(&content)?;

        if let Some(base) = path.parent() {
            for record in &mut records {
                rebase(record, base);
            }
        }

        debug!(path = %path.display(), slides = records.len(), "Loaded slide catalog");
        Ok(Self {
            store: records.into_iter().collect(),
        })
    }

    /// Parse a catalog from a JSON string, paths taken as-is
    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<SlideReference> = serde_json::from_str(json)?;
        Ok(Self {
            store: records.into_iter().collect(),
        })
    }

    /// Number of slides in the catalog
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl MetadataStore for JsonCatalog {
    fn get_slide(&self, id: &SlideId) -> Option<SlideReference> {
        self.store.get_slide(id)
    }
}

fn rebase(record: &mut SlideReference, base: &Path) {
    if record.deck_path.is_relative() {
        record.deck_path = base.join(&record.deck_path);
    }
    for path in [&mut record.slide_file_path, &mut record.slide_pdf_path]
        .into_iter()
        .flatten()
    {
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}
