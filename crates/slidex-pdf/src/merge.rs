//! Page-level merging of PDF documents
//!
//! Each pushed page is cut out of its source document, renumbered past
//! everything already merged and hung under one fresh page tree.

use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, warn};

use crate::error::{PdfError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE: &[&[u8]] = &[b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Page-tree nesting limit when resolving inherited attributes
const MAX_TREE_DEPTH: usize = 64;

/// Accumulates pages from many documents into one
pub struct PageMerger {
    document: Document,
    kids: Vec<ObjectId>,
}

impl Default for PageMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl PageMerger {
    /// Create an empty merger
    pub fn new() -> Self {
        Self {
            document: Document::with_version("1.5"),
            kids: Vec::new(),
        }
    }

    /// Pages merged so far
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// Append page `index` (zero-based) of `source`
    pub fn push_page(&mut self, mut source: Document, index: usize) -> Result<()> {
        let pages = source.get_pages();
        let count = pages.len();
        let number = u32::try_from(index + 1).map_err(|_| PdfError::PageOutOfRange { index, count })?;
        if !pages.contains_key(&number) {
            return Err(PdfError::PageOutOfRange { index, count });
        }

        let others: Vec<u32> = pages.keys().copied().filter(|n| *n != number).collect();
        if !others.is_empty() {
            source.delete_pages(&others);
            source.prune_objects();
        }

        source.renumber_objects_with(self.document.max_id + 1);
        self.document.max_id = self.document.max_id.max(source.max_id);

        let page_id = source
            .get_pages()
            .values()
            .next()
            .copied()
            .ok_or(PdfError::PageOutOfRange { index, count })?;

        let mut page = source.get_dictionary(page_id)?.clone();
        for (key, value) in inherited_attributes(&source, page_id) {
            if !page.has(&key) {
                page.set(key, value);
            }
        }

        for (object_id, object) in source.objects {
            match object.type_name().unwrap_or("") {
                "Catalog" | "Pages" | "Page" | "Outlines" | "Outline" => {}
                _ => {
                    self.document.objects.insert(object_id, object);
                }
            }
        }
        self.document.objects.insert(page_id, Object::Dictionary(page));
        self.kids.push(page_id);

        debug!(page = index, merged = self.kids.len(), "Merged page");
        Ok(())
    }

    /// Build the page tree and catalog, returning the merged document
    pub fn finish(mut self) -> Document {
        if self.kids.is_empty() {
            warn!("Merged document has no pages");
        }

        let pages_id = self.document.new_object_id();
        for kid in &self.kids {
            if let Some(Object::Dictionary(page)) = self.document.objects.get_mut(kid) {
                page.set("Parent", Object::Reference(pages_id));
            }
        }

        let kids: Vec<Object> = self.kids.iter().map(|&id| Object::Reference(id)).collect();
        let count = i64::try_from(kids.len()).unwrap_or(i64::MAX);
        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(count)),
        ]);
        self.document.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = self.document.new_object_id();
        let catalog = Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        self.document.objects.insert(catalog_id, Object::Dictionary(catalog));
        self.document.trailer.set("Root", Object::Reference(catalog_id));

        self.document.compress();
        self.document
    }
}

/// Inheritable attributes of the nearest ancestors that define them
fn inherited_attributes(document: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
    let mut current = parent_of(document, page_id);
    let mut depth = 0;

    while let Some(node_id) = current {
        let Ok(node) = document.get_dictionary(node_id) else {
            break;
        };
        for key in INHERITABLE {
            if found.iter().any(|(k, _)| k.as_slice() == *key) {
                continue;
            }
            if let Ok(value) = node.get(key) {
                found.push((key.to_vec(), value.clone()));
            }
        }

        depth += 1;
        if depth >= MAX_TREE_DEPTH {
            break;
        }
        current = parent_of(document, node_id);
    }
    found
}

fn parent_of(document: &Document, id: ObjectId) -> Option<ObjectId> {
    document
        .get_dictionary(id)
        .ok()?
        .get(b"Parent")
        .ok()?
        .as_reference()
        .ok()
}
