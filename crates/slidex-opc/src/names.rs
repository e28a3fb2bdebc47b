//! Run-scoped part name allocation
//!
//! Names are allocated as `<dir>/<stem><N>.<ext>` with `N` counting up per
//! `(dir, stem)` pair. The allocator checks the package before handing a
//! name out, so it never returns a name already present.

use std::collections::HashMap;

use crate::package::Package;
use crate::part::PartName;

/// Shape of a generated part name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartNameTemplate {
    /// Absolute directory (`/ppt/media`)
    pub dir: String,
    /// File stem before the counter (`image`)
    pub stem: String,
    /// Extension without the dot (`png`); empty for none
    pub ext: String,
}

impl PartNameTemplate {
    /// Create a template
    pub fn new(dir: impl Into<String>, stem: impl Into<String>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into().trim_end_matches('/').to_string(),
            stem: stem.into(),
            ext: ext.into().trim_start_matches('.').to_string(),
        }
    }

    fn render(&self, n: u32) -> PartName {
        if self.ext.is_empty() {
            PartName::new(format!("{}/{}{}", self.dir, self.stem, n))
        } else {
            PartName::new(format!("{}/{}{}.{}", self.dir, self.stem, n, self.ext))
        }
    }
}

/// Allocates fresh part names within one package
///
/// One allocator is owned by one assembly run and discarded afterwards.
#[derive(Debug, Default)]
pub struct PartNameAllocator {
    counters: HashMap<(String, String), u32>,
}

impl PartNameAllocator {
    /// Create an allocator with all counters at one
    pub fn new() -> Self {
        Self::default()
    }

    /// Next name for `template` that does not exist in `package`
    pub fn next_name(&mut self, package: &Package, template: &PartNameTemplate) -> PartName {
        let counter = self
            .counters
            .entry((template.dir.clone(), template.stem.clone()))
            .or_insert(1);

        loop {
            let candidate = template.render(*counter);
            *counter += 1;
            if !package.contains(&candidate) {
                return candidate;
            }
        }
    }
}
