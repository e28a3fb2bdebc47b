//! Dependency copying into the output package
//!
//! Each referenced relationship of a fragment is carried into the output
//! following its kind's [`CopyStrategy`]. Every copy lands under a freshly
//! allocated name; nothing in the output is ever overwritten. Parts that
//! carry their own relationship tables (charts with embedded workbooks,
//! diagrams) are copied recursively, keeping the nested owner-local ids.

use std::collections::HashMap;
use std::fmt;

use slidex_opc::{Package, PartName, PartNameAllocator, PartNameTemplate, RelOwner, RelTarget};
use tracing::{debug, warn};

use crate::constants::{CT_OLE_OBJECT, CT_SLIDE};
use crate::extractor::{Dependency, SlideFragment};
use crate::image_codec::{self, extension_for_content_type};
use crate::kind::{CopyStrategy, PartNamespace, RelationshipKind};

/// Extension used when neither the part name nor the content type gives one
const FALLBACK_EXTENSION: &str = "bin";

/// What happened to one source relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyAction {
    /// Blob copied byte-for-byte under a fresh name
    Copied,
    /// Image decoded and encoded again
    Reencoded,
    /// Image the codec could not read, copied byte-for-byte instead
    Verbatim,
    /// Re-created as an external relationship to the same URI
    External,
    /// Source part had no blob and its name is free in the output; related to that name
    CrossReference,
    /// Template-chain relationship, never copied
    SkippedStructural,
    /// Nothing in the copied XML references it
    Unreferenced,
    /// Could not be carried over
    Failed {
        /// Cause
        reason: String,
    },
}

impl fmt::Display for CopyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyAction::Copied => f.write_str("copied"),
            CopyAction::Reencoded => f.write_str("re-encoded"),
            CopyAction::Verbatim => f.write_str("verbatim"),
            CopyAction::External => f.write_str("external"),
            CopyAction::CrossReference => f.write_str("cross-reference"),
            CopyAction::SkippedStructural => f.write_str("skipped (template chain)"),
            CopyAction::Unreferenced => f.write_str("skipped (unreferenced)"),
            CopyAction::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// One source relationship and its fate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipCopy {
    /// Id in the source slide's table
    pub old_id: String,
    /// Id in the output slide's table, when one was created
    pub new_id: Option<String>,
    /// Classified kind
    pub kind: RelationshipKind,
    /// Outcome
    pub action: CopyAction,
}

/// Per-slide copy summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideCopyReport {
    /// Shape elements placed in the output slide
    pub shapes_copied: usize,
    /// Every relationship of the source slide
    pub relationships: Vec<RelationshipCopy>,
}

impl SlideCopyReport {
    /// Old id to new id, for the remapper
    pub fn id_mapping(&self) -> HashMap<String, String> {
        self.relationships
            .iter()
            .filter_map(|r| r.new_id.as_ref().map(|new| (r.old_id.clone(), new.clone())))
            .collect()
    }

    /// Report entry for a source id
    pub fn entry(&self, old_id: &str) -> Option<&RelationshipCopy> {
        self.relationships.iter().find(|r| r.old_id == old_id)
    }
}

/// Copies fragment dependencies from one source package into the output
///
/// Scoped to a single slide: the memo mapping source parts to their copies
/// (and how each was made) lives only as long as the copier, so two slides
/// never share a copied part.
pub struct PartCopier<'s, 't> {
    source: &'s Package,
    target: &'t mut Package,
    names: &'t mut PartNameAllocator,
    copied: HashMap<PartName, (PartName, CopyAction)>,
}

impl<'s, 't> PartCopier<'s, 't> {
    /// Create a copier from `source` into `target`
    pub fn new(source: &'s Package, target: &'t mut Package, names: &'t mut PartNameAllocator) -> Self {
        Self {
            source,
            target,
            names,
            copied: HashMap::new(),
        }
    }

    /// Carry every relationship of `fragment` over to the output slide `slide`
    ///
    /// Referenced dependencies come first, in reference order, then the
    /// skipped ones so the report lists every source relationship.
    pub fn copy_fragment(&mut self, fragment: &SlideFragment, slide: &PartName) -> Vec<RelationshipCopy> {
        let owner = RelOwner::Part(slide.clone());
        let mut report = Vec::new();

        for dependency in &fragment.dependencies {
            let (new_id, action) = self.copy_dependency(&owner, dependency);
            debug!(
                old_id = %dependency.old_id,
                new_id = new_id.as_deref().unwrap_or("-"),
                kind = %dependency.kind,
                action = %action,
                "Copied relationship"
            );
            report.push(RelationshipCopy {
                old_id: dependency.old_id.clone(),
                new_id,
                kind: dependency.kind,
                action,
            });
        }

        let skipped = fragment
            .template_links
            .iter()
            .map(|d| (d, CopyAction::SkippedStructural))
            .chain(fragment.unreferenced.iter().map(|d| (d, CopyAction::Unreferenced)));
        for (dependency, action) in skipped {
            report.push(RelationshipCopy {
                old_id: dependency.old_id.clone(),
                new_id: None,
                kind: dependency.kind,
                action,
            });
        }

        report
    }

    fn copy_dependency(&mut self, owner: &RelOwner, dependency: &Dependency) -> (Option<String>, CopyAction) {
        let source_part = match &dependency.target {
            RelTarget::External(uri) => {
                let id = self.target.relate_external(owner, uri, &dependency.rel_type);
                return (Some(id), CopyAction::External);
            }
            RelTarget::Internal(name) => name,
        };

        match dependency.kind.copy_strategy() {
            CopyStrategy::Skip => (None, CopyAction::SkippedStructural),
            strategy => match self.copy_part(source_part, dependency.kind, strategy) {
                Ok((copy, action)) => {
                    let id = self.target.relate(owner, &copy, &dependency.rel_type);
                    (Some(id), action)
                }
                Err(CopyFailure::NoBlob) if self.target.contains(source_part) => {
                    let reason = format!("{} has no blob and its name belongs to another output part", source_part);
                    warn!(part = %source_part, "Relationship not copied; name already taken in output");
                    (None, CopyAction::Failed { reason })
                }
                Err(CopyFailure::NoBlob) => {
                    debug!(part = %source_part, "Source part has no blob; relating to original name");
                    let id = self.target.relate(owner, source_part, &dependency.rel_type);
                    (Some(id), CopyAction::CrossReference)
                }
                Err(CopyFailure::Rejected(reason)) => {
                    warn!(part = %source_part, reason = %reason, "Relationship not copied");
                    (None, CopyAction::Failed { reason })
                }
            },
        }
    }

    /// Copy one source part (and what it links to) into the output
    fn copy_part(
        &mut self,
        source_part: &PartName,
        kind: RelationshipKind,
        strategy: CopyStrategy,
    ) -> Result<(PartName, CopyAction), CopyFailure> {
        if let Some(memo) = self.copied.get(source_part) {
            return Ok(memo.clone());
        }

        let source = self.source;
        let part = source.part(source_part).ok_or(CopyFailure::NoBlob)?;
        if part.content_type == CT_SLIDE {
            return Err(CopyFailure::Rejected(format!(
                "{} is a slide outside the output",
                source_part
            )));
        }

        let (copy, action) = match strategy {
            CopyStrategy::Reencode => match image_codec::reencode(&part.blob) {
                Ok(encoded) => {
                    let template = PartNameTemplate::new(PartNamespace::Media.dir(), "image", encoded.extension);
                    let name = self
                        .target
                        .add_part(self.names, &template, encoded.content_type, encoded.blob);
                    (name, CopyAction::Reencoded)
                }
                Err(e) => {
                    debug!(part = %source_part, error = %e, "Image not decodable; copying verbatim");
                    let template =
                        PartNameTemplate::new(PartNamespace::Media.dir(), "image", extension_of(part));
                    let name = self.target.add_part(
                        self.names,
                        &template,
                        part.content_type.clone(),
                        part.blob.clone(),
                    );
                    (name, CopyAction::Verbatim)
                }
            },
            CopyStrategy::Verbatim(namespace) => {
                let content_type = if namespace == PartNamespace::Embeddings && part.content_type.is_empty() {
                    CT_OLE_OBJECT.to_string()
                } else {
                    part.content_type.clone()
                };
                let template = PartNameTemplate::new(namespace.dir(), namespace.stem(), extension_of(part));
                let name = self
                    .target
                    .add_part(self.names, &template, content_type, part.blob.clone());
                (name, CopyAction::Copied)
            }
            CopyStrategy::Skip => {
                return Err(CopyFailure::Rejected(format!("{} parts are never copied", kind)));
            }
        };

        self.copied.insert(source_part.clone(), (copy.clone(), action.clone()));
        self.copy_nested(source_part, &copy);
        Ok((copy, action))
    }

    /// Re-create the relationship table of a copied part on its copy
    fn copy_nested(&mut self, source_part: &PartName, copy: &PartName) {
        let source_owner = RelOwner::Part(source_part.clone());
        let copy_owner = RelOwner::Part(copy.clone());

        for rel in self.source.relationships(&source_owner) {
            let kind = RelationshipKind::classify(&rel.rel_type);
            let strategy = kind.copy_strategy();
            if strategy == CopyStrategy::Skip {
                debug!(owner = %source_part, id = %rel.id, kind = %kind, "Skipping nested template link");
                continue;
            }

            let target = match &rel.target {
                RelTarget::External(_) => rel.target.clone(),
                RelTarget::Internal(nested) => match self.copy_part(nested, kind, strategy) {
                    Ok((nested_copy, _)) => RelTarget::Internal(nested_copy),
                    Err(CopyFailure::NoBlob) if self.target.contains(nested) => {
                        debug!(owner = %source_part, id = %rel.id, part = %nested, "Nested target name taken in output; dropped");
                        continue;
                    }
                    Err(CopyFailure::NoBlob) => rel.target.clone(),
                    Err(CopyFailure::Rejected(reason)) => {
                        debug!(owner = %source_part, id = %rel.id, reason = %reason, "Nested relationship dropped");
                        continue;
                    }
                },
            };
            self.target.relate_with_id(&copy_owner, &rel.id, &target, &rel.rel_type);
        }
    }
}

enum CopyFailure {
    /// The source package does not hold the part
    NoBlob,
    /// The part exists but must not be copied
    Rejected(String),
}

fn extension_of(part: &slidex_opc::Part) -> String {
    part.name
        .extension()
        .or_else(|| extension_for_content_type(&part.content_type).map(str::to_string))
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
