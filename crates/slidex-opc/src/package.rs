//! In-memory OPC package
//!
//! A [`Package`] is a map of parts plus one relationship table per owner.
//! The ZIP container, the content types manifest and the `_rels` parts are
//! serialization details: they are decoded on open and regenerated on save.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use tracing::debug;
use zip::read::ZipArchive;
use zip::write::ZipWriter;
use zip::CompressionMethod;

use crate::content_types::{ContentTypes, CONTENT_TYPES_ENTRY};
use crate::error::Result;
use crate::names::{PartNameAllocator, PartNameTemplate};
use crate::part::{Part, PartName};
use crate::relationships::{RelationshipTarget, Relationships, TargetMode};

/// ZIP compression used when writing a package
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate every entry
    #[default]
    Deflated,
    /// Store entries uncompressed
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// Owner of a relationship table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelOwner {
    /// The package root (`/_rels/.rels`)
    Package,
    /// A part (`<dir>/_rels/<file>.rels`)
    Part(PartName),
}

impl RelOwner {
    /// Directory relative targets are resolved against
    pub fn base_dir(&self) -> &str {
        match self {
            RelOwner::Package => "/",
            RelOwner::Part(name) => name.base_dir(),
        }
    }

    /// Name of the `.rels` part holding this owner's table
    pub fn rels_part_name(&self) -> PartName {
        match self {
            RelOwner::Package => PartName::new("/_rels/.rels"),
            RelOwner::Part(name) => name.rels_part_name(),
        }
    }
}

impl From<PartName> for RelOwner {
    fn from(name: PartName) -> Self {
        RelOwner::Part(name)
    }
}

impl From<&PartName> for RelOwner {
    fn from(name: &PartName) -> Self {
        RelOwner::Part(name.clone())
    }
}

/// Resolved target of a relationship
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelTarget {
    /// A part inside the same package (it may or may not exist)
    Internal(PartName),
    /// An opaque URI outside the package
    External(String),
}

/// One relationship with its target resolved against the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Owner-local id
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Resolved target
    pub target: RelTarget,
}

impl Relationship {
    /// Last segment of the type URI (`image`, `slideLayout`, ...)
    pub fn type_name(&self) -> &str {
        self.rel_type.rsplit('/').next().unwrap_or(&self.rel_type)
    }

    /// Internal target part, if any
    pub fn target_part(&self) -> Option<&PartName> {
        match &self.target {
            RelTarget::Internal(name) => Some(name),
            RelTarget::External(_) => None,
        }
    }
}

/// An OPC package held in memory
#[derive(Debug, Default)]
pub struct Package {
    parts: BTreeMap<PartName, Part>,
    relationships: HashMap<RelOwner, Relationships>,
    compression: Compression,
}

impl Package {
    /// Create an empty package
    pub fn new() -> Self {
        Self::default()
    }

    /// Open and decode a package file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Decode a package from an in-memory buffer
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_reader(Cursor::new(bytes))
    }

    /// Decode a package from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut content_types = ContentTypes::new();
        let mut blobs: Vec<(PartName, Vec<u8>)> = Vec::new();
        let mut relationships = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let entry = file.name().to_string();

            if entry.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;

            if entry == CONTENT_TYPES_ENTRY {
                content_types = ContentTypes::parse(&contents)?;
                continue;
            }

            let name = PartName::from_zip_path(&entry);
            match name.rels_owner() {
                Some(owner) => {
                    let owner = owner.map_or(RelOwner::Package, RelOwner::Part);
                    relationships.insert(owner, Relationships::parse(&contents)?);
                }
                None => blobs.push((name, contents)),
            }
        }

        let parts = blobs
            .into_iter()
            .map(|(name, blob)| {
                let content_type = content_types.content_type_for(&name).to_string();
                (name.clone(), Part::new(name, content_type, blob))
            })
            .collect::<BTreeMap<_, _>>();

        debug!(
            parts = parts.len(),
            rel_tables = relationships.len(),
            "Decoded package"
        );

        Ok(Self {
            parts,
            relationships,
            compression: Compression::default(),
        })
    }

    /// Set the compression used by [`write_to`](Self::write_to)
    pub fn set_compression(&mut self, compression: Compression) {
        self.compression = compression;
    }

    /// Get a part by name
    pub fn part(&self, name: &PartName) -> Option<&Part> {
        self.parts.get(name)
    }

    /// Check if a part exists
    pub fn contains(&self, name: &PartName) -> bool {
        self.parts.contains_key(name)
    }

    /// Iterate over all parts in name order
    pub fn parts(&self) -> impl Iterator<Item = &Part> {
        self.parts.values()
    }

    /// Number of parts (excluding the manifest and `.rels` parts)
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Store a blob under a freshly allocated name and return that name
    ///
    /// Never overwrites: the allocator skips every name already present. Any
    /// content type is accepted; unknown ones are simply carried through.
    pub fn add_part(
        &mut self,
        names: &mut PartNameAllocator,
        template: &PartNameTemplate,
        content_type: impl Into<String>,
        blob: Vec<u8>,
    ) -> PartName {
        let name = names.next_name(self, template);
        self.parts.insert(
            name.clone(),
            Part::new(name.clone(), content_type, blob),
        );
        name
    }

    /// Store a part under a fixed name, returning any part it replaced
    pub fn put_part(
        &mut self,
        name: PartName,
        content_type: impl Into<String>,
        blob: Vec<u8>,
    ) -> Option<Part> {
        self.parts
            .insert(name.clone(), Part::new(name, content_type, blob))
    }

    /// Remove a part together with its own relationship table
    pub fn remove_part(&mut self, name: &PartName) -> Option<Part> {
        self.relationships.remove(&RelOwner::Part(name.clone()));
        self.parts.remove(name)
    }

    /// Create an internal relationship from `owner` to `target`
    ///
    /// Returns the new owner-local id.
    pub fn relate(&mut self, owner: &RelOwner, target: &PartName, rel_type: &str) -> String {
        let reference = target.relative_to(owner.base_dir());
        self.relationships
            .entry(owner.clone())
            .or_default()
            .add(reference, rel_type, TargetMode::Internal)
    }

    /// Reserve relationship ids under `owner` so later `relate*` calls never mint them
    pub fn reserve_relationship_ids<'a>(&mut self, owner: &RelOwner, ids: impl IntoIterator<Item = &'a str>) {
        self.relationships.entry(owner.clone()).or_default().reserve(ids);
    }

    /// Create an external relationship from `owner` to a URI
    pub fn relate_external(&mut self, owner: &RelOwner, uri: &str, rel_type: &str) -> String {
        self.relationships
            .entry(owner.clone())
            .or_default()
            .add(uri, rel_type, TargetMode::External)
    }

    /// Create a relationship under a caller-chosen id
    pub fn relate_with_id(
        &mut self,
        owner: &RelOwner,
        id: &str,
        target: &RelTarget,
        rel_type: &str,
    ) {
        let (reference, target_mode) = match target {
            RelTarget::Internal(name) => (name.relative_to(owner.base_dir()), TargetMode::Internal),
            RelTarget::External(uri) => (uri.clone(), TargetMode::External),
        };
        self.relationships.entry(owner.clone()).or_default().insert(
            id,
            RelationshipTarget {
                target: reference,
                rel_type: rel_type.to_string(),
                target_mode,
            },
        );
    }

    /// Relationships of an owner, targets resolved, in document order
    pub fn relationships(&self, owner: &RelOwner) -> Vec<Relationship> {
        let Some(table) = self.relationships.get(owner) else {
            return Vec::new();
        };

        table
            .iter()
            .map(|(id, rel)| Relationship {
                id: id.to_string(),
                rel_type: rel.rel_type.clone(),
                target: resolve_target(owner, rel),
            })
            .collect()
    }

    /// One relationship of an owner by id
    pub fn relationship(&self, owner: &RelOwner, id: &str) -> Option<Relationship> {
        let rel = self.relationships.get(owner)?.get_target(id)?;
        Some(Relationship {
            id: id.to_string(),
            rel_type: rel.rel_type.clone(),
            target: resolve_target(owner, rel),
        })
    }

    /// The package's main part (target of the `officeDocument` root relationship)
    pub fn main_part(&self) -> Option<PartName> {
        self.relationships(&RelOwner::Package)
            .into_iter()
            .find(|rel| rel.type_name() == "officeDocument")
            .and_then(|rel| rel.target_part().cloned())
    }

    /// Write the package to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Encode the package into a byte buffer
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the package to any writer
    ///
    /// Entry order is deterministic: manifest, package relationships, then
    /// parts by name each followed by their own relationship table.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options =
            zip::write::SimpleFileOptions::default().compression_method(self.compression.method());

        let manifest = ContentTypes::from_parts(self.parts.values()).to_xml();
        zip.start_file(CONTENT_TYPES_ENTRY, options)?;
        zip.write_all(manifest.as_bytes())?;

        if let Some(rels) = self.relationships.get(&RelOwner::Package) {
            if !rels.is_empty() {
                zip.start_file(RelOwner::Package.rels_part_name().zip_path(), options)?;
                zip.write_all(rels.to_xml().as_bytes())?;
            }
        }

        for part in self.parts.values() {
            zip.start_file(part.name.zip_path(), options)?;
            zip.write_all(&part.blob)?;

            let owner = RelOwner::Part(part.name.clone());
            if let Some(rels) = self.relationships.get(&owner) {
                if !rels.is_empty() {
                    zip.start_file(owner.rels_part_name().zip_path(), options)?;
                    zip.write_all(rels.to_xml().as_bytes())?;
                }
            }
        }

        zip.finish()?;
        Ok(())
    }
}

fn resolve_target(owner: &RelOwner, rel: &RelationshipTarget) -> RelTarget {
    match rel.target_mode {
        TargetMode::External => RelTarget::External(rel.target.clone()),
        TargetMode::Internal => RelTarget::Internal(PartName::resolve(owner.base_dir(), &rel.target)),
    }
}
