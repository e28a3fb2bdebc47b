//! Relationship tables (`_rels/*.rels`)
//!
//! Every part (and the package itself) may own one relationship table that
//! maps short ids (`rId3`) to targets. Ids are only unique inside the owning
//! table, so the same `rId1` routinely means different things in different
//! parts.
//!
//! # Example
//!
//! ```
//! use slidex_opc::relationships::{Relationships, TargetMode};
//!
//! let mut rels = Relationships::new();
//! let id = rels.add("../media/image1.png", Relationships::TYPE_IMAGE, TargetMode::Internal);
//! assert_eq!(id, "rId1");
//!
//! let xml = rels.to_xml();
//! let reparsed = Relationships::parse(xml.as_bytes()).unwrap();
//! assert_eq!(reparsed.get("rId1"), Some("../media/image1.png"));
//! ```

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OpcError, Result};

/// Namespace of the relationships part vocabulary
pub const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Common relationship type URIs
impl Relationships {
    /// Main document part (package level)
    pub const TYPE_OFFICE_DOCUMENT: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
    /// Image relationship type
    pub const TYPE_IMAGE: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
    /// Hyperlink relationship type
    pub const TYPE_HYPERLINK: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
    /// Core properties (package level)
    pub const TYPE_CORE_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
    /// Extended properties (package level)
    pub const TYPE_EXTENDED_PROPERTIES: &'static str =
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
}

/// How a relationship target is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TargetMode {
    /// Target is a part name relative to the owner's directory
    #[default]
    Internal,
    /// Target is an opaque URI outside the package
    External,
}

impl TargetMode {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("External") => TargetMode::External,
            _ => TargetMode::Internal,
        }
    }
}

/// A relationship entry as stored in a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipTarget {
    /// Target reference, unresolved (relative path or URI)
    pub target: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Internal or external
    pub target_mode: TargetMode,
}

/// Parsed relationship table of one owner
///
/// Maintains insertion order for deterministic XML serialization.
#[derive(Debug, Clone)]
pub struct Relationships {
    order: Vec<String>,
    map: HashMap<String, RelationshipTarget>,
    next_id_counter: u32,
}

impl Default for Relationships {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            map: HashMap::new(),
            next_id_counter: 1,
        }
    }
}

impl Relationships {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a relationships part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut rels = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;
                        let mut target_mode = None;

                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                b"TargetMode" => target_mode = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target)) = (id, target) {
                            rels.insert(
                                id,
                                RelationshipTarget {
                                    target,
                                    rel_type: rel_type.unwrap_or_default(),
                                    target_mode: TargetMode::from_attr(target_mode.as_deref()),
                                },
                            );
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }

    /// Add a relationship under a freshly generated id
    pub fn add(
        &mut self,
        target: impl Into<String>,
        rel_type: impl Into<String>,
        target_mode: TargetMode,
    ) -> String {
        let mut id = format!("rId{}", self.next_id_counter);
        while self.map.contains_key(&id) {
            self.next_id_counter += 1;
            id = format!("rId{}", self.next_id_counter);
        }
        self.next_id_counter += 1;

        self.order.push(id.clone());
        self.map.insert(
            id.clone(),
            RelationshipTarget {
                target: target.into(),
                rel_type: rel_type.into(),
                target_mode,
            },
        );

        id
    }

    /// Keep [`add`](Self::add) from ever minting any of `ids`
    ///
    /// Moves the id counter past the highest numeric id among them.
    pub fn reserve<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) {
        for num in ids.into_iter().filter_map(extract_id_number) {
            self.next_id_counter = self.next_id_counter.max(num.saturating_add(1));
        }
    }

    /// Insert a relationship under a caller-chosen id
    ///
    /// Replaces an existing entry with the same id in place. The id counter
    /// is advanced past numeric ids so later [`add`](Self::add) calls never
    /// collide.
    pub fn insert(&mut self, id: impl Into<String>, rel: RelationshipTarget) {
        let id = id.into();
        if let Some(num) = extract_id_number(&id) {
            self.next_id_counter = self.next_id_counter.max(num.saturating_add(1));
        }
        if self.map.insert(id.clone(), rel).is_none() {
            self.order.push(id);
        }
    }

    /// Remove a relationship by id
    pub fn remove(&mut self, id: &str) -> Option<RelationshipTarget> {
        let removed = self.map.remove(id)?;
        self.order.retain(|existing| existing != id);
        Some(removed)
    }

    /// Serialize to the `.rels` XML format
    pub fn to_xml(&self) -> String {
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Relationships xmlns="{}">"#, RELATIONSHIPS_NS));

        for (id, rel) in self.iter() {
            xml.push_str("<Relationship");
            xml.push_str(&format!(r#" Id="{}""#, escape_xml(id)));
            xml.push_str(&format!(r#" Type="{}""#, escape_xml(&rel.rel_type)));
            xml.push_str(&format!(r#" Target="{}""#, escape_xml(&rel.target)));
            if rel.target_mode == TargetMode::External {
                xml.push_str(r#" TargetMode="External""#);
            }
            xml.push_str("/>");
        }

        xml.push_str("</Relationships>");
        xml
    }

    /// Get the raw target for an id
    pub fn get(&self, id: &str) -> Option<&str> {
        self.map.get(id).map(|r| r.target.as_str())
    }

    /// Get the full entry for an id
    pub fn get_target(&self, id: &str) -> Option<&RelationshipTarget> {
        self.map.get(id)
    }

    /// Check whether an id exists
    pub fn contains(&self, id: &str) -> bool {
        self.map.contains_key(id)
    }

    /// Number of relationships
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RelationshipTarget)> {
        self.order
            .iter()
            .filter_map(|id| self.map.get(id).map(|rel| (id.as_str(), rel)))
    }

    /// The id the next [`add`](Self::add) call would try first
    pub fn peek_next_id(&self) -> String {
        format!("rId{}", self.next_id_counter)
    }
}

/// Extract the numeric portion of an id (`rId5` -> 5)
fn extract_id_number(id: &str) -> Option<u32> {
    id.strip_prefix("rId")
        .or_else(|| id.strip_prefix("RId"))
        .or_else(|| id.strip_prefix("rid"))
        .and_then(|num_str| num_str.parse().ok())
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
