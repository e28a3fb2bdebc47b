//! `[Content_Types].xml` handling
//!
//! Content types are resolved per part: an `Override` for the exact part
//! name wins, then a `Default` for its extension. The manifest is rebuilt
//! from the part store on save, so it always covers exactly the parts that
//! are written.

use std::collections::{BTreeMap, HashMap};

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OpcError, Result};
use crate::part::{Part, PartName};

/// Namespace of the content types manifest
pub const CONTENT_TYPES_NS: &str =
    "http://schemas.openxmlformats.org/package/2006/content-types";

/// Fallback for parts with no mapping at all
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Content type of relationship parts
pub const RELATIONSHIPS_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-package.relationships+xml";

/// ZIP entry name of the manifest
pub const CONTENT_TYPES_ENTRY: &str = "[Content_Types].xml";

/// Parsed content types manifest
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<PartName, String>,
}

impl ContentTypes {
    /// Create an empty manifest
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `[Content_Types].xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(true);

        let mut types = Self::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    let local = e.local_name();
                    let is_default = local.as_ref() == b"Default";
                    let is_override = local.as_ref() == b"Override";

                    if is_default || is_override {
                        let mut key = None;
                        let mut content_type = None;
                        for attr in e.attributes().filter_map(|a| a.ok()) {
                            let value = attr.unescape_value().ok().map(|s| s.to_string());
                            match attr.key.as_ref() {
                                b"Extension" | b"PartName" => key = value,
                                b"ContentType" => content_type = value,
                                _ => {}
                            }
                        }

                        if let (Some(key), Some(content_type)) = (key, content_type) {
                            if is_default {
                                types.add_default(&key, content_type);
                            } else {
                                types.add_override(PartName::new(key), content_type);
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(types)
    }

    /// Register a default mapping for an extension (case-insensitive)
    pub fn add_default(&mut self, extension: &str, content_type: impl Into<String>) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.into());
    }

    /// Register an override for one part
    pub fn add_override(&mut self, name: PartName, content_type: impl Into<String>) {
        self.overrides.insert(name, content_type.into());
    }

    /// Resolve the content type of a part
    pub fn content_type_for(&self, name: &PartName) -> &str {
        if let Some(ct) = self.overrides.get(name) {
            return ct;
        }
        name.extension()
            .and_then(|ext| self.defaults.get(&ext))
            .map(String::as_str)
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }

    /// Build the manifest for a set of parts
    ///
    /// `rels` and `xml` get `Default` entries; every other part gets an
    /// `Override`, so two parts sharing an extension may differ in type.
    pub fn from_parts<'a>(parts: impl IntoIterator<Item = &'a Part>) -> Self {
        let mut types = Self::new();
        types.add_default("rels", RELATIONSHIPS_CONTENT_TYPE);
        types.add_default("xml", "application/xml");
        for part in parts {
            types.add_override(part.name.clone(), part.content_type.clone());
        }
        types
    }

    /// Serialize to XML with deterministic ordering
    pub fn to_xml(&self) -> String {
        let defaults: BTreeMap<_, _> = self.defaults.iter().collect();
        let overrides: BTreeMap<_, _> = self.overrides.iter().collect();

        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<Types xmlns="{}">"#, CONTENT_TYPES_NS));
        for (ext, ct) in defaults {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                escape_attr(ext),
                escape_attr(ct)
            ));
        }
        for (name, ct) in overrides {
            xml.push_str(&format!(
                r#"<Override PartName="{}" ContentType="{}"/>"#,
                escape_attr(name.as_str()),
                escape_attr(ct)
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('"', "&quot;")
}
