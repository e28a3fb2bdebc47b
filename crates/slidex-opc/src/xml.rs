//! Owned XML element tree
//!
//! Parts are parsed into [`XmlElement`] trees so fragments can be read from
//! one document and rebuilt as fresh nodes in another. Names keep their
//! prefixes exactly as written (`p:sp`, `r:embed`); namespace resolution is
//! left to callers that need it, via [`XmlElement::namespace_declarations`].

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{OpcError, Result};

/// XML declaration written in front of serialized parts
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// A node in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    /// Child element
    Element(XmlElement),
    /// Character data, unescaped
    Text(String),
    /// CDATA section content
    CData(String),
}

/// An element with its qualified name, attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    /// Qualified name as written (`p:sp`)
    pub name: String,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    /// Child nodes in document order
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with no attributes or children
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(key, value);
        self
    }

    /// Builder-style child element
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Parse a document and return its root element
    ///
    /// Comments, processing instructions and the declaration are dropped.
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e)),
                Ok(Event::Empty(ref e)) => {
                    let element = element_from_start(e);
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        OpcError::InvalidStructure("unbalanced closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Text(ref t)) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = t
                            .unescape()
                            .map(|s| s.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(t).into_owned());
                        if !text.is_empty() {
                            parent.children.push(XmlNode::Text(text));
                        }
                    }
                }
                Ok(Event::CData(ref c)) => {
                    if let Some(parent) = stack.last_mut() {
                        parent
                            .children
                            .push(XmlNode::CData(String::from_utf8_lossy(c).into_owned()));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(OpcError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(OpcError::InvalidStructure(format!(
                "unclosed element <{}>",
                stack.last().map(|e| e.name.as_str()).unwrap_or_default()
            )));
        }

        root.ok_or_else(|| OpcError::InvalidStructure("document has no root element".to_string()))
    }

    /// Name without its prefix (`sp` for `p:sp`)
    pub fn local_name(&self) -> &str {
        local_part(&self.name)
    }

    /// Prefix of the name, if any (`p` for `p:sp`)
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    /// Attribute value by qualified name
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value in place
    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Child elements in document order
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.local_name() == local)
    }

    /// Follow a path of local names from this element
    pub fn descend(&self, path: &[&str]) -> Option<&XmlElement> {
        path.iter().try_fold(self, |node, local| node.child(local))
    }

    /// Visit this element and every descendant element, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a XmlElement)) {
        visit(self);
        for child in self.elements() {
            child.walk(visit);
        }
    }

    /// Namespace declarations on this element as `(prefix, uri)` pairs
    ///
    /// The default namespace (`xmlns="..."`) has an empty prefix.
    pub fn namespace_declarations(&self) -> Vec<(&str, &str)> {
        self.attributes
            .iter()
            .filter_map(|(k, v)| {
                if k == "xmlns" {
                    Some(("", v.as_str()))
                } else {
                    k.strip_prefix("xmlns:").map(|prefix| (prefix, v.as_str()))
                }
            })
            .collect()
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Serialize this element (without declaration)
    pub fn write_to_string(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attributes {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                XmlNode::Element(e) => e.write_to_string(out),
                XmlNode::Text(t) => out.push_str(&escape_text(t)),
                XmlNode::CData(c) => {
                    out.push_str("<![CDATA[");
                    out.push_str(c);
                    out.push_str("]]>");
                }
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }

    /// Serialize as a standalone document with the XML declaration
    pub fn to_document(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        out.push('\n');
        self.write_to_string(&mut out);
        out
    }
}

/// Local part of a qualified name
pub fn local_part(qualified: &str) -> &str {
    qualified
        .split_once(':')
        .map(|(_, local)| local)
        .unwrap_or(qualified)
}

fn element_from_start(e: &BytesStart<'_>) -> XmlElement {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let attributes = e
        .attributes()
        .with_checks(false)
        .filter_map(|a| a.ok())
        .map(|attr| {
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).into_owned());
            (key, value)
        })
        .collect();

    XmlElement {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(XmlNode::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(OpcError::InvalidStructure(
            "document has more than one root element".to_string(),
        )),
    }
}

fn collect_text(element: &XmlElement, out: &mut String) {
    for child in &element.children {
        match child {
            XmlNode::Element(e) => collect_text(e, out),
            XmlNode::Text(t) | XmlNode::CData(t) => out.push_str(t),
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
  <p:cSld>
    <p:spTree>
      <p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>
      <p:sp><p:txBody><a:p><a:r><a:t>Q3 &amp; Q4 &lt;draft&gt;</a:t></a:r></a:p></p:txBody></p:sp>
      <p:pic><p:blipFill><a:blip r:embed="rId2"/></p:blipFill></p:pic>
    </p:spTree>
  </p:cSld>
</p:sld>"#;

    #[test]
    fn test_parse_names_and_namespaces() {
        let root = XmlElement::parse(SLIDE.as_bytes()).unwrap();
        assert_eq!(root.name, "p:sld");
        assert_eq!(root.local_name(), "sld");
        assert_eq!(root.prefix(), Some("p"));

        let ns = root.namespace_declarations();
        assert_eq!(ns.len(), 3);
        assert!(ns.contains(&(
            "r",
            "http://schemas.openxmlformats.org/officeDocument/2006/relationships"
        )));
    }

    #[test]
    fn test_descend_and_walk() {
        let root = XmlElement::parse(SLIDE.as_bytes()).unwrap();
        let tree = root.descend(&["cSld", "spTree"]).unwrap();
        assert_eq!(tree.elements().count(), 3);

        let mut embeds = Vec::new();
        root.walk(&mut |e| {
            if let Some(v) = e.attr("r:embed") {
                embeds.push(v.to_string());
            }
        });
        assert_eq!(embeds, vec!["rId2"]);
    }

    #[test]
    fn test_text_is_unescaped_and_reescaped() {
        let root = XmlElement::parse(SLIDE.as_bytes()).unwrap();
        assert_eq!(root.text().trim(), "Q3 & Q4 <draft>");

        let out = root.to_document();
        assert!(out.starts_with(XML_DECLARATION));
        assert!(out.contains("Q3 &amp; Q4 &lt;draft&gt;"));
    }

    #[test]
    fn test_serialize_roundtrip_is_stable() {
        let root = XmlElement::parse(SLIDE.as_bytes()).unwrap();
        let once = root.to_document();
        let twice = XmlElement::parse(once.as_bytes()).unwrap().to_document();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_builder_and_set_attr() {
        let mut el = XmlElement::new("a:blip").with_attr("r:embed", "rId1");
        el.set_attr("r:embed", "rId9");
        el.set_attr("cstate", "print");
        assert_eq!(el.attributes.len(), 2);
        assert_eq!(el.attr("r:embed"), Some("rId9"));

        let mut out = String::new();
        XmlElement::new("p:blipFill").with_child(el).write_to_string(&mut out);
        assert_eq!(
            out,
            r#"<p:blipFill><a:blip r:embed="rId9" cstate="print"/></p:blipFill>"#
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(XmlElement::parse(b"<a><b></a>").is_err());
        assert!(XmlElement::parse(b"<a>").is_err());
        assert!(XmlElement::parse(b"").is_err());
    }
}
