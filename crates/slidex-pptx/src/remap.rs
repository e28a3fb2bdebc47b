//! Relationship id remapping
//!
//! Copied XML keeps pointing at relationship ids of its *source* part. The
//! remapper rebuilds the subtree as fresh nodes, replacing every reference
//! attribute whose value has a new id in the mapping. Values with no
//! mapping are left untouched.
//!
//! Reference attributes are recognised by namespace, not by prefix: an
//! attribute counts when its prefix is bound (on the element or an
//! ancestor, or in the declarations the subtree inherits) to the
//! relationships namespace.

use std::collections::HashMap;

use slidex_opc::xml::{XmlElement, XmlNode};

use crate::constants::{NS_RELATIONSHIPS, NS_RELATIONSHIPS_STRICT};

/// Local names of attributes that hold relationship ids
///
/// `embed`/`link` on blips, `id` on OLE objects, hyperlinks, media and
/// charts, `pict` on OLE previews, `dm`/`lo`/`qs`/`cs` on SmartArt.
pub const REFERENCE_ATTRIBUTES: &[&str] = &["embed", "id", "link", "pict", "dm", "lo", "qs", "cs"];

/// Stack of in-scope namespace declarations
#[derive(Debug, Clone, Default)]
pub struct NamespaceScope {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScope {
    /// Scope seeded with declarations inherited from ancestors
    pub fn with_inherited(declarations: &[(String, String)]) -> Self {
        Self {
            frames: vec![declarations.to_vec()],
        }
    }

    /// Enter an element, recording its own declarations
    pub fn push(&mut self, element: &XmlElement) {
        self.frames.push(
            element
                .namespace_declarations()
                .into_iter()
                .map(|(p, u)| (p.to_string(), u.to_string()))
                .collect(),
        );
    }

    /// Leave the current element
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Namespace URI bound to a prefix, innermost first
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Whether a qualified attribute name is a relationship reference
    pub fn is_reference_attribute(&self, qualified: &str) -> bool {
        let Some((prefix, local)) = qualified.split_once(':') else {
            return false;
        };
        if prefix == "xmlns" || !REFERENCE_ATTRIBUTES.contains(&local) {
            return false;
        }
        matches!(
            self.resolve(prefix),
            Some(NS_RELATIONSHIPS) | Some(NS_RELATIONSHIPS_STRICT)
        )
    }
}

/// Rewrites relationship ids inside copied XML
#[derive(Debug)]
pub struct RelationshipRemapper<'a> {
    mapping: &'a HashMap<String, String>,
    inherited: Vec<(String, String)>,
}

impl<'a> RelationshipRemapper<'a> {
    /// Create a remapper for an old-id to new-id mapping
    pub fn new(mapping: &'a HashMap<String, String>) -> Self {
        Self {
            mapping,
            inherited: Vec::new(),
        }
    }

    /// Namespace declarations in scope above the subtrees being remapped
    pub fn with_namespaces(mut self, declarations: &[(String, String)]) -> Self {
        self.inherited = declarations.to_vec();
        self
    }

    /// Build a remapped copy of `element`
    pub fn remap(&self, element: &XmlElement) -> XmlElement {
        let mut scope = NamespaceScope::with_inherited(&self.inherited);
        self.rebuild(element, &mut scope)
    }

    /// Build remapped copies of several sibling subtrees
    pub fn remap_all<'e>(&self, elements: impl IntoIterator<Item = &'e XmlElement>) -> Vec<XmlElement> {
        elements.into_iter().map(|e| self.remap(e)).collect()
    }

    fn rebuild(&self, element: &XmlElement, scope: &mut NamespaceScope) -> XmlElement {
        scope.push(element);

        let attributes = element
            .attributes
            .iter()
            .map(|(key, value)| {
                let value = if scope.is_reference_attribute(key) {
                    self.mapping.get(value).cloned().unwrap_or_else(|| value.clone())
                } else {
                    value.clone()
                };
                (key.clone(), value)
            })
            .collect();

        let children = element
            .children
            .iter()
            .map(|node| match node {
                XmlNode::Element(child) => XmlNode::Element(self.rebuild(child, scope)),
                XmlNode::Text(text) => XmlNode::Text(text.clone()),
                XmlNode::CData(data) => XmlNode::CData(data.clone()),
            })
            .collect();

        scope.pop();

        XmlElement {
            name: element.name.clone(),
            attributes,
            children,
        }
    }
}

/// Every relationship id referenced inside `element`, in document order
///
/// Duplicates are removed, first occurrence wins.
pub fn collect_references(element: &XmlElement, inherited: &[(String, String)]) -> Vec<String> {
    let mut scope = NamespaceScope::with_inherited(inherited);
    let mut found = Vec::new();
    collect_into(element, &mut scope, &mut found);
    found
}

fn collect_into(element: &XmlElement, scope: &mut NamespaceScope, found: &mut Vec<String>) {
    scope.push(element);
    for (key, value) in &element.attributes {
        if scope.is_reference_attribute(key) && !found.contains(value) {
            found.push(value.clone());
        }
    }
    for child in element.elements() {
        collect_into(child, scope, found);
    }
    scope.pop();
}
