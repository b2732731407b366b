//! Owned, mutable SVG element tree.
//!
//! `roxmltree` documents are read-only, so they are converted into this tree
//! for rewriting and then serialized back to compact markup.

use roxmltree::{Document, NodeType, ParsingOptions};

use crate::error::{Error, Result};

pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Qualified name as written, e.g. `viewBox` or `xlink:href`.
    pub name: String,
    /// Namespace URI, `None` for plain attributes.
    pub namespace: Option<String>,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), namespace: None, value: value.into() }
    }

    /// Namespace declarations (`xmlns`, `xmlns:foo`) are kept as attributes.
    pub fn is_namespace_declaration(&self) -> bool {
        self.namespace.as_deref() == Some(XMLNS_NS)
    }

    /// Prefix declared by an `xmlns:prefix` attribute.
    pub fn declared_prefix(&self) -> Option<&str> {
        if self.is_namespace_declaration() {
            self.name.strip_prefix("xmlns:")
        } else {
            None
        }
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified name as written, e.g. `path` or `sodipodi:namedview`.
    pub name: String,
    pub namespace: Option<String>,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: Some(SVG_NS.to_string()),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Parse SVG markup. The root element must be `<svg>`.
    pub fn parse(text: &str) -> Result<Self> {
        let options = ParsingOptions { allow_dtd: true, ..ParsingOptions::default() };
        let doc = Document::parse_with_options(text, options)?;
        let root = doc.root_element();
        if root.tag_name().name() != "svg" {
            return Err(Error::NotSvg(root.tag_name().name().to_string()));
        }
        Ok(convert(root, None))
    }

    /// Local part of the qualified name.
    pub fn local_name(&self) -> &str {
        self.name.rsplit_once(':').map_or(self.name.as_str(), |(_, local)| local)
    }

    /// True for elements in the SVG namespace (or with no namespace) named `local`.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
            && matches!(self.namespace.as_deref(), None | Some(SVG_NS))
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|a| a.name == name).map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute::new(name, value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|a| a.name == name)?;
        Some(self.attributes.remove(index).value)
    }

    /// Attributes other than namespace declarations.
    pub fn plain_attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter().filter(|a| !a.is_namespace_declaration())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Visit this element and all descendants, depth first.
    pub fn walk(&self, f: &mut impl FnMut(&Element)) {
        f(self);
        for child in self.child_elements() {
            child.walk(f);
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in self.child_elements_mut() {
            child.walk_mut(f);
        }
    }

    /// Concatenated text content of direct text children.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(text) => Some(text.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Serialize to compact markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attribute in &self.attributes {
            out.push(' ');
            out.push_str(&attribute.name);
            out.push_str("=\"");
            escape_into(&attribute.value, true, out);
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(element) => element.write_markup(out),
                Node::Text(text) => escape_into(text, false, out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

fn convert(node: roxmltree::Node, parent: Option<roxmltree::Node>) -> Element {
    let tag = node.tag_name();
    let namespace = tag.namespace().map(str::to_string);
    let name = qualified_name(node, tag.namespace(), tag.name());

    let mut attributes = Vec::new();

    // roxmltree reports in-scope namespaces; only declare the ones the parent
    // did not already have.
    let inherited: Vec<(Option<&str>, &str)> = parent
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        let attr_name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        attributes.push(Attribute {
            name: attr_name,
            namespace: Some(XMLNS_NS.to_string()),
            value: ns.uri().to_string(),
        });
    }

    for attribute in node.attributes() {
        attributes.push(Attribute {
            name: qualified_name(node, attribute.namespace(), attribute.name()),
            namespace: attribute.namespace().map(str::to_string),
            value: attribute.value().to_string(),
        });
    }

    let mut children = Vec::new();
    for child in node.children() {
        match child.node_type() {
            NodeType::Element => children.push(Node::Element(convert(child, Some(node)))),
            NodeType::Text => {
                if let Some(text) = child.text() {
                    children.push(Node::Text(text.to_string()));
                }
            }
            // Comments and processing instructions never survive a rewrite.
            _ => {}
        }
    }

    Element { name, namespace, attributes, children }
}

fn qualified_name(node: roxmltree::Node, namespace: Option<&str>, local: &str) -> String {
    match namespace {
        None | Some(SVG_NS) => local.to_string(),
        Some(XML_NS) => format!("xml:{local}"),
        Some(uri) => match node.lookup_prefix(uri) {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        },
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_and_serialize() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><path d="M0 0h24v24H0z"/></svg>"#;
        let root = Element::parse(svg).unwrap();
        assert_eq!(root.to_markup(), svg);
    }

    #[test]
    fn test_prefixed_names_survive() {
        let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink"><use xlink:href="#a"/></svg>"##;
        let root = Element::parse(svg).unwrap();
        let child = root.child_elements().next().unwrap();
        assert_eq!(child.attr("xlink:href"), Some("#a"));
        assert_eq!(root.to_markup(), svg);
    }

    #[test]
    fn test_comments_are_dropped_and_text_escaped() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><!-- note --><text>a &amp; b</text></svg>"#;
        let root = Element::parse(svg).unwrap();
        assert_eq!(
            root.to_markup(),
            r#"<svg xmlns="http://www.w3.org/2000/svg"><text>a &amp; b</text></svg>"#
        );
    }

    #[test]
    fn test_non_svg_root_is_rejected() {
        assert!(matches!(Element::parse("<html/>"), Err(Error::NotSvg(name)) if name == "html"));
    }

    #[test]
    fn test_set_and_remove_attr() {
        let mut element = Element::new("g");
        element.set_attr("class", "a");
        element.set_attr("class", "b");
        assert_eq!(element.attr("class"), Some("b"));
        assert_eq!(element.remove_attr("class"), Some("b".to_string()));
        assert!(!element.has_attr("class"));
    }
}
