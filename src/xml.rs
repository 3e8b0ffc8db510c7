//! Minimal mutable XML tree for OOXML parts.
//!
//! Every node keeps the quick-xml event it was parsed from, so a subtree
//! that is never edited serializes back to the exact bytes it was read
//! from: attribute order, namespace declarations, quoting, self-closing
//! form and entity escaping all survive. New nodes are created with
//! [`XmlElement::new`] and serialize in the usual compact form.

use crate::error::{Error, Result};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;

/// A node in the tree.
#[derive(Debug, Clone)]
pub enum XmlNode {
    /// Element with children
    Element(XmlElement),
    /// Character data, stored escaped as read
    Text(BytesText<'static>),
    /// Declaration, comment, CDATA, processing instruction or doctype
    Other(Event<'static>),
}

impl XmlNode {
    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// The element, mutably, if this node is one.
    pub fn as_element_mut(&mut self) -> Option<&mut XmlElement> {
        match self {
            XmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Whether this node is an element with the given local name.
    pub fn is_element(&self, local: &str) -> bool {
        self.as_element().is_some_and(|e| e.is(local))
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        match self {
            XmlNode::Element(element) => element.write_to(writer),
            XmlNode::Text(text) => {
                writer.write_event(Event::Text(text.clone()))?;
                Ok(())
            },
            XmlNode::Other(event) => {
                writer.write_event(event.clone())?;
                Ok(())
            },
        }
    }
}

impl From<XmlElement> for XmlNode {
    fn from(element: XmlElement) -> Self {
        XmlNode::Element(element)
    }
}

/// An element and its children.
#[derive(Debug, Clone)]
pub struct XmlElement {
    start: BytesStart<'static>,
    children: Vec<XmlNode>,
    self_closing: bool,
}

impl XmlElement {
    /// Create an empty element with a qualified name such as `w:r`.
    pub fn new(name: &str) -> Self {
        Self {
            start: BytesStart::new(name.to_string()),
            children: Vec::new(),
            self_closing: true,
        }
    }

    fn from_start(start: BytesStart<'static>, self_closing: bool) -> Self {
        Self {
            start,
            children: Vec::new(),
            self_closing,
        }
    }

    /// Builder: add an attribute.
    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: impl Into<XmlNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Builder: append an escaped text child.
    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(XmlNode::Text(BytesText::new(text).into_owned()));
        self
    }

    /// Qualified name, e.g. `w:r`.
    pub fn name(&self) -> &[u8] {
        self.start.name().into_inner()
    }

    /// Local name without namespace prefix, e.g. `r`.
    pub fn local_name(&self) -> &[u8] {
        self.start.local_name().into_inner()
    }

    /// Whether the local name equals `local`.
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local.as_bytes()
    }

    /// Value of the first attribute whose local name is `local`.
    pub fn attribute(&self, local: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|attr| attr.key.local_name().as_ref() == local.as_bytes())
            .and_then(|attr| attr.unescape_value().ok().map(Cow::into_owned))
    }

    /// Whether an attribute with this exact qualified key exists.
    pub fn has_qualified_attribute(&self, key: &str) -> bool {
        self.start
            .attributes()
            .flatten()
            .any(|attr| attr.key.as_ref() == key.as_bytes())
    }

    /// Append an attribute unless the qualified key is already present.
    pub fn ensure_attribute(&mut self, key: &str, value: &str) {
        if !self.has_qualified_attribute(key) {
            self.start.push_attribute((key, value));
        }
    }

    /// Child nodes.
    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// Child nodes, mutably. Adding children to a self-closing element
    /// makes it serialize with explicit start and end tags.
    pub fn children_mut(&mut self) -> &mut Vec<XmlNode> {
        &mut self.children
    }

    /// Child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(XmlNode::as_element)
    }

    /// First child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&XmlElement> {
        self.elements().find(|e| e.is(local))
    }

    /// First child element with the given local name, mutably.
    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlElement> {
        self.children
            .iter_mut()
            .filter_map(XmlNode::as_element_mut)
            .find(|e| e.is(local))
    }

    /// Whether this element or any descendant satisfies `pred`.
    pub fn any_descendant(&self, pred: &dyn Fn(&XmlElement) -> bool) -> bool {
        self.elements()
            .any(|child| pred(child) || child.any_descendant(pred))
    }

    /// Unescaped concatenation of the direct text children.
    pub fn text(&self) -> Result<String> {
        let mut text = String::new();
        for child in &self.children {
            if let XmlNode::Text(t) = child {
                text.push_str(&t.unescape()?);
            }
        }
        Ok(text)
    }

    /// Replace all children with a single escaped text node.
    pub fn set_text(&mut self, text: &str) {
        self.children.clear();
        if !text.is_empty() {
            self.children
                .push(XmlNode::Text(BytesText::new(text).into_owned()));
        }
    }

    fn write_to<W: std::io::Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        if self.children.is_empty() && self.self_closing {
            writer.write_event(Event::Empty(self.start.borrow()))?;
            return Ok(());
        }
        writer.write_event(Event::Start(self.start.borrow()))?;
        for child in &self.children {
            child.write_to(writer)?;
        }
        writer.write_event(Event::End(self.start.to_end()))?;
        Ok(())
    }

    /// Serialize this element alone.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        self.write_to(&mut writer)?;
        Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
    }
}

/// A parsed XML part: prolog nodes plus the root element.
#[derive(Debug, Clone)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
}

impl XmlDocument {
    /// Parse a complete XML document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut stack: Vec<XmlElement> = Vec::new();
        let mut nodes = Vec::new();

        loop {
            let node = match reader.read_event()? {
                Event::Start(e) => {
                    stack.push(XmlElement::from_start(e.into_owned(), false));
                    continue;
                },
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        Error::DocumentStructure(format!(
                            "unbalanced end tag at byte {}",
                            reader.buffer_position()
                        ))
                    })?;
                    XmlNode::Element(element)
                },
                Event::Empty(e) => XmlNode::Element(XmlElement::from_start(e.into_owned(), true)),
                Event::Text(e) => XmlNode::Text(e.into_owned()),
                Event::Eof => break,
                other => XmlNode::Other(other.into_owned()),
            };
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => nodes.push(node),
            }
        }

        if let Some(open) = stack.last() {
            return Err(Error::DocumentStructure(format!(
                "unclosed element <{}>",
                String::from_utf8_lossy(open.name())
            )));
        }
        if !nodes.iter().any(|n| matches!(n, XmlNode::Element(_))) {
            return Err(Error::DocumentStructure("document has no root element".to_string()));
        }

        Ok(Self { nodes })
    }

    /// The root element.
    pub fn root(&self) -> Option<&XmlElement> {
        self.nodes.iter().find_map(XmlNode::as_element)
    }

    /// The root element, mutably.
    pub fn root_mut(&mut self) -> Option<&mut XmlElement> {
        self.nodes.iter_mut().find_map(XmlNode::as_element_mut)
    }

    /// Serialize back to bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new(Vec::new());
        for node in &self.nodes {
            node.write_to(&mut writer)?;
        }
        Ok(writer.into_inner())
    }
}
