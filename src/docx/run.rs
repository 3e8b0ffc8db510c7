//! Run-level primitives over `w:r` elements.
//!
//! A run's plain text is built from its content children:
//!
//! | Element | Text |
//! |---|---|
//! | `w:t` | its unescaped character data |
//! | `w:tab`, `w:ptab` | `\t` |
//! | `w:br` (text wrapping), `w:cr` | `\n` |
//! | `w:noBreakHyphen` | `-` |
//! | anything else | nothing |
//!
//! Offsets handed to [`partition`] are byte offsets into that text.

use crate::error::{Error, Result};
use crate::xml::{XmlElement, XmlNode};

/// Qualified name of a run.
pub const RUN: &str = "w:r";
/// Qualified name of run properties.
pub const RUN_PROPERTIES: &str = "w:rPr";
/// Qualified name of a text element.
pub const TEXT: &str = "w:t";

/// What one content child contributes to the run text.
enum Piece {
    /// `w:t` character data, may be split
    Text(String),
    /// Fixed one-character content, never split
    Atom(&'static str),
    /// Contributes no text (page-break markers, drawings, fields...)
    Marker,
}

fn piece(element: &XmlElement) -> Result<Piece> {
    Ok(match element.local_name() {
        b"t" => Piece::Text(element.text()?),
        b"tab" | b"ptab" => Piece::Atom("\t"),
        b"cr" => Piece::Atom("\n"),
        b"br" => match element.attribute("type").as_deref() {
            None | Some("textWrapping") => Piece::Atom("\n"),
            Some(_) => Piece::Marker,
        },
        b"noBreakHyphen" => Piece::Atom("-"),
        _ => Piece::Marker,
    })
}

/// Plain text of a run.
pub fn text(run: &XmlElement) -> Result<String> {
    let mut text = String::new();
    for element in run.elements() {
        match piece(element)? {
            Piece::Text(t) => text.push_str(&t),
            Piece::Atom(a) => text.push_str(a),
            Piece::Marker => {},
        }
    }
    Ok(text)
}

/// Whether the run carries a page-break marker: a renderer-reported
/// `w:lastRenderedPageBreak` or a forced `w:br w:type="page"`.
pub fn has_page_break(run: &XmlElement) -> bool {
    run.any_descendant(&|e| {
        e.is("lastRenderedPageBreak")
            || (e.is("br") && e.attribute("type").as_deref() == Some("page"))
    })
}

/// The run's formatting block (`w:rPr`), if any.
pub fn properties(run: &XmlElement) -> Option<&XmlElement> {
    run.child("rPr")
}

/// Whether text needs `xml:space="preserve"` to survive serialization.
pub fn needs_space_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

/// Build a `w:t` element holding `text`.
pub fn text_element(text: &str) -> XmlElement {
    let mut element = XmlElement::new(TEXT).with_text(text);
    if needs_space_preserve(text) {
        element.ensure_attribute("xml:space", "preserve");
    }
    element
}

/// Build a run with optional formatting and the given content.
pub fn new_run(properties: Option<&XmlElement>, content: Vec<XmlNode>) -> XmlElement {
    let mut run = XmlElement::new(RUN);
    if let Some(properties) = properties {
        run.children_mut().push(XmlNode::Element(properties.clone()));
    }
    run.children_mut().extend(content);
    run
}

/// Replace the run's content, keeping its start tag and `w:rPr`.
pub fn set_content(run: &mut XmlElement, content: Vec<XmlNode>) {
    let children = run.children_mut();
    children.retain(|n| n.is_element("rPr"));
    children.extend(content);
}

/// A run's content divided around a removed byte range.
#[derive(Debug, Default)]
pub struct Partition {
    /// Content that precedes the range
    pub before: Vec<XmlNode>,
    /// Content that follows the range
    pub after: Vec<XmlNode>,
}

impl Partition {
    /// Whether the trailing part holds any element.
    pub fn has_after(&self) -> bool {
        self.after.iter().any(|n| matches!(n, XmlNode::Element(_)))
    }
}

/// Divide the run's content (everything except `w:rPr`) around the byte
/// range `start..end` of its text.
///
/// `w:t` elements straddling a boundary are cut; the cut pieces keep the
/// original element's attributes. Zero-width content before `end` stays
/// in front, the rest goes behind. Content inside the range is dropped.
pub fn partition(run: &XmlElement, start: usize, end: usize) -> Result<Partition> {
    let mut parts = Partition::default();
    let mut pos = 0;

    for node in run.children() {
        let element = match node {
            XmlNode::Element(e) if e.is("rPr") => continue,
            XmlNode::Element(e) => e,
            other => {
                let side = if pos < end { &mut parts.before } else { &mut parts.after };
                side.push(other.clone());
                continue;
            },
        };

        match piece(element)? {
            Piece::Text(text) => {
                let (s, e) = (pos, pos + text.len());
                if e <= start {
                    parts.before.push(node.clone());
                } else if s >= end {
                    parts.after.push(node.clone());
                } else {
                    if s < start {
                        parts.before.push(cut_text(element, &text, 0, start - s)?);
                    }
                    if e > end {
                        parts.after.push(cut_text(element, &text, end - s, text.len())?);
                    }
                }
                pos = e;
            },
            Piece::Atom(atom) => {
                let (s, e) = (pos, pos + atom.len());
                if e <= start {
                    parts.before.push(node.clone());
                } else if s >= end {
                    parts.after.push(node.clone());
                }
                pos = e;
            },
            Piece::Marker => {
                if pos < end {
                    parts.before.push(node.clone());
                } else {
                    parts.after.push(node.clone());
                }
            },
        }
    }

    Ok(parts)
}

fn cut_text(original: &XmlElement, text: &str, from: usize, to: usize) -> Result<XmlNode> {
    let slice = text.get(from..to).ok_or_else(|| {
        Error::DocumentStructure(format!(
            "offset {}..{} is not on a character boundary of '{}'",
            from, to, text
        ))
    })?;
    let mut element = original.clone();
    element.set_text(slice);
    if needs_space_preserve(slice) {
        element.ensure_attribute("xml:space", "preserve");
    }
    Ok(XmlNode::Element(element))
}
