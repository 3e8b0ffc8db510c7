//! DOCX package access.
//!
//! DOCX files are ZIP archives of XML parts in Open XML format. The main
//! content lives in the part targeted by the package's `officeDocument`
//! relationship, normally `word/document.xml`.
//!
//! Only the main document part is parsed. Every other entry is carried
//! through untouched, in archive order and with its original compression,
//! so saving a package that was never edited reproduces the same parts.

pub mod run;

use crate::error::{Error, Result};
use crate::xml::{XmlDocument, XmlElement, XmlNode};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Default location of the main document part.
pub const DEFAULT_DOCUMENT_PART: &str = "word/document.xml";

const PACKAGE_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// One archive entry, kept verbatim.
#[derive(Debug, Clone)]
struct PackageEntry {
    name: String,
    data: Vec<u8>,
    compression: CompressionMethod,
    is_dir: bool,
}

/// An opened Word document.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    entries: Vec<PackageEntry>,
    document_part: String,
    document: XmlDocument,
}

impl DocxPackage {
    /// Open a DOCX file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    /// Open DOCX bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::InvalidPackage(format!("Failed to open DOCX archive: {}", e)))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let mut data = Vec::new();
            file.read_to_end(&mut data)?;
            entries.push(PackageEntry {
                name: file.name().to_string(),
                data,
                compression: file.compression(),
                is_dir: file.is_dir(),
            });
        }

        let document_part = entries
            .iter()
            .find(|e| e.name == PACKAGE_RELS)
            .and_then(|e| std::str::from_utf8(&e.data).ok())
            .and_then(main_document_target)
            .unwrap_or_else(|| DEFAULT_DOCUMENT_PART.to_string());

        let entry = entries
            .iter()
            .find(|e| e.name == document_part)
            .ok_or_else(|| {
                Error::DocumentStructure(format!("package has no {} part", document_part))
            })?;
        let xml = std::str::from_utf8(&entry.data)?;
        let document = XmlDocument::parse(xml)?;

        log::debug!(
            "Opened DOCX package: {} entries, main part {}",
            entries.len(),
            document_part
        );

        Ok(Self {
            entries,
            document_part,
            document,
        })
    }

    /// Name of the main document part.
    pub fn document_part(&self) -> &str {
        &self.document_part
    }

    /// The parsed main document part.
    pub fn document(&self) -> &XmlDocument {
        &self.document
    }

    /// Swap in a new main document tree, returning the old one.
    pub fn replace_document(&mut self, document: XmlDocument) -> XmlDocument {
        std::mem::replace(&mut self.document, document)
    }

    /// Serialize the package.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let document_xml = self.document.to_bytes()?;
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for entry in &self.entries {
            let method = match entry.compression {
                CompressionMethod::Stored => CompressionMethod::Stored,
                _ => CompressionMethod::Deflated,
            };
            let options = SimpleFileOptions::default().compression_method(method);
            if entry.is_dir {
                zip.add_directory(entry.name.as_str(), options)?;
                continue;
            }
            zip.start_file(entry.name.as_str(), options)?;
            if entry.name == self.document_part {
                zip.write_all(&document_xml)?;
            } else {
                zip.write_all(&entry.data)?;
            }
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write the package to `path`.
    ///
    /// The bytes go to a sibling temporary file first and are renamed into
    /// place, so `path` never holds a partial document.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        let tmp = temp_sibling(path);
        std::fs::write(&tmp, &bytes)?;
        if let Err(e) = std::fs::rename(&tmp, path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    /// Plain text of every paragraph, runs only. Existing ruby annotations
    /// contribute nothing.
    pub fn paragraph_texts(&self, include_tables: bool) -> Result<Vec<String>> {
        let mut texts = Vec::new();
        let body = body(&self.document)?;
        collect_paragraphs(body, include_tables, &mut |p: &XmlElement| {
            let mut text = String::new();
            for node in p.children() {
                if let Some(r) = node.as_element().filter(|e| e.is("r")) {
                    text.push_str(&run::text(r)?);
                }
            }
            texts.push(text);
            Ok(())
        })?;
        Ok(texts)
    }

    /// `(base, reading)` of every ruby annotation directly inside a body
    /// paragraph, in document order.
    pub fn annotations(&self, include_tables: bool) -> Result<Vec<(String, String)>> {
        let mut found = Vec::new();
        let body = body(&self.document)?;
        collect_paragraphs(body, include_tables, &mut |p: &XmlElement| {
            for ruby in p.elements().filter(|e| e.is("ruby")) {
                let base = ruby_part_text(ruby, "rubyBase")?;
                let reading = ruby_part_text(ruby, "rt")?;
                found.push((base, reading));
            }
            Ok(())
        })?;
        Ok(found)
    }
}

/// Call `f` on every paragraph of the body in document order.
///
/// With `include_tables`, paragraphs inside table cells and block-level
/// content controls are visited where they occur. Paragraphs nested
/// inside runs (text boxes) are never visited.
pub fn for_each_paragraph(
    document: &mut XmlDocument,
    include_tables: bool,
    f: &mut dyn FnMut(&mut XmlElement) -> Result<()>,
) -> Result<()> {
    let body = body_mut(document)?;
    visit_paragraphs(body, include_tables, f)
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Find the main document target in `_rels/.rels`.
fn main_document_target(rels: &str) -> Option<String> {
    let mut reader = Reader::from_str(rels);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = None;
                let mut target = None;
                for attr in e.attributes().flatten() {
                    let value = attr.unescape_value().ok()?.into_owned();
                    match attr.key.local_name().as_ref() {
                        b"Type" => rel_type = Some(value),
                        b"Target" => target = Some(value),
                        _ => {},
                    }
                }
                if rel_type.is_some_and(|t| t.ends_with(OFFICE_DOCUMENT_REL)) {
                    return target.map(|t| t.trim_start_matches('/').to_string());
                }
            },
            Ok(Event::Eof) | Err(_) => return None,
            _ => {},
        }
    }
}

fn body(document: &XmlDocument) -> Result<&XmlElement> {
    document
        .root()
        .and_then(|root| root.child("body"))
        .ok_or_else(|| Error::DocumentStructure("document has no w:body".to_string()))
}

fn body_mut(document: &mut XmlDocument) -> Result<&mut XmlElement> {
    document
        .root_mut()
        .and_then(|root| root.child_mut("body"))
        .ok_or_else(|| Error::DocumentStructure("document has no w:body".to_string()))
}

/// Block-level containers that hold paragraphs in document order.
fn is_block_container(element: &XmlElement) -> bool {
    matches!(
        element.local_name(),
        b"tbl" | b"tr" | b"tc" | b"sdt" | b"sdtContent" | b"customXml"
    )
}

fn visit_paragraphs(
    parent: &mut XmlElement,
    include_tables: bool,
    f: &mut dyn FnMut(&mut XmlElement) -> Result<()>,
) -> Result<()> {
    for node in parent.children_mut() {
        let XmlNode::Element(element) = node else {
            continue;
        };
        if element.is("p") {
            f(element)?;
        } else if include_tables && is_block_container(element) {
            visit_paragraphs(element, include_tables, f)?;
        }
    }
    Ok(())
}

fn collect_paragraphs(
    parent: &XmlElement,
    include_tables: bool,
    f: &mut dyn FnMut(&XmlElement) -> Result<()>,
) -> Result<()> {
    for element in parent.elements() {
        if element.is("p") {
            f(element)?;
        } else if include_tables && is_block_container(element) {
            collect_paragraphs(element, include_tables, f)?;
        }
    }
    Ok(())
}

fn ruby_part_text(ruby: &XmlElement, part: &str) -> Result<String> {
    let mut text = String::new();
    if let Some(part) = ruby.child(part) {
        for r in part.elements().filter(|e| e.is("r")) {
            text.push_str(&run::text(r)?);
        }
    }
    Ok(text)
}
