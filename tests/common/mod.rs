//! In-memory DOCX fixtures shared by the integration tests.

#![allow(dead_code)]

use ruby_oxide::docx::run;
use ruby_oxide::{DocxPackage, Mode, RubyConfig};
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const CONTENT_TYPES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    r#"<Default Extension="xml" ContentType="application/xml"/>"#,
    r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
    r#"</Types>"#
);

pub const RELS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
    r#"</Relationships>"#
);

pub const STYLES: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
    r#"<w:docDefaults><w:rPrDefault><w:rPr><w:sz w:val="21"/></w:rPr></w:rPrDefault></w:docDefaults>"#,
    r#"</w:styles>"#
);

/// Wrap body content in a complete `word/document.xml`.
pub fn document_xml(body: &str) -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            "<w:body>{}<w:sectPr/></w:body></w:document>"
        ),
        body
    )
}

/// Build a DOCX archive around the given body content.
pub fn docx(body: &str) -> Vec<u8> {
    let document = document_xml(body);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", RELS),
        ("word/document.xml", document.as_str()),
        ("word/styles.xml", STYLES),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// A paragraph with one plain run per string.
pub fn paragraph(runs: &[&str]) -> String {
    let mut xml = String::from("<w:p>");
    for text in runs {
        xml.push_str(&format!(r#"<w:r><w:t xml:space="preserve">{}</w:t></w:r>"#, text));
    }
    xml.push_str("</w:p>");
    xml
}

/// Raw bytes of one archive entry.
pub fn entry(archive: &[u8], name: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut data = Vec::new();
    file.read_to_end(&mut data).unwrap();
    data
}

/// Names of all archive entries in order.
pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(archive)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

/// Configuration with the given mode and `(word, reading)` rules.
pub fn config(mode: Mode, rules: &[(&str, &str)]) -> RubyConfig {
    rules
        .iter()
        .fold(RubyConfig::new(Vec::new(), mode), |c, (w, r)| c.with_rule(*w, *r))
}

/// Text of each body paragraph as a reader sees it: run text and ruby
/// base text interleaved in document order.
pub fn visible_texts(package: &DocxPackage) -> Vec<String> {
    let body = package.document().root().unwrap().child("body").unwrap();
    body.elements()
        .filter(|e| e.is("p"))
        .map(|p| {
            let mut text = String::new();
            for child in p.elements() {
                if child.is("r") {
                    text.push_str(&run::text(child).unwrap());
                } else if child.is("ruby") {
                    for r in child.child("rubyBase").unwrap().elements() {
                        text.push_str(&run::text(r).unwrap());
                    }
                }
            }
            text
        })
        .collect()
}
