//! Splicing an annotation node into a paragraph in place of matched text.

use crate::docx::run;
use crate::error::{Error, Result};
use crate::xml::{XmlElement, XmlNode};

/// Replace `len` bytes of the run at child `index` of `paragraph`,
/// starting at byte `start` of its text, with `annotation`.
///
/// The run keeps its position, start tag and formatting and is cut down to
/// the text before the match (possibly nothing). The annotation follows
/// it. Text after the match moves into a new run with a copy of the
/// original formatting, inserted after the annotation.
///
/// Returns the number of nodes inserted after `index` (1 or 2). Any index
/// into the paragraph's children beyond `index` is stale afterwards.
pub fn split(
    paragraph: &mut XmlElement,
    index: usize,
    start: usize,
    len: usize,
    annotation: XmlElement,
) -> Result<usize> {
    let children = paragraph.children_mut();
    let target = children
        .get_mut(index)
        .and_then(XmlNode::as_element_mut)
        .filter(|e| e.is("r"))
        .ok_or_else(|| Error::DocumentStructure(format!("paragraph child {} is not a run", index)))?;

    let text = run::text(target)?;
    let end = start + len;
    if end > text.len() || !text.is_char_boundary(start) || !text.is_char_boundary(end) {
        return Err(Error::DocumentStructure(format!(
            "range {}..{} does not fit run text of {} bytes",
            start,
            end,
            text.len()
        )));
    }

    let parts = run::partition(target, start, end)?;
    let has_after = parts.has_after();
    let after_run = has_after.then(|| run::new_run(run::properties(target), parts.after));
    run::set_content(target, parts.before);

    children.insert(index + 1, XmlNode::Element(annotation));
    match after_run {
        Some(after) => {
            children.insert(index + 2, XmlNode::Element(after));
            Ok(2)
        },
        None => Ok(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::XmlDocument;

    fn paragraph(runs: &str) -> XmlElement {
        XmlDocument::parse(&format!("<w:p>{}</w:p>", runs))
            .unwrap()
            .root()
            .unwrap()
            .clone()
    }

    fn marker() -> XmlElement {
        XmlElement::new("w:ruby")
    }

    #[test]
    fn test_split_in_middle() {
        let mut p = paragraph("<w:r><w:rPr><w:b/></w:rPr><w:t>前の運命の後</w:t></w:r>");
        let inserted = split(&mut p, 0, "前の".len(), "運命".len(), marker()).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(
            p.to_xml().unwrap(),
            concat!(
                "<w:p>",
                "<w:r><w:rPr><w:b/></w:rPr><w:t>前の</w:t></w:r>",
                "<w:ruby/>",
                "<w:r><w:rPr><w:b/></w:rPr><w:t>の後</w:t></w:r>",
                "</w:p>"
            )
        );
    }

    #[test]
    fn test_split_whole_run_leaves_empty_run() {
        let mut p = paragraph(r#"<w:r w:rsidR="00AB"><w:rPr><w:i/></w:rPr><w:t>運命</w:t></w:r>"#);
        let inserted = split(&mut p, 0, 0, "運命".len(), marker()).unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(
            p.to_xml().unwrap(),
            r#"<w:p><w:r w:rsidR="00AB"><w:rPr><w:i/></w:rPr></w:r><w:ruby/></w:p>"#
        );
    }

    #[test]
    fn test_split_after_text_with_leading_space() {
        let mut p = paragraph("<w:r><w:t>key word</w:t></w:r>");
        split(&mut p, 0, 0, 3, marker()).unwrap();
        assert_eq!(
            p.to_xml().unwrap(),
            r#"<w:p><w:r></w:r><w:ruby/><w:r><w:t xml:space="preserve"> word</w:t></w:r></w:p>"#
        );
    }

    #[test]
    fn test_split_later_sibling() {
        let mut p = paragraph("<w:pPr/><w:r><w:t>a</w:t></w:r><w:r><w:t>bc</w:t></w:r>");
        split(&mut p, 2, 1, 1, marker()).unwrap();
        assert_eq!(
            p.to_xml().unwrap(),
            "<w:p><w:pPr/><w:r><w:t>a</w:t></w:r><w:r><w:t>b</w:t></w:r><w:ruby/></w:p>"
        );
    }

    #[test]
    fn test_split_rejects_non_run() {
        let mut p = paragraph("<w:pPr/><w:r><w:t>a</w:t></w:r>");
        assert!(matches!(
            split(&mut p, 0, 0, 1, marker()),
            Err(Error::DocumentStructure(_))
        ));
        assert!(split(&mut p, 5, 0, 1, marker()).is_err());
    }

    #[test]
    fn test_split_rejects_bad_range() {
        let mut p = paragraph("<w:r><w:t>運命</w:t></w:r>");
        assert!(split(&mut p, 0, 1, 2, marker()).is_err());
        assert!(split(&mut p, 0, 0, 9, marker()).is_err());
    }
}
