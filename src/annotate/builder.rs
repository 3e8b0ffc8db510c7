//! Construction of `w:ruby` annotation nodes.
//!
//! ```text
//! <w:ruby>
//!   <w:rubyPr>
//!     <w:rubyAlign w:val="distributeSpace"/>
//!     <w:hps w:val="10"/>             (optional)
//!     <w:hpsRaise w:val="20"/>        (optional)
//!     <w:hpsBaseText w:val="21"/>     (optional)
//!     <w:lid w:val="ja-JP"/>          (optional)
//!   </w:rubyPr>
//!   <w:rt><w:r>[w:rPr]<w:t>reading</w:t></w:r></w:rt>
//!   <w:rubyBase><w:r>[w:rPr]<w:t>word</w:t></w:r></w:rubyBase>
//! </w:ruby>
//! ```

use crate::config::RubyStyle;
use crate::docx::run;
use crate::xml::{XmlElement, XmlNode};

/// Elements that follow `w:sz` in the `w:rPr` content model.
const AFTER_SZ: &[&str] = &[
    "szCs",
    "highlight",
    "u",
    "effect",
    "bdr",
    "shd",
    "fitText",
    "vertAlign",
    "rtl",
    "cs",
    "em",
    "lang",
    "eastAsianLayout",
    "specVanish",
    "oMath",
];

fn val_element(name: &str, value: &str) -> XmlElement {
    XmlElement::new(name).with_attribute("w:val", value)
}

fn ruby_properties(style: &RubyStyle) -> XmlElement {
    let mut properties =
        XmlElement::new("w:rubyPr").with_child(val_element("w:rubyAlign", &style.align));
    if let Some(size) = style.reading_size {
        properties = properties.with_child(val_element("w:hps", &size.to_string()));
    }
    if let Some(raise) = style.raise {
        properties = properties.with_child(val_element("w:hpsRaise", &raise.to_string()));
    }
    if let Some(size) = style.base_size {
        properties = properties.with_child(val_element("w:hpsBaseText", &size.to_string()));
    }
    if let Some(lang) = &style.lang {
        properties = properties.with_child(val_element("w:lid", lang));
    }
    properties
}

/// Set `w:sz` (and `w:szCs` when present) keeping schema order.
fn set_font_size(properties: &mut XmlElement, half_points: u32) {
    let value = half_points.to_string();
    let mut found = false;
    for node in properties.children_mut() {
        if let Some(e) = node.as_element_mut() {
            if e.is("sz") || e.is("szCs") {
                let name = String::from_utf8_lossy(e.name()).into_owned();
                *e = val_element(&name, &value);
                found |= e.is("sz");
            }
        }
    }
    if found {
        return;
    }
    let children = properties.children_mut();
    let at = children
        .iter()
        .position(|n| AFTER_SZ.iter().any(|name| n.is_element(name)))
        .unwrap_or(children.len());
    children.insert(at, XmlNode::Element(val_element("w:sz", &value)));
}

/// Drop `w:sz` and `w:szCs` so the size falls back to the ruby default.
fn clear_font_size(properties: &mut XmlElement) {
    properties
        .children_mut()
        .retain(|n| !(n.is_element("sz") || n.is_element("szCs")));
}

fn sub_run(text: &str, properties: Option<XmlElement>) -> XmlElement {
    run::new_run(properties.as_ref(), vec![XmlNode::Element(run::text_element(text))])
}

/// Build the annotation node for `word` glossed with `reading`.
///
/// `formatting` is the `w:rPr` of the run the word was cut from; it is
/// copied into both sub-runs when the style asks for it. Sizes from the
/// style override the copied ones; without a reading size the copied
/// size is dropped from the reading so it never renders at base size.
pub fn build(
    word: &str,
    reading: &str,
    style: &RubyStyle,
    formatting: Option<&XmlElement>,
) -> XmlElement {
    let inherited = formatting.filter(|_| style.inherit_run_formatting).cloned();

    let mut reading_properties = inherited.clone();
    let mut base_properties = inherited;
    match style.reading_size {
        Some(size) => set_font_size(
            reading_properties.get_or_insert_with(|| XmlElement::new(run::RUN_PROPERTIES)),
            size,
        ),
        None => {
            if let Some(properties) = reading_properties.as_mut() {
                clear_font_size(properties);
            }
            reading_properties = reading_properties.filter(|p| p.elements().next().is_some());
        },
    }
    if let Some(size) = style.base_size {
        set_font_size(
            base_properties.get_or_insert_with(|| XmlElement::new(run::RUN_PROPERTIES)),
            size,
        );
    }

    XmlElement::new("w:ruby")
        .with_child(ruby_properties(style))
        .with_child(XmlElement::new("w:rt").with_child(sub_run(reading, reading_properties)))
        .with_child(XmlElement::new("w:rubyBase").with_child(sub_run(word, base_properties)))
}
