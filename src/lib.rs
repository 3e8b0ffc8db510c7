// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::len_without_is_empty)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Ruby Oxide
//!
//! Phonetic ruby (furigana) annotation for Word documents in Rust.
//!
//! ## Core Features
//!
//! - **Target rules**: an ordered list of (word, reading) pairs; when one
//!   word contains another, the longer one is annotated
//! - **Repetition modes**: `once` per document, `per_page` (page breaks taken
//!   from `w:lastRenderedPageBreak` and `w:br w:type="page"` markers), `all`
//! - **Formatting preserved**: runs are split in place, the text after a
//!   match inherits the original run properties, untouched XML is written
//!   back byte for byte
//! - **All-or-nothing**: a document is only written once every paragraph
//!   has been processed
//!
//! ## Architecture
//!
//! ```text
//! DocxPackage (zip entries + parsed word/document.xml)
//!     ↓
//! RubyAnnotator ── RubyConfig (rules, mode, style)
//!     ↓ per paragraph
//! scan → build w:ruby → split run → update eligibility → rescan
//!     ↓
//! DocxPackage::save
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use ruby_oxide::{DocxPackage, Mode, RubyConfig, apply};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RubyConfig::new(Vec::new(), Mode::Once).with_rule("運命", "さだめ");
//!
//! let mut doc = DocxPackage::open("novel.docx")?;
//! let report = apply(&mut doc, &config)?;
//! doc.save("novel_ruby.docx")?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! ```
//!
//! ## License
//!
//! Licensed under either of:
//!
//! * Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
//! * MIT license ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Document model
pub mod docx;
pub mod xml;

// Annotation engine
pub mod annotate;

// Re-exports
pub use annotate::{apply, default_output_path, AnnotationReport, RubyAnnotator};
pub use config::{Mode, RubyConfig, RubyRule, RubyStyle};
pub use docx::DocxPackage;
pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
