//! Ruby annotation of Word documents.
//!
//! ## Architecture
//!
//! ```text
//! RubyAnnotator (document driver)
//!     │  one ApplicationTracker per document
//!     ↓
//! paragraph::annotate (per paragraph, scan / splice / rescan)
//!     ├─ scanner::scan        longest eligible word in a run's text
//!     ├─ builder::build       w:ruby node for (word, reading)
//!     ├─ splitter::split      run → before run, w:ruby, after run
//!     └─ tracker              once / per_page / all eligibility
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use ruby_oxide::{Mode, RubyAnnotator, RubyConfig};
//!
//! let config = RubyConfig::new(Vec::new(), Mode::PerPage)
//!     .with_rule("運命", "さだめ")
//!     .with_rule("鍵", "かぎ");
//! let annotator = RubyAnnotator::new(config)?;
//! let report = annotator.annotate_file("book.docx", "book_ruby.docx")?;
//! println!("{}", report);
//! ```

pub mod builder;
pub mod paragraph;
pub mod scanner;
pub mod splitter;
pub mod tracker;

pub use scanner::{Match, RuleSet};
pub use tracker::ApplicationTracker;

use crate::config::RubyConfig;
use crate::docx::{self, DocxPackage};
use crate::error::Result;
use crate::xml::XmlElement;
use indexmap::IndexMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Outcome of one document pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationReport {
    /// Paragraphs visited
    pub paragraphs: usize,
    /// Page-break runs encountered
    pub page_boundaries: usize,
    /// Annotations per word, in rule registration order
    pub applied: IndexMap<String, usize>,
}

impl AnnotationReport {
    fn for_config(config: &RubyConfig) -> Self {
        let mut applied = IndexMap::new();
        for rule in &config.rules {
            applied.entry(rule.word.clone()).or_insert(0);
        }
        Self {
            applied,
            ..Default::default()
        }
    }

    /// Total number of annotations.
    pub fn total(&self) -> usize {
        self.applied.values().sum()
    }

    /// Annotations of a single word.
    pub fn count(&self, word: &str) -> usize {
        self.applied.get(word).copied().unwrap_or(0)
    }
}

impl fmt::Display for AnnotationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} annotation(s) in {} paragraph(s), {} page boundary marker(s)",
            self.total(),
            self.paragraphs,
            self.page_boundaries
        )?;
        for (word, count) in &self.applied {
            writeln!(f, "  {}: {}", word, count)?;
        }
        Ok(())
    }
}

/// Applies a validated configuration to documents.
///
/// The annotator holds no per-document state; every call builds its own
/// tracker, so one annotator can serve many documents, including from
/// several threads.
#[derive(Debug, Clone)]
pub struct RubyAnnotator {
    config: RubyConfig,
    rules: RuleSet,
}

impl RubyAnnotator {
    /// Validate `config` and prepare the scan order.
    pub fn new(config: RubyConfig) -> Result<Self> {
        config.validate()?;
        let rules = RuleSet::new(&config.rules);
        for rule in rules.shadowed() {
            log::warn!(
                "Rule '{}' → '{}' is shadowed by an earlier rule for the same word",
                rule.word,
                rule.reading
            );
        }
        Ok(Self { config, rules })
    }

    /// Annotate a package in memory.
    ///
    /// The pass runs on a copy of the main document tree, which replaces
    /// the package's tree only once every paragraph has been processed. On
    /// error the package is left exactly as it was.
    pub fn annotate(&self, package: &mut DocxPackage) -> Result<AnnotationReport> {
        let mut document = package.document().clone();
        let mut tracker = ApplicationTracker::new(self.config.mode);
        let mut report = AnnotationReport::for_config(&self.config);

        docx::for_each_paragraph(
            &mut document,
            self.config.include_tables,
            &mut |p: &mut XmlElement| {
                report.paragraphs += 1;
                let applied = paragraph::annotate(p, &self.rules, &self.config.style, &mut tracker)?;
                for word in applied {
                    *report.applied.entry(word).or_insert(0) += 1;
                }
                Ok(())
            },
        )?;

        report.page_boundaries = tracker.page_boundaries();
        package.replace_document(document);

        log::info!(
            "Applied {} annotation(s) in {} mode across {} paragraph(s), {} page boundary marker(s)",
            report.total(),
            self.config.mode,
            report.paragraphs,
            report.page_boundaries
        );
        Ok(report)
    }

    /// Annotate DOCX bytes, returning the new bytes.
    pub fn annotate_bytes(&self, bytes: &[u8]) -> Result<(Vec<u8>, AnnotationReport)> {
        let mut package = DocxPackage::from_bytes(bytes)?;
        let report = self.annotate(&mut package)?;
        Ok((package.to_bytes()?, report))
    }

    /// Read `input`, annotate it and write the result to `output`.
    ///
    /// Nothing is written unless the whole document was processed.
    pub fn annotate_file(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<AnnotationReport> {
        let input = input.as_ref();
        let output = output.as_ref();
        log::info!("Annotating {} → {}", input.display(), output.display());

        let mut package = DocxPackage::open(input)?;
        let report = self.annotate(&mut package)?;
        package.save(output)?;
        Ok(report)
    }
}

/// Annotate `package` with `config`.
pub fn apply(package: &mut DocxPackage, config: &RubyConfig) -> Result<AnnotationReport> {
    RubyAnnotator::new(config.clone())?.annotate(package)
}

/// `<stem>_ruby.docx` next to `input`.
pub fn default_output_path(input: impl AsRef<Path>) -> PathBuf {
    let input = input.as_ref();
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    input.with_file_name(format!("{}_ruby.docx", stem))
}
