//! Annotation configuration: target rules, repetition mode and ruby style.
//!
//! A configuration is validated as a whole before any document is opened,
//! so a bad rule never produces a half-annotated file.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Repetition policy for annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Only the first occurrence in the whole document
    Once,
    /// The first occurrence on every page
    PerPage,
    /// Every occurrence
    All,
}

impl Mode {
    /// Canonical name as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Once => "once",
            Mode::PerPage => "per_page",
            Mode::All => "all",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Mode::Once),
            "per_page" | "per-page" | "perpage" => Ok(Mode::PerPage),
            "all" => Ok(Mode::All),
            _ => Err(Error::UnknownMode(s.to_string())),
        }
    }
}

/// A target word and the reading placed above it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubyRule {
    /// Base text to search for
    pub word: String,
    /// Reading rendered as the gloss
    pub reading: String,
}

impl RubyRule {
    /// Create a rule.
    pub fn new(word: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            reading: reading.into(),
        }
    }

    /// Parse a `WORD=READING` pair.
    pub fn parse_pair(pair: &str) -> Option<Self> {
        let (word, reading) = pair.split_once('=')?;
        Some(Self::new(word, reading))
    }
}

/// Properties written into every `w:rubyPr` block.
///
/// Sizes are in half-points, the unit WordprocessingML uses for `w:sz`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RubyStyle {
    /// Ruby alignment (`w:rubyAlign`)
    pub align: String,
    /// Reading font size (`w:hps`)
    pub reading_size: Option<u32>,
    /// Distance between reading and base (`w:hpsRaise`)
    pub raise: Option<u32>,
    /// Base text font size (`w:hpsBaseText`)
    pub base_size: Option<u32>,
    /// Language of the gloss (`w:lid`)
    pub lang: Option<String>,
    /// Copy the split run's `w:rPr` into the base and reading sub-runs
    pub inherit_run_formatting: bool,
}

impl Default for RubyStyle {
    fn default() -> Self {
        Self {
            align: "distributeSpace".to_string(),
            reading_size: None,
            raise: None,
            base_size: None,
            lang: None,
            inherit_run_formatting: true,
        }
    }
}

impl RubyStyle {
    /// Sizing used by Word for 10.5pt Japanese body text.
    pub fn japanese() -> Self {
        Self {
            reading_size: Some(10),
            raise: Some(20),
            base_size: Some(21),
            lang: Some("ja-JP".to_string()),
            ..Default::default()
        }
    }

    /// Enable or disable copying run formatting into the annotation.
    pub fn with_inherit_run_formatting(mut self, enable: bool) -> Self {
        self.inherit_run_formatting = enable;
        self
    }
}

/// Full configuration for one annotation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubyConfig {
    /// Rules in registration order
    pub rules: Vec<RubyRule>,
    /// Repetition policy
    pub mode: Mode,
    /// Ruby property block
    pub style: RubyStyle,
    /// Also process paragraphs nested in tables and content controls
    pub include_tables: bool,
}

/// On-disk shape of a rule file. `mode` is optional here so a missing
/// value can be reported as a configuration error instead of a JSON one.
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RubyRule>,
    mode: Option<String>,
    style: Option<RubyStyle>,
    include_tables: Option<bool>,
}

impl RubyConfig {
    /// Create a configuration with default style.
    pub fn new(rules: Vec<RubyRule>, mode: Mode) -> Self {
        Self {
            rules,
            mode,
            style: RubyStyle::default(),
            include_tables: true,
        }
    }

    /// Append a rule.
    pub fn with_rule(mut self, word: impl Into<String>, reading: impl Into<String>) -> Self {
        self.rules.push(RubyRule::new(word, reading));
        self
    }

    /// Set the repetition mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the ruby style.
    pub fn with_style(mut self, style: RubyStyle) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable processing of table and content-control paragraphs.
    pub fn with_tables(mut self, enable: bool) -> Self {
        self.include_tables = enable;
        self
    }

    /// Check the rule list.
    ///
    /// Blank words or readings are rejected: a whitespace-only word would
    /// gloss every space in the document.
    pub fn validate(&self) -> Result<()> {
        if self.rules.is_empty() {
            return Err(Error::EmptyRules);
        }
        for (index, rule) in self.rules.iter().enumerate() {
            if rule.word.trim().is_empty() {
                return Err(Error::EmptyWord { index });
            }
            if rule.reading.trim().is_empty() {
                return Err(Error::EmptyReading {
                    index,
                    word: rule.word.clone(),
                });
            }
        }
        Ok(())
    }

    /// Parse a JSON rule file.
    ///
    /// ```json
    /// {"mode": "per_page", "rules": [{"word": "運命", "reading": "さだめ"}]}
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config = Self::from_json_with_mode(json, None)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON rule file without validating its rules; `mode`, when
    /// given, replaces the file's mode. Callers are expected to add rules
    /// and call [`RubyConfig::validate`] themselves.
    pub fn from_json_with_mode(json: &str, mode: Option<Mode>) -> Result<Self> {
        let file: RuleFile = serde_json::from_str(json)?;
        let mode = match (mode, file.mode) {
            (Some(mode), _) => mode,
            (None, Some(value)) => value.parse()?,
            (None, None) => return Err(Error::MissingMode),
        };
        Ok(Self {
            rules: file.rules,
            mode,
            style: file.style.unwrap_or_default(),
            include_tables: file.include_tables.unwrap_or(true),
        })
    }

    /// Read and parse a JSON rule file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }
}
