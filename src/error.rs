//! Error types for the ruby annotation library.
//!
//! Configuration problems are reported before any document is touched.
//! Everything else aborts the pass over the current document; the
//! in-memory tree is discarded and nothing is written.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while annotating a document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No annotation rules were supplied
    #[error("Configuration error: rule list is empty")]
    EmptyRules,

    /// A rule has an empty target word
    #[error("Configuration error: rule #{index} has an empty word")]
    EmptyWord {
        /// Position of the rule in registration order
        index: usize,
    },

    /// A rule has an empty reading
    #[error("Configuration error: rule #{index} ('{word}') has an empty reading")]
    EmptyReading {
        /// Position of the rule in registration order
        index: usize,
        /// Target word of the offending rule
        word: String,
    },

    /// No repetition mode was given
    #[error("Configuration error: mode is missing (expected once, per_page or all)")]
    MissingMode,

    /// Mode value not recognised
    #[error("Configuration error: unknown mode '{0}' (expected once, per_page or all)")]
    UnknownMode(String),

    /// The document tree does not allow a required operation
    #[error("Document structure error: {0}")]
    DocumentStructure(String),

    /// The input is not a readable Office package
    #[error("Invalid DOCX package: {0}")]
    InvalidPackage(String),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Zip archive error
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error
    #[error("UTF-8 decoding error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Rule file could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error was caused by the supplied configuration rather
    /// than by the document.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyRules
                | Error::EmptyWord { .. }
                | Error::EmptyReading { .. }
                | Error::MissingMode
                | Error::UnknownMode(_)
        )
    }
}
