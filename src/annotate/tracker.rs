//! Per-mode eligibility of target words.

use crate::config::Mode;
use std::collections::HashSet;

/// Tracks which words may still be annotated at the current scan position.
///
/// One tracker serves one document pass. In [`Mode::Once`] exhaustion is
/// document-wide, in [`Mode::PerPage`] it lasts until the next page
/// boundary, and [`Mode::All`] never exhausts anything.
#[derive(Debug, Clone)]
pub struct ApplicationTracker {
    mode: Mode,
    exhausted: HashSet<String>,
    page_boundaries: usize,
}

impl ApplicationTracker {
    /// Create a tracker with every word eligible.
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            exhausted: HashSet::new(),
            page_boundaries: 0,
        }
    }

    /// Whether `word` may be annotated now.
    pub fn is_eligible(&self, word: &str) -> bool {
        match self.mode {
            Mode::All => true,
            Mode::Once | Mode::PerPage => !self.exhausted.contains(word),
        }
    }

    /// Record that `word` was annotated.
    pub fn mark_applied(&mut self, word: &str) {
        match self.mode {
            Mode::All => {},
            Mode::Once | Mode::PerPage => {
                self.exhausted.insert(word.to_string());
            },
        }
    }

    /// A page boundary was crossed.
    pub fn on_page_boundary(&mut self) {
        self.page_boundaries += 1;
        if self.mode == Mode::PerPage && !self.exhausted.is_empty() {
            log::debug!(
                "Page boundary {}: {} word(s) eligible again",
                self.page_boundaries,
                self.exhausted.len()
            );
            self.exhausted.clear();
        }
    }

    /// Page boundaries seen so far.
    pub fn page_boundaries(&self) -> usize {
        self.page_boundaries
    }
}
