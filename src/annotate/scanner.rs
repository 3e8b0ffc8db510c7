//! Longest-word-first search of target words in run text.

use crate::config::RubyRule;

/// Rules ordered for scanning: longest word first.
///
/// The sort is stable, so among rules with words of equal length the one
/// registered first is tried first. Length is counted in characters.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<RubyRule>,
}

impl RuleSet {
    /// Order `rules` for scanning.
    pub fn new(rules: &[RubyRule]) -> Self {
        let mut rules = rules.to_vec();
        rules.sort_by_key(|r| std::cmp::Reverse(r.word.chars().count()));
        Self { rules }
    }

    /// Rules in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &RubyRule> {
        self.rules.iter()
    }

    /// Rules that can never match because an earlier rule has the same word.
    pub fn shadowed(&self) -> Vec<&RubyRule> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(i, r)| self.rules[..*i].iter().any(|earlier| earlier.word == r.word))
            .map(|(_, r)| r)
            .collect()
    }
}

/// An occurrence of a rule's word in a run's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'r> {
    /// The rule that matched
    pub rule: &'r RubyRule,
    /// Byte offset of the word in the text
    pub start: usize,
}

impl Match<'_> {
    /// Byte length of the matched word.
    pub fn len(&self) -> usize {
        self.rule.word.len()
    }

    /// Byte offset just past the matched word.
    pub fn end(&self) -> usize {
        self.start + self.len()
    }
}

/// Find the first candidate that occurs in `text`.
///
/// Candidates are tried in the order given; the first one with any
/// occurrence wins and its earliest occurrence is returned. Offsets of
/// other candidates are never compared.
pub fn scan<'r, I>(text: &str, candidates: I) -> Option<Match<'r>>
where
    I: IntoIterator<Item = &'r RubyRule>,
{
    if text.is_empty() {
        return None;
    }
    candidates.into_iter().find_map(|rule| {
        text.find(rule.word.as_str())
            .map(|start| Match { rule, start })
    })
}
