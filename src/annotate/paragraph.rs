//! Scan / splice / rescan loop over one paragraph.

use super::builder;
use super::scanner::{scan, RuleSet};
use super::tracker::ApplicationTracker;
use super::splitter;
use crate::config::RubyStyle;
use crate::docx::run;
use crate::error::Result;
use crate::xml::XmlElement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Examining the child at this index
    Scanning(usize),
    /// The paragraph changed; resume at the split run
    Restart(usize),
    Done,
}

/// Annotate every eligible occurrence in `paragraph`, returning the words
/// annotated in order.
///
/// Only direct `w:r` children are scanned. After each splice the scan
/// resumes at the run that was split, because the text left in front of
/// the match may still hold a shorter word. Earlier runs had no eligible
/// match when they were entered and eligibility only shrinks until the
/// next page boundary, so they are not revisited. Annotation nodes are
/// never scanned, which bounds the loop by the number of occurrences.
///
/// A page-break run signals the tracker once, the first time the scan
/// enters it; the part of a split run that keeps the marker does not
/// signal again. A marker that lands in the after-run of a split is not
/// signalled either, since its run was already entered.
pub fn annotate(
    paragraph: &mut XmlElement,
    rules: &RuleSet,
    style: &RubyStyle,
    tracker: &mut ApplicationTracker,
) -> Result<Vec<String>> {
    let mut scan_state = ScanState {
        frontier: 0,
        applied: Vec::new(),
    };
    let mut state = State::Scanning(0);

    loop {
        state = match state {
            State::Scanning(index) => {
                scan_state.step(paragraph, index, rules, style, tracker)?
            },
            State::Restart(index) => State::Scanning(index),
            State::Done => break,
        };
    }

    Ok(scan_state.applied)
}

struct ScanState {
    /// First child index the scan has not entered yet
    frontier: usize,
    applied: Vec<String>,
}

impl ScanState {
    fn step(
        &mut self,
        paragraph: &mut XmlElement,
        index: usize,
        rules: &RuleSet,
        style: &RubyStyle,
        tracker: &mut ApplicationTracker,
    ) -> Result<State> {
        let target = match paragraph.children().get(index) {
            None => return Ok(State::Done),
            Some(node) => match node.as_element().filter(|e| e.is("r")) {
                Some(target) => target,
                None => return Ok(State::Scanning(index + 1)),
            },
        };

        if index >= self.frontier {
            self.frontier = index + 1;
            if run::has_page_break(target) {
                tracker.on_page_boundary();
            }
        }

        let text = run::text(target)?;
        let eligible = rules.iter().filter(|r| tracker.is_eligible(&r.word));
        let Some(found) = scan(&text, eligible) else {
            return Ok(State::Scanning(index + 1));
        };

        let annotation = builder::build(
            &found.rule.word,
            &found.rule.reading,
            style,
            run::properties(target),
        );
        let inserted = splitter::split(paragraph, index, found.start, found.len(), annotation)?;
        self.frontier += inserted;
        tracker.mark_applied(&found.rule.word);
        log::debug!(
            "Annotated '{}' ({}) at byte {} of run {}",
            found.rule.word,
            found.rule.reading,
            found.start,
            index
        );
        self.applied.push(found.rule.word.clone());
        Ok(State::Restart(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Mode, RubyRule};
    use crate::xml::XmlDocument;

    fn paragraph(runs: &str) -> XmlElement {
        XmlDocument::parse(&format!("<w:p>{}</w:p>", runs))
            .unwrap()
            .root()
            .unwrap()
            .clone()
    }

    fn rule_set(pairs: &[(&str, &str)]) -> RuleSet {
        let rules: Vec<RubyRule> = pairs.iter().map(|(w, r)| RubyRule::new(*w, *r)).collect();
        RuleSet::new(&rules)
    }

    fn run_texts(p: &XmlElement) -> String {
        p.elements()
            .filter(|e| e.is("r"))
            .map(|r| run::text(r).unwrap())
            .collect()
    }

    fn ruby_count(p: &XmlElement) -> usize {
        p.elements().filter(|e| e.is("ruby")).count()
    }

    #[test]
    fn test_all_occurrences_in_one_run() {
        let mut p = paragraph("<w:r><w:t>鍵と鍵と鍵</w:t></w:r>");
        let mut tracker = ApplicationTracker::new(Mode::All);
        let applied =
            annotate(&mut p, &rule_set(&[("鍵", "かぎ")]), &RubyStyle::default(), &mut tracker)
                .unwrap();
        assert_eq!(applied.len(), 3);
        assert_eq!(ruby_count(&p), 3);
        assert_eq!(run_texts(&p), "とと");
    }

    #[test]
    fn test_shorter_word_in_prefix_is_found_after_restart() {
        let mut p = paragraph("<w:r><w:t>命の運命</w:t></w:r>");
        let mut tracker = ApplicationTracker::new(Mode::All);
        let rules = rule_set(&[("命", "いのち"), ("運命", "さだめ")]);
        let applied = annotate(&mut p, &rules, &RubyStyle::default(), &mut tracker).unwrap();
        assert_eq!(applied, vec!["運命", "命"]);
        assert_eq!(run_texts(&p), "の");
    }

    #[test]
    fn test_once_mode_stops_after_first() {
        let mut p = paragraph("<w:r><w:t>鍵</w:t></w:r><w:r><w:t>鍵</w:t></w:r>");
        let mut tracker = ApplicationTracker::new(Mode::Once);
        let applied =
            annotate(&mut p, &rule_set(&[("鍵", "かぎ")]), &RubyStyle::default(), &mut tracker)
                .unwrap();
        assert_eq!(applied.len(), 1);
        // the first run was consumed, the second is untouched
        assert!(p.to_xml().unwrap().ends_with("<w:r><w:t>鍵</w:t></w:r></w:p>"));
    }

    #[test]
    fn test_page_break_fires_once_per_run() {
        let mut p = paragraph("<w:r><w:lastRenderedPageBreak/><w:t>鍵と鍵</w:t></w:r>");
        let mut tracker = ApplicationTracker::new(Mode::PerPage);
        let applied =
            annotate(&mut p, &rule_set(&[("鍵", "かぎ")]), &RubyStyle::default(), &mut tracker)
                .unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(tracker.page_boundaries(), 1);
    }

    #[test]
    fn test_marker_moved_to_after_run_does_not_fire_again() {
        let mut p = paragraph(r#"<w:r><w:t>鍵</w:t><w:br w:type="page"/><w:t>鍵</w:t></w:r>"#);
        let mut tracker = ApplicationTracker::new(Mode::PerPage);
        let applied =
            annotate(&mut p, &rule_set(&[("鍵", "かぎ")]), &RubyStyle::default(), &mut tracker)
                .unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(tracker.page_boundaries(), 1);
        // the marker travels with the text after the match
        assert!(p.to_xml().unwrap().ends_with(r#"</w:ruby><w:r><w:br w:type="page"/><w:t>鍵</w:t></w:r></w:p>"#));
    }

    #[test]
    fn test_page_reset_does_not_reach_back() {
        // two words on the first page; the break run resets eligibility
        let mut p = paragraph(concat!(
            "<w:r><w:t>扉と扉</w:t></w:r>",
            r#"<w:r><w:br w:type="page"/><w:t>鍵</w:t></w:r>"#
        ));
        let mut tracker = ApplicationTracker::new(Mode::PerPage);
        let rules = rule_set(&[("扉", "とびら"), ("鍵", "かぎ")]);
        let applied = annotate(&mut p, &rules, &RubyStyle::default(), &mut tracker).unwrap();
        assert_eq!(applied, vec!["扉", "鍵"]);
        assert_eq!(run_texts(&p), "と扉");
    }

    #[test]
    fn test_annotation_nodes_are_not_rescanned() {
        let mut p = paragraph("<w:r><w:t>鍵</w:t></w:r>");
        let rules = rule_set(&[("鍵", "かぎ")]);
        let mut tracker = ApplicationTracker::new(Mode::All);
        annotate(&mut p, &rules, &RubyStyle::default(), &mut tracker).unwrap();
        let again = annotate(&mut p, &rules, &RubyStyle::default(), &mut tracker).unwrap();
        assert!(again.is_empty());
        assert_eq!(ruby_count(&p), 1);
    }

    #[test]
    fn test_non_run_children_are_skipped() {
        let mut p = paragraph(concat!(
            "<w:pPr><w:t>鍵</w:t></w:pPr>",
            r#"<w:hyperlink r:id="rId1"><w:r><w:t>鍵</w:t></w:r></w:hyperlink>"#,
            "<w:r><w:t>鍵</w:t></w:r>"
        ));
        let mut tracker = ApplicationTracker::new(Mode::All);
        let applied =
            annotate(&mut p, &rule_set(&[("鍵", "かぎ")]), &RubyStyle::default(), &mut tracker)
                .unwrap();
        assert_eq!(applied.len(), 1);
    }
}
