//! Property tests for the annotation pass.

mod common;

use common::{config, docx, visible_texts};
use proptest::prelude::*;
use ruby_oxide::{apply, DocxPackage, Mode};

const RULES: &[(&str, &str)] = &[("命", "いのち"), ("運命", "さだめ"), ("鍵", "かぎ")];

fn body(paragraphs: &[Vec<String>]) -> String {
    paragraphs
        .iter()
        .map(|runs| {
            let runs: Vec<&str> = runs.iter().map(String::as_str).collect();
            common::paragraph(&runs)
        })
        .collect()
}

fn run_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(
        prop::collection::vec("[運命鍵のa ]{0,10}", 1..4),
        1..4,
    )
}

proptest! {
    #[test]
    fn prop_visible_text_is_preserved(paragraphs in run_strategy()) {
        let mut package = DocxPackage::from_bytes(&docx(&body(&paragraphs))).unwrap();
        apply(&mut package, &config(Mode::All, RULES)).unwrap();

        let expected: Vec<String> = paragraphs.iter().map(|runs| runs.concat()).collect();
        prop_assert_eq!(visible_texts(&package), expected);
    }

    #[test]
    fn prop_all_mode_annotates_every_occurrence(paragraphs in run_strategy()) {
        let mut package = DocxPackage::from_bytes(&docx(&body(&paragraphs))).unwrap();
        let report = apply(&mut package, &config(Mode::All, RULES)).unwrap();

        // every 命 is glossed, alone or as part of 運命
        let expected: usize = paragraphs
            .iter()
            .flatten()
            .map(|run| run.matches('命').count() + run.matches('鍵').count())
            .sum();
        prop_assert_eq!(report.total(), expected);
        prop_assert_eq!(package.annotations(true).unwrap().len(), expected);
    }

    #[test]
    fn prop_once_mode_annotates_each_word_at_most_once(paragraphs in run_strategy()) {
        let mut package = DocxPackage::from_bytes(&docx(&body(&paragraphs))).unwrap();
        let report = apply(&mut package, &config(Mode::Once, RULES)).unwrap();
        for (word, count) in &report.applied {
            prop_assert!(*count <= 1, "{} annotated {} times", word, count);
        }
    }
}
