//! Strengths, struggles and the payload handed to the summary writer

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::metrics::Metrics;
use super::primary::PrimaryPattern;
use crate::alignment::{AlignedWord, WordStatus};

const MAX_STRENGTHS: usize = 3;
const MAX_STRUGGLES: usize = 3;
const MIN_STRENGTH_LEN: usize = 6;

/// Long but common words that say nothing about reading skill
static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "after", "again", "always", "another", "around", "because", "before", "between",
        "could", "didn't", "different", "doesn't", "during", "enough", "everyone", "everything",
        "little", "nothing", "people", "really", "should", "something", "started", "thought",
        "through", "together", "without", "wouldn't", "anything", "someone", "himself",
        "herself", "itself", "myself", "yourself", "themselves", "whether", "whatever",
    ]
    .into_iter()
    .collect()
});

/// An expected word paired with what was said instead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Struggle {
    pub expected: String,
    pub spoken: String,
}

/// Everything the summary writer receives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentSummary {
    pub metrics: Metrics,
    pub strengths: Vec<String>,
    pub struggles: Vec<Struggle>,
    pub primary_pattern: Option<PrimaryPattern>,
}

fn clean_word(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
}

/// Up to three longer words read correctly, longest first
#[must_use]
pub fn strengths(words: &[AlignedWord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut picked: Vec<String> = words
        .iter()
        .filter(|w| w.status == WordStatus::Correct)
        .filter(|w| w.expected.chars().count() >= MIN_STRENGTH_LEN)
        .map(|w| clean_word(&w.expected))
        .filter(|w| !COMMON_WORDS.contains(w.to_lowercase().as_str()))
        .filter(|w| seen.insert(w.to_lowercase()))
        .map(str::to_string)
        .collect();

    // Stable: equal lengths keep reading order
    picked.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    picked.truncate(MAX_STRENGTHS);
    picked
}

/// Up to three misread or substituted words, in reading order
#[must_use]
pub fn struggles(words: &[AlignedWord]) -> Vec<Struggle> {
    words
        .iter()
        .filter(|w| matches!(w.status, WordStatus::Misread | WordStatus::Substituted))
        .filter_map(|w| {
            w.spoken.as_ref().map(|spoken| Struggle {
                expected: w.expected.clone(),
                spoken: spoken.clone(),
            })
        })
        .take(MAX_STRUGGLES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strengths_filters_and_sorts() {
        let words = vec![
            AlignedWord::correct("because"),
            AlignedWord::correct("garden."),
            AlignedWord::correct("butterflies"),
            AlignedWord::correct("cat"),
            AlignedWord::correct("Garden"),
            AlignedWord::read_as("elephant", "elegant", WordStatus::Misread),
            AlignedWord::correct("flowers"),
            AlignedWord::correct("sunshine"),
        ];

        assert_eq!(strengths(&words), vec!["butterflies", "sunshine", "flowers"]);
    }

    #[test]
    fn test_strength_length_counts_expected_text() {
        // "hello!" is six characters as written
        let words = vec![AlignedWord::correct("hello!"), AlignedWord::correct("tiger")];
        assert_eq!(strengths(&words), vec!["hello"]);
    }

    #[test]
    fn test_strengths_stable_for_equal_length() {
        let words = vec![AlignedWord::correct("planet"), AlignedWord::correct("rocket")];
        assert_eq!(strengths(&words), vec!["planet", "rocket"]);
    }

    #[test]
    fn test_struggles_keep_input_order_and_cap() {
        let words = vec![
            AlignedWord::read_as("went", "want", WordStatus::Misread),
            AlignedWord::skipped("the"),
            AlignedWord::read_as("house", "horse", WordStatus::Substituted),
            AlignedWord::read_as("big", "bag", WordStatus::Misread),
            AlignedWord::read_as("red", "rod", WordStatus::Misread),
        ];
        let found = struggles(&words);

        assert_eq!(found.len(), 3);
        assert_eq!(found[0].expected, "went");
        assert_eq!(found[1].spoken, "horse");
        assert_eq!(found[2].expected, "big");
    }
}
