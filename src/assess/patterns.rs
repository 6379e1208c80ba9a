//! Error pattern classification
//!
//! Every non-correct word with spoken text is checked for:
//! - initial sound changes ("cat" -> "hat")
//! - final sound changes ("cat" -> "cap")
//! - confusable letter pairs (b/d, p/q, m/n, u/n)
//! - exact substitutions, one bucket per (expected, spoken) pair
//!
//! Buckets live in an insertion-ordered registry so equal counts keep
//! first-occurrence order after the stable sort.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignedWord, WordStatus};

/// Letter pairs readers commonly confuse
pub const CONFUSABLE_PAIRS: [(char, char); 4] = [('b', 'd'), ('p', 'q'), ('m', 'n'), ('u', 'n')];

/// Kind of error pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Substitution,
    InitialSound,
    FinalSound,
    VisualSimilarity,
    Hesitation,
    Repetition,
    SelfCorrection,
    FillerWord,
}

impl PatternType {
    /// Wire name (`initial_sound`, `visual_similarity`, ...)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Substitution => "substitution",
            Self::InitialSound => "initial_sound",
            Self::FinalSound => "final_sound",
            Self::VisualSimilarity => "visual_similarity",
            Self::Hesitation => "hesitation",
            Self::Repetition => "repetition",
            Self::SelfCorrection => "self_correction",
            Self::FillerWord => "filler_word",
        }
    }

    /// Behaviours that say little about decoding skill on their own
    #[must_use]
    pub fn is_low_information(&self) -> bool {
        matches!(
            self,
            Self::Hesitation | Self::Repetition | Self::SelfCorrection | Self::FillerWord
        )
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One expected/spoken example of a pattern
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternExample {
    pub expected: String,
    pub spoken: String,
}

impl fmt::Display for PatternExample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→{}", self.expected, self.spoken)
    }
}

/// A classified error pattern with its examples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub description: String,
    pub examples: Vec<PatternExample>,
    pub count: usize,
}

impl ErrorPattern {
    /// Copy with at most `max_examples` examples, for display
    #[must_use]
    pub fn truncated(&self, max_examples: usize) -> Self {
        Self {
            examples: self.examples.iter().take(max_examples).cloned().collect(),
            ..self.clone()
        }
    }
}

/// Identity of a pattern bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PatternKey {
    /// One global bucket per kind
    Singleton(PatternType),
    /// One bucket per confusable pair
    VisualPair(char, char),
    /// One bucket per exact (expected, spoken) pair
    ExactSubstitution(String, String),
}

impl PatternKey {
    fn pattern_type(&self) -> PatternType {
        match self {
            Self::Singleton(kind) => *kind,
            Self::VisualPair(..) => PatternType::VisualSimilarity,
            Self::ExactSubstitution(..) => PatternType::Substitution,
        }
    }

    fn description(&self) -> String {
        match self {
            Self::Singleton(PatternType::InitialSound) => {
                "Changes the beginning sound of words".to_string()
            }
            Self::Singleton(PatternType::FinalSound) => {
                "Changes the ending sound of words".to_string()
            }
            Self::Singleton(PatternType::Hesitation) => "Pauses before words".to_string(),
            Self::Singleton(PatternType::Repetition) => "Repeats words".to_string(),
            Self::Singleton(kind) => format!("Shows {} errors", kind.as_str().replace('_', " ")),
            Self::VisualPair(a, b) => format!("Confuses the letters '{a}' and '{b}'"),
            Self::ExactSubstitution(expected, spoken) => {
                format!("Reads \"{expected}\" as \"{spoken}\"")
            }
        }
    }

    /// Exact substitutions keep only their first example
    fn keeps_repeat_examples(&self) -> bool {
        !matches!(self, Self::ExactSubstitution(..))
    }
}

#[derive(Debug)]
struct Bucket {
    key: PatternKey,
    examples: Vec<PatternExample>,
    count: usize,
}

/// Insertion-ordered map from bucket key to accumulated state
#[derive(Debug, Default)]
struct PatternRegistry {
    index: HashMap<PatternKey, usize>,
    buckets: Vec<Bucket>,
}

impl PatternRegistry {
    fn record(&mut self, key: PatternKey, example: PatternExample) {
        if let Some(&slot) = self.index.get(&key) {
            let bucket = &mut self.buckets[slot];
            bucket.count += 1;
            if bucket.key.keeps_repeat_examples() {
                bucket.examples.push(example);
            }
            return;
        }

        self.index.insert(key.clone(), self.buckets.len());
        self.buckets.push(Bucket {
            key,
            examples: vec![example],
            count: 1,
        });
    }

    fn into_patterns(self) -> Vec<ErrorPattern> {
        let mut patterns: Vec<ErrorPattern> = self
            .buckets
            .into_iter()
            .map(|bucket| ErrorPattern {
                pattern_type: bucket.key.pattern_type(),
                description: bucket.key.description(),
                examples: bucket.examples,
                count: bucket.count,
            })
            .collect();

        // Stable: equal counts keep registry (first-occurrence) order
        patterns.sort_by(|a, b| b.count.cmp(&a.count));
        patterns
    }
}

/// Error pattern classifier
#[derive(Debug, Clone, Default)]
pub struct ErrorClassifier {
    fluency_behaviors: bool,
}

impl ErrorClassifier {
    /// Classifier for decoding errors only
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Also bucket hesitation- and repeat-flagged words
    #[must_use]
    pub fn with_fluency_behaviors(mut self, enabled: bool) -> Self {
        self.fluency_behaviors = enabled;
        self
    }

    /// Classify `words` into patterns sorted by count, most frequent first
    #[must_use]
    pub fn classify(&self, words: &[AlignedWord]) -> Vec<ErrorPattern> {
        let mut registry = PatternRegistry::default();

        for word in words {
            if self.fluency_behaviors {
                record_behaviors(&mut registry, word);
            }

            if !word.status.is_error() {
                continue;
            }
            let Some(spoken) = word.spoken.as_deref() else {
                continue;
            };
            record_decoding_errors(&mut registry, word, spoken);
        }

        registry.into_patterns()
    }
}

/// Classify decoding errors in `words` with the default classifier
#[must_use]
pub fn classify_errors(words: &[AlignedWord]) -> Vec<ErrorPattern> {
    ErrorClassifier::new().classify(words)
}

fn record_decoding_errors(registry: &mut PatternRegistry, word: &AlignedWord, spoken: &str) {
    let expected = word.expected.to_lowercase();
    let heard = spoken.to_lowercase();
    let example = || PatternExample {
        expected: word.expected.clone(),
        spoken: spoken.to_string(),
    };

    if let (Some(e), Some(s)) = (expected.chars().next(), heard.chars().next()) {
        if e != s {
            registry.record(PatternKey::Singleton(PatternType::InitialSound), example());
        }
    }

    if let (Some(e), Some(s)) = (expected.chars().last(), heard.chars().last()) {
        if e != s {
            registry.record(PatternKey::Singleton(PatternType::FinalSound), example());
        }
    }

    for (a, b) in CONFUSABLE_PAIRS {
        let swapped = (expected.contains(a) && heard.contains(b))
            || (expected.contains(b) && heard.contains(a));
        if swapped {
            registry.record(PatternKey::VisualPair(a, b), example());
        }
    }

    if word.status == WordStatus::Substituted {
        registry.record(
            PatternKey::ExactSubstitution(word.expected.clone(), spoken.to_string()),
            example(),
        );
    }
}

fn record_behaviors(registry: &mut PatternRegistry, word: &AlignedWord) {
    let example = || PatternExample {
        expected: word.expected.clone(),
        spoken: word.spoken.clone().unwrap_or_default(),
    };

    if word.hesitation {
        registry.record(PatternKey::Singleton(PatternType::Hesitation), example());
    }
    if word.is_repeat {
        registry.record(PatternKey::Singleton(PatternType::Repetition), example());
    }
}
