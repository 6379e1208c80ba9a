//! Word-level alignment records consumed by scoring and rendering.
//!
//! A [`MatchingResult`] is produced once by the transcript aligner and is
//! read-only from here on. Field names follow the aligner's camelCase JSON.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FluencyError, Result};

/// Classification of one passage word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Correct,
    Misread,
    Substituted,
    Skipped,
}

impl WordStatus {
    /// Any status other than `Correct`
    #[must_use]
    pub fn is_error(self) -> bool {
        !matches!(self, Self::Correct)
    }
}

/// One passage word annotated with what the reader actually said
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedWord {
    pub expected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spoken: Option<String>,
    pub status: WordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<f64>,
    #[serde(default)]
    pub hesitation: bool,
    #[serde(default)]
    pub pause_duration: f64,
    #[serde(default)]
    pub is_repeat: bool,
}

impl AlignedWord {
    /// A correctly read word
    #[must_use]
    pub fn correct(expected: impl Into<String>) -> Self {
        let expected = expected.into();
        Self {
            spoken: Some(expected.clone()),
            expected,
            status: WordStatus::Correct,
            start_time: None,
            end_time: None,
            hesitation: false,
            pause_duration: 0.0,
            is_repeat: false,
        }
    }

    /// A word read as something else (`Misread` or `Substituted`)
    #[must_use]
    pub fn read_as(expected: impl Into<String>, spoken: impl Into<String>, status: WordStatus) -> Self {
        Self {
            expected: expected.into(),
            spoken: Some(spoken.into()),
            status,
            start_time: None,
            end_time: None,
            hesitation: false,
            pause_duration: 0.0,
            is_repeat: false,
        }
    }

    /// A word the reader left out
    #[must_use]
    pub fn skipped(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            spoken: None,
            status: WordStatus::Skipped,
            start_time: None,
            end_time: None,
            hesitation: false,
            pause_duration: 0.0,
            is_repeat: false,
        }
    }

    /// Set start/end times in seconds
    #[must_use]
    pub fn with_timing(mut self, start: f64, end: f64) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Mark a hesitation before the word
    #[must_use]
    pub fn with_hesitation(mut self, pause_duration: f64) -> Self {
        self.hesitation = true;
        self.pause_duration = pause_duration;
        self
    }

    /// Mark the word as repeated by the reader
    #[must_use]
    pub fn with_repeat(mut self) -> Self {
        self.is_repeat = true;
        self
    }

    fn validate(&self, index: usize) -> Result<()> {
        if self.spoken.is_none() && self.status != WordStatus::Skipped {
            return Err(FluencyError::InvalidInput(format!(
                "word {index} ({:?}) has no spoken text but status {:?}",
                self.expected, self.status
            )));
        }

        for time in [self.start_time, self.end_time].into_iter().flatten() {
            if !time.is_finite() || time < 0.0 {
                return Err(FluencyError::InvalidInput(format!(
                    "word {index} has invalid timestamp {time}"
                )));
            }
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(FluencyError::InvalidInput(format!(
                    "word {index} starts at {start}s after it ends at {end}s"
                )));
            }
        }

        Ok(())
    }
}

/// Per-status counts over a word sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WordTally {
    pub correct: usize,
    pub misread: usize,
    pub substituted: usize,
    pub skipped: usize,
}

impl WordTally {
    /// Count statuses in `words`
    #[must_use]
    pub fn of(words: &[AlignedWord]) -> Self {
        words.iter().fold(Self::default(), |mut tally, word| {
            match word.status {
                WordStatus::Correct => tally.correct += 1,
                WordStatus::Misread => tally.misread += 1,
                WordStatus::Substituted => tally.substituted += 1,
                WordStatus::Skipped => tally.skipped += 1,
            }
            tally
        })
    }

    /// Every non-correct word
    #[must_use]
    pub fn errors(&self) -> usize {
        self.misread + self.substituted + self.skipped
    }
}

/// Aligned word sequence plus the aligner's aggregate counts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingResult {
    pub words: Vec<AlignedWord>,
    pub correct_count: usize,
    pub error_count: usize,
    pub skip_count: usize,
    pub misread_count: usize,
    pub substitution_count: usize,
}

impl MatchingResult {
    /// Build a result whose counts are tallied from `words`
    #[must_use]
    pub fn from_words(words: Vec<AlignedWord>) -> Self {
        let tally = WordTally::of(&words);
        Self {
            words,
            correct_count: tally.correct,
            error_count: tally.errors(),
            skip_count: tally.skipped,
            misread_count: tally.misread,
            substitution_count: tally.substituted,
        }
    }

    /// Number of passage words
    #[must_use]
    pub fn total_words(&self) -> usize {
        self.words.len()
    }

    /// Check the counts against the word sequence and every word's invariants
    pub fn validate(&self) -> Result<()> {
        for (index, word) in self.words.iter().enumerate() {
            word.validate(index)?;
        }

        let tally = WordTally::of(&self.words);
        let checks = [
            ("correctCount", self.correct_count, tally.correct),
            ("errorCount", self.error_count, tally.errors()),
            ("skipCount", self.skip_count, tally.skipped),
            ("misreadCount", self.misread_count, tally.misread),
            ("substitutionCount", self.substitution_count, tally.substituted),
        ];

        for (field, declared, counted) in checks {
            if declared != counted {
                return Err(FluencyError::InvalidInput(format!(
                    "{field} is {declared} but the word list tallies {counted}"
                )));
            }
        }

        Ok(())
    }

    /// Parse and validate a result from JSON text
    pub fn from_json(json: &str) -> Result<Self> {
        let result: Self = serde_json::from_str(json)?;
        result.validate()?;
        Ok(result)
    }

    /// Read, parse and validate a result from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}

/// Check that an audio duration is a usable, non-negative number of seconds
pub fn check_duration(seconds: f64) -> Result<f64> {
    if !seconds.is_finite() {
        return Err(FluencyError::InvalidInput(format!(
            "audio duration must be a finite number, got {seconds}"
        )));
    }
    if seconds < 0.0 {
        return Err(FluencyError::InvalidInput(format!(
            "audio duration must not be negative, got {seconds}"
        )));
    }
    Ok(seconds)
}

/// Parse an audio duration given as text (e.g. a CLI argument)
pub fn parse_duration(raw: &str) -> Result<f64> {
    let seconds: f64 = raw
        .trim()
        .parse()
        .map_err(|_| FluencyError::InvalidInput(format!("audio duration {raw:?} is not a number")))?;
    check_duration(seconds)
}
