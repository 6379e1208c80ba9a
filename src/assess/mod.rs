//! Reading fluency assessment
//!
//! Turns a [`MatchingResult`] into:
//! - fluency metrics (accuracy, pace, prosody grade)
//! - classified error patterns
//! - the primary pattern plus strengths/struggles for narration
//!
//! Everything here is synchronous and side-effect free.

pub mod metrics;
pub mod patterns;
pub mod primary;
pub mod report;
pub mod summary;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alignment::MatchingResult;
use crate::error::Result;

pub use metrics::{compute_metrics, Metrics, ProsodyGrade};
pub use patterns::{
    classify_errors, ErrorClassifier, ErrorPattern, PatternExample, PatternKey, PatternType,
};
pub use primary::{primary_pattern, select_primary, PrimaryPattern};
pub use report::{AssessmentReport, ReportFormat};
pub use summary::{strengths, struggles, AssessmentSummary, Struggle};

/// Full assessment of one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    pub summary: AssessmentSummary,
    /// All patterns, most frequent first, with every example
    pub patterns: Vec<ErrorPattern>,
}

/// Assess `result` with the default classifier
pub fn assess(result: &MatchingResult, audio_duration: f64) -> Result<Assessment> {
    assess_with(&ErrorClassifier::new(), result, audio_duration)
}

/// Assess `result` with a configured classifier
pub fn assess_with(
    classifier: &ErrorClassifier,
    result: &MatchingResult,
    audio_duration: f64,
) -> Result<Assessment> {
    let metrics = compute_metrics(result, audio_duration)?;
    let patterns = classifier.classify(&result.words);

    debug!(
        "Assessed {} words: accuracy {}%, {} wpm, {} patterns",
        metrics.total_words,
        metrics.accuracy,
        metrics.words_per_minute,
        patterns.len()
    );

    Ok(Assessment {
        summary: AssessmentSummary {
            metrics,
            strengths: strengths(&result.words),
            struggles: struggles(&result.words),
            primary_pattern: primary_pattern(&patterns),
        },
        patterns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::{AlignedWord, WordStatus};

    #[test]
    fn test_assess_combines_outputs() {
        let result = MatchingResult::from_words(vec![
            AlignedWord::correct("wonderful"),
            AlignedWord::read_as("bat", "pat", WordStatus::Substituted),
        ]);
        let assessment = assess(&result, 2.0).unwrap();

        assert_eq!(assessment.summary.metrics.accuracy, 50);
        assert_eq!(assessment.summary.strengths, vec!["wonderful"]);
        assert_eq!(assessment.summary.struggles.len(), 1);
        let primary = assessment.summary.primary_pattern.unwrap();
        assert_eq!(primary.pattern_type, PatternType::InitialSound);
        assert_eq!(primary.examples, vec!["bat→pat"]);
    }
}
