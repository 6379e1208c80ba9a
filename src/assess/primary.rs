//! Primary pattern selection for narration

use serde::{Deserialize, Serialize};

use super::patterns::{ErrorPattern, PatternType};

/// Examples carried into the narration payload
const PRIMARY_EXAMPLE_LIMIT: usize = 2;

/// The one pattern handed to the summary writer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryPattern {
    #[serde(rename = "type")]
    pub pattern_type: PatternType,
    pub description: String,
    /// Formatted `expected→spoken`
    pub examples: Vec<String>,
}

impl From<&ErrorPattern> for PrimaryPattern {
    fn from(pattern: &ErrorPattern) -> Self {
        Self {
            pattern_type: pattern.pattern_type,
            description: pattern.description.clone(),
            examples: pattern
                .examples
                .iter()
                .take(PRIMARY_EXAMPLE_LIMIT)
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Pick the most useful pattern from a count-sorted list
///
/// The top entry wins unless it is a low-information behaviour (hesitation,
/// repetition, ...) and a later entry is not.
#[must_use]
pub fn select_primary(patterns: &[ErrorPattern]) -> Option<&ErrorPattern> {
    let top = patterns.first()?;
    if !top.pattern_type.is_low_information() {
        return Some(top);
    }

    patterns[1..]
        .iter()
        .find(|p| !p.pattern_type.is_low_information())
        .or(Some(top))
}

/// [`select_primary`] converted to the narration payload
#[must_use]
pub fn primary_pattern(patterns: &[ErrorPattern]) -> Option<PrimaryPattern> {
    select_primary(patterns).map(PrimaryPattern::from)
}
