//! Accuracy, pace and prosody scoring
//!
//! The prosody score blends three step functions:
//! - accuracy points (share of words read correctly)
//! - rate points (words per minute against a 100-180 wpm core band)
//! - fluency points (error density)
//!
//! The bands are hard cutoffs, so a one-word change near a boundary can move
//! the score by a full half point.

use serde::{Deserialize, Serialize};

use crate::alignment::{check_duration, MatchingResult};
use crate::error::Result;

const ACCURACY_WEIGHT: f64 = 0.4;
const RATE_WEIGHT: f64 = 0.3;
const FLUENCY_WEIGHT: f64 = 0.3;

/// Lowest and highest values a prosody score can take
pub const PROSODY_MIN: f64 = 1.5;
pub const PROSODY_MAX: f64 = 4.0;

/// Overall fluency grade, ordered from weakest to strongest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ProsodyGrade {
    NeedsSupport,
    Developing,
    Proficient,
    Excellent,
}

impl ProsodyGrade {
    /// Grade for a prosody score (thresholds 3.8 / 3.0 / 2.0, inclusive)
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score >= 3.8 {
            Self::Excellent
        } else if score >= 3.0 {
            Self::Proficient
        } else if score >= 2.0 {
            Self::Developing
        } else {
            Self::NeedsSupport
        }
    }

    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Proficient => "Proficient",
            Self::Developing => "Developing",
            Self::NeedsSupport => "Needs Support",
        }
    }
}

/// Fluency metrics for one reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Percent of words read correctly (0-100)
    pub accuracy: u8,
    pub words_per_minute: u32,
    /// One-decimal score in `[1.5, 4.0]`
    pub prosody_score: f64,
    pub prosody_grade: ProsodyGrade,
    pub total_words: usize,
    pub correct_count: usize,
    pub error_count: usize,
    pub skip_count: usize,
}

/// Points awarded for accuracy (percent)
#[must_use]
pub fn accuracy_points(accuracy: u8) -> f64 {
    match accuracy {
        98.. => 4.0,
        95..=97 => 3.5,
        90..=94 => 3.0,
        85..=89 => 2.5,
        75..=84 => 2.0,
        _ => 1.5,
    }
}

/// Points awarded for reading rate (words per minute)
#[must_use]
pub fn rate_points(words_per_minute: u32) -> f64 {
    match words_per_minute {
        100..=180 => 4.0,
        80..=200 => 3.5,
        60..=220 => 3.0,
        _ => 2.0,
    }
}

/// Points awarded for error density (`errors / total words`)
#[must_use]
pub fn fluency_points(error_rate: f64) -> f64 {
    if error_rate <= 0.02 {
        4.0
    } else if error_rate <= 0.05 {
        3.5
    } else if error_rate <= 0.10 {
        3.0
    } else if error_rate <= 0.20 {
        2.5
    } else {
        2.0
    }
}

/// Weighted blend of the three point scores, rounded to one decimal
#[must_use]
pub fn prosody_score(accuracy_points: f64, rate_points: f64, fluency_points: f64) -> f64 {
    let blended = accuracy_points * ACCURACY_WEIGHT
        + rate_points * RATE_WEIGHT
        + fluency_points * FLUENCY_WEIGHT;
    ((blended * 10.0).round() / 10.0).clamp(PROSODY_MIN, PROSODY_MAX)
}

/// Compute metrics for `result` read over `audio_duration` seconds
///
/// Empty word lists and zero durations degrade to zero accuracy / pace.
/// Only a non-finite or negative duration is rejected.
pub fn compute_metrics(result: &MatchingResult, audio_duration: f64) -> Result<Metrics> {
    let audio_duration = check_duration(audio_duration)?;
    let total_words = result.total_words();

    let accuracy = if total_words == 0 {
        0
    } else {
        (result.correct_count as f64 / total_words as f64 * 100.0)
            .round()
            .clamp(0.0, 100.0) as u8
    };

    let words_read = result.correct_count + result.misread_count + result.substitution_count;
    let words_per_minute = if audio_duration <= 0.0 {
        0
    } else {
        (words_read as f64 / (audio_duration / 60.0)).round() as u32
    };

    let error_rate = if total_words == 0 {
        0.0
    } else {
        result.error_count as f64 / total_words as f64
    };

    let score = prosody_score(
        accuracy_points(accuracy),
        rate_points(words_per_minute),
        fluency_points(error_rate),
    );

    Ok(Metrics {
        accuracy,
        words_per_minute,
        prosody_score: score,
        prosody_grade: ProsodyGrade::from_score(score),
        total_words,
        correct_count: result.correct_count,
        error_count: result.error_count,
        skip_count: result.skip_count,
    })
}
