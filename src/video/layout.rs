//! Greedy line-wrapped word layout
//!
//! Widths come from a [`TextMeasurer`] supplied by the rendering surface, so
//! the same words always land in the same place for a given font.

use serde::{Deserialize, Serialize};

use crate::alignment::{AlignedWord, WordStatus};
use crate::error::{FluencyError, Result};

/// Font selection passed to the measurer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Pixel size
    pub size: f32,
}

impl FontSpec {
    #[must_use]
    pub fn new(size: f32) -> Self {
        Self { size }
    }
}

/// Text measurement provided by the rendering surface
pub trait TextMeasurer: Send + Sync {
    /// Width in pixels of `text` set in `font`
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32>;
}

/// Measurer with a fixed advance per character (a fraction of the font size)
///
/// Deterministic on every platform; used for previews and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasurer {
    pub advance: f32,
}

impl Default for FixedAdvanceMeasurer {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasurer for FixedAdvanceMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32> {
        Ok(text.chars().count() as f32 * font.size * self.advance)
    }
}

/// Geometry for one layout pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Canvas width in pixels
    pub width: f32,
    /// Left/right margin
    pub padding: f32,
    /// Distance between line tops
    pub line_height: f32,
    /// Top of the first line
    pub top: f32,
    pub font: FontSpec,
}

/// A positioned word, carrying the fields the renderer needs
#[derive(Debug, Clone, PartialEq)]
pub struct WordLayout {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub status: WordStatus,
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub hesitation: bool,
    pub is_repeat: bool,
}

fn checked_width(measurer: &dyn TextMeasurer, text: &str, font: &FontSpec) -> Result<f32> {
    let width = measurer.measure(text, font)?;
    if !width.is_finite() || width < 0.0 {
        return Err(FluencyError::MeasurementFailure(format!(
            "measured width {width} for {text:?}"
        )));
    }
    Ok(width)
}

/// Lay out `words` left to right, wrapping when a word would cross the right margin
///
/// A word wider than the whole line still gets a line of its own rather than
/// wrapping forever.
pub fn layout_words(
    words: &[AlignedWord],
    params: &LayoutParams,
    measurer: &dyn TextMeasurer,
) -> Result<Vec<WordLayout>> {
    let space = checked_width(measurer, " ", &params.font)?;
    let right_edge = params.width - params.padding;

    let mut x = params.padding;
    let mut y = params.top;
    let mut layouts = Vec::with_capacity(words.len());

    for word in words {
        let width = checked_width(measurer, &word.expected, &params.font)?;

        if x > params.padding && x + width > right_edge {
            x = params.padding;
            y += params.line_height;
        }

        layouts.push(WordLayout {
            text: word.expected.clone(),
            x,
            y,
            width,
            status: word.status,
            start_time: word.start_time,
            end_time: word.end_time,
            hesitation: word.hesitation,
            is_repeat: word.is_repeat,
        });

        x += width + space;
    }

    Ok(layouts)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenMeasurer;

    impl TextMeasurer for BrokenMeasurer {
        fn measure(&self, _text: &str, _font: &FontSpec) -> Result<f32> {
            Err(FluencyError::MeasurementFailure("no font loaded".to_string()))
        }
    }

    fn params(width: f32) -> LayoutParams {
        LayoutParams {
            width,
            padding: 10.0,
            line_height: 30.0,
            top: 50.0,
            font: FontSpec::new(10.0),
        }
    }

    fn words(texts: &[&str]) -> Vec<AlignedWord> {
        texts.iter().map(|t| AlignedWord::correct(*t)).collect()
    }

    #[test]
    fn test_words_share_a_line_when_they_fit() {
        // 6px per char, 6px space
        let layouts = layout_words(
            &words(&["the", "cat"]),
            &params(200.0),
            &FixedAdvanceMeasurer::default(),
        )
        .unwrap();

        assert_eq!(layouts[0].x, 10.0);
        assert_eq!(layouts[0].width, 18.0);
        assert_eq!(layouts[1].x, 34.0);
        assert_eq!(layouts[1].y, 50.0);
    }

    #[test]
    fn test_wraps_before_crossing_right_margin() {
        // right edge at 60: "aaaa" ends at 34, "bbbb" would end at 64
        let layouts = layout_words(
            &words(&["aaaa", "bbbb", "cc"]),
            &params(70.0),
            &FixedAdvanceMeasurer::default(),
        )
        .unwrap();

        assert_eq!((layouts[0].x, layouts[0].y), (10.0, 50.0));
        assert_eq!((layouts[1].x, layouts[1].y), (10.0, 80.0));
        assert_eq!((layouts[2].x, layouts[2].y), (40.0, 80.0));
    }

    #[test]
    fn test_oversized_word_takes_its_own_line() {
        let layouts = layout_words(
            &words(&["extraordinarily", "big"]),
            &params(50.0),
            &FixedAdvanceMeasurer::default(),
        )
        .unwrap();

        assert_eq!((layouts[0].x, layouts[0].y), (10.0, 50.0));
        assert_eq!((layouts[1].x, layouts[1].y), (10.0, 80.0));
    }

    #[test]
    fn test_carries_word_fields() {
        let source = vec![AlignedWord::read_as("ship", "chip", WordStatus::Misread)
            .with_timing(1.0, 1.5)
            .with_hesitation(0.8)
            .with_repeat()];
        let layouts =
            layout_words(&source, &params(200.0), &FixedAdvanceMeasurer::default()).unwrap();

        assert_eq!(layouts[0].text, "ship");
        assert_eq!(layouts[0].status, WordStatus::Misread);
        assert_eq!(layouts[0].start_time, Some(1.0));
        assert_eq!(layouts[0].end_time, Some(1.5));
        assert!(layouts[0].hesitation);
        assert!(layouts[0].is_repeat);
    }

    #[test]
    fn test_deterministic() {
        let source = words(&["a", "quick", "brown", "fox", "jumps", "over", "the", "dog"]);
        let measurer = FixedAdvanceMeasurer::default();
        let first = layout_words(&source, &params(90.0), &measurer).unwrap();
        let second = layout_words(&source, &params(90.0), &measurer).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_measurement_failure_propagates() {
        let err = layout_words(&words(&["cat"]), &params(100.0), &BrokenMeasurer).unwrap_err();
        assert!(matches!(err, FluencyError::MeasurementFailure(_)));
    }
}
