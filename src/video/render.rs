//! Frame composition as draw commands
//!
//! The renderer never touches pixels: for a timestamp it returns a [`Frame`]
//! (an ordered list of rectangles, text runs and markers) that a
//! [`FrameRasterizer`](super::raster::FrameRasterizer) turns into an image.
//! Identical inputs always produce an identical frame.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::layout::{FontSpec, LayoutParams, WordLayout};
use crate::alignment::WordStatus;

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Colors used by the renderer
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub background: Color,
    pub header: Color,
    pub pending: Color,
    pub correct: Color,
    pub hesitation: Color,
    pub misread: Color,
    pub substituted: Color,
    pub skipped: Color,
    pub speaking_highlight: Color,
    pub repeat_marker: Color,
    pub progress_track: Color,
    pub progress_fill: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Color::rgb(0xFF, 0xFF, 0xFF),
            header: Color::rgb(0x1F, 0x29, 0x37),
            pending: Color::rgb(0x9C, 0xA3, 0xAF),
            correct: Color::rgb(0x16, 0xA3, 0x4A),
            hesitation: Color::rgb(0xD9, 0x77, 0x06),
            misread: Color::rgb(0xDC, 0x26, 0x26),
            substituted: Color::rgb(0x93, 0x33, 0xEA),
            skipped: Color::rgb(0x64, 0x74, 0x8B),
            speaking_highlight: Color::rgba(0xFD, 0xE0, 0x47, 0xC0),
            repeat_marker: Color::rgb(0x25, 0x63, 0xEB),
            progress_track: Color::rgb(0xE5, 0xE7, 0xEB),
            progress_fill: Color::rgb(0x3B, 0x82, 0xF6),
        }
    }
}

/// Canvas geometry and typography
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub padding: f32,
    pub line_height: f32,
    pub font_size: f32,
    /// Font file; system fonts are searched when unset
    pub font_path: Option<PathBuf>,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            padding: 48.0,
            line_height: 56.0,
            font_size: 36.0,
            font_path: None,
        }
    }
}

const PROGRESS_BAR_HEIGHT: f32 = 8.0;
const LEGEND_SWATCH: f32 = 16.0;
const LEGEND_SPACING: f32 = 190.0;
const REPEAT_MARKER_RADIUS: f32 = 5.0;

impl CanvasConfig {
    fn header_size(&self) -> f32 {
        self.font_size * 0.75
    }

    fn legend_size(&self) -> f32 {
        self.font_size * 0.5
    }

    fn progress_top(&self) -> f32 {
        self.padding + self.header_size() * 1.4
    }

    /// Top of the first line of passage text
    #[must_use]
    pub fn text_top(&self) -> f32 {
        self.progress_top() + PROGRESS_BAR_HEIGHT + self.font_size
    }

    /// Layout geometry for this canvas
    #[must_use]
    pub fn layout_params(&self) -> LayoutParams {
        LayoutParams {
            width: self.width as f32,
            padding: self.padding,
            line_height: self.line_height,
            top: self.text_top(),
            font: FontSpec::new(self.font_size),
        }
    }
}

/// Header information shown on every frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub name: String,
    pub words_per_minute: u32,
}

/// Highlight phase of a word at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordState {
    NotYetSpoken,
    Speaking,
    Spoken,
}

/// Resolved appearance of one word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordStyle {
    pub text: Color,
    pub highlight: Option<Color>,
    pub strike: bool,
}

/// Color for a word's reading outcome
///
/// Error statuses win over hesitation; hesitation only tints correct words.
#[must_use]
pub fn status_color(status: WordStatus, hesitation: bool, palette: &Palette) -> Color {
    match status {
        WordStatus::Misread => palette.misread,
        WordStatus::Substituted => palette.substituted,
        WordStatus::Skipped => palette.skipped,
        WordStatus::Correct if hesitation => palette.hesitation,
        WordStatus::Correct => palette.correct,
    }
}

/// Appearance for a word in `state`
#[must_use]
pub fn resolve_word_style(
    state: WordState,
    status: WordStatus,
    hesitation: bool,
    palette: &Palette,
) -> WordStyle {
    match state {
        WordState::NotYetSpoken => WordStyle {
            text: palette.pending,
            highlight: None,
            strike: false,
        },
        WordState::Speaking => WordStyle {
            text: status_color(status, hesitation, palette),
            highlight: Some(palette.speaking_highlight),
            strike: false,
        },
        WordState::Spoken => WordStyle {
            text: status_color(status, hesitation, palette),
            highlight: None,
            strike: status == WordStatus::Skipped,
        },
    }
}

/// State of a timed word at `time`
///
/// A word with only one edge is treated as instantaneous. Untimed words
/// (usually skips) follow `anchor`, the end of the closest earlier timed word.
#[must_use]
pub fn word_state(word: &WordLayout, time: f64, anchor: f64) -> WordState {
    let start = word.start_time.or(word.end_time);
    let end = word.end_time.or(word.start_time);

    match (start, end) {
        (Some(start), Some(end)) => {
            if time < start {
                WordState::NotYetSpoken
            } else if time <= end {
                WordState::Speaking
            } else {
                WordState::Spoken
            }
        }
        _ if time > anchor => WordState::Spoken,
        _ => WordState::NotYetSpoken,
    }
}

/// One drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// Text with its top-left corner at (x, y)
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
        color: Color,
    },
    Circle {
        cx: f32,
        cy: f32,
        radius: f32,
        color: Color,
    },
}

/// A composed frame
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<DrawCommand>,
}

/// Pure frame composer
#[derive(Debug, Clone, Default)]
pub struct FrameRenderer {
    canvas: CanvasConfig,
    palette: Palette,
}

impl FrameRenderer {
    #[must_use]
    pub fn new(canvas: CanvasConfig, palette: Palette) -> Self {
        Self { canvas, palette }
    }

    #[must_use]
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Compose the frame shown at `time` seconds
    #[must_use]
    pub fn render(&self, time: f64, words: &[WordLayout], session: &SessionInfo) -> Frame {
        let mut commands = Vec::with_capacity(words.len() * 2 + 24);

        commands.push(DrawCommand::Rect {
            x: 0.0,
            y: 0.0,
            width: self.canvas.width as f32,
            height: self.canvas.height as f32,
            color: self.palette.background,
        });

        self.draw_header(&mut commands, session);
        self.draw_progress(&mut commands, time, words);
        self.draw_words(&mut commands, time, words);
        self.draw_legend(&mut commands);

        Frame {
            width: self.canvas.width,
            height: self.canvas.height,
            commands,
        }
    }

    fn draw_header(&self, commands: &mut Vec<DrawCommand>, session: &SessionInfo) {
        commands.push(DrawCommand::Text {
            x: self.canvas.padding,
            y: self.canvas.padding,
            size: self.canvas.header_size(),
            text: format!("{} | {} WPM", session.name, session.words_per_minute),
            color: self.palette.header,
        });
    }

    fn draw_progress(&self, commands: &mut Vec<DrawCommand>, time: f64, words: &[WordLayout]) {
        let track_width = self.canvas.width as f32 - 2.0 * self.canvas.padding;
        let top = self.canvas.progress_top();

        let max_end = words
            .iter()
            .filter_map(|w| w.end_time)
            .fold(0.0_f64, f64::max);
        let progress = if max_end > 0.0 {
            (time / max_end).clamp(0.0, 1.0)
        } else {
            0.0
        };

        commands.push(DrawCommand::Rect {
            x: self.canvas.padding,
            y: top,
            width: track_width,
            height: PROGRESS_BAR_HEIGHT,
            color: self.palette.progress_track,
        });
        if progress > 0.0 {
            commands.push(DrawCommand::Rect {
                x: self.canvas.padding,
                y: top,
                width: track_width * progress as f32,
                height: PROGRESS_BAR_HEIGHT,
                color: self.palette.progress_fill,
            });
        }
    }

    fn draw_words(&self, commands: &mut Vec<DrawCommand>, time: f64, words: &[WordLayout]) {
        let size = self.canvas.font_size;
        let mut anchor = 0.0;

        for word in words {
            let state = word_state(word, time, anchor);
            if let Some(end) = word.end_time.or(word.start_time) {
                anchor = end;
            }
            let style = resolve_word_style(state, word.status, word.hesitation, &self.palette);

            if let Some(highlight) = style.highlight {
                commands.push(DrawCommand::Rect {
                    x: word.x - 4.0,
                    y: word.y - 4.0,
                    width: word.width + 8.0,
                    height: size * 1.25 + 8.0,
                    color: highlight,
                });
            }

            commands.push(DrawCommand::Text {
                x: word.x,
                y: word.y,
                size,
                text: word.text.clone(),
                color: style.text,
            });

            if style.strike {
                commands.push(DrawCommand::Rect {
                    x: word.x,
                    y: word.y + size * 0.6,
                    width: word.width,
                    height: 2.0,
                    color: style.text,
                });
            }

            if word.is_repeat {
                commands.push(DrawCommand::Circle {
                    cx: word.x + word.width + REPEAT_MARKER_RADIUS,
                    cy: word.y,
                    radius: REPEAT_MARKER_RADIUS,
                    color: self.palette.repeat_marker,
                });
            }
        }
    }

    fn draw_legend(&self, commands: &mut Vec<DrawCommand>) {
        let size = self.canvas.legend_size();
        let top = self.canvas.height as f32 - self.canvas.padding - LEGEND_SWATCH;
        let entries = [
            ("Correct", self.palette.correct),
            ("Hesitation", self.palette.hesitation),
            ("Misread", self.palette.misread),
            ("Substituted", self.palette.substituted),
            ("Skipped", self.palette.skipped),
        ];

        let mut x = self.canvas.padding;
        for (label, color) in entries {
            commands.push(DrawCommand::Rect {
                x,
                y: top,
                width: LEGEND_SWATCH,
                height: LEGEND_SWATCH,
                color,
            });
            commands.push(DrawCommand::Text {
                x: x + LEGEND_SWATCH + 6.0,
                y: top,
                size,
                text: label.to_string(),
                color: self.palette.header,
            });
            x += LEGEND_SPACING;
        }

        commands.push(DrawCommand::Circle {
            cx: x + LEGEND_SWATCH / 2.0,
            cy: top + LEGEND_SWATCH / 2.0,
            radius: REPEAT_MARKER_RADIUS,
            color: self.palette.repeat_marker,
        });
        commands.push(DrawCommand::Text {
            x: x + LEGEND_SWATCH + 6.0,
            y: top,
            size,
            text: "Repeated".to_string(),
            color: self.palette.header,
        });
    }
}
