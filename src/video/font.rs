//! TrueType/OpenType font used for both measuring and drawing text

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use tracing::debug;

use super::layout::{FontSpec, TextMeasurer};
use crate::error::{FluencyError, Result};

/// Fonts tried when no font path is configured
pub const DEFAULT_FONT_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A loaded font; cheap to clone
#[derive(Clone)]
pub struct GlyphFont {
    font: FontArc,
    source: PathBuf,
}

impl std::fmt::Debug for GlyphFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphFont").field("source", &self.source).finish()
    }
}

impl GlyphFont {
    /// Parse font data
    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<PathBuf>) -> Result<Self> {
        let source = source.into();
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            FluencyError::MeasurementFailure(format!("{}: {e}", source.display()))
        })?;
        Ok(Self { font, source })
    }

    /// Load a font file
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            FluencyError::MeasurementFailure(format!("cannot read font {}: {e}", path.display()))
        })?;
        Self::from_bytes(bytes, path)
    }

    /// Load `configured` if given, otherwise the first usable system font
    pub fn discover(configured: Option<&Path>) -> Result<Self> {
        if let Some(path) = configured {
            return Self::load(path);
        }

        for candidate in DEFAULT_FONT_PATHS {
            let path = Path::new(candidate);
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(font) => {
                    debug!("Using font {}", path.display());
                    return Ok(font);
                }
                Err(e) => debug!("Skipping font {}: {}", path.display(), e),
            }
        }

        Err(FluencyError::MeasurementFailure(
            "no usable font found; set canvas.font_path".to_string(),
        ))
    }

    /// Where the font was loaded from
    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Advance width of `text` including kerning
    #[must_use]
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut previous = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }

        width
    }

    /// Rasterize `text` with its top-left at (`x`, `y`)
    ///
    /// `plot` receives absolute pixel coordinates and a 0.0-1.0 coverage.
    pub fn draw_text(&self, text: &str, x: f32, y: f32, size: f32, mut plot: impl FnMut(i32, i32, f32)) {
        let scale = PxScale::from(size);
        let scaled = self.font.as_scaled(scale);
        let baseline = y + scaled.ascent();
        let mut caret = x;
        let mut previous = None;

        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }

            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            if let Some(outlined) = self.font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();
                outlined.draw(|gx, gy, coverage| {
                    plot(
                        bounds.min.x as i32 + gx as i32,
                        bounds.min.y as i32 + gy as i32,
                        coverage,
                    );
                });
            }

            caret += scaled.h_advance(id);
            previous = Some(id);
        }
    }
}

impl TextMeasurer for GlyphFont {
    fn measure(&self, text: &str, font: &FontSpec) -> Result<f32> {
        Ok(self.text_width(text, font.size))
    }
}
