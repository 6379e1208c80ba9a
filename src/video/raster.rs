//! Turn draw commands into pixels

use image::{Rgba, RgbaImage};

use super::font::GlyphFont;
use super::render::{Color, DrawCommand, Frame};
use crate::error::Result;

/// Rasterization backend for composed frames
pub trait FrameRasterizer: Send + Sync {
    fn rasterize(&self, frame: &Frame) -> Result<RgbaImage>;
}

/// Blend `color` over the pixel at (x, y) with extra `coverage` (0.0-1.0)
fn blend(image: &mut RgbaImage, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= image.width() || y >= image.height() {
        return;
    }

    let alpha = (f32::from(color.a) / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }

    let pixel = image.get_pixel_mut(x, y);
    let mix = |dst: u8, src: u8| -> u8 {
        (f32::from(src) * alpha + f32::from(dst) * (1.0 - alpha)).round() as u8
    };
    *pixel = Rgba([
        mix(pixel[0], color.r),
        mix(pixel[1], color.g),
        mix(pixel[2], color.b),
        255,
    ]);
}

fn fill_rect(image: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, color: Color) {
    let x0 = x.round().max(0.0) as i32;
    let y0 = y.round().max(0.0) as i32;
    let x1 = (x + width).round().min(image.width() as f32) as i32;
    let y1 = (y + height).round().min(image.height() as f32) as i32;

    for py in y0..y1 {
        for px in x0..x1 {
            blend(image, px, py, color, 1.0);
        }
    }
}

fn fill_circle(image: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Color) {
    let r2 = radius * radius;
    let x0 = (cx - radius).floor() as i32;
    let x1 = (cx + radius).ceil() as i32;
    let y0 = (cy - radius).floor() as i32;
    let y1 = (cy + radius).ceil() as i32;

    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                blend(image, px, py, color, 1.0);
            }
        }
    }
}

/// Software rasterizer drawing text with a [`GlyphFont`]
#[derive(Debug, Clone)]
pub struct GlyphRasterizer {
    font: GlyphFont,
}

impl GlyphRasterizer {
    #[must_use]
    pub fn new(font: GlyphFont) -> Self {
        Self { font }
    }

    /// Paint every non-text command; text goes through `draw_text`
    fn paint(
        frame: &Frame,
        mut draw_text: impl FnMut(&mut RgbaImage, f32, f32, f32, &str, Color),
    ) -> RgbaImage {
        let mut image = RgbaImage::from_pixel(frame.width, frame.height, Rgba([0, 0, 0, 255]));

        for command in &frame.commands {
            match command {
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => fill_rect(&mut image, *x, *y, *width, *height, *color),
                DrawCommand::Circle {
                    cx,
                    cy,
                    radius,
                    color,
                } => fill_circle(&mut image, *cx, *cy, *radius, *color),
                DrawCommand::Text {
                    x,
                    y,
                    size,
                    text,
                    color,
                } => draw_text(&mut image, *x, *y, *size, text, *color),
            }
        }

        image
    }
}

impl FrameRasterizer for GlyphRasterizer {
    fn rasterize(&self, frame: &Frame) -> Result<RgbaImage> {
        Ok(Self::paint(frame, |image, x, y, size, text, color| {
            self.font.draw_text(text, x, y, size, |px, py, coverage| {
                blend(image, px, py, color, coverage);
            });
        }))
    }
}

/// Rasterizer that draws text as solid blocks, needing no font
///
/// Useful for previews and tests on machines without fonts installed.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRasterizer;

impl FrameRasterizer for BlockRasterizer {
    fn rasterize(&self, frame: &Frame) -> Result<RgbaImage> {
        Ok(GlyphRasterizer::paint(frame, |image, x, y, size, text, color| {
            let width = text.chars().count() as f32 * size * 0.6;
            fill_rect(image, x, y + size * 0.2, width, size * 0.8, color);
        }))
    }
}
