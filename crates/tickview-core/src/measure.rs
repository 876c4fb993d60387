//! Measurement requests and text metrics.

use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Size request along one axis, as handed down by the parent layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MeasureSpec {
    /// The parent has fixed the size.
    Exactly(f32),
    /// The view may be as large as it wants up to this size.
    AtMost(f32),
    /// No constraint; use the content size.
    Unspecified,
}

impl MeasureSpec {
    /// Resolve against the content's desired size.
    #[must_use]
    pub fn resolve(self, desired: f32) -> f32 {
        match self {
            Self::Exactly(size) => size,
            Self::AtMost(size) => size.min(desired),
            Self::Unspecified => desired,
        }
    }
}

/// Font metrics needed to lay out a line of text.
pub trait TextMetrics {
    /// Advance width of `text` at `size` pixels.
    fn text_width(&self, text: &str, size: f32) -> f32;

    /// Distance from the top of the tallest glyph to the baseline.
    fn ascent(&self, size: f32) -> f32;

    /// Distance from the baseline to the bottom of the lowest glyph.
    fn descent(&self, size: f32) -> f32;
}

/// Fixed-advance approximation, one advance per terminal column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    /// Column advance as a fraction of the font size
    pub advance: f32,
    /// Ascent as a fraction of the font size
    pub ascent: f32,
    /// Descent as a fraction of the font size
    pub descent: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self {
            advance: 0.6,
            ascent: 0.8,
            descent: 0.2,
        }
    }
}

impl TextMetrics for MonospaceMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.width() as f32 * self.advance * size
    }

    fn ascent(&self, size: f32) -> f32 {
        self.ascent * size
    }

    fn descent(&self, size: f32) -> f32 {
        self.descent * size
    }
}
