use std::fmt;

use serde::{Deserialize, Serialize};

const DEFAULT_FAMILY: &str = "sans-serif";
const ELLIPSIS: char = '…';

/// CSS font weight as it appears in payloads: `700` or `"bold"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(u16),
    Named(String),
}

impl FontWeight {
    pub const NORMAL: Self = Self::Numeric(400);
    pub const BOLD: Self = Self::Numeric(700);

    #[must_use]
    pub fn is_bold(&self) -> bool {
        match self {
            Self::Numeric(weight) => *weight >= 600,
            Self::Named(name) => matches!(
                name.trim().to_ascii_lowercase().as_str(),
                "bold" | "bolder" | "semibold" | "extrabold" | "black"
            ),
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(weight) => write!(f, "{weight}"),
            Self::Named(name) => f.write_str(name.trim()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    #[serde(default = "default_family")]
    pub font_family: String,
    #[serde(default = "default_size")]
    pub font_size: f64,
    #[serde(default)]
    pub font_weight: FontWeight,
}

fn default_family() -> String {
    DEFAULT_FAMILY.to_owned()
}

fn default_size() -> f64 {
    12.0
}

impl FontSpec {
    #[must_use]
    pub fn new(font_size: f64, font_weight: FontWeight) -> Self {
        Self {
            font_family: default_family(),
            font_size,
            font_weight,
        }
    }

    #[must_use]
    pub fn title() -> Self {
        Self::new(20.0, FontWeight::BOLD)
    }

    #[must_use]
    pub fn label() -> Self {
        Self::new(12.0, FontWeight::NORMAL)
    }

    #[must_use]
    pub fn annotation() -> Self {
        Self::new(11.0, FontWeight::NORMAL)
    }

    /// Font size guarded against non-positive or non-finite payload values.
    #[must_use]
    pub fn size_px(&self) -> f64 {
        if self.font_size.is_finite() && self.font_size > 0.0 {
            self.font_size
        } else {
            default_size()
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    #[must_use]
    pub fn scaled(mut self, factor: f64) -> Self {
        self.font_size = self.size_px() * factor;
        self
    }

    #[must_use]
    pub fn is_monospace(&self) -> bool {
        let family = self.font_family.to_ascii_lowercase();
        family.contains("mono") || family.contains("courier") || family.contains("consolas")
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::label()
    }
}

/// Measured box of a single line of text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextExtent {
    pub width: f64,
    pub ascent: f64,
    pub descent: f64,
}

impl TextExtent {
    #[must_use]
    pub fn height(self) -> f64 {
        self.ascent + self.descent
    }
}

/// Text extents for layout; hosts with real font metrics supply their own.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent;

    fn width(&self, text: &str, font: &FontSpec) -> f64 {
        self.measure(text, font).width
    }

    /// Widest of several strings, zero for none.
    fn max_width(&self, texts: &[&str], font: &FontSpec) -> f64 {
        texts
            .iter()
            .map(|text| self.width(text, font))
            .fold(0.0, f64::max)
    }
}

/// Deterministic measurer estimating advance widths per glyph class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicTextMeasurer {
    pub bold_factor: f64,
}

impl Default for HeuristicTextMeasurer {
    fn default() -> Self {
        Self { bold_factor: 1.08 }
    }
}

impl HeuristicTextMeasurer {
    fn advance_em(glyph: char) -> f64 {
        match glyph {
            'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' | 'I' => 0.28,
            ' ' | '(' | ')' | '[' | ']' | '{' | '}' | 'f' | 't' | 'r' | '-' => 0.34,
            'm' | 'w' | 'M' | 'W' | '@' | '%' | '—' => 0.86,
            '0'..='9' => 0.56,
            c if c.is_ascii_uppercase() => 0.66,
            c if c.is_ascii() => 0.52,
            // CJK and other wide scripts.
            _ => 1.0,
        }
    }
}

impl TextMeasurer for HeuristicTextMeasurer {
    fn measure(&self, text: &str, font: &FontSpec) -> TextExtent {
        let size = font.size_px();
        let em = if font.is_monospace() {
            0.6 * text.chars().count() as f64
        } else {
            text.chars().map(Self::advance_em).sum()
        };
        let weight_factor = if font.font_weight.is_bold() {
            self.bold_factor
        } else {
            1.0
        };
        TextExtent {
            width: em * size * weight_factor,
            ascent: 0.8 * size,
            descent: 0.2 * size,
        }
    }
}

/// Shortens `text` with a trailing ellipsis until it fits `max_width`.
///
/// Returns an empty string when not even the ellipsis fits.
#[must_use]
pub fn truncate_to_width(
    measurer: &dyn TextMeasurer,
    text: &str,
    font: &FontSpec,
    max_width: f64,
) -> String {
    if measurer.width(text, font) <= max_width {
        return text.to_owned();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (0..chars.len()).rev() {
        let mut candidate: String = chars[..keep].iter().collect();
        candidate = candidate.trim_end().to_owned();
        candidate.push(ELLIPSIS);
        if measurer.width(&candidate, font) <= max_width {
            return candidate;
        }
    }
    String::new()
}
