//! Fonts and the measurements layout depends on.

use serde::{Deserialize, Serialize};

/// A font selection as chosen by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    /// Size in points
    pub size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "Consolas".to_string(),
            size: 12.0,
        }
    }
}

impl std::fmt::Display for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}pt", self.family, self.size)
    }
}

/// Pixel measurements of a (monospace) font.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Advance of one column
    pub char_width: f32,
    /// Advance of the widest digit glyph (`9`)
    pub digit_width: f32,
    /// Height of one visual row
    pub line_height: f32,
}

impl FontMetrics {
    /// Approximates metrics from a point size when the host has no real
    /// text measurement available.
    pub fn estimate(font: &Font) -> Self {
        let px = font.size * 96.0 / 72.0;
        let advance = (px * 0.6).round().max(1.0);
        Self {
            char_width: advance,
            digit_width: advance,
            line_height: (px * 1.25).round().max(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_scales_with_size() {
        let small = FontMetrics::estimate(&Font::default());
        let large = FontMetrics::estimate(&Font {
            size: 24.0,
            ..Font::default()
        });

        assert!(large.digit_width > small.digit_width);
        assert!(large.line_height > small.line_height);
        assert_eq!(small.char_width, small.digit_width);
    }
}
