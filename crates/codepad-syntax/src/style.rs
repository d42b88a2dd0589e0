//! Visual styles attached to highlighted text.

use serde::{Deserialize, Serialize};

/// An opaque RGB color.
///
/// Serialized as a `#RRGGBB` string so config files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const LIGHT_GRAY: Color = Color::rgb(0xC0, 0xC0, 0xC0);
    pub const DARK_GREEN: Color = Color::rgb(0x00, 0x80, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid color `{value}`, expected #RRGGBB"))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

/// Font weight of styled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// The visual style a rule applies: color, weight, italic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub italic: bool,
}

impl Style {
    /// A normal-weight, upright style in the given color.
    pub const fn plain(color: Color) -> Self {
        Self {
            color,
            weight: FontWeight::Normal,
            italic: false,
        }
    }

    pub const fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    pub const fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(Color::from_hex("#569CD6"), Some(Color::rgb(0x56, 0x9C, 0xD6)));
        assert_eq!(Color::from_hex("d69d85"), Some(Color::rgb(0xD6, 0x9D, 0x85)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
        assert_eq!(Color::DARK_GREEN.to_hex(), "#008000");
    }

    #[test]
    fn test_style_serialization() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            style: Style,
        }

        let parsed: Wrapper = toml::from_str("style = { color = \"#569CD6\", weight = \"bold\" }").unwrap();
        assert_eq!(parsed.style, Style::plain(Color::rgb(0x56, 0x9C, 0xD6)).bold());
        assert!(!parsed.style.italic);

        let bad = toml::from_str::<Wrapper>("style = { color = \"blue\" }");
        assert!(bad.is_err());
    }
}
