//! Built-in rule sets.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Color, HighlightEngine, HighlightRule, Style, SyntaxError};

const PYTHON_KEYWORDS: &[&str] = &[
    "and", "as", "assert", "break", "class", "continue", "def", "del", "elif", "else", "except",
    "False", "finally", "for", "from", "global", "if", "import", "in", "is", "lambda", "None",
    "nonlocal", "not", "or", "pass", "raise", "return", "True", "try", "while", "with", "yield",
];

const RUST_KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

/// How string literals are matched on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StringMatching {
    /// Each quote pair is its own literal; backslash escapes are honored.
    #[default]
    Pairwise,
    /// One literal from the first quote to the last quote on the line, so
    /// `"a" + "b"` is a single span.
    Greedy,
}

/// Styles and matching mode used to build rule sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightSettings {
    pub string_matching: StringMatching,
    pub keyword: Style,
    pub comment: Style,
    pub string: Style,
}

impl Default for HighlightSettings {
    fn default() -> Self {
        Self {
            string_matching: StringMatching::default(),
            keyword: Style::plain(Color::rgb(0x56, 0x9C, 0xD6)).bold(),
            comment: Style::plain(Color::DARK_GREEN),
            string: Style::plain(Color::rgb(0xD6, 0x9D, 0x85)),
        }
    }
}

/// Languages with a built-in rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Python,
    Rust,
}

impl Language {
    /// Picks a rule set from a file name. Anything that isn't Rust gets the
    /// Python rules, including untitled buffers.
    pub fn from_path(path: Option<&Path>) -> Self {
        match path.and_then(|p| p.extension()).and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("rs") => Language::Rust,
            _ => Language::Python,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::Rust => "rust",
        }
    }

    /// Compiles a fresh engine for this language.
    pub fn engine(&self, settings: &HighlightSettings) -> Result<HighlightEngine, SyntaxError> {
        let rules = match self {
            Language::Python => python_rules(settings)?,
            Language::Rust => rust_rules(settings)?,
        };
        tracing::debug!(language = self.name(), rules = rules.len(), "compiled highlight rules");
        Ok(HighlightEngine::new(rules))
    }
}

/// Keywords, then `#` comments, then double- and single-quoted strings.
pub fn python_rules(settings: &HighlightSettings) -> Result<Vec<HighlightRule>, SyntaxError> {
    let mut rules = keyword_rules(PYTHON_KEYWORDS, settings.keyword)?;
    rules.push(HighlightRule::new("#.*", settings.comment)?);
    rules.extend(string_rules(&['"', '\''], settings)?);
    Ok(rules)
}

/// Keywords, then `//` comments, then double-quoted strings.
pub fn rust_rules(settings: &HighlightSettings) -> Result<Vec<HighlightRule>, SyntaxError> {
    let mut rules = keyword_rules(RUST_KEYWORDS, settings.keyword)?;
    rules.push(HighlightRule::new("//.*", settings.comment)?);
    rules.extend(string_rules(&['"'], settings)?);
    Ok(rules)
}

fn keyword_rules(words: &[&str], style: Style) -> Result<Vec<HighlightRule>, SyntaxError> {
    words
        .iter()
        .map(|word| HighlightRule::keyword(word, style))
        .collect()
}

fn string_rules(
    quotes: &[char],
    settings: &HighlightSettings,
) -> Result<Vec<HighlightRule>, SyntaxError> {
    quotes
        .iter()
        .map(|&quote| {
            let pattern = match settings.string_matching {
                StringMatching::Greedy => format!("{quote}.*{quote}"),
                StringMatching::Pairwise => format!(r"{quote}(?:[^{quote}\\]|\\.)*{quote}"),
            };
            HighlightRule::new(&pattern, settings.string)
        })
        .collect()
}
