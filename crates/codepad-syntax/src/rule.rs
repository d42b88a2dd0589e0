//! Highlight rules and the engine that applies them to a line.

use regex::Regex;

use crate::{Style, SyntaxError};

/// One pattern → style mapping. Immutable once built.
#[derive(Debug)]
pub struct HighlightRule {
    pattern: Regex,
    style: Style,
}

impl HighlightRule {
    /// Compiles a rule from a regular expression.
    pub fn new(pattern: &str, style: Style) -> Result<Self, SyntaxError> {
        let compiled = Regex::new(pattern).map_err(|source| SyntaxError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            pattern: compiled,
            style,
        })
    }

    /// A rule matching `word` only as a whole word.
    pub fn keyword(word: &str, style: Style) -> Result<Self, SyntaxError> {
        Self::new(&format!(r"\b{}\b", regex::escape(word)), style)
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn style(&self) -> Style {
        self.style
    }
}

/// A styled character range within one line.
///
/// Offsets count `char`s from the start of the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightSpan {
    pub start: usize,
    pub len: usize,
    pub style: Style,
}

impl HighlightSpan {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// An ordered rule sequence, compiled once and applied per line.
///
/// The engine keeps no state between calls: the same line always yields the
/// same spans, and nothing carries over from one line to the next (a quote
/// left open at the end of a line is not continued on the following one).
#[derive(Debug, Default)]
pub struct HighlightEngine {
    rules: Vec<HighlightRule>,
}

impl HighlightEngine {
    pub fn new(rules: Vec<HighlightRule>) -> Self {
        Self { rules }
    }

    /// An engine with no rules; every line comes back unstyled.
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[HighlightRule] {
        &self.rules
    }

    /// Returns every match of every rule, in rule order.
    ///
    /// Within a rule, matches never overlap: scanning resumes at the end of
    /// the previous match. Spans from different rules may overlap; a later
    /// span wins on the characters they share (see [`Self::resolve_line`]).
    pub fn highlight_line(&self, line: &str) -> Vec<HighlightSpan> {
        let offsets = CharOffsets::new(line);
        let mut spans = Vec::new();

        for rule in &self.rules {
            for found in rule.pattern.find_iter(line) {
                if found.is_empty() {
                    continue;
                }
                let start = offsets.char_at(found.start());
                let end = offsets.char_at(found.end());
                spans.push(HighlightSpan {
                    start,
                    len: end - start,
                    style: rule.style,
                });
            }
        }

        spans
    }

    /// Flattens the spans of a line into non-overlapping runs, later rules
    /// overwriting earlier ones character by character.
    pub fn resolve_line(&self, line: &str) -> Vec<HighlightSpan> {
        resolve_spans(&self.highlight_line(line), line.chars().count())
    }
}

/// Flattens overlapping spans into ordered, non-overlapping runs with
/// last-applied-wins semantics. Adjacent runs with equal style merge.
pub fn resolve_spans(spans: &[HighlightSpan], line_len: usize) -> Vec<HighlightSpan> {
    let mut cells: Vec<Option<Style>> = vec![None; line_len];
    for span in spans {
        let end = span.end().min(line_len);
        for cell in cells.iter_mut().take(end).skip(span.start) {
            *cell = Some(span.style);
        }
    }

    let mut runs: Vec<HighlightSpan> = Vec::new();
    for (idx, cell) in cells.into_iter().enumerate() {
        let Some(style) = cell else { continue };
        match runs.last_mut() {
            Some(run) if run.end() == idx && run.style == style => run.len += 1,
            _ => runs.push(HighlightSpan {
                start: idx,
                len: 1,
                style,
            }),
        }
    }
    runs
}

/// Maps byte offsets to char offsets for one line.
enum CharOffsets {
    Ascii,
    Table(Vec<usize>),
}

impl CharOffsets {
    fn new(line: &str) -> Self {
        if line.is_ascii() {
            return Self::Ascii;
        }
        let mut table = vec![0; line.len() + 1];
        let mut chars = 0;
        for (byte, ch) in line.char_indices() {
            for slot in &mut table[byte..byte + ch.len_utf8()] {
                *slot = chars;
            }
            chars += 1;
        }
        table[line.len()] = chars;
        Self::Table(table)
    }

    fn char_at(&self, byte: usize) -> usize {
        match self {
            Self::Ascii => byte,
            Self::Table(table) => table[byte],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    const RED: Style = Style::plain(Color::rgb(0xFF, 0, 0));
    const BLUE: Style = Style::plain(Color::rgb(0, 0, 0xFF));

    #[test]
    fn test_rule_matches_repeat_to_end_of_line() {
        let engine = HighlightEngine::new(vec![HighlightRule::keyword("if", RED).unwrap()]);
        let spans = engine.highlight_line("if a if b");

        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].len), (0, 2));
        assert_eq!((spans[1].start, spans[1].len), (5, 2));
    }

    #[test]
    fn test_later_rule_wins_on_overlap() {
        let engine = HighlightEngine::new(vec![
            HighlightRule::new("abcd", RED).unwrap(),
            HighlightRule::new("bc", BLUE).unwrap(),
        ]);

        let runs = engine.resolve_line("abcd");
        assert_eq!(
            runs,
            vec![
                HighlightSpan { start: 0, len: 1, style: RED },
                HighlightSpan { start: 1, len: 2, style: BLUE },
                HighlightSpan { start: 3, len: 1, style: RED },
            ]
        );
    }

    #[test]
    fn test_offsets_are_in_chars() {
        let engine = HighlightEngine::new(vec![HighlightRule::new("#.*", RED).unwrap()]);
        let spans = engine.highlight_line("é = 1 # ünïcode");

        assert_eq!(spans, vec![HighlightSpan { start: 6, len: 9, style: RED }]);
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = HighlightRule::new("(unclosed", RED).unwrap_err();
        assert!(matches!(err, SyntaxError::InvalidPattern { .. }));
    }

    #[test]
    fn test_plain_engine_has_no_spans() {
        assert!(HighlightEngine::plain().highlight_line("def f(): pass").is_empty());
    }
}
