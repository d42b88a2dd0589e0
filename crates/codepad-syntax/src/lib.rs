//! # Codepad Syntax
//!
//! Rule-based syntax highlighting, one line at a time.
//!
//! ## Why rules and not a parser?
//!
//! Highlighting here is lexical: an ordered list of regular expressions,
//! each mapped to a style. Rules are compiled once when an engine is built
//! and then applied to each line independently, which keeps re-highlighting
//! after an edit proportional to the lines that changed.
//!
//! ## Learning: Ordered overlap
//!
//! Rules never coordinate with each other. A keyword inside a comment is
//! first styled as a keyword, then the comment rule paints over it.
//! [`resolve_spans`] turns that layering into flat runs.

mod languages;
mod rule;
mod style;

pub use languages::{HighlightSettings, Language, StringMatching, python_rules, rust_rules};
pub use rule::{HighlightEngine, HighlightRule, HighlightSpan, resolve_spans};
pub use style::{Color, FontWeight, Style};

/// Errors that can occur while building highlight rules.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("Invalid highlight pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn highlighting_is_idempotent(line in "[ -~]{0,60}") {
            let engine = Language::Python.engine(&HighlightSettings::default()).unwrap();
            let first = engine.highlight_line(&line);
            let second = engine.highlight_line(&line);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn resolved_runs_are_ordered_and_disjoint(line in "[ -~]{0,60}") {
            let engine = Language::Python.engine(&HighlightSettings::default()).unwrap();
            let runs = engine.resolve_line(&line);
            for pair in runs.windows(2) {
                prop_assert!(pair[0].end() <= pair[1].start);
            }
            if let Some(last) = runs.last() {
                prop_assert!(last.end() <= line.chars().count());
            }
        }
    }
}
