//! Per-view highlight cache.
//!
//! Each view owns its own engine and a cache of spans per logical line.
//! A content change rescans only the lines it rewrote and splices them in;
//! the untouched lines above and below keep their spans and just shift.

use codepad_buffer::{ContentChange, TextBuffer};
use codepad_syntax::{HighlightEngine, HighlightSpan, resolve_spans};

use super::{ViewEvent, ViewListener, ViewSnapshot};

#[derive(Debug)]
pub struct LineHighlighter {
    engine: HighlightEngine,
    lines: Vec<Vec<HighlightSpan>>,
}

impl LineHighlighter {
    /// Creates a highlighter and scans every line of `buffer`.
    pub fn new(engine: HighlightEngine, buffer: &TextBuffer) -> Self {
        let mut highlighter = Self {
            engine,
            lines: Vec::new(),
        };
        highlighter.rehighlight(buffer);
        highlighter
    }

    pub fn engine(&self) -> &HighlightEngine {
        &self.engine
    }

    /// Swaps in a new rule set and rescans.
    pub fn set_engine(&mut self, engine: HighlightEngine, buffer: &TextBuffer) {
        self.engine = engine;
        self.rehighlight(buffer);
    }

    /// Rescans every line.
    pub fn rehighlight(&mut self, buffer: &TextBuffer) {
        self.lines = (0..buffer.len_lines())
            .map(|line| self.scan(buffer, line))
            .collect();
    }

    /// Brings the cache in line with `buffer` after `change`.
    pub fn apply_change(&mut self, change: &ContentChange, buffer: &TextBuffer) {
        let old = change.old_lines();
        let expected = (self.lines.len() + change.lines_added).checked_sub(change.lines_removed);

        if *old.end() >= self.lines.len() || expected != Some(buffer.len_lines()) {
            tracing::warn!(
                cached = self.lines.len(),
                actual = buffer.len_lines(),
                "highlight cache out of step, rescanning"
            );
            self.rehighlight(buffer);
            return;
        }

        let fresh: Vec<_> = change
            .new_lines()
            .map(|line| self.scan(buffer, line))
            .collect();
        tracing::trace!(first = change.first_line, lines = fresh.len(), "rehighlighted");
        self.lines.splice(old, fresh);
    }

    /// Raw spans of a line, in rule order.
    pub fn spans(&self, line: usize) -> &[HighlightSpan] {
        self.lines.get(line).map_or(&[], Vec::as_slice)
    }

    /// Non-overlapping styled runs of a line.
    pub fn resolved(&self, line: usize, buffer: &TextBuffer) -> Vec<HighlightSpan> {
        let len = buffer.line_len(line).unwrap_or(0);
        resolve_spans(self.spans(line), len)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn scan(&self, buffer: &TextBuffer, line: usize) -> Vec<HighlightSpan> {
        let text = buffer.line_text(line).unwrap_or_default();
        self.engine.highlight_line(&text)
    }
}

impl ViewListener for LineHighlighter {
    fn on_view_event(&mut self, event: &ViewEvent, view: &ViewSnapshot<'_>) {
        if let ViewEvent::ContentChanged(change) = event {
            self.apply_change(change, view.buffer);
        }
    }
}
