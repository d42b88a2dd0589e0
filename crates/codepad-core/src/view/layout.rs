//! Block layout: where each logical line sits vertically.
//!
//! A block is one logical line. With wrapping on, a block spans several
//! visual rows; its height is `rows * line_height`. Offsets here are in
//! document coordinates (top of the first block is 0); the view subtracts
//! its scroll offset to get viewport coordinates.

use codepad_buffer::{Position, TextBuffer};
use unicode_width::UnicodeWidthChar;

/// Display columns taken by `text`, with tabs expanded to the next stop.
pub fn display_width(text: &str, tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    text.chars().fold(0, |col, ch| match ch {
        '\t' => (col / tab_stop + 1) * tab_stop,
        _ => col + ch.width().unwrap_or(0),
    })
}

/// Vertical geometry of every block in a buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    /// `tops[i]` is the top of line `i`; the extra last entry is the
    /// document height
    tops: Vec<f32>,
    /// Visual rows per line
    rows: Vec<usize>,
    line_height: f32,
    wrap_columns: Option<usize>,
    tab_stop: usize,
}

impl BlockLayout {
    /// Lays out every line of `buffer`.
    ///
    /// `wrap_columns` is the number of columns per visual row, or `None`
    /// to disable wrapping.
    pub fn compute(
        buffer: &TextBuffer,
        line_height: f32,
        wrap_columns: Option<usize>,
        tab_stop: usize,
    ) -> Self {
        let wrap_columns = wrap_columns.map(|c| c.max(1));
        let count = buffer.len_lines();
        let mut tops = Vec::with_capacity(count + 1);
        let mut rows = Vec::with_capacity(count);
        let mut top = 0.0;

        for line in 0..count {
            let text = buffer.line_text(line).unwrap_or_default();
            let width = display_width(&text, tab_stop);
            let line_rows = match wrap_columns {
                Some(cols) => width.div_ceil(cols).max(1),
                None => 1,
            };
            tops.push(top);
            rows.push(line_rows);
            top += line_rows as f32 * line_height;
        }
        tops.push(top);

        Self {
            tops,
            rows,
            line_height,
            wrap_columns,
            tab_stop,
        }
    }

    pub fn line_count(&self) -> usize {
        self.rows.len()
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn wrap_columns(&self) -> Option<usize> {
        self.wrap_columns
    }

    pub fn tab_stop(&self) -> usize {
        self.tab_stop
    }

    /// Top of a block in document coordinates.
    pub fn block_top(&self, line: usize) -> f32 {
        self.tops[line.min(self.line_count())]
    }

    /// Height of a block (0 past the last line).
    pub fn block_height(&self, line: usize) -> f32 {
        self.rows
            .get(line)
            .map_or(0.0, |&rows| rows as f32 * self.line_height)
    }

    /// Number of visual rows a block occupies.
    pub fn block_rows(&self, line: usize) -> usize {
        self.rows.get(line).copied().unwrap_or(0)
    }

    pub fn document_height(&self) -> f32 {
        self.tops[self.line_count()]
    }

    /// The first line whose block is (at least partly) below `y`.
    pub fn line_at(&self, y: f32) -> usize {
        let after = self.tops[1..].partition_point(|&bottom| bottom <= y);
        after.min(self.line_count().saturating_sub(1))
    }

    /// Top (document coordinates) of the visual row holding `pos`.
    pub fn row_top(&self, buffer: &TextBuffer, pos: Position) -> f32 {
        let row = match self.wrap_columns {
            Some(cols) => {
                let text = buffer.line_text(pos.line).unwrap_or_default();
                let prefix: String = text.chars().take(pos.column).collect();
                let col = display_width(&prefix, self.tab_stop);
                (col / cols).min(self.block_rows(pos.line).saturating_sub(1))
            }
            None => 0,
        };
        self.block_top(pos.line) + row as f32 * self.line_height
    }
}
