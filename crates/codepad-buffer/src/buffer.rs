//! Core text buffer implementation using a rope.
//!
//! ## Learning: Ownership in Action
//!
//! ```rust,ignore
//! let buffer = TextBuffer::new();  // buffer OWNS the rope
//! let text = buffer.text();        // text BORROWS from buffer
//! // buffer.insert(0, "x");        // ERROR! Can't mutate while borrowed
//! drop(text);                      // Release borrow
//! buffer.insert(0, "x");           // Now OK!
//! ```

use ropey::Rope;
use std::borrow::Cow;
use std::ops::Range;

use crate::history::{Edit, EditKind, History};
use crate::{BufferError, BufferResult, ContentChange, Position};

/// A text buffer backed by a rope.
///
/// The buffer never touches the filesystem. Callers persist `text()` and
/// then call [`TextBuffer::mark_saved`].
#[derive(Debug, Clone)]
pub struct TextBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Content as of the last successful save
    saved: Rope,

    /// Edit history for undo/redo
    history: History,
}

impl TextBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use codepad_buffer::TextBuffer;
    ///
    /// let buffer = TextBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::from_rope(Rope::new())
    }

    fn from_rope(rope: Rope) -> Self {
        Self {
            saved: rope.clone(),
            rope,
            history: History::default(),
        }
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    #[inline]
    pub fn text(&self) -> Cow<'_, str> {
        self.rope.slice(..).into()
    }

    /// Returns a line (0-indexed) including its trailing line break.
    pub fn line(&self, line_idx: usize) -> BufferResult<Cow<'_, str>> {
        self.check_line(line_idx)?;
        Ok(self.rope.line(line_idx).into())
    }

    /// Returns a line without its trailing line break.
    pub fn line_text(&self, line_idx: usize) -> BufferResult<String> {
        let mut line = self.line(line_idx)?.into_owned();
        while line.ends_with(['\n', '\r']) {
            line.pop();
        }
        Ok(line)
    }

    /// Returns a slice of text by character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<Cow<'_, str>> {
        if range.start > range.end || range.end > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(range.end));
        }
        Ok(self.rope.slice(range).into())
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the length of a line in characters, line break excluded.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        Ok(self.line_text(line_idx)?.chars().count())
    }

    // ==================== Mutations ====================

    /// Inserts text at a character index.
    pub fn insert(&mut self, char_idx: usize, text: &str) -> BufferResult<ContentChange> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }
        self.history.push(Edit::insert(char_idx, text));
        Ok(self.apply(char_idx, 0, text))
    }

    /// Deletes text in a character range.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<ContentChange> {
        let removed = self.slice(range.clone())?.into_owned();
        self.history.push(Edit::delete(range.start, removed));
        Ok(self.apply(range.start, range.len(), ""))
    }

    /// Replaces everything, as when a document is loaded. Clears history
    /// and the result counts as saved.
    pub fn set_text(&mut self, text: &str) -> ContentChange {
        let len = self.len_chars();
        let change = self.apply(0, len, text);
        self.history.clear();
        self.mark_saved();
        change
    }

    /// Performs a raw edit and describes it.
    ///
    /// `first_line` starts one character early so that a `\r` right before
    /// the edit, which may join or split a CRLF pair, is covered.
    fn apply(&mut self, position: usize, chars_removed: usize, text: &str) -> ContentChange {
        let first_line = self.rope.char_to_line(position.saturating_sub(1));
        let old_last = self.rope.char_to_line(position + chars_removed);

        if chars_removed > 0 {
            self.rope.remove(position..position + chars_removed);
        }
        self.rope.insert(position, text);

        let chars_added = text.chars().count();
        let new_last = self.rope.char_to_line(position + chars_added);

        ContentChange {
            position,
            chars_removed,
            chars_added,
            first_line,
            lines_removed: old_last - first_line,
            lines_added: new_last - first_line,
        }
    }

    // ==================== Undo/Redo ====================

    /// Undoes the last edit step.
    pub fn undo(&mut self) -> BufferResult<ContentChange> {
        let edit = self.history.undo().ok_or(BufferError::NothingToUndo)?;
        Ok(match edit.kind {
            EditKind::Insert => self.apply(edit.position, edit.len_chars(), ""),
            EditKind::Delete => self.apply(edit.position, 0, &edit.content),
        })
    }

    /// Redoes the last undone edit step.
    pub fn redo(&mut self) -> BufferResult<ContentChange> {
        let edit = self.history.redo().ok_or(BufferError::NothingToRedo)?;
        Ok(match edit.kind {
            EditKind::Insert => self.apply(edit.position, 0, &edit.content),
            EditKind::Delete => self.apply(edit.position, edit.len_chars(), ""),
        })
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Ends the current undo step; the next edit starts a new one.
    pub fn seal_undo_step(&mut self) {
        self.history.seal();
    }

    // ==================== Saved State ====================

    /// Returns true if the content differs from the last saved snapshot.
    pub fn is_modified(&self) -> bool {
        self.rope != self.saved
    }

    /// Records the current content as persisted.
    pub fn mark_saved(&mut self) {
        self.saved = self.rope.clone();
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a character index.
    pub fn position_to_char_idx(&self, pos: Position) -> BufferResult<usize> {
        let line_len = self
            .line_len(pos.line)
            .map_err(|_| BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            })?;

        // Column may sit at end of line (for insertion)
        if pos.column > line_len {
            return Err(BufferError::PositionOutOfBounds {
                line: pos.line,
                column: pos.column,
            });
        }

        Ok(self.rope.line_to_char(pos.line) + pos.column)
    }

    /// Converts a character index to a Position (line, column).
    pub fn char_idx_to_position(&self, char_idx: usize) -> BufferResult<Position> {
        if char_idx > self.len_chars() {
            return Err(BufferError::InvalidCharIndex(char_idx));
        }

        let line = self.rope.char_to_line(char_idx);
        let column = char_idx - self.rope.line_to_char(line);
        Ok(Position { line, column })
    }

    /// Clamps a position onto the buffer.
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.len_lines() - 1);
        let column = pos.column.min(self.line_len(line).unwrap_or(0));
        Position { line, column }
    }

    fn check_line(&self, line_idx: usize) -> BufferResult<()> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::PositionOutOfBounds {
                line: line_idx,
                column: 0,
            });
        }
        Ok(())
    }
}

impl Default for TextBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for TextBuffer {
    fn from(s: &str) -> Self {
        Self::from_rope(Rope::from_str(s))
    }
}

impl From<String> for TextBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}
