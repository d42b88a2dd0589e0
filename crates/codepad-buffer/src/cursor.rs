//! Cursor and position types for text navigation.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` wraps line/column coordinates instead of a bare
//! `(usize, usize)`, so line and column can't be swapped by accident.

use serde::{Deserialize, Serialize};

/// A position in the text buffer (line and column).
///
/// Both line and column are 0-indexed; the column counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, column: 0 };

    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The text cursor: a position plus an optional selection anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Current cursor position
    pub position: Position,

    /// Selection anchor. When set, the text between the anchor and
    /// `position` is selected.
    pub anchor: Option<Position>,
}

impl Cursor {
    /// Creates a cursor at a position with no selection.
    pub fn new(position: Position) -> Self {
        Self {
            position,
            anchor: None,
        }
    }

    /// Moves the cursor, clearing the selection.
    pub fn move_to(&mut self, position: Position) {
        self.position = position;
        self.anchor = None;
    }

    /// Moves the cursor, extending the selection from where it was.
    pub fn select_to(&mut self, position: Position) {
        if self.anchor.is_none() {
            self.anchor = Some(self.position);
        }
        self.position = position;
    }

    /// Drops the selection, keeping the position.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Returns a copy of this cursor with the selection dropped.
    pub fn collapsed(&self) -> Cursor {
        Cursor::new(self.position)
    }

    /// Returns true if text is selected.
    pub fn has_selection(&self) -> bool {
        self.anchor.is_some_and(|anchor| anchor != self.position)
    }

    /// Returns the selection as an ordered `(start, end)` pair.
    pub fn selection_range(&self) -> Option<(Position, Position)> {
        self.anchor
            .filter(|&anchor| anchor != self.position)
            .map(|anchor| (anchor.min(self.position), anchor.max(self.position)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 3) > Position::new(2, 1));
        assert_eq!(Position::new(4, 2).to_string(), "5:3");
    }

    #[test]
    fn test_selection_range_is_ordered() {
        let mut cursor = Cursor::new(Position::new(3, 4));
        cursor.select_to(Position::new(1, 0));

        assert!(cursor.has_selection());
        assert_eq!(
            cursor.selection_range(),
            Some((Position::new(1, 0), Position::new(3, 4)))
        );
    }

    #[test]
    fn test_collapsed_drops_selection() {
        let mut cursor = Cursor::new(Position::ZERO);
        cursor.select_to(Position::new(0, 5));

        let collapsed = cursor.collapsed();
        assert!(!collapsed.has_selection());
        assert_eq!(collapsed.position, Position::new(0, 5));
        assert!(cursor.has_selection());
    }
}
