//! Description of a single content mutation.

use std::ops::RangeInclusive;

/// What changed in a buffer after one mutation.
///
/// Character counts are in `char`s. Line fields describe which logical
/// lines were rewritten: before the edit, lines
/// `first_line..=first_line + lines_removed` held the affected text; after
/// it, lines `first_line..=first_line + lines_added` do. Every line outside
/// those ranges is textually unchanged (only shifted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContentChange {
    /// Character index where the edit starts
    pub position: usize,
    /// Number of characters removed at `position`
    pub chars_removed: usize,
    /// Number of characters inserted at `position`
    pub chars_added: usize,
    /// First logical line whose text may differ
    pub first_line: usize,
    /// Line breaks that disappeared from the affected range
    pub lines_removed: usize,
    /// Line breaks that appeared in the affected range
    pub lines_added: usize,
}

impl ContentChange {
    /// Lines (after the edit) whose text must be re-read.
    pub fn new_lines(&self) -> RangeInclusive<usize> {
        self.first_line..=self.first_line + self.lines_added
    }

    /// Lines (before the edit) that were replaced.
    pub fn old_lines(&self) -> RangeInclusive<usize> {
        self.first_line..=self.first_line + self.lines_removed
    }

    /// Net change in the number of lines.
    pub fn line_delta(&self) -> isize {
        self.lines_added as isize - self.lines_removed as isize
    }

    /// Returns true if the edit did not touch the text at all.
    pub fn is_noop(&self) -> bool {
        self.chars_removed == 0 && self.chars_added == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_ranges() {
        let change = ContentChange {
            position: 4,
            chars_removed: 0,
            chars_added: 3,
            first_line: 2,
            lines_removed: 0,
            lines_added: 2,
        };
        assert_eq!(change.old_lines(), 2..=2);
        assert_eq!(change.new_lines(), 2..=4);
        assert_eq!(change.line_delta(), 2);
        assert!(!change.is_noop());
    }
}
