//! # Codepad Buffer
//!
//! Mutable text storage for one editing session.
//!
//! ## Key Concepts
//!
//! ### Change reporting
//! Every mutation returns a [`ContentChange`] describing the edited region
//! in characters and in lines. Views use it to decide what to re-layout,
//! repaint and re-highlight without diffing the whole document.
//!
//! ### Saved snapshot
//! The buffer keeps the rope it last persisted. A rope clone shares its
//! chunks, so holding the snapshot is cheap, and comparing against it gives
//! an exact "differs from disk" answer even after undoing back to the saved
//! text.

mod buffer;
mod change;
mod cursor;
mod history;

pub use buffer::TextBuffer;
pub use change::ContentChange;
pub use cursor::{Cursor, Position};
pub use history::{Edit, EditKind, History};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Position {line}:{column} is out of bounds")]
    PositionOutOfBounds { line: usize, column: usize },

    #[error("Invalid character index: {0}")]
    InvalidCharIndex(usize),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TextBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_lines(), 1);
        assert!(!buffer.is_modified());
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TextBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        buffer.delete(5..7).unwrap();
        assert_eq!(buffer.text(), "HelloWorld!");
    }

    #[test]
    fn test_line_operations() {
        let buffer = TextBuffer::from("Line 1\nLine 2\r\nLine 3");
        assert_eq!(buffer.len_lines(), 3);
        assert_eq!(buffer.line(0).unwrap(), "Line 1\n");
        assert_eq!(buffer.line_text(1).unwrap(), "Line 2");
        assert_eq!(buffer.line_text(2).unwrap(), "Line 3");
    }
}
