//! Primitive undo/redo history.
//!
//! This is deliberately small: a bounded stack of edits where consecutive
//! keystrokes on one line merge into a single step. Anything smarter
//! (grouping, branching) is out of scope for the buffer.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The type of edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// Text was inserted
    Insert,
    /// Text was deleted
    Delete,
}

/// A single recorded edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    /// What kind of edit this is
    pub kind: EditKind,
    /// Character position where the edit occurred
    pub position: usize,
    /// The text that was inserted or deleted
    pub content: String,
}

impl Edit {
    /// Creates an insert edit.
    pub fn insert(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            position,
            content: content.into(),
        }
    }

    /// Creates a delete edit.
    pub fn delete(position: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Delete,
            position,
            content: content.into(),
        }
    }

    /// Number of characters the edit covers.
    pub fn len_chars(&self) -> usize {
        self.content.chars().count()
    }

    /// Returns true if `next` continues this edit (typing forward,
    /// backspacing, or forward-deleting on the same line).
    fn continues_with(&self, next: &Edit) -> bool {
        if self.kind != next.kind || self.content.contains('\n') || next.content.contains('\n') {
            return false;
        }
        match self.kind {
            EditKind::Insert => self.position + self.len_chars() == next.position,
            EditKind::Delete => {
                next.position + next.len_chars() == self.position || next.position == self.position
            }
        }
    }

    fn absorb(&mut self, next: Edit) {
        match self.kind {
            EditKind::Insert => self.content.push_str(&next.content),
            EditKind::Delete if next.position < self.position => {
                self.content = next.content + &self.content;
                self.position = next.position;
            }
            EditKind::Delete => self.content.push_str(&next.content),
        }
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Edit>,
    redo_stack: Vec<Edit>,
    max_size: usize,
    /// When false the next push starts a new undo step
    mergeable: bool,
}

impl History {
    /// Creates a history keeping at most `max_size` undo steps.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
            mergeable: true,
        }
    }

    /// Records an edit, clearing the redo stack.
    pub fn push(&mut self, edit: Edit) {
        self.redo_stack.clear();

        if self.mergeable {
            if let Some(last) = self.undo_stack.back_mut() {
                if last.continues_with(&edit) {
                    last.absorb(edit);
                    return;
                }
            }
        }

        self.mergeable = true;
        self.undo_stack.push_back(edit);
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Forces the next edit into its own undo step.
    pub fn seal(&mut self) {
        self.mergeable = false;
    }

    /// Pops the most recent edit for undoing.
    pub fn undo(&mut self) -> Option<Edit> {
        let edit = self.undo_stack.pop_back()?;
        self.redo_stack.push(edit.clone());
        self.mergeable = false;
        Some(edit)
    }

    /// Pops the most recently undone edit for redoing.
    pub fn redo(&mut self) -> Option<Edit> {
        let edit = self.redo_stack.pop()?;
        self.undo_stack.push_back(edit.clone());
        self.mergeable = false;
        Some(edit)
    }

    /// Returns true if there are edits to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.mergeable = true;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}
