//! Undo/redo management for editor operations.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `UndoableBuffer<T>` - wraps a TextBuffer and provides undo/redo

use std::ops::Range;

use smol_str::{SmolStr, ToSmolStr};

use crate::text::TextBuffer;
use crate::types::EditInfo;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track
/// state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if anything was applied.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if anything was applied.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// A recorded edit operation for undo/redo.
#[derive(Debug, Clone)]
struct EditOperation {
    /// Character position where the edit occurred
    pos: usize,
    /// Text that was deleted (empty for pure insertions)
    deleted: SmolStr,
    /// Text that was inserted (empty for pure deletions)
    inserted: SmolStr,
}

/// A TextBuffer wrapper that tracks edits and provides undo/redo.
///
/// All mutations go through this wrapper, which records them. A replace is
/// recorded as one operation so a formatting toggle or search replacement
/// undoes in a single step.
pub struct UndoableBuffer<T> {
    buffer: T,
    undo_stack: Vec<EditOperation>,
    redo_stack: Vec<EditOperation>,
    max_steps: usize,
}

impl<T: Clone> Clone for UndoableBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            buffer: self.buffer.clone(),
            undo_stack: self.undo_stack.clone(),
            redo_stack: self.redo_stack.clone(),
            max_steps: self.max_steps,
        }
    }
}

impl<T: TextBuffer + Default> Default for UndoableBuffer<T> {
    fn default() -> Self {
        Self::new(T::default(), 200)
    }
}

impl<T: TextBuffer> UndoableBuffer<T> {
    /// Create a new undoable buffer wrapping the given buffer.
    pub fn new(buffer: T, max_steps: usize) -> Self {
        Self {
            buffer,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_steps,
        }
    }

    /// Get a reference to the inner buffer.
    pub fn inner(&self) -> &T {
        &self.buffer
    }

    /// Record an operation. Clears the redo stack: a new edit forks
    /// history.
    fn record_op(&mut self, pos: usize, deleted: &str, inserted: &str) {
        self.redo_stack.clear();

        self.undo_stack.push(EditOperation {
            pos,
            deleted: deleted.to_smolstr(),
            inserted: inserted.to_smolstr(),
        });

        while self.undo_stack.len() > self.max_steps {
            self.undo_stack.remove(0);
        }
    }
}

// Delegate TextBuffer to the inner buffer, recording each mutation.
impl<T: TextBuffer> TextBuffer for UndoableBuffer<T> {
    fn len_bytes(&self) -> usize {
        self.buffer.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.record_op(char_offset, "", text);
        self.buffer.insert(char_offset, text);
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let deleted = self
            .buffer
            .slice(char_range.clone())
            .unwrap_or_default();
        self.record_op(char_range.start, &deleted, "");
        self.buffer.delete(char_range);
    }

    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let deleted = self
            .buffer
            .slice(char_range.clone())
            .unwrap_or_default();
        self.record_op(char_range.start, &deleted, text);
        self.buffer.replace(char_range, text);
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        self.buffer.slice(char_range)
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        self.buffer.char_at(char_offset)
    }

    fn text(&self) -> String {
        self.buffer.text()
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        self.buffer.char_to_byte(char_offset)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        self.buffer.byte_to_char(byte_offset)
    }

    fn last_edit(&self) -> Option<EditInfo> {
        self.buffer.last_edit()
    }
}

impl<T: TextBuffer> UndoManager for UndoableBuffer<T> {
    fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn undo(&mut self) -> bool {
        let Some(op) = self.undo_stack.pop() else {
            return false;
        };

        // Inverse: what was inserted goes away, what was deleted comes back.
        let inserted_chars = op.inserted.chars().count();
        self.buffer
            .replace(op.pos..op.pos + inserted_chars, &op.deleted);

        self.redo_stack.push(op);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(op) = self.redo_stack.pop() else {
            return false;
        };

        let deleted_chars = op.deleted.chars().count();
        self.buffer
            .replace(op.pos..op.pos + deleted_chars, &op.inserted);

        self.undo_stack.push(op);
        true
    }

    fn clear_history(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EditorRope;

    #[test]
    fn insert_undo_redo() {
        let mut buf = UndoableBuffer::new(EditorRope::from_str("draft"), 100);
        assert!(!buf.can_undo());

        buf.insert(5, " two");
        assert_eq!(buf.text(), "draft two");

        assert!(buf.undo());
        assert_eq!(buf.text(), "draft");
        assert!(buf.can_redo());

        assert!(buf.redo());
        assert_eq!(buf.text(), "draft two");
        assert!(!buf.can_redo());
    }

    #[test]
    fn delete_undo_restores_text() {
        let mut buf = UndoableBuffer::new(EditorRope::from_str("one two three"), 100);

        buf.delete(3..7);
        assert_eq!(buf.text(), "one three");

        assert!(buf.undo());
        assert_eq!(buf.text(), "one two three");
    }

    #[test]
    fn replace_is_one_undo_step() {
        let mut buf = UndoableBuffer::new(EditorRope::from_str("hello world"), 100);

        buf.replace(6..11, "rust");
        assert_eq!(buf.text(), "hello rust");

        assert!(buf.undo());
        assert_eq!(buf.text(), "hello world");
        assert!(!buf.can_undo());

        assert!(buf.redo());
        assert_eq!(buf.text(), "hello rust");
    }

    #[test]
    fn new_edit_clears_redo() {
        let mut buf = UndoableBuffer::new(EditorRope::from_str("abc"), 100);

        buf.insert(3, "d");
        assert!(buf.undo());
        assert!(buf.can_redo());

        buf.insert(3, "e");
        assert!(!buf.can_redo());
    }

    #[test]
    fn max_steps_evicts_oldest() {
        let mut buf = UndoableBuffer::new(EditorRope::new(), 3);

        buf.insert(0, "a");
        buf.insert(1, "b");
        buf.insert(2, "c");
        buf.insert(3, "d"); // evicts "a"
        assert_eq!(buf.text(), "abcd");

        assert!(buf.undo());
        assert!(buf.undo());
        assert!(buf.undo());
        assert!(!buf.undo());
        assert_eq!(buf.text(), "a");
    }

    #[test]
    fn undo_redo_cycles_with_fork() {
        let mut buf = UndoableBuffer::new(EditorRope::new(), 100);

        buf.insert(0, "a");
        buf.insert(1, "b");
        buf.insert(2, "c");

        assert!(buf.undo());
        assert!(buf.undo());
        assert_eq!(buf.text(), "a");

        buf.insert(1, "x");
        assert_eq!(buf.text(), "ax");
        assert!(!buf.can_redo());
    }
}
