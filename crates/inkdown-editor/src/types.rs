//! Core editing state types shared across the crate.

use std::ops::Range;

/// A selection between two char offsets.
///
/// `anchor` is where the selection started, `head` is the moving end (the
/// caret). A collapsed selection (`anchor == head`) is just a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection at `offset`.
    pub fn caret(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// The lower of the two offsets.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// The higher of the two offsets.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Normalized char range, start <= end.
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start() && offset < self.end()
    }
}

/// Metadata about the most recent buffer mutation.
///
/// Recorded by the buffer itself so callers (undo repositioning, change
/// notification) can see what just happened without diffing text.
#[derive(Debug, Clone, Copy)]
pub struct EditInfo {
    /// Char offset where the edit was applied.
    pub char_pos: usize,
    /// Chars inserted at `char_pos`.
    pub inserted_len: usize,
    /// Chars removed at `char_pos` before the insert.
    pub deleted_len: usize,
    /// Document length in chars after the edit.
    pub doc_len_after: usize,
    /// When the edit happened. Excluded from equality.
    pub timestamp: web_time::Instant,
}

impl EditInfo {
    pub fn new(char_pos: usize, inserted_len: usize, deleted_len: usize, doc_len_after: usize) -> Self {
        Self {
            char_pos,
            inserted_len,
            deleted_len,
            doc_len_after,
            timestamp: web_time::Instant::now(),
        }
    }

    /// Char offset of the caret after this edit.
    pub fn caret_after(&self) -> usize {
        self.char_pos + self.inserted_len
    }
}

impl PartialEq for EditInfo {
    fn eq(&self, other: &Self) -> bool {
        self.char_pos == other.char_pos
            && self.inserted_len == other.inserted_len
            && self.deleted_len == other.deleted_len
            && self.doc_len_after == other.doc_len_after
    }
}

impl Eq for EditInfo {}
