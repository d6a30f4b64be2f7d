//! Text buffer abstraction for editor storage.
//!
//! The `TextBuffer` trait is the seam between editing logic and text
//! storage. The shipped backend is a ropey rope; tests occasionally use it
//! directly without the undo layer on top.

use smol_str::{SmolStr, ToSmolStr};
use std::ops::Range;

use crate::types::EditInfo;

/// A text buffer that supports efficient editing and offset conversion.
///
/// All offsets are in Unicode scalar values (chars), not bytes or UTF-16.
pub trait TextBuffer {
    /// Total length in bytes (UTF-8).
    fn len_bytes(&self) -> usize;

    /// Total length in chars (Unicode scalar values).
    fn len_chars(&self) -> usize;

    /// Check if empty.
    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Insert text at char offset.
    fn insert(&mut self, char_offset: usize, text: &str);

    /// Append text at end.
    fn push(&mut self, text: &str) {
        self.insert(self.len_chars(), text);
    }

    /// Delete char range.
    fn delete(&mut self, char_range: Range<usize>);

    /// Replace char range with text.
    ///
    /// Default implementation is delete-then-insert; backends that can
    /// record the replacement as one edit should override.
    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        self.delete(char_range.clone());
        self.insert(char_range.start, text);
    }

    /// Get a slice as SmolStr. Returns None if range is invalid.
    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr>;

    /// Get character at offset. Returns None if out of bounds.
    fn char_at(&self, char_offset: usize) -> Option<char>;

    /// Convert entire buffer to String.
    fn text(&self) -> String;

    /// Convert char offset to byte offset.
    fn char_to_byte(&self, char_offset: usize) -> usize;

    /// Convert byte offset to char offset.
    fn byte_to_char(&self, byte_offset: usize) -> usize;

    /// Get info about the last edit operation, if any.
    fn last_edit(&self) -> Option<EditInfo>;
}

/// Ropey-backed text buffer.
///
/// Provides O(log n) editing operations and offset conversions.
#[derive(Clone, Default)]
pub struct EditorRope {
    rope: ropey::Rope,
    last_edit: Option<EditInfo>,
}

impl EditorRope {
    /// Create a new empty rope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from string.
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: ropey::Rope::from_str(s),
            last_edit: None,
        }
    }

    /// Get a reference to the underlying rope (for advanced operations).
    pub fn rope(&self) -> &ropey::Rope {
        &self.rope
    }
}

impl TextBuffer for EditorRope {
    fn len_bytes(&self) -> usize {
        self.rope.len_bytes()
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn insert(&mut self, char_offset: usize, text: &str) {
        self.rope.insert(char_offset, text);
        self.last_edit = Some(EditInfo::new(
            char_offset,
            text.chars().count(),
            0,
            self.rope.len_chars(),
        ));
    }

    fn delete(&mut self, char_range: Range<usize>) {
        let deleted_len = char_range.len();
        self.rope.remove(char_range.clone());
        self.last_edit = Some(EditInfo::new(
            char_range.start,
            0,
            deleted_len,
            self.rope.len_chars(),
        ));
    }

    fn replace(&mut self, char_range: Range<usize>, text: &str) {
        let deleted_len = char_range.len();
        self.rope.remove(char_range.clone());
        self.rope.insert(char_range.start, text);
        self.last_edit = Some(EditInfo::new(
            char_range.start,
            text.chars().count(),
            deleted_len,
            self.rope.len_chars(),
        ));
    }

    fn slice(&self, char_range: Range<usize>) -> Option<SmolStr> {
        if char_range.end > self.len_chars() || char_range.start > char_range.end {
            return None;
        }
        Some(self.rope.slice(char_range).to_smolstr())
    }

    fn char_at(&self, char_offset: usize) -> Option<char> {
        if char_offset >= self.len_chars() {
            return None;
        }
        Some(self.rope.char(char_offset))
    }

    fn text(&self) -> String {
        self.rope.to_string()
    }

    fn char_to_byte(&self, char_offset: usize) -> usize {
        self.rope.char_to_byte(char_offset)
    }

    fn byte_to_char(&self, byte_offset: usize) -> usize {
        self.rope.byte_to_char(byte_offset)
    }

    fn last_edit(&self) -> Option<EditInfo> {
        self.last_edit
    }
}

impl From<&str> for EditorRope {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for EditorRope {
    fn from(s: String) -> Self {
        Self::from_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_operations() {
        let mut rope = EditorRope::from_str("# Notes\n");
        assert_eq!(rope.len_chars(), 8);

        rope.push("body text");
        assert_eq!(rope.text(), "# Notes\nbody text");

        rope.delete(7..8);
        assert_eq!(rope.text(), "# Notesbody text");
    }

    #[test]
    fn replace_records_single_edit() {
        let mut rope = EditorRope::from_str("hello world");
        rope.replace(6..11, "rust");
        assert_eq!(rope.text(), "hello rust");

        let edit = rope.last_edit().unwrap();
        assert_eq!(edit.char_pos, 6);
        assert_eq!(edit.deleted_len, 5);
        assert_eq!(edit.inserted_len, 4);
        assert_eq!(edit.doc_len_after, 10);
    }

    #[test]
    fn char_at_and_slice_bounds() {
        let rope = EditorRope::from_str("abc");
        assert_eq!(rope.char_at(0), Some('a'));
        assert_eq!(rope.char_at(3), None);
        assert_eq!(rope.slice(1..3).as_deref(), Some("bc"));
        assert_eq!(rope.slice(1..4), None);
    }

    #[test]
    fn offset_conversion_multibyte() {
        // "día" - 'í' is 2 bytes, 1 char
        let rope = EditorRope::from_str("día");
        assert_eq!(rope.len_chars(), 3);
        assert_eq!(rope.len_bytes(), 4);
        assert_eq!(rope.char_to_byte(2), 3);
        assert_eq!(rope.byte_to_char(3), 2);
    }
}
