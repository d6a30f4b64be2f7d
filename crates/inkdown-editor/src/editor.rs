//! The editing surface: one buffer plus cursor, selection, scroll and
//! change notification.
//!
//! `Editor` is what the application controller talks to. It owns an
//! undo-tracked rope and keeps the selection valid across every mutation.
//! Listeners registered with [`Editor::on_change`] run after any buffer
//! mutation with the full current content.

use std::ops::Range;

use smol_str::SmolStr;
use tracing::debug;

use crate::format::{self, FormatKind};
use crate::stats::{DocumentStats, document_stats};
use crate::text::{EditorRope, TextBuffer};
use crate::types::Selection;
use crate::undo::{UndoManager, UndoableBuffer};

const DEFAULT_UNDO_STEPS: usize = 200;

/// Where template content lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateInsertMode {
    /// Insert at the caret, replacing any selection.
    AtCursor,
    /// Replace the whole document (undoable as one step).
    ReplaceDocument,
}

type ChangeListener = Box<dyn FnMut(&str)>;

/// Editing state for a single document.
pub struct Editor {
    buffer: UndoableBuffer<EditorRope>,
    selection: Selection,
    scroll: f64,
    listeners: Vec<ChangeListener>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor {
    pub fn new() -> Self {
        Self::with_content("")
    }

    pub fn with_content(text: &str) -> Self {
        Self {
            buffer: UndoableBuffer::new(EditorRope::from_str(text), DEFAULT_UNDO_STEPS),
            selection: Selection::caret(0),
            scroll: 0.0,
            listeners: Vec::new(),
        }
    }

    /// Full document text.
    pub fn value(&self) -> String {
        self.buffer.text()
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Replace the whole document and reset undo history.
    ///
    /// This is a document load, not an edit: history starts over and the
    /// caret returns to the top.
    pub fn set_value(&mut self, text: &str) {
        self.load(text);
        self.notify();
    }

    /// Like [`Editor::set_value`] but without notifying listeners. Used
    /// when swapping documents in and out (tab switches), where the caller
    /// manages downstream state itself.
    pub fn set_value_silent(&mut self, text: &str) {
        self.load(text);
    }

    fn load(&mut self, text: &str) {
        debug!(target: "inkdown::editor", chars = text.chars().count(), "load document");
        self.buffer = UndoableBuffer::new(EditorRope::from_str(text), DEFAULT_UNDO_STEPS);
        self.selection = Selection::caret(0);
        self.scroll = 0.0;
    }

    /// Insert at the caret, replacing the selection if one exists.
    pub fn insert(&mut self, text: &str) {
        let range = self.selection.to_range();
        self.buffer.replace(range.clone(), text);
        self.selection = Selection::caret(range.start + text.chars().count());
        self.notify();
    }

    /// Replace an arbitrary char range. Returns false when the range is
    /// out of bounds.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> bool {
        if range.start > range.end || range.end > self.buffer.len_chars() {
            return false;
        }
        self.buffer.replace(range.clone(), text);
        self.selection = Selection::caret(range.start + text.chars().count());
        self.notify();
        true
    }

    /// Insert template content per the chosen mode.
    pub fn insert_template(&mut self, content: &str, mode: TemplateInsertMode) {
        match mode {
            TemplateInsertMode::AtCursor => self.insert(content),
            TemplateInsertMode::ReplaceDocument => {
                let len = self.buffer.len_chars();
                self.buffer.replace(0..len, content);
                self.selection = Selection::caret(content.chars().count());
                self.notify();
            }
        }
    }

    /// Toggle an inline formatting marker around the selection.
    pub fn apply_formatting(&mut self, kind: FormatKind) {
        self.selection = format::apply_toggle(&mut self.buffer, self.selection, kind.marker());
        self.notify();
    }

    /// Caret position in chars.
    pub fn cursor(&self) -> usize {
        self.selection.head
    }

    /// Move the caret, collapsing any selection. Clamped to the document.
    pub fn set_cursor(&mut self, offset: usize) {
        self.selection = Selection::caret(offset.min(self.buffer.len_chars()));
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        let len = self.buffer.len_chars();
        self.selection = Selection::new(anchor.min(len), head.min(len));
    }

    pub fn selected_text(&self) -> Option<SmolStr> {
        if self.selection.is_collapsed() {
            return None;
        }
        self.buffer.slice(self.selection.to_range())
    }

    /// Vertical scroll as a fraction of the scrollable range, in [0, 1].
    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn set_scroll(&mut self, fraction: f64) {
        self.scroll = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
    }

    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.buffer.can_redo()
    }

    /// Undo one step. The caret moves to the end of the restored edit.
    pub fn undo(&mut self) -> bool {
        if !self.buffer.undo() {
            return false;
        }
        self.reposition_after_history();
        self.notify();
        true
    }

    pub fn redo(&mut self) -> bool {
        if !self.buffer.redo() {
            return false;
        }
        self.reposition_after_history();
        self.notify();
        true
    }

    fn reposition_after_history(&mut self) {
        if let Some(edit) = self.buffer.last_edit() {
            let caret = edit.caret_after().min(self.buffer.len_chars());
            self.selection = Selection::caret(caret);
        }
    }

    /// Register a listener invoked after every buffer mutation with the
    /// current content.
    pub fn on_change(&mut self, listener: impl FnMut(&str) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let value = self.buffer.text();
        for listener in &mut self.listeners {
            listener(&value);
        }
    }

    /// Word/char counts and reading time for the current document.
    pub fn stats(&self, words_per_minute: u32) -> DocumentStats {
        document_stats(&self.buffer.text(), words_per_minute)
    }
}
