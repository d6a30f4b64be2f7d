//! inkdown-editor: editing state for a markdown document, free of any UI
//! framework.
//!
//! This crate provides:
//! - `TextBuffer` trait for text storage abstraction
//! - `EditorRope` - ropey-backed implementation
//! - `UndoableBuffer<T>` - undo/redo recording over any buffer
//! - `Editor` - cursor, selection, scroll and change notification
//! - Formatting toggles, document search and document statistics

pub mod editor;
pub mod format;
pub mod search;
pub mod stats;
pub mod text;
pub mod types;
pub mod undo;

pub use editor::{Editor, TemplateInsertMode};
pub use format::FormatKind;
pub use search::{MatchSet, SearchEngine, SearchMatch};
pub use smol_str::SmolStr;
pub use stats::{DocumentStats, document_stats};
pub use text::{EditorRope, TextBuffer};
pub use types::{EditInfo, Selection};
pub use undo::{UndoManager, UndoableBuffer};
