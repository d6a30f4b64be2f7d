//! Inline formatting toggles.
//!
//! Formatting is literal marker handling, not markdown parsing: a toggle
//! wraps the selection in the marker pair, or removes the pair when the
//! selection already starts and ends with it. Applying the same toggle
//! twice to a non-empty selection restores the original text.

use crate::text::TextBuffer;
use crate::types::Selection;

/// Inline formatting commands and their literal markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Bold,
    Italic,
    Code,
    Strikethrough,
}

impl FormatKind {
    /// The marker placed on both sides of the text.
    pub fn marker(&self) -> &'static str {
        match self {
            FormatKind::Bold => "**",
            FormatKind::Italic => "*",
            FormatKind::Code => "`",
            FormatKind::Strikethrough => "~~",
        }
    }
}

/// Toggle `marker` around the selection. Returns the selection after the
/// edit.
///
/// - Collapsed selection: insert the pair, caret between the markers.
/// - Selection already delimited by the marker on both sides: unwrap.
/// - Anything else: wrap, and select the wrapped span so the next toggle
///   sees the markers.
pub(crate) fn apply_toggle<T: TextBuffer>(
    buffer: &mut T,
    selection: Selection,
    marker: &str,
) -> Selection {
    let mlen = marker.chars().count();
    let (start, end) = (selection.start(), selection.end());

    if start == end {
        buffer.insert(start, &format!("{marker}{marker}"));
        return Selection::caret(start + mlen);
    }

    let Some(text) = buffer.slice(start..end) else {
        return selection;
    };

    let delimited =
        text.starts_with(marker) && text.ends_with(marker) && text.chars().count() >= 2 * mlen;

    if delimited {
        // Marker bytes are ASCII, so byte slicing at marker.len() is safe
        // once starts_with/ends_with hold.
        let inner = &text[marker.len()..text.len() - marker.len()];
        buffer.replace(start..end, inner);
        Selection::new(start, end - 2 * mlen)
    } else {
        buffer.replace(start..end, &format!("{marker}{text}{marker}"));
        Selection::new(start, end + 2 * mlen)
    }
}
