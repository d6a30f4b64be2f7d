//! Document statistics for the status bar.

/// Counts shown alongside the editor, plus estimated reading time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub words: usize,
    pub chars: usize,
    /// Whole minutes at the configured words-per-minute rate, at least 1
    /// when there is anything to read.
    pub reading_minutes: u32,
}

/// Compute stats over raw markdown text.
///
/// Words are whitespace-separated runs; markdown syntax is counted as
/// written, matching what the user sees in the editor pane.
pub fn document_stats(text: &str, words_per_minute: u32) -> DocumentStats {
    let words = text.split_whitespace().count();
    let chars = text.chars().count();
    let wpm = words_per_minute.max(1) as usize;
    let reading_minutes = if words == 0 {
        0
    } else {
        words.div_ceil(wpm) as u32
    };
    DocumentStats {
        words,
        chars,
        reading_minutes,
    }
}
