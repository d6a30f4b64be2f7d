//! In-document search and replace.
//!
//! Matching is case-insensitive with per-char folding, leftmost and
//! non-overlapping: after a match the scan resumes at its end. All
//! positions are char offsets, half-open ranges.

use tracing::debug;

use crate::editor::Editor;

/// One occurrence of the query, as a half-open char range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    pub from: usize,
    pub to: usize,
}

/// All occurrences plus the navigation position.
///
/// `current` is 1-based so a status line can show "3 of 12"; it is 0 when
/// the set is empty or navigation has not started.
#[derive(Debug, Clone, Default)]
pub struct MatchSet {
    matches: Vec<SearchMatch>,
    current: usize,
}

impl MatchSet {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// 1-based index of the current match, 0 when none.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_match(&self) -> Option<&SearchMatch> {
        if self.current == 0 {
            return None;
        }
        self.matches.get(self.current - 1)
    }

    pub fn matches(&self) -> &[SearchMatch] {
        &self.matches
    }
}

/// Search state over an editor buffer.
#[derive(Debug, Default)]
pub struct SearchEngine {
    query: String,
    set: MatchSet,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn match_set(&self) -> &MatchSet {
        &self.set
    }

    /// Run a search over the current document. An empty query clears the
    /// set.
    pub fn search(&mut self, editor: &Editor, query: &str) -> &MatchSet {
        self.query = query.to_owned();
        self.set = MatchSet {
            matches: find_matches(&editor.value(), query),
            current: 0,
        };
        debug!(
            target: "inkdown::search",
            query,
            hits = self.set.matches.len(),
            "search"
        );
        &self.set
    }

    /// Select the next match relative to the caret, wrapping past the end.
    pub fn next(&mut self, editor: &mut Editor) -> Option<SearchMatch> {
        if self.set.matches.is_empty() {
            return None;
        }
        let from_pos = editor.selection().end();
        let idx = self
            .set
            .matches
            .iter()
            .position(|m| m.from >= from_pos)
            .map(|i| i + 1)
            .unwrap_or(1);
        Some(self.select(editor, idx))
    }

    /// Select the previous match relative to the caret, wrapping past the
    /// start.
    pub fn previous(&mut self, editor: &mut Editor) -> Option<SearchMatch> {
        if self.set.matches.is_empty() {
            return None;
        }
        let from_pos = editor.selection().start();
        let idx = self
            .set
            .matches
            .iter()
            .rposition(|m| m.to <= from_pos)
            .map(|i| i + 1)
            .unwrap_or(self.set.matches.len());
        Some(self.select(editor, idx))
    }

    fn select(&mut self, editor: &mut Editor, idx: usize) -> SearchMatch {
        self.set.current = idx;
        let m = self.set.matches[idx - 1];
        editor.set_selection(m.from, m.to);
        m
    }

    /// Replace the current match, then re-run the search on the changed
    /// document. Returns false when navigation has not selected a match.
    pub fn replace(&mut self, editor: &mut Editor, replacement: &str) -> bool {
        let Some(m) = self.set.current_match().copied() else {
            return false;
        };
        editor.replace_range(m.from..m.to, replacement);
        self.refresh(editor);
        true
    }

    /// Replace every match in document order. Unmatched regions are
    /// untouched. Returns the number of replacements.
    pub fn replace_all(&mut self, editor: &mut Editor, replacement: &str) -> usize {
        let count = self.set.matches.len();
        if count == 0 {
            return 0;
        }

        let chars: Vec<char> = editor.value().chars().collect();
        let mut out = String::with_capacity(chars.len() + count * replacement.len());
        let mut pos = 0;
        for m in &self.set.matches {
            out.extend(chars[pos..m.from].iter());
            out.push_str(replacement);
            pos = m.to;
        }
        out.extend(chars[pos..].iter());

        editor.replace_range(0..chars.len(), &out);
        self.refresh(editor);
        count
    }

    pub fn clear(&mut self) {
        self.query.clear();
        self.set = MatchSet::default();
    }

    fn refresh(&mut self, editor: &Editor) {
        self.set = MatchSet {
            matches: find_matches(&editor.value(), &self.query),
            current: 0,
        };
    }
}

fn char_eq_fold(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

fn find_matches(content: &str, query: &str) -> Vec<SearchMatch> {
    if query.is_empty() {
        return Vec::new();
    }

    let hay: Vec<char> = content.chars().collect();
    let needle: Vec<char> = query.chars().collect();
    let mut out = Vec::new();

    let mut i = 0;
    while i + needle.len() <= hay.len() {
        let hit = hay[i..i + needle.len()]
            .iter()
            .zip(&needle)
            .all(|(a, b)| char_eq_fold(*a, *b));
        if hit {
            out.push(SearchMatch {
                from: i,
                to: i + needle.len(),
            });
            i += needle.len();
        } else {
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn case_insensitive_and_non_overlapping() {
        let ed = Editor::with_content("aaaa");
        let mut engine = SearchEngine::new();
        let set = engine.search(&ed, "AA");
        assert_eq!(set.len(), 2);
        assert_eq!(set.matches()[0], SearchMatch { from: 0, to: 2 });
        assert_eq!(set.matches()[1], SearchMatch { from: 2, to: 4 });
    }

    #[test]
    fn empty_query_yields_empty_set() {
        let ed = Editor::with_content("anything");
        let mut engine = SearchEngine::new();
        assert!(engine.search(&ed, "").is_empty());
        assert_eq!(engine.match_set().current(), 0);
    }

    #[test]
    fn unicode_fold() {
        let ed = Editor::with_content("Äpfel essen");
        let mut engine = SearchEngine::new();
        assert_eq!(engine.search(&ed, "äpfel").len(), 1);
    }

    #[test]
    fn next_wraps_around() {
        let mut ed = Editor::with_content("x ab y ab z ab");
        let mut engine = SearchEngine::new();
        engine.search(&ed, "ab");

        let first = engine.next(&mut ed).unwrap();
        assert_eq!(first.from, 2);
        let second = engine.next(&mut ed).unwrap();
        assert_eq!(second.from, 7);
        let third = engine.next(&mut ed).unwrap();
        assert_eq!(third.from, 12);
        assert_eq!(engine.match_set().current(), 3);

        // Past the last match, wrap to the first.
        let wrapped = engine.next(&mut ed).unwrap();
        assert_eq!(wrapped.from, 2);
        assert_eq!(engine.match_set().current(), 1);
    }

    #[test]
    fn previous_wraps_to_last() {
        let mut ed = Editor::with_content("ab .. ab");
        let mut engine = SearchEngine::new();
        engine.search(&ed, "ab");

        ed.set_cursor(0);
        let m = engine.previous(&mut ed).unwrap();
        assert_eq!(m.from, 6);
        assert_eq!(engine.match_set().current(), 2);

        let m = engine.previous(&mut ed).unwrap();
        assert_eq!(m.from, 0);
    }

    #[test]
    fn navigation_starts_from_caret() {
        let mut ed = Editor::with_content("ab ab ab");
        ed.set_cursor(4);
        let mut engine = SearchEngine::new();
        engine.search(&ed, "ab");

        // Caret sits inside the second match; next snaps forward.
        let m = engine.next(&mut ed).unwrap();
        assert_eq!(m.from, 6);
    }

    #[test]
    fn replace_current_only() {
        let mut ed = Editor::with_content("red red red");
        let mut engine = SearchEngine::new();
        engine.search(&ed, "red");

        // No navigation yet: nothing is "current".
        assert!(!engine.replace(&mut ed, "blue"));

        engine.next(&mut ed);
        assert!(engine.replace(&mut ed, "blue"));
        assert_eq!(ed.value(), "blue red red");
        assert_eq!(engine.match_set().len(), 2);
    }

    #[test]
    fn replace_all_preserves_surroundings() {
        let mut ed = Editor::with_content("foo, bar, foo!");
        let mut engine = SearchEngine::new();
        engine.search(&ed, "FOO");
        assert_eq!(engine.replace_all(&mut ed, "qux"), 2);
        assert_eq!(ed.value(), "qux, bar, qux!");
        assert!(engine.match_set().is_empty());
    }

    proptest! {
        #[test]
        fn matches_are_sorted_and_disjoint(
            content in "[a-zA-Z ]{0,40}",
            query in "[a-z]{1,4}",
        ) {
            let found = find_matches(&content, &query);
            for w in found.windows(2) {
                prop_assert!(w[0].to <= w[1].from);
            }
            let lowered: Vec<char> = content.to_lowercase().chars().collect();
            for m in &found {
                let got: String = lowered[m.from..m.to].iter().collect();
                prop_assert_eq!(got, query.clone());
            }
        }

        #[test]
        fn replace_all_removes_every_match(
            content in "[a-z ]{0,40}",
            query in "[a-z]{1,3}",
        ) {
            let mut ed = Editor::with_content(&content);
            let mut engine = SearchEngine::new();
            engine.search(&ed, &query);
            engine.replace_all(&mut ed, "0");
            prop_assert!(engine.search(&ed, &query).is_empty());
        }
    }
}
