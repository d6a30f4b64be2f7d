//! Callout blocks: blockquotes whose first line is a `[!TYPE]` marker,
//! optionally followed by `(title)`.
//!
//! Detection works on the text of the quote's first paragraph line; the
//! writer decides between a callout container and a plain blockquote.

use std::sync::LazyLock;

use regex::Regex;
use smol_str::SmolStr;

static CALLOUT_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[!([A-Za-z]+)\]\s*(?:\((.*)\))?\s*$").unwrap()
});

/// The recognized callout types. Anything else falls back to `Note`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalloutKind {
    Note,
    Warning,
    Tip,
    Important,
    Caution,
}

impl CalloutKind {
    fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_uppercase().as_str() {
            "NOTE" => Some(CalloutKind::Note),
            "WARNING" => Some(CalloutKind::Warning),
            "TIP" => Some(CalloutKind::Tip),
            "IMPORTANT" => Some(CalloutKind::Important),
            "CAUTION" => Some(CalloutKind::Caution),
            _ => None,
        }
    }

    /// Suffix for the `callout-*` class.
    pub fn class_suffix(&self) -> &'static str {
        match self {
            CalloutKind::Note => "note",
            CalloutKind::Warning => "warning",
            CalloutKind::Tip => "tip",
            CalloutKind::Important => "important",
            CalloutKind::Caution => "caution",
        }
    }

    /// Title shown when the marker does not provide one.
    pub fn canonical_title(&self) -> &'static str {
        match self {
            CalloutKind::Note => "Note",
            CalloutKind::Warning => "Warning",
            CalloutKind::Tip => "Tip",
            CalloutKind::Important => "Important",
            CalloutKind::Caution => "Caution",
        }
    }
}

/// A resolved callout head: kind plus display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalloutHead {
    pub kind: CalloutKind,
    pub title: SmolStr,
}

/// Match the first line of a blockquote against the callout marker.
///
/// Unknown types keep their text: `[!FOO]` becomes a note titled "FOO",
/// `[!FOO](Custom)` a note titled "Custom".
pub fn parse_marker(line: &str) -> Option<CalloutHead> {
    let caps = CALLOUT_MARKER_RE.captures(line.trim())?;
    let token = caps.get(1).map(|m| m.as_str())?;
    let explicit = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty());

    let (kind, fallback) = match CalloutKind::from_token(token) {
        Some(kind) => (kind, SmolStr::new(kind.canonical_title())),
        None => (CalloutKind::Note, SmolStr::new(token)),
    };

    Some(CalloutHead {
        kind,
        title: explicit.map(SmolStr::new).unwrap_or(fallback),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_case_insensitive() {
        let head = parse_marker("[!warning]").unwrap();
        assert_eq!(head.kind, CalloutKind::Warning);
        assert_eq!(head.title, "Warning");

        let head = parse_marker("[!TIP]").unwrap();
        assert_eq!(head.kind, CalloutKind::Tip);
    }

    #[test]
    fn explicit_title() {
        let head = parse_marker("[!NOTE] (Read me first)").unwrap();
        assert_eq!(head.kind, CalloutKind::Note);
        assert_eq!(head.title, "Read me first");
    }

    #[test]
    fn unknown_type_falls_back_to_note_keeping_text() {
        let head = parse_marker("[!BANANA]").unwrap();
        assert_eq!(head.kind, CalloutKind::Note);
        assert_eq!(head.title, "BANANA");

        let head = parse_marker("[!BANANA](Yellow)").unwrap();
        assert_eq!(head.kind, CalloutKind::Note);
        assert_eq!(head.title, "Yellow");
    }

    #[test]
    fn non_markers_do_not_match() {
        assert!(parse_marker("plain quote text").is_none());
        assert!(parse_marker("[!NOTE] trailing words").is_none());
        assert!(parse_marker("[NOTE]").is_none());
        assert!(parse_marker("").is_none());
    }

    #[test]
    fn empty_parens_use_fallback_title() {
        let head = parse_marker("[!CAUTION]()").unwrap();
        assert_eq!(head.title, "Caution");
    }
}
