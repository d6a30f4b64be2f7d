//! Fenced code highlighting via syntect.
//!
//! Output is class-annotated spans (`ClassStyle::Spaced`) so the host
//! stylesheet controls the palette; the render pipeline stays
//! theme-independent here.

use std::sync::LazyLock;

use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);

/// Look up a fence language token. Accepts names and extensions
/// ("rust", "rs", "py").
pub fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let token = lang.trim();
    if token.is_empty() {
        return None;
    }
    SYNTAX_SET.find_syntax_by_token(token)
}

/// Highlight a whole code block into classed `<span>` HTML.
pub fn highlight_block(code: &str, syntax: &SyntaxReference) -> Result<String, syntect::Error> {
    let mut generator =
        ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAX_SET, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator.parse_html_for_line_which_includes_newline(line)?;
    }
    Ok(generator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_language_highlights_with_classes() {
        let syntax = find_syntax("rust").unwrap();
        let html = highlight_block("let x = 1;\n", syntax).unwrap();
        assert!(html.contains("<span"));
        assert!(html.contains("class="));
    }

    #[test]
    fn unknown_language_is_none() {
        assert!(find_syntax("not-a-language").is_none());
        assert!(find_syntax("").is_none());
    }

    #[test]
    fn token_lookup_accepts_extensions() {
        assert!(find_syntax("rs").is_some());
        assert!(find_syntax("py").is_some());
    }
}
