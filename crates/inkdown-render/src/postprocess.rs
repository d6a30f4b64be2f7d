//! Placeholder activation after markdown rendering.
//!
//! The writer leaves inert placeholder elements for math and diagrams.
//! [`PostProcessor`] walks them and splices engine output into the HTML,
//! memoizing per source so repeated previews of the same document do not
//! re-typeset unchanged expressions.

use std::collections::HashMap;

use pulldown_cmark_escape::escape_html;
use tracing::{debug, warn};

use crate::types::{Placeholder, PlaceholderKind, Rendered, Theme};

/// What an engine did with a placeholder source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypesetResult {
    /// Finished output to splice into the placeholder element.
    Replaced(String),
    /// Leave the placeholder untouched for a later pass (e.g. a
    /// client-side library that activates elements itself).
    Deferred,
    /// Typesetting failed with the given message.
    Failed(String),
}

/// Typesets math placeholder sources.
pub trait MathTypesetter {
    fn typeset(&self, source: &str, display: bool, theme: Theme) -> TypesetResult;
}

/// Renders diagram placeholder sources.
pub trait DiagramEngine {
    fn render(&self, source: &str, theme: Theme) -> TypesetResult;
}

/// No engine: placeholders stay inert.
impl MathTypesetter for () {
    fn typeset(&self, _source: &str, _display: bool, _theme: Theme) -> TypesetResult {
        TypesetResult::Deferred
    }
}

impl DiagramEngine for () {
    fn render(&self, _source: &str, _theme: Theme) -> TypesetResult {
        TypesetResult::Deferred
    }
}

impl<T: MathTypesetter> MathTypesetter for &T {
    fn typeset(&self, source: &str, display: bool, theme: Theme) -> TypesetResult {
        (**self).typeset(source, display, theme)
    }
}

impl<T: DiagramEngine> DiagramEngine for &T {
    fn render(&self, source: &str, theme: Theme) -> TypesetResult {
        (**self).render(source, theme)
    }
}

impl<T: MathTypesetter> MathTypesetter for Option<T> {
    fn typeset(&self, source: &str, display: bool, theme: Theme) -> TypesetResult {
        match self {
            Some(engine) => engine.typeset(source, display, theme),
            None => TypesetResult::Deferred,
        }
    }
}

impl<T: DiagramEngine> DiagramEngine for Option<T> {
    fn render(&self, source: &str, theme: Theme) -> TypesetResult {
        match self {
            Some(engine) => engine.render(source, theme),
            None => TypesetResult::Deferred,
        }
    }
}

/// Activates placeholders in rendered HTML.
///
/// Failures are isolated per placeholder: a bad diagram leaves an error
/// marker in its place and the rest of the document is unaffected.
pub struct PostProcessor<M, D> {
    math: M,
    diagrams: D,
    theme: Theme,
    cache: HashMap<(PlaceholderKind, String), TypesetResult>,
}

impl Default for PostProcessor<(), ()> {
    fn default() -> Self {
        Self::new((), (), Theme::Light)
    }
}

impl<M: MathTypesetter, D: DiagramEngine> PostProcessor<M, D> {
    pub fn new(math: M, diagrams: D, theme: Theme) -> Self {
        Self {
            math,
            diagrams,
            theme,
            cache: HashMap::new(),
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Theme changes invalidate memoized output so the next pass
    /// re-typesets against the new theme.
    pub fn set_theme(&mut self, theme: Theme) {
        if self.theme != theme {
            self.theme = theme;
            self.cache.clear();
        }
    }

    /// Activate every placeholder in `rendered`, returning the final HTML.
    pub fn process(&mut self, rendered: &Rendered) -> String {
        let mut html = rendered.html.clone();
        for placeholder in &rendered.placeholders {
            match self.outcome_for(placeholder) {
                TypesetResult::Deferred => {}
                TypesetResult::Replaced(content) => {
                    let activated = fill_placeholder(placeholder, &content);
                    html = html.replacen(&placeholder.fragment, &activated, 1);
                }
                TypesetResult::Failed(message) => {
                    warn!(
                        target: "inkdown::render",
                        id = %placeholder.id,
                        error = %message,
                        "placeholder activation failed"
                    );
                    let marker = error_marker(placeholder, &message);
                    html = html.replacen(&placeholder.fragment, &marker, 1);
                }
            }
        }
        html
    }

    fn outcome_for(&mut self, placeholder: &Placeholder) -> TypesetResult {
        let key = (placeholder.kind, placeholder.source.clone());
        if let Some(hit) = self.cache.get(&key) {
            debug!(target: "inkdown::render", id = %placeholder.id, "typeset cache hit");
            return hit.clone();
        }
        let outcome = match placeholder.kind {
            PlaceholderKind::MathInline => self.math.typeset(&placeholder.source, false, self.theme),
            PlaceholderKind::MathBlock => self.math.typeset(&placeholder.source, true, self.theme),
            PlaceholderKind::Diagram => self.diagrams.render(&placeholder.source, self.theme),
        };
        if outcome != TypesetResult::Deferred {
            self.cache.insert(key, outcome.clone());
        }
        outcome
    }
}

/// Insert engine output just before the placeholder's closing tag, keeping
/// the element (id and data attributes included) around it.
fn fill_placeholder(placeholder: &Placeholder, content: &str) -> String {
    let closing = placeholder.kind.closing_tag();
    match placeholder.fragment.strip_suffix(closing) {
        Some(open) => format!("{open}{content}{closing}"),
        None => placeholder.fragment.clone(),
    }
}

fn error_marker(placeholder: &Placeholder, message: &str) -> String {
    let mut escaped_source = String::new();
    let mut escaped_message = String::new();
    let _ = escape_html(&mut escaped_source, &placeholder.source);
    let _ = escape_html(&mut escaped_message, message);
    match placeholder.kind {
        PlaceholderKind::MathInline => format!(
            r#"<span class="katex-error" title="{escaped_message}"><code>{escaped_source}</code></span>"#
        ),
        PlaceholderKind::MathBlock => format!(
            r#"<div class="katex-error" title="{escaped_message}"><code>{escaped_source}</code></div>"#
        ),
        PlaceholderKind::Diagram => format!(
            r#"<div class="diagram-error" title="{escaped_message}"><pre>{escaped_source}</pre></div>"#
        ),
    }
}
