//! Markdown → HTML entry point.

use pulldown_cmark::{Options, Parser};
use tracing::debug;

use crate::autolink::AutoLinker;
use crate::html;
use crate::types::{RenderError, RenderOptions, Rendered};

/// Configurable markdown renderer.
///
/// The base dialect is CommonMark plus tables, strikethrough, task lists
/// and smart punctuation. Raw HTML is always escaped to visible text.
/// Math, mermaid and callouts are independently toggled extensions;
/// turning one off restores base-dialect output for its syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> RenderOptions {
        self.options
    }

    pub fn set_options(&mut self, options: RenderOptions) {
        self.options = options;
    }

    /// Render markdown to HTML plus the placeholders the post-processor
    /// will activate. Empty input renders to nothing.
    pub fn render(&self, source: &str) -> Result<Rendered, RenderError> {
        if source.is_empty() {
            return Ok(Rendered::default());
        }

        let extensions = self.options.extensions;
        let mut dialect = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_SMART_PUNCTUATION;
        if extensions.math {
            dialect |= Options::ENABLE_MATH;
        }

        let parser = Parser::new_ext(source, dialect);
        let mut out = String::new();
        let placeholders = html::push_html(&mut out, AutoLinker::new(parser), extensions)?;
        debug!(
            target: "inkdown::render",
            bytes = source.len(),
            placeholders = placeholders.len(),
            "rendered markdown"
        );
        Ok(Rendered {
            html: out,
            placeholders,
        })
    }
}
