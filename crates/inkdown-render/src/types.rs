//! Shared types for the render pipeline.

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Extended-markdown features that can be toggled independently.
///
/// With a feature off, its syntax renders exactly as plain
/// CommonMark+GFM would: dollar text stays text, mermaid fences are
/// ordinary code blocks, callout markers are ordinary blockquote text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extensions {
    pub math: bool,
    pub mermaid: bool,
    pub callouts: bool,
}

impl Default for Extensions {
    fn default() -> Self {
        Self {
            math: true,
            mermaid: true,
            callouts: true,
        }
    }
}

impl Extensions {
    pub const NONE: Extensions = Extensions {
        math: false,
        mermaid: false,
        callouts: false,
    };
}

/// Options for a render pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub extensions: Extensions,
}

/// Color scheme forwarded to placeholder engines. Diagram and math output
/// can depend on it, so changing it invalidates their memoized results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// What a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    MathInline,
    MathBlock,
    Diagram,
}

impl PlaceholderKind {
    /// Closing tag of the emitted placeholder element.
    pub(crate) fn closing_tag(&self) -> &'static str {
        match self {
            PlaceholderKind::MathInline => "</span>",
            PlaceholderKind::MathBlock | PlaceholderKind::Diagram => "</div>",
        }
    }
}

/// An inert element in the rendered HTML waiting for an engine to fill it.
///
/// `fragment` is the exact emitted element text; ids are unique within one
/// render, so replacing the first occurrence of the fragment is exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub id: SmolStr,
    pub kind: PlaceholderKind,
    /// Raw source, not HTML-escaped.
    pub source: String,
    pub fragment: String,
}

/// Output of one parse: HTML plus the placeholders it contains.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub placeholders: Vec<Placeholder>,
}

/// Failures in the markdown-to-HTML pipeline.
#[derive(Debug, Error, Diagnostic)]
pub enum RenderError {
    #[error("html assembly failed")]
    #[diagnostic(code(render::write))]
    Write(#[from] core::fmt::Error),
}
