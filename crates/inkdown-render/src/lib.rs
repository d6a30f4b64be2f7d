//! Markdown rendering pipeline for inkdown.
//!
//! The pipeline has three stages:
//!
//! 1. [`MarkdownRenderer`] parses markdown and writes HTML, leaving inert
//!    placeholder elements for math and mermaid sources.
//! 2. [`PostProcessor`] activates those placeholders through injected
//!    [`MathTypesetter`] / [`DiagramEngine`] implementations, memoizing
//!    per source and theme.
//! 3. [`Preview`] owns both, debounces re-render requests and answers
//!    scroll queries.
//!
//! Raw HTML in the input is always escaped to visible text; the produced
//! HTML contains only elements this crate wrote itself.

mod autolink;
mod callout;
pub mod document;
mod highlight;
mod html;
pub mod math;
pub mod parser;
pub mod postprocess;
pub mod preview;
pub mod types;

pub use document::standalone_document;
pub use math::LatexTypesetter;
pub use parser::MarkdownRenderer;
pub use postprocess::{DiagramEngine, MathTypesetter, PostProcessor, TypesetResult};
pub use preview::{PREVIEW_ERROR_HTML, Preview, RENDER_DEBOUNCE};
pub use types::{
    Extensions, Placeholder, PlaceholderKind, RenderError, RenderOptions, Rendered, Theme,
};
