//! Debounced preview of rendered markdown.
//!
//! The preview holds the renderer, the post-processor and the current
//! HTML. Re-render requests go through a single pending slot: within the
//! debounce window the last writer wins, and a request for content equal
//! to what is already shown is dropped. Commits are serialized by `&mut`
//! access; nothing here spawns tasks.

use tokio::time::{Duration, Instant, sleep_until};
use tracing::{debug, error};

use crate::parser::MarkdownRenderer;
use crate::postprocess::{DiagramEngine, MathTypesetter, PostProcessor};
use crate::types::{RenderOptions, Theme};

/// Window within which consecutive render requests are coalesced.
pub const RENDER_DEBOUNCE: Duration = Duration::from_millis(300);

/// Shown in place of the document when the render pipeline fails.
pub const PREVIEW_ERROR_HTML: &str =
    r#"<div class="preview-error">Failed to render preview.</div>"#;

struct PendingRender {
    source: String,
    deadline: Instant,
}

pub struct Preview<M, D> {
    renderer: MarkdownRenderer,
    processor: PostProcessor<M, D>,
    html: String,
    /// Source of the last committed render, for the no-op check.
    committed: Option<String>,
    pending: Option<PendingRender>,
    content_height: f64,
    viewport_height: f64,
    scroll_offset: f64,
}

impl Default for Preview<(), ()> {
    fn default() -> Self {
        Self::new(RenderOptions::default(), (), (), Theme::Light)
    }
}

impl<M: MathTypesetter, D: DiagramEngine> Preview<M, D> {
    pub fn new(options: RenderOptions, math: M, diagrams: D, theme: Theme) -> Self {
        Self {
            renderer: MarkdownRenderer::new(options),
            processor: PostProcessor::new(math, diagrams, theme),
            html: String::new(),
            committed: None,
            pending: None,
            content_height: 0.0,
            viewport_height: 0.0,
            scroll_offset: 0.0,
        }
    }

    /// The currently shown HTML.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn options(&self) -> RenderOptions {
        self.renderer.options()
    }

    /// Changing options invalidates the no-op check so the next request
    /// re-renders even for unchanged content.
    pub fn set_options(&mut self, options: RenderOptions) {
        if self.renderer.options() != options {
            self.renderer.set_options(options);
            self.committed = None;
        }
    }

    pub fn theme(&self) -> Theme {
        self.processor.theme()
    }

    /// Propagate a theme change and re-render the current document so
    /// typeset output picks up the new theme.
    pub fn set_theme(&mut self, theme: Theme) {
        self.processor.set_theme(theme);
        if let Some(source) = self.committed.clone() {
            self.commit(source);
        }
    }

    /// Ask for a re-render. `immediate` commits now; otherwise the source
    /// sits in the pending slot until [`Self::run_pending`] drains it,
    /// later requests replacing earlier ones. Content identical to the
    /// last commit is a no-op either way and clears the slot.
    pub fn request_render(&mut self, source: &str, immediate: bool) {
        if self.committed.as_deref() == Some(source) {
            self.pending = None;
            return;
        }
        if immediate {
            self.pending = None;
            self.commit(source.to_owned());
        } else {
            self.pending = Some(PendingRender {
                source: source.to_owned(),
                deadline: Instant::now() + RENDER_DEBOUNCE,
            });
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Wait out the debounce window and commit the pending source, if
    /// any. Returns whether a commit happened.
    ///
    /// Cancel safe: the slot is only taken after the timer fires, so a
    /// cancelled call leaves the request pending.
    pub async fn run_pending(&mut self) -> bool {
        let Some(deadline) = self.pending.as_ref().map(|p| p.deadline) else {
            return false;
        };
        sleep_until(deadline).await;
        match self.pending.take() {
            Some(pending) => {
                self.commit(pending.source);
                true
            }
            None => false,
        }
    }

    fn commit(&mut self, source: String) {
        match self.renderer.render(&source) {
            Ok(rendered) => {
                self.html = self.processor.process(&rendered);
                debug!(
                    target: "inkdown::preview",
                    bytes = source.len(),
                    placeholders = rendered.placeholders.len(),
                    "preview committed"
                );
            }
            Err(err) => {
                error!(target: "inkdown::preview", error = %err, "preview render failed");
                self.html = PREVIEW_ERROR_HTML.to_owned();
            }
        }
        self.committed = Some(source);
    }

    /// Report the rendered content and viewport heights, rescaling the
    /// current offset into the new range.
    pub fn set_geometry(&mut self, content_height: f64, viewport_height: f64) {
        self.content_height = if content_height.is_finite() {
            content_height.max(0.0)
        } else {
            0.0
        };
        self.viewport_height = if viewport_height.is_finite() {
            viewport_height.max(0.0)
        } else {
            0.0
        };
        self.scroll_offset = self.scroll_offset.min(self.scrollable());
    }

    /// One-way scroll coupling from the editor: fraction of the
    /// scrollable range, clamped to [0, 1].
    pub fn sync_scroll(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.scroll_offset = fraction * self.scrollable();
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    /// Inverse of [`Self::sync_scroll`]; 0 when the content does not
    /// scroll.
    pub fn scroll_fraction(&self) -> f64 {
        let scrollable = self.scrollable();
        if scrollable <= 0.0 {
            0.0
        } else {
            self.scroll_offset / scrollable
        }
    }

    fn scrollable(&self) -> f64 {
        (self.content_height - self.viewport_height).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use crate::postprocess::TypesetResult;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn debounce_commits_last_writer_only() {
        let mut preview = Preview::default();
        preview.request_render("one", false);
        preview.request_render("two", false);
        assert_eq!(preview.html(), "");
        assert!(preview.run_pending().await);
        assert_eq!(preview.html(), "<p>two</p>\n");
        // Nothing left in the slot.
        assert!(!preview.run_pending().await);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_bypasses_debounce() {
        let mut preview = Preview::default();
        preview.request_render("stale", false);
        preview.request_render("now", true);
        assert_eq!(preview.html(), "<p>now</p>\n");
        // The immediate commit dropped the stale pending request.
        assert!(!preview.run_pending().await);
        assert_eq!(preview.html(), "<p>now</p>\n");
    }

    #[tokio::test(start_paused = true)]
    async fn identical_content_is_a_noop() {
        let mut preview = Preview::default();
        preview.request_render("same", true);
        let before = preview.html().to_owned();

        preview.request_render("same", false);
        assert!(!preview.has_pending());
        assert!(!preview.run_pending().await);
        assert_eq!(preview.html(), before);

        // A pending request for different content is cancelled when the
        // content reverts to what is already shown.
        preview.request_render("other", false);
        preview.request_render("same", false);
        assert!(!preview.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn changed_options_rerender_unchanged_content() {
        let mut preview = Preview::default();
        preview.request_render("$x^2$", true);
        assert!(preview.html().contains("katex-inline"));

        let mut options = preview.options();
        options.extensions.math = false;
        preview.set_options(options);
        // Same source is not treated as a no-op after an options change.
        preview.request_render("$x^2$", true);
        assert!(preview.html().contains("$x^2$"));
        assert!(!preview.html().contains("katex-inline"));
    }

    struct CountingMath(Cell<usize>);

    impl MathTypesetter for CountingMath {
        fn typeset(&self, source: &str, _display: bool, theme: Theme) -> TypesetResult {
            self.0.set(self.0.get() + 1);
            TypesetResult::Replaced(format!("<math>{source}@{}</math>", theme.as_str()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn theme_change_rerenders_typeset_output() {
        let math = CountingMath(Cell::new(0));
        let mut preview = Preview::new(RenderOptions::default(), &math, (), Theme::Light);
        preview.request_render("$x^2$", true);
        assert!(preview.html().contains("<math>x^2@light</math>"));
        assert_eq!(math.0.get(), 1);

        preview.set_theme(Theme::Dark);
        assert!(preview.html().contains("<math>x^2@dark</math>"));
        assert_eq!(math.0.get(), 2);

        // Unchanged theme does not re-typeset.
        preview.set_theme(Theme::Dark);
        assert_eq!(math.0.get(), 2);
    }

    #[test]
    fn scroll_maps_fraction_to_offset() {
        let mut preview = Preview::default();
        preview.set_geometry(1000.0, 400.0);
        preview.sync_scroll(0.5);
        assert_eq!(preview.scroll_offset(), 300.0);
        assert_eq!(preview.scroll_fraction(), 0.5);

        preview.sync_scroll(7.0);
        assert_eq!(preview.scroll_fraction(), 1.0);
    }

    #[test]
    fn unscrollable_content_reports_zero() {
        let mut preview = Preview::default();
        preview.set_geometry(300.0, 400.0);
        preview.sync_scroll(0.7);
        assert_eq!(preview.scroll_offset(), 0.0);
        assert_eq!(preview.scroll_fraction(), 0.0);
    }

    #[test]
    fn shrinking_geometry_reclamps_offset() {
        let mut preview = Preview::default();
        preview.set_geometry(1000.0, 400.0);
        preview.sync_scroll(1.0);
        assert_eq!(preview.scroll_offset(), 600.0);
        preview.set_geometry(500.0, 400.0);
        assert_eq!(preview.scroll_offset(), 100.0);
        assert_eq!(preview.scroll_fraction(), 1.0);
    }
}
