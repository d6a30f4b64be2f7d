//! The application controller.
//!
//! One [`Controller`] owns the whole headless core: editor, preview,
//! search, tabs, config and shortcuts. The shell feeds it edits, key
//! chords and menu actions; the controller keeps every component
//! consistent and answers with an [`ActionOutcome`] when the shell has
//! to open one of its own panels.
//!
//! All state changes go through `&mut self`, so edits, renders and tab
//! switches are applied strictly in call order.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use serde_json::json;
use smol_str::SmolStr;
use tokio::time::{Duration, Instant, sleep_until};
use tracing::{debug, error};

use inkdown_editor::{
    DocumentStats, Editor, FormatKind, MatchSet, SearchEngine, SearchMatch, TemplateInsertMode,
};
use inkdown_render::{
    DiagramEngine, Extensions, MathTypesetter, Preview, RenderOptions, Theme, standalone_document,
};
use inkdown_session::{
    ConfigBackend, ConfigStore, KeyChord, Platform, SessionError, ShortcutCommand,
    ShortcutRegistry, ShortcutRow, TabSession, Template, UNTITLED, templates,
};

use crate::actions::{ActionId, ActionOutcome, Panel};
use crate::error::{AppError, Result};
use crate::host::{
    Confirm, FileError, HTML_FILTERS, Host, MARKDOWN_FILTERS, MessageKind, PDF_FILTERS,
};

fn theme_of(config: &ConfigStore) -> Theme {
    if config.theme() == "dark" {
        Theme::Dark
    } else {
        Theme::Light
    }
}

fn extensions_of(config: &ConfigStore) -> Extensions {
    Extensions {
        math: config.markdown_math(),
        mermaid: config.markdown_mermaid(),
        callouts: config.markdown_callouts(),
    }
}

pub struct Controller<H, M = (), D = ()> {
    host: H,
    config: ConfigStore,
    tabs: TabSession,
    editor: Editor,
    preview: Preview<M, D>,
    finder: SearchEngine,
    shortcuts: ShortcutRegistry,
    /// Last saved content per tab id. A tab with no entry counts as
    /// modified until its next save.
    baselines: HashMap<SmolStr, String>,
    auto_save_at: Option<Instant>,
}

impl<H, M, D> Controller<H, M, D>
where
    H: Host,
    M: MathTypesetter,
    D: DiagramEngine,
{
    /// Build a controller around an already-loaded config. The preview
    /// starts with the theme and markdown extensions the config holds.
    pub fn new(host: H, config: ConfigStore, math: M, diagrams: D) -> Self {
        let options = RenderOptions {
            extensions: extensions_of(&config),
        };
        let preview = Preview::new(options, math, diagrams, theme_of(&config));
        Self {
            host,
            config,
            tabs: TabSession::new(),
            editor: Editor::new(),
            preview,
            finder: SearchEngine::new(),
            shortcuts: ShortcutRegistry::default(),
            baselines: HashMap::new(),
            auto_save_at: None,
        }
    }

    /// Load the config from the backend and restore the previous
    /// session, falling back to one empty Untitled tab.
    pub async fn bootstrap(host: H, backend: &impl ConfigBackend, math: M, diagrams: D) -> Self {
        let config = ConfigStore::load(backend).await;
        let mut controller = Self::new(host, config, math, diagrams);
        controller.restore_session();
        controller
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn preview(&self) -> &Preview<M, D> {
        &self.preview
    }

    pub fn tabs(&self) -> &TabSession {
        &self.tabs
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn shortcuts(&self) -> &ShortcutRegistry {
        &self.shortcuts
    }

    // ---- session lifecycle ----

    /// Restore the tab set saved by the previous run; when nothing was
    /// saved, start with one empty Untitled tab. Either way the active
    /// tab lands in the editor and the preview renders immediately.
    pub fn restore_session(&mut self) -> bool {
        let restored = self.tabs.restore_from(&self.config);
        if restored {
            self.baselines = self
                .tabs
                .iter()
                .filter(|tab| !tab.modified)
                .map(|tab| (tab.id.clone(), tab.content.clone()))
                .collect();
        } else {
            let id = self.tabs.create_tab(None, "");
            self.baselines.insert(id, String::new());
        }
        self.load_active_tab();
        restored
    }

    /// Snapshot the session into the config tree and flush it through
    /// the backend.
    pub async fn persist_session(&mut self, backend: &impl ConfigBackend) -> Result<()> {
        self.snapshot_active_view();
        self.tabs.save_to(&mut self.config)?;
        self.config
            .flush(backend)
            .await
            .map_err(AppError::Persist)?;
        debug!(target: "inkdown::app", tabs = self.tabs.len(), "session persisted");
        Ok(())
    }

    // ---- editing ----

    /// Insert at the caret, replacing the selection if one exists.
    pub fn insert_text(&mut self, text: &str) {
        self.editor.insert(text);
        self.sync_after_edit();
    }

    /// Replace an arbitrary char range; false when out of bounds.
    pub fn replace_range(&mut self, range: Range<usize>, text: &str) -> bool {
        let changed = self.editor.replace_range(range, text);
        if changed {
            self.sync_after_edit();
        }
        changed
    }

    pub fn set_cursor(&mut self, offset: usize) {
        self.editor.set_cursor(offset);
    }

    pub fn set_selection(&mut self, anchor: usize, head: usize) {
        self.editor.set_selection(anchor, head);
    }

    pub fn apply_formatting(&mut self, kind: FormatKind) {
        self.editor.apply_formatting(kind);
        self.sync_after_edit();
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.editor.undo();
        if changed {
            self.sync_after_edit();
        }
        changed
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.editor.redo();
        if changed {
            self.sync_after_edit();
        }
        changed
    }

    /// Record an editor scroll and mirror it onto the preview.
    pub fn on_editor_scroll(&mut self, fraction: f64) {
        self.editor.set_scroll(fraction);
        if let Some(id) = self.tabs.active_id() {
            self.tabs.update_scroll(&id, self.editor.scroll());
        }
        self.preview.sync_scroll(self.editor.scroll());
    }

    /// Document statistics using the configured reading speed.
    pub fn stats(&self) -> DocumentStats {
        let wpm = self.config.words_per_minute().round().max(1.0) as u32;
        self.editor.stats(wpm)
    }

    // ---- search ----

    pub fn find(&mut self, query: &str) -> &MatchSet {
        self.finder.search(&self.editor, query)
    }

    pub fn matches(&self) -> &MatchSet {
        self.finder.match_set()
    }

    pub fn find_next(&mut self) -> Option<SearchMatch> {
        self.finder.next(&mut self.editor)
    }

    pub fn find_previous(&mut self) -> Option<SearchMatch> {
        self.finder.previous(&mut self.editor)
    }

    pub fn replace_current(&mut self, replacement: &str) -> bool {
        let replaced = self.finder.replace(&mut self.editor, replacement);
        if replaced {
            self.sync_after_edit();
        }
        replaced
    }

    pub fn replace_all(&mut self, replacement: &str) -> usize {
        let count = self.finder.replace_all(&mut self.editor, replacement);
        if count > 0 {
            self.sync_after_edit();
        }
        count
    }

    pub fn clear_search(&mut self) {
        self.finder.clear();
    }

    // ---- templates and snippets ----

    /// Built-in templates followed by the user's custom ones. A stored
    /// record with a builtin's id (a usage-stamped copy) replaces the
    /// shipped entry.
    pub fn available_templates(&self) -> Vec<Template> {
        let mut all = templates::builtin_templates();
        for stored in self.config.templates() {
            match all.iter().position(|known| known.id == stored.id) {
                Some(slot) => all[slot] = stored,
                None => all.push(stored),
            }
        }
        all
    }

    /// Fill a template with placeholder values and insert it, stamping
    /// its last-used time. The shell collects `id`, `values` and `mode`
    /// through its picker panel.
    pub fn insert_template(
        &mut self,
        id: &str,
        values: &HashMap<SmolStr, String>,
        mode: TemplateInsertMode,
    ) -> Result<()> {
        let template = self
            .available_templates()
            .into_iter()
            .find(|template| template.id == id)
            .ok_or_else(|| SessionError::TemplateNotFound {
                id: SmolStr::new(id),
            })?;
        let filled = templates::fill(&template.content, values);
        self.editor.insert_template(&filled, mode);
        self.sync_after_edit();
        self.config.record_template_use(&template);
        Ok(())
    }

    /// Expand a snippet by trigger at the caret.
    pub fn expand_snippet(&mut self, trigger: &str, values: &HashMap<SmolStr, String>) -> Result<()> {
        let snippet = self
            .config
            .snippets()
            .into_iter()
            .find(|snippet| snippet.trigger == trigger)
            .ok_or_else(|| SessionError::SnippetNotFound {
                trigger: SmolStr::new(trigger),
            })?;
        let filled = templates::fill(&snippet.content, values);
        self.editor.insert(&filled);
        self.sync_after_edit();
        Ok(())
    }

    // ---- tabs ----

    /// Open a fresh Untitled tab and switch to it.
    pub fn new_tab(&mut self) -> SmolStr {
        self.snapshot_active_view();
        let id = self.tabs.create_tab(None, "");
        self.baselines.insert(id.clone(), String::new());
        self.tabs.activate(&id);
        self.load_active_tab();
        id
    }

    /// Switch tabs, snapshotting the outgoing tab's view state first.
    /// Switching to the already-active tab is a no-op.
    pub fn switch_to(&mut self, id: &str) -> Result<()> {
        if self.tabs.get(id).is_none() {
            return Err(SessionError::TabNotFound {
                id: SmolStr::new(id),
            }
            .into());
        }
        if self.tabs.active_id().as_deref() != Some(id) {
            self.snapshot_active_view();
            self.tabs.activate(id);
            self.load_active_tab();
            debug!(target: "inkdown::app", tab = id, "switched tab");
        }
        Ok(())
    }

    pub fn next_tab(&mut self) -> Result<()> {
        match self.tabs.next_tab_id() {
            Some(id) => self.switch_to(&id),
            None => Ok(()),
        }
    }

    pub fn previous_tab(&mut self) -> Result<()> {
        match self.tabs.previous_tab_id() {
            Some(id) => self.switch_to(&id),
            None => Ok(()),
        }
    }

    /// Close a tab, asking for confirmation when it has unsaved
    /// changes. Returns whether it actually closed.
    pub async fn close_tab(&mut self, id: &str) -> Result<bool> {
        let Some(tab) = self.tabs.get(id) else {
            return Err(SessionError::TabNotFound {
                id: SmolStr::new(id),
            }
            .into());
        };
        let modified = tab.modified;
        let title = tab.title.clone();
        if modified {
            let message = format!("\"{title}\" has unsaved changes. Close it anyway?");
            if self.host.confirm("Unsaved changes", &message).await != Confirm::Yes {
                debug!(target: "inkdown::app", tab = id, "close declined");
                return Ok(false);
            }
        }
        let was_active = self.tabs.active_id().as_deref() == Some(id);
        self.tabs.close_tab(id);
        self.baselines.remove(id);
        if was_active {
            self.load_active_tab();
        }
        Ok(true)
    }

    pub async fn close_active_tab(&mut self) -> Result<bool> {
        match self.tabs.active_id() {
            Some(id) => self.close_tab(&id).await,
            None => Ok(false),
        }
    }

    // ---- files ----

    /// Read a file and show it in a tab. A tab already holding the path
    /// is focused instead of duplicated; a pristine Untitled tab is
    /// reused instead of leaving an empty shell behind. Read failures
    /// are reported through the host and change nothing.
    pub async fn open_path(&mut self, path: &Path) -> Result<()> {
        let content = match self.host.read_file(path).await {
            Ok(content) => content,
            Err(err) => return self.report_file_error("open", path, err).await,
        };

        self.config.add_recent_file(&path.to_string_lossy());

        if let Some(existing) = self.tabs.find_by_path(path) {
            return self.switch_to(&existing);
        }

        let reuse = self
            .tabs
            .active()
            .filter(|tab| tab.path.is_none() && !tab.modified && tab.content.is_empty())
            .map(|tab| tab.id.clone());
        let id = match reuse {
            Some(id) => {
                self.tabs.set_path(&id, Some(path.to_path_buf()));
                self.tabs.update_content(&id, &content);
                id
            }
            None => {
                self.snapshot_active_view();
                self.tabs.create_tab(Some(path.to_path_buf()), content.clone())
            }
        };
        self.baselines.insert(id.clone(), content);
        self.tabs.activate(&id);
        self.load_active_tab();
        debug!(target: "inkdown::app", path = %path.display(), tab = %id, "opened file");
        Ok(())
    }

    /// Save the active tab. `always_ask` forces the save dialog even
    /// when the tab has a path (Save As). Returns whether a file was
    /// written; a cancelled dialog is not an error.
    pub async fn save_active(&mut self, always_ask: bool) -> Result<bool> {
        let Some(tab) = self.tabs.active() else {
            return Ok(false);
        };
        let id = tab.id.clone();
        let known = tab.path.clone();

        let path = match (known, always_ask) {
            (Some(path), false) => path,
            _ => match self.host.show_save_dialog(MARKDOWN_FILTERS).await {
                Some(path) => path,
                None => {
                    debug!(target: "inkdown::app", tab = %id, "save cancelled");
                    return Ok(false);
                }
            },
        };

        // The exact bytes of the document, no BOM, no normalization.
        let content = self.editor.value();
        if let Err(err) = self.host.write_file(&path, content.as_bytes()).await {
            self.report_file_error("save", &path, err).await?;
            return Ok(false);
        }

        self.tabs.set_path(&id, Some(path.clone()));
        self.tabs.update_content(&id, &content);
        self.tabs.set_modified(&id, false);
        self.baselines.insert(id.clone(), content);
        self.config.add_recent_file(&path.to_string_lossy());
        self.auto_save_at = None;
        debug!(target: "inkdown::app", tab = %id, path = %path.display(), "saved");
        Ok(true)
    }

    /// Wait out the auto-save delay and save if still due. Returns
    /// whether a save happened.
    ///
    /// Cancel safe: the deadline is only cleared after the timer fires,
    /// so shells can select this against other events.
    pub async fn run_auto_save(&mut self) -> Result<bool> {
        let Some(deadline) = self.auto_save_at else {
            return Ok(false);
        };
        sleep_until(deadline).await;
        if self.auto_save_at != Some(deadline) {
            return Ok(false);
        }
        self.auto_save_at = None;

        let due = self.config.auto_save_enabled()
            && self
                .tabs
                .active()
                .is_some_and(|tab| tab.modified && tab.path.is_some());
        if !due {
            return Ok(false);
        }
        let saved = self.save_active(false).await?;
        if saved {
            debug!(target: "inkdown::app", "auto-saved");
        }
        Ok(saved)
    }

    pub fn auto_save_pending(&self) -> bool {
        self.auto_save_at.is_some()
    }

    // ---- preview ----

    /// Wait out the render debounce and commit the pending render, if
    /// any. Returns whether the preview HTML changed.
    pub async fn run_pending_render(&mut self) -> bool {
        self.preview.run_pending().await
    }

    pub fn render_pending(&self) -> bool {
        self.preview.has_pending()
    }

    pub fn set_preview_geometry(&mut self, content_height: f64, viewport_height: f64) {
        self.preview.set_geometry(content_height, viewport_height);
    }

    /// Switch the color scheme everywhere typeset output depends on it.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        self.config.set("theme", json!(theme.as_str()))?;
        self.preview.set_theme(theme);
        Ok(())
    }

    pub fn toggle_theme(&mut self) -> Result<()> {
        let next = match theme_of(&self.config) {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        };
        self.set_theme(next)
    }

    /// Apply new markdown extension toggles and re-render immediately.
    pub fn set_markdown_extensions(&mut self, extensions: Extensions) -> Result<()> {
        self.config.set("markdown.math", json!(extensions.math))?;
        self.config
            .set("markdown.mermaid", json!(extensions.mermaid))?;
        self.config
            .set("markdown.callouts", json!(extensions.callouts))?;
        self.preview.set_options(RenderOptions { extensions });
        self.preview.request_render(&self.editor.value(), true);
        Ok(())
    }

    // ---- shortcuts ----

    pub fn set_shortcut(&mut self, action: &str, binding: &str) -> Result<()> {
        self.shortcuts
            .set_shortcut(&mut self.config, action, binding)?;
        Ok(())
    }

    pub fn reset_shortcut(&mut self, action: &str) -> Result<bool> {
        Ok(self.shortcuts.reset_shortcut(&mut self.config, action)?)
    }

    pub fn shortcut_rows(&self) -> Vec<ShortcutRow> {
        self.shortcuts.all_shortcuts(&self.config)
    }

    /// Dispatch a physical key chord. `None` when no binding matched.
    /// The matched row carries its command, so every registered action
    /// has a handler here.
    pub async fn handle_chord(
        &mut self,
        chord: &KeyChord,
        platform: Platform,
    ) -> Result<Option<ActionOutcome>> {
        let Some(spec) = self.shortcuts.match_chord(&self.config, chord, platform) else {
            return Ok(None);
        };
        debug!(target: "inkdown::app", action = spec.id, "chord matched");
        let outcome = match spec.command {
            ShortcutCommand::NewTab => self.handle_action(ActionId::New).await?,
            ShortcutCommand::OpenFile => self.handle_action(ActionId::Open).await?,
            ShortcutCommand::Save => self.handle_action(ActionId::Save).await?,
            ShortcutCommand::SaveAs => self.handle_action(ActionId::SaveAs).await?,
            ShortcutCommand::CloseTab => {
                self.close_active_tab().await?;
                ActionOutcome::Done
            }
            ShortcutCommand::Undo => self.handle_action(ActionId::Undo).await?,
            ShortcutCommand::Redo => self.handle_action(ActionId::Redo).await?,
            ShortcutCommand::Find => self.handle_action(ActionId::Find).await?,
            ShortcutCommand::Bold => {
                self.apply_formatting(FormatKind::Bold);
                ActionOutcome::Done
            }
            ShortcutCommand::Italic => {
                self.apply_formatting(FormatKind::Italic);
                ActionOutcome::Done
            }
            ShortcutCommand::InlineCode => {
                self.apply_formatting(FormatKind::Code);
                ActionOutcome::Done
            }
            ShortcutCommand::Strikethrough => {
                self.apply_formatting(FormatKind::Strikethrough);
                ActionOutcome::Done
            }
            ShortcutCommand::ToggleTheme => self.handle_action(ActionId::ToggleTheme).await?,
            ShortcutCommand::FocusMode => self.handle_action(ActionId::FocusMode).await?,
            ShortcutCommand::ToggleStatistics => {
                self.handle_action(ActionId::ToggleStatistics).await?
            }
            ShortcutCommand::NextTab => {
                self.next_tab()?;
                ActionOutcome::Done
            }
            ShortcutCommand::PreviousTab => {
                self.previous_tab()?;
                ActionOutcome::Done
            }
            ShortcutCommand::InsertTemplate => {
                self.handle_action(ActionId::InsertTemplate).await?
            }
        };
        Ok(Some(outcome))
    }

    // ---- actions ----

    /// Dispatch one menu action.
    pub async fn handle_action(&mut self, action: ActionId) -> Result<ActionOutcome> {
        debug!(target: "inkdown::app", action = %action, "action");
        match action {
            ActionId::New => {
                self.new_tab();
            }
            ActionId::Open => match self.host.show_open_dialog(MARKDOWN_FILTERS).await {
                Some(path) => self.open_path(&path).await?,
                None => debug!(target: "inkdown::app", "open cancelled"),
            },
            ActionId::Save => {
                self.save_active(false).await?;
            }
            ActionId::SaveAs => {
                self.save_active(true).await?;
            }
            ActionId::ExportHtml => self.export_html().await?,
            ActionId::ExportPdf => self.export_pdf().await?,
            ActionId::Undo => {
                self.undo();
            }
            ActionId::Redo => {
                self.redo();
            }
            ActionId::Find => return Ok(ActionOutcome::OpenPanel(Panel::Search)),
            ActionId::ToggleTheme => self.toggle_theme()?,
            ActionId::ViewModeEditor => self.config.set("viewMode", json!("editor"))?,
            ActionId::ViewModePreview => self.config.set("viewMode", json!("preview"))?,
            ActionId::ViewModeSplit => self.config.set("viewMode", json!("split"))?,
            ActionId::FocusMode => {
                let active = self.config.focus_mode_last_used();
                self.config.set("focusMode.lastUsed", json!(!active))?;
            }
            ActionId::InsertTemplate => {
                return Ok(ActionOutcome::OpenPanel(Panel::TemplatePicker));
            }
            ActionId::ToggleStatistics => {
                let visible = self.config.statistics_visible();
                self.config.set("statistics.visible", json!(!visible))?;
            }
            ActionId::ToggleAutoSave => {
                let enabled = self.config.auto_save_enabled();
                self.config.set("autoSave.enabled", json!(!enabled))?;
                if enabled {
                    self.auto_save_at = None;
                }
            }
            ActionId::AutoSaveSettings => {
                return Ok(ActionOutcome::OpenPanel(Panel::AutoSaveSettings));
            }
            ActionId::OpenKeyboardShortcuts => {
                return Ok(ActionOutcome::OpenPanel(Panel::KeyboardShortcuts));
            }
            ActionId::AdvancedMarkdownSettings => {
                return Ok(ActionOutcome::OpenPanel(Panel::MarkdownSettings));
            }
        }
        Ok(ActionOutcome::Done)
    }

    /// Hand a clicked link to the system browser.
    pub async fn open_link(&self, url: &str) {
        debug!(target: "inkdown::app", url, "opening external link");
        self.host.open_external(url).await;
    }

    // ---- internals ----

    /// Propagate the editor's content to the active tab, the preview
    /// and the auto-save timer. Every edit funnels through here, in
    /// call order.
    fn sync_after_edit(&mut self) {
        let Some(id) = self.tabs.active_id() else {
            return;
        };
        let content = self.editor.value();
        self.tabs.update_content(&id, &content);
        let modified = self
            .baselines
            .get(&id)
            .map(|baseline| *baseline != content)
            .unwrap_or(true);
        self.tabs.set_modified(&id, modified);
        self.preview.request_render(&content, false);
        if modified {
            self.arm_auto_save(&id);
        } else {
            self.auto_save_at = None;
        }
    }

    fn arm_auto_save(&mut self, id: &str) {
        let has_path = self.tabs.get(id).is_some_and(|tab| tab.path.is_some());
        if has_path && self.config.auto_save_enabled() {
            let delay = Duration::from_secs(self.config.auto_save_delay_secs());
            self.auto_save_at = Some(Instant::now() + delay);
        }
    }

    /// Write the editor's cursor and scroll back to the active tab.
    fn snapshot_active_view(&mut self) {
        if let Some(id) = self.tabs.active_id() {
            self.tabs.update_cursor(&id, self.editor.cursor());
            self.tabs.update_scroll(&id, self.editor.scroll());
        }
    }

    /// Load the active tab into the editor and render it immediately;
    /// with no tabs left, clear both. Search state never survives a
    /// document swap.
    fn load_active_tab(&mut self) {
        match self.tabs.active() {
            Some(tab) => {
                let content = tab.content.clone();
                let cursor = tab.cursor;
                let scroll = tab.scroll;
                self.editor.set_value_silent(&content);
                self.editor.set_cursor(cursor);
                self.editor.set_scroll(scroll);
                self.preview.request_render(&content, true);
                self.preview.sync_scroll(scroll);
            }
            None => {
                self.editor.set_value_silent("");
                self.preview.request_render("", true);
            }
        }
        self.finder.clear();
        self.auto_save_at = None;
    }

    fn render_standalone(&mut self) -> Result<String> {
        let content = self.editor.value();
        self.preview.request_render(&content, true);
        let title = self
            .tabs
            .active()
            .map(|tab| tab.title.clone())
            .unwrap_or_else(|| SmolStr::new(UNTITLED));
        Ok(standalone_document(
            &title,
            self.preview.theme(),
            self.preview.html(),
        )?)
    }

    async fn export_html(&mut self) -> Result<()> {
        let Some(dest) = self.host.show_save_dialog(HTML_FILTERS).await else {
            return Ok(());
        };
        let doc = self.render_standalone()?;
        if let Err(err) = self.host.write_file(&dest, doc.as_bytes()).await {
            return self.report_file_error("export", &dest, err).await;
        }
        debug!(target: "inkdown::app", path = %dest.display(), "exported html");
        Ok(())
    }

    async fn export_pdf(&mut self) -> Result<()> {
        let Some(dest) = self.host.show_save_dialog(PDF_FILTERS).await else {
            return Ok(());
        };
        let doc = self.render_standalone()?;
        if let Err(err) = self.host.export_pdf(&doc, &dest).await {
            return self.report_file_error("export", &dest, err).await;
        }
        debug!(target: "inkdown::app", path = %dest.display(), "exported pdf");
        Ok(())
    }

    /// Tell the user about a failed file operation. Stale recent-files
    /// entries are purged on the way; nothing else changes.
    async fn report_file_error(&mut self, verb: &str, path: &Path, err: FileError) -> Result<()> {
        if err == FileError::NotFound && self.config.remove_recent_file(&path.to_string_lossy()) {
            debug!(target: "inkdown::app", path = %path.display(), "purged stale recent file");
        }
        error!(
            target: "inkdown::app",
            path = %path.display(),
            error = %err,
            "file {verb} failed"
        );
        let message = format!("Could not {verb} {}: {err}", path.display());
        self.host.show_message(MessageKind::Error, &message).await;
        Ok(())
    }
}
