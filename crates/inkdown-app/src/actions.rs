//! Action identifiers the shell emits from menus and buttons.

/// What the shell must do after the controller handled an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Fully handled inside the core.
    Done,
    /// The core has no UI; the shell should open one of its panels.
    OpenPanel(Panel),
}

/// Shell-owned panels the controller can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Search,
    TemplatePicker,
    AutoSaveSettings,
    KeyboardShortcuts,
    MarkdownSettings,
}

/// One menu or toolbar action, identified on the wire by a stable
/// kebab-case string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionId {
    New,
    Open,
    Save,
    SaveAs,
    ExportHtml,
    ExportPdf,
    Undo,
    Redo,
    Find,
    ToggleTheme,
    ViewModeEditor,
    ViewModePreview,
    ViewModeSplit,
    FocusMode,
    InsertTemplate,
    ToggleStatistics,
    ToggleAutoSave,
    AutoSaveSettings,
    OpenKeyboardShortcuts,
    AdvancedMarkdownSettings,
}

impl ActionId {
    /// Parse a wire string; `None` for anything unknown.
    pub fn parse(id: &str) -> Option<ActionId> {
        Self::all()
            .iter()
            .copied()
            .find(|action| action.as_str() == id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionId::New => "new",
            ActionId::Open => "open",
            ActionId::Save => "save",
            ActionId::SaveAs => "save-as",
            ActionId::ExportHtml => "export-html",
            ActionId::ExportPdf => "export-pdf",
            ActionId::Undo => "undo",
            ActionId::Redo => "redo",
            ActionId::Find => "find",
            ActionId::ToggleTheme => "toggle-theme",
            ActionId::ViewModeEditor => "view-mode-editor",
            ActionId::ViewModePreview => "view-mode-preview",
            ActionId::ViewModeSplit => "view-mode-split",
            ActionId::FocusMode => "focus-mode",
            ActionId::InsertTemplate => "insert-template",
            ActionId::ToggleStatistics => "toggle-statistics",
            ActionId::ToggleAutoSave => "toggle-auto-save",
            ActionId::AutoSaveSettings => "auto-save-settings",
            ActionId::OpenKeyboardShortcuts => "open-keyboard-shortcuts",
            ActionId::AdvancedMarkdownSettings => "advanced-markdown-settings",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ActionId::New => "New Tab",
            ActionId::Open => "Open File",
            ActionId::Save => "Save",
            ActionId::SaveAs => "Save As",
            ActionId::ExportHtml => "Export as HTML",
            ActionId::ExportPdf => "Export as PDF",
            ActionId::Undo => "Undo",
            ActionId::Redo => "Redo",
            ActionId::Find => "Find",
            ActionId::ToggleTheme => "Toggle Theme",
            ActionId::ViewModeEditor => "Editor Only",
            ActionId::ViewModePreview => "Preview Only",
            ActionId::ViewModeSplit => "Split View",
            ActionId::FocusMode => "Focus Mode",
            ActionId::InsertTemplate => "Insert Template",
            ActionId::ToggleStatistics => "Toggle Statistics",
            ActionId::ToggleAutoSave => "Toggle Auto Save",
            ActionId::AutoSaveSettings => "Auto Save Settings",
            ActionId::OpenKeyboardShortcuts => "Keyboard Shortcuts",
            ActionId::AdvancedMarkdownSettings => "Advanced Markdown Settings",
        }
    }

    pub fn all() -> &'static [ActionId] {
        &[
            ActionId::New,
            ActionId::Open,
            ActionId::Save,
            ActionId::SaveAs,
            ActionId::ExportHtml,
            ActionId::ExportPdf,
            ActionId::Undo,
            ActionId::Redo,
            ActionId::Find,
            ActionId::ToggleTheme,
            ActionId::ViewModeEditor,
            ActionId::ViewModePreview,
            ActionId::ViewModeSplit,
            ActionId::FocusMode,
            ActionId::InsertTemplate,
            ActionId::ToggleStatistics,
            ActionId::ToggleAutoSave,
            ActionId::AutoSaveSettings,
            ActionId::OpenKeyboardShortcuts,
            ActionId::AdvancedMarkdownSettings,
        ]
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_strings_round_trip() {
        for action in ActionId::all() {
            assert_eq!(ActionId::parse(action.as_str()), Some(*action));
        }
        assert_eq!(ActionId::parse("save-as"), Some(ActionId::SaveAs));
        assert_eq!(ActionId::parse("frobnicate"), None);
        assert_eq!(ActionId::parse("Save"), None);
    }
}
