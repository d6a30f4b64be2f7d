//! Keyboard shortcut registry.
//!
//! Bindings are stored as canonical text (`Mod-Shift-S`): modifiers in
//! the order Mod, Ctrl, Alt, Shift, Meta, then the key. `Mod` stays
//! symbolic in storage and resolves to the platform primary modifier
//! only when a physical chord is matched.

use serde_json::Value;
use smol_str::SmolStr;

use crate::config::ConfigStore;
use crate::error::SessionError;

/// A chord description in canonical text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding(SmolStr);

impl KeyBinding {
    /// Parse and canonicalize user text. `None` when no tokens survive
    /// trimming.
    pub fn parse(text: &str) -> Option<Self> {
        let mut mods = [false; 5];
        let mut key: Option<String> = None;
        for token in text.trim().split('-').filter(|t| !t.is_empty()) {
            match token.to_ascii_lowercase().as_str() {
                "mod" | "cmdorctrl" => mods[0] = true,
                "ctrl" | "control" => mods[1] = true,
                "alt" | "option" => mods[2] = true,
                "shift" => mods[3] = true,
                "meta" | "cmd" | "super" => mods[4] = true,
                _ => key = Some(normalize_key(token)),
            }
        }

        let mut tokens: Vec<&str> = Vec::new();
        for (on, name) in mods.iter().zip(["Mod", "Ctrl", "Alt", "Shift", "Meta"]) {
            if *on {
                tokens.push(name);
            }
        }
        if let Some(key) = &key {
            tokens.push(key);
        }
        if tokens.is_empty() {
            return None;
        }
        Some(Self(SmolStr::new(tokens.join("-"))))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive equality, the comparison conflicts use.
    pub fn conflicts_with(&self, other: &KeyBinding) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    /// Does a physical chord match this binding on the given platform?
    pub fn matches_chord(&self, chord: &KeyChord, platform: Platform) -> bool {
        let mut want = Modifiers::default();
        let mut want_key: Option<&str> = None;
        for token in self.0.split('-') {
            match token {
                "Mod" => match platform {
                    Platform::MacOs => want.meta = true,
                    Platform::Other => want.ctrl = true,
                },
                "Ctrl" => want.ctrl = true,
                "Alt" => want.alt = true,
                "Shift" => want.shift = true,
                "Meta" => want.meta = true,
                key => want_key = Some(key),
            }
        }
        let Some(want_key) = want_key else {
            return false;
        };
        want == chord.modifiers() && want_key.eq_ignore_ascii_case(&chord.key)
    }
}

impl std::fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_key(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Modifiers {
    ctrl: bool,
    alt: bool,
    shift: bool,
    meta: bool,
}

/// A physical key event as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: SmolStr,
}

impl KeyChord {
    fn modifiers(&self) -> Modifiers {
        Modifiers {
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
            meta: self.meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

/// What a matched chord does. Every table row names one, so registration
/// and dispatch share a single source of truth and a new row without a
/// handler fails to compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutCommand {
    NewTab,
    OpenFile,
    Save,
    SaveAs,
    CloseTab,
    Undo,
    Redo,
    Find,
    Bold,
    Italic,
    InlineCode,
    Strikethrough,
    ToggleTheme,
    FocusMode,
    ToggleStatistics,
    NextTab,
    PreviousTab,
    InsertTemplate,
}

/// One known action with its fixed metadata.
#[derive(Debug, Clone, Copy)]
pub struct ActionSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub default_binding: &'static str,
    pub command: ShortcutCommand,
}

use ShortcutCommand::*;

/// Registration order doubles as dispatch precedence: when two actions
/// resolve to the same binding, the earlier row wins at match time.
/// `view:toggle-statistics` ships colliding with `file:save-as`; the
/// conflict reporting below is the mitigation.
const DEFAULT_SHORTCUTS: &[ActionSpec] = &[
    spec("file:new", "New Tab", "File", "Mod-N", NewTab),
    spec("file:open", "Open File", "File", "Mod-O", OpenFile),
    spec("file:save", "Save", "File", "Mod-S", Save),
    spec("file:save-as", "Save As", "File", "Mod-Shift-S", SaveAs),
    spec("file:close-tab", "Close Tab", "File", "Mod-W", CloseTab),
    spec("edit:undo", "Undo", "Edit", "Mod-Z", Undo),
    spec("edit:redo", "Redo", "Edit", "Mod-Shift-Z", Redo),
    spec("edit:find", "Find", "Edit", "Mod-F", Find),
    spec("format:bold", "Bold", "Format", "Mod-B", Bold),
    spec("format:italic", "Italic", "Format", "Mod-I", Italic),
    spec("format:code", "Inline Code", "Format", "Mod-E", InlineCode),
    spec("format:strikethrough", "Strikethrough", "Format", "Mod-Shift-X", Strikethrough),
    spec("view:toggle-theme", "Toggle Theme", "View", "Mod-Shift-L", ToggleTheme),
    spec("view:focus-mode", "Focus Mode", "View", "Mod-Shift-F", FocusMode),
    spec("view:toggle-statistics", "Toggle Statistics", "View", "Mod-Shift-S", ToggleStatistics),
    spec("tabs:next", "Next Tab", "Tabs", "Ctrl-Tab", NextTab),
    spec("tabs:previous", "Previous Tab", "Tabs", "Ctrl-Shift-Tab", PreviousTab),
    spec("insert:template", "Insert Template", "Insert", "Mod-Shift-T", InsertTemplate),
];

const fn spec(
    id: &'static str,
    name: &'static str,
    category: &'static str,
    default_binding: &'static str,
    command: ShortcutCommand,
) -> ActionSpec {
    ActionSpec {
        id,
        name,
        category,
        default_binding,
        command,
    }
}

/// A resolved row for shortcut settings UIs.
#[derive(Debug, Clone)]
pub struct ShortcutRow {
    pub action: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub binding: KeyBinding,
    pub is_default: bool,
}

/// Fixed action table plus per-user overrides stored in config under
/// `keyboardShortcuts.{action}`.
#[derive(Debug, Clone, Copy)]
pub struct ShortcutRegistry {
    actions: &'static [ActionSpec],
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self {
            actions: DEFAULT_SHORTCUTS,
        }
    }
}

impl ShortcutRegistry {
    pub fn actions(&self) -> &'static [ActionSpec] {
        self.actions
    }

    fn spec_for(&self, action: &str) -> Option<&'static ActionSpec> {
        self.actions.iter().find(|spec| spec.id == action)
    }

    fn override_for(&self, config: &ConfigStore, action: &str) -> Option<KeyBinding> {
        let value = config.get(&override_key(action));
        value.as_str().and_then(KeyBinding::parse)
    }

    /// Override when present, else the default; `None` for unknown ids.
    pub fn resolve(&self, config: &ConfigStore, action: &str) -> Option<KeyBinding> {
        let spec = self.spec_for(action)?;
        self.override_for(config, action)
            .or_else(|| KeyBinding::parse(spec.default_binding))
    }

    pub fn set_shortcut(
        &self,
        config: &mut ConfigStore,
        action: &str,
        text: &str,
    ) -> Result<(), SessionError> {
        if self.spec_for(action).is_none() {
            return Err(SessionError::UnknownAction {
                action: SmolStr::new(action),
            });
        }
        let binding = KeyBinding::parse(text).ok_or(SessionError::EmptyBinding)?;
        config.set(
            &override_key(action),
            Value::String(binding.as_str().to_owned()),
        )
    }

    /// Drop the override; resolution falls back to the default. Returns
    /// whether an override existed.
    pub fn reset_shortcut(
        &self,
        config: &mut ConfigStore,
        action: &str,
    ) -> Result<bool, SessionError> {
        if self.spec_for(action).is_none() {
            return Err(SessionError::UnknownAction {
                action: SmolStr::new(action),
            });
        }
        Ok(config.remove(&override_key(action)))
    }

    pub fn reset_all(&self, config: &mut ConfigStore) {
        config.remove("keyboardShortcuts");
    }

    pub fn is_custom(&self, config: &ConfigStore, action: &str) -> bool {
        self.override_for(config, action).is_some()
    }

    /// Every known action with its resolved binding, in registration
    /// order.
    pub fn all_shortcuts(&self, config: &ConfigStore) -> Vec<ShortcutRow> {
        self.actions
            .iter()
            .filter_map(|spec| {
                let binding = self.resolve(config, spec.id)?;
                Some(ShortcutRow {
                    action: spec.id,
                    name: spec.name,
                    category: spec.category,
                    is_default: !self.is_custom(config, spec.id),
                    binding,
                })
            })
            .collect()
    }

    /// First other action resolving to the same binding,
    /// case-insensitively.
    pub fn find_conflict(
        &self,
        config: &ConfigStore,
        binding: &KeyBinding,
        exclude_action: Option<&str>,
    ) -> Option<&'static str> {
        self.actions
            .iter()
            .filter(|spec| Some(spec.id) != exclude_action)
            .find(|spec| {
                self.resolve(config, spec.id)
                    .is_some_and(|resolved| resolved.conflicts_with(binding))
            })
            .map(|spec| spec.id)
    }

    pub fn has_conflict(
        &self,
        config: &ConfigStore,
        binding: &KeyBinding,
        exclude_action: Option<&str>,
    ) -> bool {
        self.find_conflict(config, binding, exclude_action).is_some()
    }

    /// Dispatch a physical chord to its action row. Earlier rows win
    /// when bindings collide.
    pub fn match_chord(
        &self,
        config: &ConfigStore,
        chord: &KeyChord,
        platform: Platform,
    ) -> Option<&'static ActionSpec> {
        self.actions.iter().find(|spec| {
            self.resolve(config, spec.id)
                .is_some_and(|binding| binding.matches_chord(chord, platform))
        })
    }
}

fn override_key(action: &str) -> String {
    format!("keyboardShortcuts.{action}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chord(ctrl: bool, alt: bool, shift: bool, meta: bool, key: &str) -> KeyChord {
        KeyChord {
            ctrl,
            alt,
            shift,
            meta,
            key: SmolStr::new(key),
        }
    }

    #[test]
    fn bindings_canonicalize() {
        assert_eq!(KeyBinding::parse("mod-shift-s").unwrap().as_str(), "Mod-Shift-S");
        assert_eq!(KeyBinding::parse("SHIFT-MOD-s").unwrap().as_str(), "Mod-Shift-S");
        assert_eq!(KeyBinding::parse(" ctrl-alt-delete ").unwrap().as_str(), "Ctrl-Alt-Delete");
        assert_eq!(KeyBinding::parse("cmd-k").unwrap().as_str(), "Meta-K");
        assert!(KeyBinding::parse("   ").is_none());
    }

    #[test]
    fn set_get_reset_round_trip() {
        let registry = ShortcutRegistry::default();
        let mut config = ConfigStore::default();

        registry
            .set_shortcut(&mut config, "file:save", "Mod-Shift-S")
            .unwrap();
        assert_eq!(
            registry.resolve(&config, "file:save").unwrap().as_str(),
            "Mod-Shift-S"
        );
        assert!(registry.is_custom(&config, "file:save"));

        let rows = registry.all_shortcuts(&config);
        let save = rows.iter().find(|r| r.action == "file:save").unwrap();
        assert_eq!(save.binding.as_str(), "Mod-Shift-S");
        assert!(!save.is_default);

        assert!(registry.reset_shortcut(&mut config, "file:save").unwrap());
        assert_eq!(
            registry.resolve(&config, "file:save").unwrap().as_str(),
            "Mod-S"
        );
        assert!(!registry.is_custom(&config, "file:save"));
        assert!(!registry.reset_shortcut(&mut config, "file:save").unwrap());
    }

    #[test]
    fn unknown_action_and_empty_binding_are_rejected() {
        let registry = ShortcutRegistry::default();
        let mut config = ConfigStore::default();

        assert!(matches!(
            registry.set_shortcut(&mut config, "file:frobnicate", "Mod-X"),
            Err(SessionError::UnknownAction { .. })
        ));
        assert!(matches!(
            registry.set_shortcut(&mut config, "file:save", "  "),
            Err(SessionError::EmptyBinding)
        ));
    }

    #[test]
    fn every_action_carries_a_distinct_command() {
        let registry = ShortcutRegistry::default();
        let mut seen = Vec::new();
        for spec in registry.actions() {
            assert!(!seen.contains(&spec.command), "{} reuses a command", spec.id);
            seen.push(spec.command);
        }
    }

    #[test]
    fn reset_all_clears_every_override() {
        let registry = ShortcutRegistry::default();
        let mut config = ConfigStore::default();
        registry.set_shortcut(&mut config, "file:save", "Mod-1").unwrap();
        registry.set_shortcut(&mut config, "edit:find", "Mod-2").unwrap();

        registry.reset_all(&mut config);
        assert_eq!(registry.resolve(&config, "file:save").unwrap().as_str(), "Mod-S");
        assert_eq!(registry.resolve(&config, "edit:find").unwrap().as_str(), "Mod-F");
    }

    #[test]
    fn shipped_collision_is_reported() {
        let registry = ShortcutRegistry::default();
        let config = ConfigStore::default();
        let binding = KeyBinding::parse("mod-shift-s").unwrap();

        assert_eq!(
            registry.find_conflict(&config, &binding, Some("file:save-as")),
            Some("view:toggle-statistics")
        );
        assert_eq!(
            registry.find_conflict(&config, &binding, Some("view:toggle-statistics")),
            Some("file:save-as")
        );
        assert!(registry.has_conflict(&config, &binding, None));

        let free = KeyBinding::parse("Mod-9").unwrap();
        assert!(!registry.has_conflict(&config, &free, None));
    }

    #[test]
    fn chord_matching_resolves_mod_per_platform() {
        let registry = ShortcutRegistry::default();
        let config = ConfigStore::default();

        let ctrl_s = chord(true, false, false, false, "s");
        let matched = registry
            .match_chord(&config, &ctrl_s, Platform::Other)
            .unwrap();
        assert_eq!(matched.id, "file:save");
        assert_eq!(matched.command, ShortcutCommand::Save);
        // On macOS Ctrl-S is not the primary chord.
        assert!(
            registry
                .match_chord(&config, &ctrl_s, Platform::MacOs)
                .is_none()
        );

        let meta_s = chord(false, false, false, true, "S");
        assert_eq!(
            registry
                .match_chord(&config, &meta_s, Platform::MacOs)
                .map(|spec| spec.id),
            Some("file:save")
        );
    }

    #[test]
    fn colliding_chord_dispatches_to_first_registered() {
        let registry = ShortcutRegistry::default();
        let config = ConfigStore::default();

        // Mod-Shift-S is owned by both file:save-as and
        // view:toggle-statistics; the earlier registration wins.
        let chord = chord(true, false, true, false, "s");
        assert_eq!(
            registry
                .match_chord(&config, &chord, Platform::Other)
                .map(|spec| spec.id),
            Some("file:save-as")
        );
    }

    #[test]
    fn overrides_participate_in_dispatch() {
        let registry = ShortcutRegistry::default();
        let mut config = ConfigStore::default();
        registry
            .set_shortcut(&mut config, "edit:find", "Ctrl-Shift-F")
            .unwrap();

        let chord = chord(true, false, true, false, "f");
        assert_eq!(
            registry
                .match_chord(&config, &chord, Platform::Other)
                .map(|spec| spec.id),
            Some("edit:find")
        );
        // The default Mod-F no longer matches once overridden.
        let old = KeyChord {
            ctrl: true,
            alt: false,
            shift: false,
            meta: false,
            key: SmolStr::new("f"),
        };
        assert!(registry.match_chord(&config, &old, Platform::Other).is_none());
    }
}
