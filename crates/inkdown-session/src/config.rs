//! Validated user preferences.
//!
//! The store is a JSON tree seeded from a default tree; reads fall back
//! to the defaults for absent paths so configs written by older versions
//! keep working. Writes are validated per key before they become
//! visible. Persistence goes through an injected [`ConfigBackend`].

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use serde_json::{Map, Value, json};
use smol_str::SmolStr;
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::tabs::now_millis;
use crate::templates::{self, Snippet, Template};

pub const RECENT_FILES_CAP: usize = 10;

pub type BackendError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Persistent key-value backing for the store.
pub trait ConfigBackend {
    /// Read the whole serialized tree; `None` when nothing was stored yet.
    fn load(&self) -> impl Future<Output = Result<Option<String>, BackendError>> + Send;
    /// Replace the stored tree.
    fn store(&self, payload: &str) -> impl Future<Output = Result<(), BackendError>> + Send;
}

/// Backend over a JSON file on disk.
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ConfigBackend for JsonFileBackend {
    async fn load(&self) -> Result<Option<String>, BackendError> {
        match std::fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn store(&self, payload: &str) -> Result<(), BackendError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, payload)?;
        Ok(())
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend(Arc<Mutex<Option<String>>>);

impl MemoryBackend {
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self(Arc::new(Mutex::new(Some(payload.into()))))
    }
}

impl ConfigBackend for MemoryBackend {
    async fn load(&self) -> Result<Option<String>, BackendError> {
        match self.0.lock() {
            Ok(slot) => Ok(slot.clone()),
            Err(_) => Err("memory backend lock poisoned".into()),
        }
    }

    async fn store(&self, payload: &str) -> Result<(), BackendError> {
        match self.0.lock() {
            Ok(mut slot) => {
                *slot = Some(payload.to_owned());
                Ok(())
            }
            Err(_) => Err("memory backend lock poisoned".into()),
        }
    }
}

static DEFAULTS: LazyLock<Map<String, Value>> = LazyLock::new(|| {
    json!({
        "theme": "light",
        "viewMode": "split",
        "fontSize": 14,
        "lineNumbers": true,
        "lineWrapping": true,
        "autoSave": { "enabled": true, "delay": 5 },
        "markdown": { "math": true, "mermaid": true, "callouts": true },
        "statistics": { "visible": true, "wordsPerMinute": 200 },
        "focusMode": { "lastUsed": false },
        "keyboardShortcuts": {},
        "customTemplates": [],
        "customSnippets": [],
        "recentFiles": [],
        "tabs": { "lastOpenTabs": [], "activeTabId": null, "data": {} }
    })
    .as_object()
    .cloned()
    .unwrap()
});

static NULL: Value = Value::Null;

/// User preferences, validated on write, defaulted on read.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    tree: Map<String, Value>,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            tree: DEFAULTS.clone(),
        }
    }
}

impl ConfigStore {
    /// Load from the backend; a missing, unreadable or corrupt store logs
    /// and starts from defaults.
    pub async fn load(backend: &impl ConfigBackend) -> Self {
        match backend.load().await {
            Ok(Some(payload)) => match serde_json::from_str::<Map<String, Value>>(&payload) {
                Ok(tree) => {
                    debug!(target: "inkdown::session", keys = tree.len(), "config loaded");
                    Self { tree }
                }
                Err(err) => {
                    warn!(
                        target: "inkdown::session",
                        error = %err,
                        "corrupt config store, starting from defaults"
                    );
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(err) => {
                warn!(
                    target: "inkdown::session",
                    error = %err,
                    "config store unreadable, starting from defaults"
                );
                Self::default()
            }
        }
    }

    /// Write the current tree through the backend.
    pub async fn flush(&self, backend: &impl ConfigBackend) -> Result<(), BackendError> {
        let payload = serde_json::to_string_pretty(&self.tree)?;
        backend.store(&payload).await
    }

    /// Value at a dotted path, falling back to the default tree; `Null`
    /// when neither has it.
    pub fn get(&self, path: &str) -> Value {
        self.value_at(path).clone()
    }

    /// Validate and write one value. The write is visible to reads
    /// immediately; on validation failure nothing changes.
    pub fn set(&mut self, path: &str, value: Value) -> Result<(), SessionError> {
        validate(path, &value)?;
        set_path(&mut self.tree, path, value);
        Ok(())
    }

    /// Remove a stored value so reads fall back to the default.
    pub fn remove(&mut self, path: &str) -> bool {
        remove_path(&mut self.tree, path)
    }

    /// Restore the full default tree.
    pub fn reset(&mut self) {
        self.tree = DEFAULTS.clone();
    }

    pub fn theme(&self) -> SmolStr {
        self.str_at("theme")
    }

    pub fn view_mode(&self) -> SmolStr {
        self.str_at("viewMode")
    }

    pub fn font_size(&self) -> u64 {
        self.value_at("fontSize").as_u64().unwrap_or(14)
    }

    pub fn line_numbers(&self) -> bool {
        self.bool_at("lineNumbers")
    }

    pub fn line_wrapping(&self) -> bool {
        self.bool_at("lineWrapping")
    }

    pub fn auto_save_enabled(&self) -> bool {
        self.bool_at("autoSave.enabled")
    }

    pub fn auto_save_delay_secs(&self) -> u64 {
        self.value_at("autoSave.delay").as_u64().unwrap_or(5)
    }

    pub fn statistics_visible(&self) -> bool {
        self.bool_at("statistics.visible")
    }

    pub fn words_per_minute(&self) -> f64 {
        self.value_at("statistics.wordsPerMinute")
            .as_f64()
            .unwrap_or(200.0)
    }

    pub fn focus_mode_last_used(&self) -> bool {
        self.bool_at("focusMode.lastUsed")
    }

    pub fn markdown_math(&self) -> bool {
        self.bool_at("markdown.math")
    }

    pub fn markdown_mermaid(&self) -> bool {
        self.bool_at("markdown.mermaid")
    }

    pub fn markdown_callouts(&self) -> bool {
        self.bool_at("markdown.callouts")
    }

    pub fn recent_files(&self) -> Vec<String> {
        self.value_at("recentFiles")
            .as_array()
            .map(|files| {
                files
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_owned))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Record a path as most recently used, deduplicating and capping the
    /// list.
    pub fn add_recent_file(&mut self, path: &str) {
        let mut files = self.recent_files();
        files.retain(|known| known != path);
        files.insert(0, path.to_owned());
        files.truncate(RECENT_FILES_CAP);
        set_path(&mut self.tree, "recentFiles", json!(files));
    }

    /// Drop a stale path; returns whether it was present.
    pub fn remove_recent_file(&mut self, path: &str) -> bool {
        let mut files = self.recent_files();
        let had = files.iter().any(|known| known == path);
        if had {
            files.retain(|known| known != path);
            set_path(&mut self.tree, "recentFiles", json!(files));
        }
        had
    }

    /// Stored template records: the user's own plus usage-stamped copies
    /// of builtins.
    pub fn templates(&self) -> Vec<Template> {
        serde_json::from_value(self.get("customTemplates")).unwrap_or_default()
    }

    pub fn snippets(&self) -> Vec<Snippet> {
        serde_json::from_value(self.get("customSnippets")).unwrap_or_default()
    }

    pub fn update_templates(&mut self, list: &[Template]) -> Result<(), SessionError> {
        templates::validate_templates(list)?;
        let value = serde_json::to_value(list).map_err(|err| SessionError::InvalidConfig {
            key: "customTemplates".to_owned(),
            value: Value::Null,
            reason: err.to_string(),
        })?;
        set_path(&mut self.tree, "customTemplates", value);
        Ok(())
    }

    pub fn update_snippets(&mut self, list: &[Snippet]) -> Result<(), SessionError> {
        templates::validate_snippets(list)?;
        let value = serde_json::to_value(list).map_err(|err| SessionError::InvalidConfig {
            key: "customSnippets".to_owned(),
            value: Value::Null,
            reason: err.to_string(),
        })?;
        set_path(&mut self.tree, "customSnippets", value);
        Ok(())
    }

    /// Stamp a template as just used and store the stamped record. First
    /// use of a builtin stores a copy here, so the stamp survives
    /// restarts and shadows the shipped record when templates are listed.
    pub fn record_template_use(&mut self, template: &Template) {
        let mut stamped = template.clone();
        stamped.last_used = Some(now_millis());
        let mut list = self.templates();
        match list.iter().position(|known| known.id == stamped.id) {
            Some(slot) => list[slot] = stamped,
            None => list.push(stamped),
        }
        match serde_json::to_value(&list) {
            Ok(value) => set_path(&mut self.tree, "customTemplates", value),
            Err(err) => warn!(
                target: "inkdown::session",
                error = %err,
                "template use stamp not stored"
            ),
        }
    }

    fn value_at(&self, path: &str) -> &Value {
        lookup(&self.tree, path)
            .or_else(|| lookup(&DEFAULTS, path))
            .unwrap_or(&NULL)
    }

    fn str_at(&self, path: &str) -> SmolStr {
        self.value_at(path)
            .as_str()
            .map(SmolStr::new)
            .unwrap_or_default()
    }

    fn bool_at(&self, path: &str) -> bool {
        self.value_at(path).as_bool().unwrap_or_default()
    }
}

fn lookup<'a>(tree: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    match path.split_once('.') {
        None => tree.get(path),
        Some((head, rest)) => lookup(tree.get(head)?.as_object()?, rest),
    }
}

fn set_path(tree: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            tree.insert(path.to_owned(), value);
        }
        Some((head, rest)) => {
            let child = tree
                .entry(head.to_owned())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                set_path(map, rest, value);
            }
        }
    }
}

fn remove_path(tree: &mut Map<String, Value>, path: &str) -> bool {
    match path.split_once('.') {
        None => tree.remove(path).is_some(),
        Some((head, rest)) => tree
            .get_mut(head)
            .and_then(Value::as_object_mut)
            .map(|map| remove_path(map, rest))
            .unwrap_or(false),
    }
}

fn validate(key: &str, value: &Value) -> Result<(), SessionError> {
    let ok = match key {
        "theme" => matches!(value.as_str(), Some("light" | "dark")),
        "viewMode" => matches!(value.as_str(), Some("editor" | "preview" | "split")),
        "fontSize" => value.as_u64().is_some_and(|n| n >= 1),
        "lineNumbers" | "lineWrapping" | "autoSave.enabled" | "statistics.visible"
        | "focusMode.lastUsed" | "markdown.math" | "markdown.mermaid" | "markdown.callouts" => {
            value.is_boolean()
        }
        "autoSave.delay" => value.as_u64().is_some_and(|n| (1..=60).contains(&n)),
        "statistics.wordsPerMinute" => value.as_f64().is_some_and(|n| n > 0.0),
        "keyboardShortcuts" => value.as_object().is_some_and(|map| {
            map.values()
                .all(|v| v.as_str().is_some_and(|s| !s.trim().is_empty()))
        }),
        key if key.starts_with("keyboardShortcuts.") => {
            value.as_str().is_some_and(|s| !s.trim().is_empty())
        }
        "recentFiles" | "tabs.lastOpenTabs" => value
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string)),
        "customTemplates" => return validate_collection::<Template>(key, value),
        "customSnippets" => return validate_collection::<Snippet>(key, value),
        "tabs.activeTabId" => value.is_string() || value.is_null(),
        "tabs.data" => value.is_object(),
        "autoSave" | "statistics" | "markdown" | "focusMode" | "tabs" => {
            return validate_subtree(key, value);
        }
        // Forward compatibility: unknown keys are stored verbatim.
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(SessionError::InvalidConfig {
            key: key.to_owned(),
            value: value.clone(),
            reason: reason_for(key).to_owned(),
        })
    }
}

fn validate_collection<T>(key: &str, value: &Value) -> Result<(), SessionError>
where
    T: serde::de::DeserializeOwned + Validated,
{
    let items: Vec<T> =
        serde_json::from_value(value.clone()).map_err(|err| SessionError::InvalidConfig {
            key: key.to_owned(),
            value: value.clone(),
            reason: err.to_string(),
        })?;
    T::validate_all(&items)
}

/// A whole-object write to a recognized subtree checks every child
/// against the same rules as its dotted path.
fn validate_subtree(key: &str, value: &Value) -> Result<(), SessionError> {
    let Some(map) = value.as_object() else {
        return Err(SessionError::InvalidConfig {
            key: key.to_owned(),
            value: value.clone(),
            reason: "expected an object".to_owned(),
        });
    };
    for (child, child_value) in map {
        validate(&format!("{key}.{child}"), child_value)?;
    }
    Ok(())
}

/// Record types that carry their own list-level validation.
trait Validated: Sized {
    fn validate_all(items: &[Self]) -> Result<(), SessionError>;
}

impl Validated for Template {
    fn validate_all(items: &[Self]) -> Result<(), SessionError> {
        templates::validate_templates(items)
    }
}

impl Validated for Snippet {
    fn validate_all(items: &[Self]) -> Result<(), SessionError> {
        templates::validate_snippets(items)
    }
}

fn reason_for(key: &str) -> &'static str {
    match key {
        "theme" => "expected \"light\" or \"dark\"",
        "viewMode" => "expected \"editor\", \"preview\" or \"split\"",
        "fontSize" => "expected a positive integer",
        "autoSave.delay" => "expected an integer between 1 and 60",
        "statistics.wordsPerMinute" => "expected a number greater than zero",
        "recentFiles" | "tabs.lastOpenTabs" => "expected an array of strings",
        "tabs.activeTabId" => "expected a tab id or null",
        "tabs.data" => "expected an object of tab snapshots",
        key if key.starts_with("keyboardShortcuts") => "expected non-empty binding strings",
        _ => "expected a boolean",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_served_for_absent_keys() {
        let config = ConfigStore::default();
        assert_eq!(config.theme(), "light");
        assert_eq!(config.view_mode(), "split");
        assert_eq!(config.font_size(), 14);
        assert_eq!(config.auto_save_delay_secs(), 5);
        assert_eq!(config.words_per_minute(), 200.0);
        assert!(config.recent_files().is_empty());
    }

    #[test]
    fn set_is_visible_to_reads() {
        let mut config = ConfigStore::default();
        config.set("theme", json!("dark")).unwrap();
        assert_eq!(config.theme(), "dark");
        config.set("autoSave.delay", json!(30)).unwrap();
        assert_eq!(config.auto_save_delay_secs(), 30);
    }

    #[test]
    fn boundary_validation() {
        let mut config = ConfigStore::default();

        assert!(config.set("autoSave.delay", json!(1)).is_ok());
        assert!(config.set("autoSave.delay", json!(60)).is_ok());
        assert!(config.set("autoSave.delay", json!(0)).is_err());
        assert!(config.set("autoSave.delay", json!(61)).is_err());
        assert!(config.set("autoSave.delay", json!(2.5)).is_err());
        assert!(config.set("autoSave.delay", json!("five")).is_err());

        assert!(config.set("statistics.wordsPerMinute", json!(2.5)).is_ok());
        assert!(config.set("statistics.wordsPerMinute", json!(0)).is_err());
        assert!(config.set("statistics.wordsPerMinute", json!(-10)).is_err());

        assert!(config.set("theme", json!("dark")).is_ok());
        assert!(config.set("theme", json!("blue")).is_err());
        assert!(config.set("viewMode", json!("editor")).is_ok());
        assert!(config.set("viewMode", json!("full")).is_err());
        assert!(config.set("fontSize", json!(0)).is_err());
        assert!(config.set("lineNumbers", json!("yes")).is_err());
    }

    #[test]
    fn failed_set_changes_nothing() {
        let mut config = ConfigStore::default();
        let err = config.set("theme", json!("blue")).unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig { .. }));
        assert_eq!(config.theme(), "light");
    }

    #[test]
    fn markdown_extensions_default_on_and_validate() {
        let mut config = ConfigStore::default();
        assert!(config.markdown_math());
        assert!(config.markdown_mermaid());
        assert!(config.markdown_callouts());

        config.set("markdown.mermaid", json!(false)).unwrap();
        assert!(!config.markdown_mermaid());
        assert!(config.set("markdown.math", json!("on")).is_err());
    }

    #[test]
    fn unknown_keys_pass_through() {
        let mut config = ConfigStore::default();
        config.set("experimental.vimMode", json!(true)).unwrap();
        assert_eq!(config.get("experimental.vimMode"), json!(true));
    }

    #[test]
    fn remove_falls_back_to_default() {
        let mut config = ConfigStore::default();
        config.set("theme", json!("dark")).unwrap();
        assert!(config.remove("theme"));
        assert_eq!(config.theme(), "light");
        assert!(!config.remove("theme"));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut config = ConfigStore::default();
        config.set("theme", json!("dark")).unwrap();
        config.set("fontSize", json!(18)).unwrap();
        config.reset();
        assert_eq!(config.theme(), "light");
        assert_eq!(config.font_size(), 14);
    }

    #[test]
    fn recent_files_dedupe_and_cap() {
        let mut config = ConfigStore::default();
        for i in 0..12 {
            config.add_recent_file(&format!("/notes/{i}.md"));
        }
        let files = config.recent_files();
        assert_eq!(files.len(), RECENT_FILES_CAP);
        assert_eq!(files[0], "/notes/11.md");

        config.add_recent_file("/notes/5.md");
        let files = config.recent_files();
        assert_eq!(files.len(), RECENT_FILES_CAP);
        assert_eq!(files[0], "/notes/5.md");
        assert_eq!(files.iter().filter(|f| *f == "/notes/5.md").count(), 1);

        assert!(config.remove_recent_file("/notes/5.md"));
        assert!(!config.recent_files().contains(&"/notes/5.md".to_owned()));
        assert!(!config.remove_recent_file("/notes/5.md"));
    }

    #[test]
    fn template_updates_are_validated() {
        let mut config = ConfigStore::default();
        let template = Template {
            id: SmolStr::new("letter"),
            name: SmolStr::new("Letter"),
            category: SmolStr::new("Writing"),
            content: "Dear {{name}},".to_owned(),
            created_at: 0,
            last_used: None,
            builtin: false,
        };
        config.update_templates(&[template.clone()]).unwrap();
        assert_eq!(config.templates(), vec![template.clone()]);

        let err = config
            .update_templates(&[template.clone(), template])
            .unwrap_err();
        assert!(matches!(err, SessionError::DuplicateTemplate { .. }));
    }

    #[test]
    fn raw_template_value_is_validated_too() {
        let mut config = ConfigStore::default();
        // A record without an id never reaches the tree.
        assert!(
            config
                .set("customTemplates", json!([{ "name": "A", "content": "x" }]))
                .is_err()
        );
        assert!(
            config
                .set(
                    "customTemplates",
                    json!([{ "id": "a", "name": "A", "content": "x" }])
                )
                .is_ok()
        );
        assert!(
            config
                .set(
                    "customTemplates",
                    json!([
                        { "id": "a", "name": "A", "content": "x" },
                        { "id": "a", "name": "B", "content": "y" }
                    ])
                )
                .is_err()
        );
    }

    #[test]
    fn template_use_is_stamped_and_stored() {
        let mut config = ConfigStore::default();
        let builtin = &templates::builtin_templates()[0];
        assert_eq!(builtin.last_used, None);

        config.record_template_use(builtin);
        let stored = config.templates();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, builtin.id);
        assert!(stored[0].builtin);
        assert!(stored[0].last_used.is_some());

        // Re-use restamps the stored copy instead of appending another.
        config.record_template_use(&stored[0]);
        assert_eq!(config.templates().len(), 1);
    }

    #[test]
    fn whole_object_writes_validate_each_child() {
        let mut config = ConfigStore::default();

        let err = config
            .set("autoSave", json!({ "enabled": true, "delay": 900 }))
            .unwrap_err();
        assert!(matches!(err, SessionError::InvalidConfig { .. }));
        assert_eq!(config.auto_save_delay_secs(), 5);

        config
            .set("autoSave", json!({ "enabled": false, "delay": 30 }))
            .unwrap();
        assert!(!config.auto_save_enabled());
        assert_eq!(config.auto_save_delay_secs(), 30);

        // A partial object replaces the subtree; absent children read
        // from the defaults again.
        config.set("autoSave", json!({ "enabled": true })).unwrap();
        assert_eq!(config.auto_save_delay_secs(), 5);

        assert!(
            config
                .set("statistics", json!({ "wordsPerMinute": 0 }))
                .is_err()
        );
        assert!(config.set("markdown", json!({ "math": "on" })).is_err());
        assert!(config.set("focusMode", json!(true)).is_err());
        assert!(config.set("tabs", json!({ "lastOpenTabs": [1] })).is_err());
    }

    #[tokio::test]
    async fn corrupt_backend_starts_from_defaults() {
        let backend = MemoryBackend::with_payload("not json at all");
        let config = ConfigStore::load(&backend).await;
        assert_eq!(config.theme(), "light");
    }

    #[tokio::test]
    async fn flush_then_load_round_trips() {
        let backend = MemoryBackend::default();
        let mut config = ConfigStore::default();
        config.set("theme", json!("dark")).unwrap();
        config.set("fontSize", json!(16)).unwrap();
        config.flush(&backend).await.unwrap();

        let reloaded = ConfigStore::load(&backend).await;
        assert_eq!(reloaded.theme(), "dark");
        assert_eq!(reloaded.font_size(), 16);
    }

    #[tokio::test]
    async fn file_backend_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("conf/settings.json"));

        assert!(backend.load().await.unwrap().is_none());

        let mut config = ConfigStore::default();
        config.set("viewMode", json!("preview")).unwrap();
        config.flush(&backend).await.unwrap();

        let reloaded = ConfigStore::load(&backend).await;
        assert_eq!(reloaded.view_mode(), "preview");
    }
}
