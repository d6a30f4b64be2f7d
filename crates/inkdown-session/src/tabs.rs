//! Tabbed session state.
//!
//! A [`TabSession`] keeps open documents in insertion order, tracks
//! which one is active, and snapshots the whole set into the config
//! tree under `tabs.*` so a later launch can pick up where the last
//! one stopped.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use smol_str::{SmolStr, format_smolstr};
use tracing::{debug, warn};
use web_time::{SystemTime, UNIX_EPOCH};

use crate::config::ConfigStore;
use crate::error::SessionError;

/// Title shown for tabs that have never been saved.
pub const UNTITLED: &str = "Untitled";

pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn title_for(path: Option<&Path>) -> SmolStr {
    path.and_then(Path::file_name)
        .map(|name| SmolStr::new(name.to_string_lossy()))
        .unwrap_or_else(|| SmolStr::new(UNTITLED))
}

fn clamp_fraction(fraction: f64) -> f64 {
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

/// One open document.
#[derive(Debug, Clone, PartialEq)]
pub struct Tab {
    pub id: SmolStr,
    pub path: Option<PathBuf>,
    pub content: String,
    /// File name of `path`, or [`UNTITLED`].
    pub title: SmolStr,
    /// Whether `content` differs from what is on disk.
    pub modified: bool,
    /// Vertical scroll as a fraction of the scrollable range, in [0, 1].
    pub scroll: f64,
    /// Caret position as a char offset into `content`.
    pub cursor: usize,
    /// Unix milliseconds.
    pub created_at: u64,
    /// Unix milliseconds of the last content, cursor or flag mutation.
    pub last_modified: u64,
}

/// The persisted shape of one tab under `tabs.data.{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabSnapshot {
    #[serde(default)]
    path: Option<PathBuf>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    title: SmolStr,
    #[serde(default)]
    modified: bool,
    #[serde(default)]
    scroll_position: f64,
    #[serde(default)]
    cursor_position: usize,
    #[serde(default)]
    created_at: u64,
    #[serde(default)]
    last_modified: u64,
}

impl TabSnapshot {
    fn of(tab: &Tab) -> Self {
        Self {
            path: tab.path.clone(),
            content: tab.content.clone(),
            title: tab.title.clone(),
            modified: tab.modified,
            scroll_position: tab.scroll,
            cursor_position: tab.cursor,
            created_at: tab.created_at,
            last_modified: tab.last_modified,
        }
    }

    fn into_tab(self, id: SmolStr) -> Tab {
        let title = if self.title.is_empty() {
            title_for(self.path.as_deref())
        } else {
            self.title
        };
        Tab {
            id,
            path: self.path,
            content: self.content,
            title,
            modified: self.modified,
            scroll: clamp_fraction(self.scroll_position),
            cursor: self.cursor_position,
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

/// Open tabs in insertion order with one optional active tab.
///
/// Ids are unique for the lifetime of the session, including across a
/// save/restore cycle. The active id, when set, always names a live
/// tab.
#[derive(Debug, Default)]
pub struct TabSession {
    order: Vec<SmolStr>,
    tabs: HashMap<SmolStr, Tab>,
    active: Option<SmolStr>,
    next_id: usize,
}

impl TabSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Tab> {
        self.tabs.get(id)
    }

    pub fn active_id(&self) -> Option<SmolStr> {
        self.active.clone()
    }

    pub fn active(&self) -> Option<&Tab> {
        self.tabs.get(self.active.as_ref()?)
    }

    /// Tabs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.order.iter().filter_map(|id| self.tabs.get(id))
    }

    /// Tab ids in insertion order, the order a tab strip shows them.
    pub fn ordered_ids(&self) -> &[SmolStr] {
        &self.order
    }

    pub fn find_by_path(&self, path: &Path) -> Option<SmolStr> {
        self.iter()
            .find(|tab| tab.path.as_deref() == Some(path))
            .map(|tab| tab.id.clone())
    }

    /// Open a new tab at the end of the strip. It becomes active only
    /// when the session was empty.
    pub fn create_tab(&mut self, path: Option<PathBuf>, content: impl Into<String>) -> SmolStr {
        let mut id = format_smolstr!("tab-{}", self.next_id);
        self.next_id += 1;
        while self.tabs.contains_key(&id) {
            id = format_smolstr!("tab-{}", self.next_id);
            self.next_id += 1;
        }

        let now = now_millis();
        let tab = Tab {
            id: id.clone(),
            title: title_for(path.as_deref()),
            path,
            content: content.into(),
            modified: false,
            scroll: 0.0,
            cursor: 0,
            created_at: now,
            last_modified: now,
        };

        let first = self.order.is_empty();
        self.order.push(id.clone());
        self.tabs.insert(id.clone(), tab);
        if first {
            self.active = Some(id.clone());
        }
        debug!(target: "inkdown::session", tab = %id, "created tab");
        id
    }

    /// Make `id` the active tab; false when it does not exist.
    pub fn activate(&mut self, id: &str) -> bool {
        if self.tabs.contains_key(id) {
            self.active = Some(SmolStr::new(id));
            true
        } else {
            false
        }
    }

    /// Remove a tab. Closing the active tab promotes the survivor at
    /// the closed ordinal, wrapping to the first when the last one
    /// closed; closing the only tab leaves no active tab.
    pub fn close_tab(&mut self, id: &str) -> bool {
        let Some(pos) = self.order.iter().position(|known| known == id) else {
            return false;
        };
        self.order.remove(pos);
        self.tabs.remove(id);
        if self.active.as_deref() == Some(id) {
            self.active = if self.order.is_empty() {
                None
            } else {
                Some(self.order[pos % self.order.len()].clone())
            };
        }
        debug!(target: "inkdown::session", tab = id, remaining = self.order.len(), "closed tab");
        true
    }

    /// Id of the tab after the active one, wrapping.
    pub fn next_tab_id(&self) -> Option<SmolStr> {
        self.neighbor(1)
    }

    /// Id of the tab before the active one, wrapping.
    pub fn previous_tab_id(&self) -> Option<SmolStr> {
        self.neighbor(-1)
    }

    fn neighbor(&self, step: isize) -> Option<SmolStr> {
        let active = self.active.as_ref()?;
        let pos = self.order.iter().position(|id| id == active)?;
        let len = self.order.len() as isize;
        let target = (pos as isize + step).rem_euclid(len) as usize;
        Some(self.order[target].clone())
    }

    pub fn update_content(&mut self, id: &str, content: &str) -> bool {
        match self.tabs.get_mut(id) {
            Some(tab) => {
                tab.content = content.to_owned();
                tab.last_modified = now_millis();
                true
            }
            None => false,
        }
    }

    /// Move the caret. Bumps `last_modified` but never the modified
    /// flag.
    pub fn update_cursor(&mut self, id: &str, cursor: usize) -> bool {
        match self.tabs.get_mut(id) {
            Some(tab) => {
                tab.cursor = cursor;
                tab.last_modified = now_millis();
                true
            }
            None => false,
        }
    }

    /// Record the scroll fraction, clamped to [0, 1]. Leaves both
    /// `last_modified` and the modified flag alone.
    pub fn update_scroll(&mut self, id: &str, fraction: f64) -> bool {
        match self.tabs.get_mut(id) {
            Some(tab) => {
                tab.scroll = clamp_fraction(fraction);
                true
            }
            None => false,
        }
    }

    pub fn set_modified(&mut self, id: &str, modified: bool) -> bool {
        match self.tabs.get_mut(id) {
            Some(tab) => {
                tab.modified = modified;
                tab.last_modified = now_millis();
                true
            }
            None => false,
        }
    }

    /// Attach or detach a file path, recomputing the title.
    pub fn set_path(&mut self, id: &str, path: Option<PathBuf>) -> bool {
        match self.tabs.get_mut(id) {
            Some(tab) => {
                tab.title = title_for(path.as_deref());
                tab.path = path;
                true
            }
            None => false,
        }
    }

    /// Snapshot every tab into the config tree under `tabs.*`.
    pub fn save_to(&self, config: &mut ConfigStore) -> Result<(), SessionError> {
        let order: Vec<&str> = self.order.iter().map(SmolStr::as_str).collect();
        config.set("tabs.lastOpenTabs", json!(order))?;
        config.set(
            "tabs.activeTabId",
            self.active
                .as_ref()
                .map_or(Value::Null, |id| Value::String(id.to_string())),
        )?;

        let mut data = Map::new();
        for id in &self.order {
            if let Some(tab) = self.tabs.get(id) {
                data.insert(id.to_string(), serde_json::to_value(TabSnapshot::of(tab))?);
            }
        }
        config.set("tabs.data", Value::Object(data))?;
        debug!(target: "inkdown::session", tabs = self.order.len(), "session saved");
        Ok(())
    }

    /// Replace the session with the one stored in the config tree.
    ///
    /// Corrupt or missing snapshots are skipped with a warning rather
    /// than failing the whole restore. The saved active tab is
    /// promoted when it survived, else the first restored tab. Returns
    /// whether anything was restored.
    pub fn restore_from(&mut self, config: &ConfigStore) -> bool {
        let ids: Vec<SmolStr> = config
            .get("tabs.lastOpenTabs")
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(SmolStr::new))
                    .collect()
            })
            .unwrap_or_default();
        let data = config.get("tabs.data");
        let empty = Map::new();
        let data = data.as_object().unwrap_or(&empty);

        self.order.clear();
        self.tabs.clear();
        self.active = None;

        for id in ids {
            let Some(raw) = data.get(id.as_str()) else {
                warn!(target: "inkdown::session", tab = %id, "tab listed without snapshot, skipping");
                continue;
            };
            match serde_json::from_value::<TabSnapshot>(raw.clone()) {
                Ok(snapshot) => {
                    self.tabs.insert(id.clone(), snapshot.into_tab(id.clone()));
                    self.order.push(id);
                }
                Err(err) => {
                    warn!(
                        target: "inkdown::session",
                        tab = %id,
                        error = %err,
                        "corrupt tab snapshot, skipping"
                    );
                }
            }
        }

        self.active = config
            .get("tabs.activeTabId")
            .as_str()
            .filter(|id| self.tabs.contains_key(*id))
            .map(SmolStr::new)
            .or_else(|| self.order.first().cloned());

        self.resume_counter();
        let restored = !self.order.is_empty();
        if restored {
            debug!(target: "inkdown::session", tabs = self.order.len(), "session restored");
        }
        restored
    }

    /// Advance the id counter past every restored id so new tabs never
    /// collide with them.
    fn resume_counter(&mut self) {
        let max = self
            .order
            .iter()
            .filter_map(|id| id.strip_prefix("tab-")?.parse::<usize>().ok())
            .max();
        if let Some(max) = max {
            self.next_id = self.next_id.max(max + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(n: usize) -> (TabSession, Vec<SmolStr>) {
        let mut session = TabSession::new();
        let ids = (0..n)
            .map(|i| session.create_tab(None, format!("doc {i}")))
            .collect();
        (session, ids)
    }

    #[test]
    fn first_tab_becomes_active_later_ones_do_not() {
        let mut session = TabSession::new();
        let a = session.create_tab(None, "");
        assert_eq!(session.active_id(), Some(a.clone()));

        let b = session.create_tab(None, "");
        assert_ne!(a, b);
        assert_eq!(session.active_id(), Some(a));
    }

    #[test]
    fn titles_come_from_file_names() {
        let mut session = TabSession::new();
        let untitled = session.create_tab(None, "");
        let named = session.create_tab(Some(PathBuf::from("/notes/plan.md")), "");
        assert_eq!(session.get(&untitled).unwrap().title, UNTITLED);
        assert_eq!(session.get(&named).unwrap().title, "plan.md");
    }

    #[test]
    fn set_path_recomputes_title() {
        let mut session = TabSession::new();
        let id = session.create_tab(None, "");
        session.set_path(&id, Some(PathBuf::from("/notes/plan.md")));
        assert_eq!(session.get(&id).unwrap().title, "plan.md");
        session.set_path(&id, None);
        assert_eq!(session.get(&id).unwrap().title, UNTITLED);
    }

    #[test]
    fn find_by_path_matches_exactly() {
        let mut session = TabSession::new();
        let id = session.create_tab(Some(PathBuf::from("/notes/a.md")), "");
        assert_eq!(session.find_by_path(Path::new("/notes/a.md")), Some(id));
        assert_eq!(session.find_by_path(Path::new("/notes/b.md")), None);
    }

    #[test]
    fn mutators_report_unknown_ids() {
        let mut session = TabSession::new();
        session.create_tab(None, "");
        assert!(!session.update_content("tab-99", "x"));
        assert!(!session.update_cursor("tab-99", 1));
        assert!(!session.update_scroll("tab-99", 0.5));
        assert!(!session.set_modified("tab-99", true));
        assert!(!session.set_path("tab-99", None));
        assert!(!session.activate("tab-99"));
        assert!(!session.close_tab("tab-99"));
    }

    #[test]
    fn content_cursor_and_flag_bump_last_modified_scroll_does_not() {
        let mut session = TabSession::new();
        let id = session.create_tab(None, "");

        session.tabs.get_mut(&id).unwrap().last_modified = 0;
        assert!(session.update_content(&id, "hello"));
        assert_ne!(session.get(&id).unwrap().last_modified, 0);

        session.tabs.get_mut(&id).unwrap().last_modified = 0;
        assert!(session.update_cursor(&id, 3));
        assert_ne!(session.get(&id).unwrap().last_modified, 0);

        session.tabs.get_mut(&id).unwrap().last_modified = 0;
        assert!(session.set_modified(&id, true));
        assert_ne!(session.get(&id).unwrap().last_modified, 0);

        session.tabs.get_mut(&id).unwrap().last_modified = 0;
        assert!(session.update_scroll(&id, 0.7));
        assert_eq!(session.get(&id).unwrap().last_modified, 0);
        assert_eq!(session.get(&id).unwrap().scroll, 0.7);
    }

    #[test]
    fn scroll_is_clamped() {
        let mut session = TabSession::new();
        let id = session.create_tab(None, "");
        session.update_scroll(&id, 3.5);
        assert_eq!(session.get(&id).unwrap().scroll, 1.0);
        session.update_scroll(&id, -0.1);
        assert_eq!(session.get(&id).unwrap().scroll, 0.0);
        session.update_scroll(&id, f64::NAN);
        assert_eq!(session.get(&id).unwrap().scroll, 0.0);
    }

    #[test]
    fn closing_active_promotes_next_ordinal() {
        let (mut session, ids) = session_with(3);
        session.activate(&ids[1]);
        assert!(session.close_tab(&ids[1]));
        assert_eq!(session.active_id(), Some(ids[2].clone()));
    }

    #[test]
    fn closing_last_active_wraps_to_first() {
        let (mut session, ids) = session_with(3);
        session.activate(&ids[2]);
        assert!(session.close_tab(&ids[2]));
        assert_eq!(session.active_id(), Some(ids[0].clone()));
    }

    #[test]
    fn closing_inactive_keeps_active() {
        let (mut session, ids) = session_with(3);
        session.activate(&ids[0]);
        assert!(session.close_tab(&ids[2]));
        assert_eq!(session.active_id(), Some(ids[0].clone()));
    }

    #[test]
    fn closing_only_tab_leaves_none_active() {
        let (mut session, ids) = session_with(1);
        assert!(session.close_tab(&ids[0]));
        assert!(session.is_empty());
        assert_eq!(session.active_id(), None);
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let (mut session, ids) = session_with(2);
        assert_eq!(session.active_id(), Some(ids[0].clone()));
        assert_eq!(session.next_tab_id(), Some(ids[1].clone()));
        session.activate(&ids[1]);
        assert_eq!(session.next_tab_id(), Some(ids[0].clone()));
        assert_eq!(session.previous_tab_id(), Some(ids[0].clone()));
    }

    #[test]
    fn single_tab_navigates_to_itself() {
        let (session, ids) = session_with(1);
        assert_eq!(session.next_tab_id(), Some(ids[0].clone()));
        assert_eq!(session.previous_tab_id(), Some(ids[0].clone()));
    }

    #[test]
    fn save_restore_round_trips() {
        let (mut session, ids) = session_with(3);
        session.update_content(&ids[1], "## middle");
        session.update_cursor(&ids[1], 4);
        session.update_scroll(&ids[1], 0.25);
        session.set_modified(&ids[1], true);
        session.set_path(&ids[2], Some(PathBuf::from("/notes/c.md")));
        session.activate(&ids[1]);

        let mut config = ConfigStore::default();
        session.save_to(&mut config).unwrap();

        let mut restored = TabSession::new();
        assert!(restored.restore_from(&config));

        assert_eq!(
            restored.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
            ids
        );
        assert_eq!(restored.active_id(), Some(ids[1].clone()));

        let middle = restored.get(&ids[1]).unwrap();
        assert_eq!(middle.content, "## middle");
        assert_eq!(middle.cursor, 4);
        assert_eq!(middle.scroll, 0.25);
        assert!(middle.modified);

        let last = restored.get(&ids[2]).unwrap();
        assert_eq!(last.path.as_deref(), Some(Path::new("/notes/c.md")));
        assert_eq!(last.title, "c.md");
    }

    #[test]
    fn snapshot_uses_camel_case_keys() {
        let (mut session, ids) = session_with(1);
        session.update_scroll(&ids[0], 0.5);
        let mut config = ConfigStore::default();
        session.save_to(&mut config).unwrap();

        let snapshot = config.get(&format!("tabs.data.{}", ids[0]));
        assert!(snapshot.get("scrollPosition").is_some());
        assert!(snapshot.get("cursorPosition").is_some());
        assert!(snapshot.get("createdAt").is_some());
        assert!(snapshot.get("lastModified").is_some());
    }

    #[test]
    fn stale_active_id_promotes_first() {
        let (mut session, ids) = session_with(2);
        session.activate(&ids[1]);
        let mut config = ConfigStore::default();
        session.save_to(&mut config).unwrap();
        config
            .set("tabs.activeTabId", json!("tab-does-not-exist"))
            .unwrap();

        let mut restored = TabSession::new();
        assert!(restored.restore_from(&config));
        assert_eq!(restored.active_id(), Some(ids[0].clone()));
    }

    #[test]
    fn corrupt_snapshot_is_skipped() {
        let (mut session, ids) = session_with(2);
        let mut config = ConfigStore::default();
        session.save_to(&mut config).unwrap();
        config
            .set(&format!("tabs.data.{}", ids[0]), json!("not an object"))
            .unwrap();

        let mut restored = TabSession::new();
        assert!(restored.restore_from(&config));
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.active_id(), Some(ids[1].clone()));
    }

    #[test]
    fn restore_from_empty_config_restores_nothing() {
        let mut session = TabSession::new();
        assert!(!session.restore_from(&ConfigStore::default()));
        assert!(session.is_empty());
        assert_eq!(session.active_id(), None);
    }

    #[test]
    fn ids_never_collide_after_restore() {
        let (mut session, ids) = session_with(3);
        let mut config = ConfigStore::default();
        session.save_to(&mut config).unwrap();

        let mut restored = TabSession::new();
        restored.restore_from(&config);
        let fresh = restored.create_tab(None, "");
        assert!(!ids.contains(&fresh));
        assert!(restored.get(&fresh).is_some());
        assert_eq!(restored.len(), 4);
    }
}
