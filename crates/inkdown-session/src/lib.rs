//! inkdown-session: everything the app remembers between launches.
//!
//! - `ConfigStore` - validated user preferences behind a pluggable
//!   persistence backend
//! - `ShortcutRegistry` - keyboard shortcuts with per-user overrides
//!   and conflict reporting
//! - `TabSession` - open tabs, their per-tab view state, and the
//!   save/restore snapshot
//! - Templates and snippets with `{{placeholder}}` substitution

pub mod config;
pub mod error;
pub mod shortcuts;
pub mod tabs;
pub mod templates;

pub use config::{BackendError, ConfigBackend, ConfigStore, JsonFileBackend, MemoryBackend};
pub use error::SessionError;
pub use shortcuts::{
    ActionSpec, KeyBinding, KeyChord, Platform, ShortcutCommand, ShortcutRegistry, ShortcutRow,
};
pub use tabs::{Tab, TabSession, UNTITLED};
pub use templates::{Snippet, Template, builtin_templates};
