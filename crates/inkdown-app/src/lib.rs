//! inkdown-app: the headless application core.
//!
//! [`Controller`] ties the editor, the preview pipeline, search, tabs
//! and the config store together and dispatches menu actions and key
//! chords. Everything that needs a window or privileged filesystem
//! access stays behind the [`Host`] trait, so the whole application
//! logic runs in tests without a shell.

pub mod actions;
pub mod controller;
pub mod error;
pub mod host;

pub use actions::{ActionId, ActionOutcome, Panel};
pub use controller::Controller;
pub use error::AppError;
pub use host::{
    Confirm, FileError, HTML_FILTERS, Host, MARKDOWN_FILTERS, MessageKind, PDF_FILTERS,
};
