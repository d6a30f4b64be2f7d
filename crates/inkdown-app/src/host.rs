//! The contract between the controller and the surrounding shell.
//!
//! Everything that needs a window, a dialog or privileged filesystem
//! access is behind [`Host`]. The controller never touches the disk or
//! the screen itself, which is what makes it drivable from tests.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Dialog filter for markdown documents.
pub const MARKDOWN_FILTERS: &[&str] = &["md", "markdown", "txt"];
/// Dialog filter for HTML export.
pub const HTML_FILTERS: &[&str] = &["html"];
/// Dialog filter for PDF export.
pub const PDF_FILTERS: &[&str] = &["pdf"];

/// Severity of a user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
}

/// Answer to a yes/no/cancel confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    Yes,
    No,
    Cancel,
}

/// File access failure, normalized so every shell reports the same
/// categories.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    #[error("file not found")]
    NotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("disk full")]
    DiskFull,
    #[error("{0}")]
    Other(String),
}

impl From<io::Error> for FileError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => FileError::NotFound,
            io::ErrorKind::PermissionDenied => FileError::PermissionDenied,
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => FileError::DiskFull,
            _ => FileError::Other(err.to_string()),
        }
    }
}

/// Shell capabilities the controller calls out to.
///
/// Dialog methods resolve to `None` when the user cancels; cancel is
/// never an error. File contents cross this boundary as the exact
/// bytes on disk, UTF-8 either way, no BOM handling.
pub trait Host {
    /// Ask the user to pick an existing file.
    fn show_open_dialog(
        &self,
        extensions: &[&str],
    ) -> impl Future<Output = Option<PathBuf>> + Send;

    /// Ask the user to pick a destination path.
    fn show_save_dialog(
        &self,
        extensions: &[&str],
    ) -> impl Future<Output = Option<PathBuf>> + Send;

    /// Yes/no/cancel prompt.
    fn confirm(&self, title: &str, message: &str) -> impl Future<Output = Confirm> + Send;

    /// Fire-and-forget notification.
    fn show_message(&self, kind: MessageKind, message: &str) -> impl Future<Output = ()> + Send;

    fn read_file(&self, path: &Path) -> impl Future<Output = Result<String, FileError>> + Send;

    fn write_file(
        &self,
        path: &Path,
        bytes: &[u8],
    ) -> impl Future<Output = Result<(), FileError>> + Send;

    /// Open a URL in the system browser.
    fn open_external(&self, url: &str) -> impl Future<Output = ()> + Send;

    /// Print the given standalone HTML document to a PDF file.
    fn export_pdf(
        &self,
        html: &str,
        dest: &Path,
    ) -> impl Future<Output = Result<(), FileError>> + Send;
}
