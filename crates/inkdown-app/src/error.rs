use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use inkdown_render::RenderError;
use inkdown_session::{BackendError, SessionError};

use crate::host::FileError;

/// Errors surfaced at the controller boundary.
#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Render(#[from] RenderError),

    #[error("{}: {source}", .path.display())]
    #[diagnostic(code(app::file))]
    File {
        path: PathBuf,
        #[source]
        source: FileError,
    },

    #[error("failed to persist session")]
    #[diagnostic(code(app::persist))]
    Persist(#[source] BackendError),
}

pub type Result<T> = std::result::Result<T, AppError>;
