use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

/// Errors raised by configuration, shortcut and tab operations.
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    #[error("invalid value {value} for {key}: {reason}")]
    #[diagnostic(code(config::invalid))]
    InvalidConfig {
        key: String,
        value: serde_json::Value,
        reason: String,
    },

    #[error("template id already in use: {id}")]
    #[diagnostic(code(config::duplicate_template))]
    DuplicateTemplate { id: SmolStr },

    #[error("snippet trigger already in use: {trigger}")]
    #[diagnostic(code(config::duplicate_snippet))]
    DuplicateSnippet { trigger: SmolStr },

    #[error("{entity} requires a non-empty {field}")]
    #[diagnostic(code(config::missing_field))]
    MissingField {
        entity: &'static str,
        field: &'static str,
    },

    #[error("unknown shortcut action: {action}")]
    #[diagnostic(
        code(shortcuts::unknown_action),
        help("Known actions are listed by ShortcutRegistry::all_shortcuts")
    )]
    UnknownAction { action: SmolStr },

    #[error("shortcut binding must not be empty")]
    #[diagnostic(code(shortcuts::empty_binding))]
    EmptyBinding,

    #[error("no template with id {id}")]
    #[diagnostic(code(templates::not_found))]
    TemplateNotFound { id: SmolStr },

    #[error("no snippet with trigger {trigger}")]
    #[diagnostic(code(templates::snippet_not_found))]
    SnippetNotFound { trigger: SmolStr },

    #[error("no tab with id {id}")]
    #[diagnostic(code(tabs::not_found))]
    TabNotFound { id: SmolStr },

    #[error("failed to encode tab snapshot")]
    #[diagnostic(code(tabs::snapshot))]
    Snapshot {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SessionError>;
