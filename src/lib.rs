//! lazydokku - A terminal dashboard for dokku.
//!
//! This library provides the core functionality for the `lazydokku` binary:
//! running dokku subcommands, parsing their reports into an application
//! model, and keeping that model in sync with the backend on every change.

pub mod cli;
pub mod config;
pub mod fake;
pub mod gateway;
pub mod history_log;
pub mod models;
pub mod registry;
pub mod report;
pub mod tui;
pub mod worker;

pub use gateway::{CommandFailure, CommandRunner, Gateway, ProcessRunner};
pub use registry::Registry;

/// A backend report did not have the shape or correlation we expect.
///
/// These are compatibility errors against dokku's output contract. They abort
/// a refresh instead of installing a wrongly correlated application set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    #[error("{report}: expected {expected} lines, found {found}")]
    LineCount {
        report: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("domains:report block for '{expected}' has header '{header}'")]
    AppMismatch { expected: String, header: String },

    #[error("{report}: malformed line '{line}'")]
    MalformedLine { report: &'static str, line: String },

    #[error("{report} for '{app}': {reason}")]
    InvalidJson {
        report: &'static str,
        app: String,
        reason: String,
    },
}

/// Library-level error type for lazydokku operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Data integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl From<CommandFailure> for Error {
    fn from(failure: CommandFailure) -> Self {
        Error::CommandFailed(failure.command_line)
    }
}

/// Result type alias for lazydokku operations.
pub type Result<T> = std::result::Result<T, Error>;
