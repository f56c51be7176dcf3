//! Error types for klog

use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors. Anything that reaches `main` ends the run.
#[derive(Debug, Error)]
pub enum KlogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Malformed entry: {0}")]
    MalformedEntry(String),

    #[error("Corrupt entry {path}: {reason}")]
    CorruptEntry { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Editor error: {0}")]
    Editor(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Terminal error: {0}")]
    Terminal(String),

    #[error("Interrupted")]
    Interrupted,

    #[error("{0}: not implemented")]
    NotImplemented(&'static str),
}

impl KlogError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            KlogError::Config(_) => 2,
            KlogError::InvalidDate(_) => 3,
            KlogError::MalformedEntry(_) => 4,
            KlogError::CorruptEntry { .. } => 5,
            KlogError::Interrupted => 130,
            _ => 1,
        }
    }

    /// Get a user-friendly error message with suggestions
    pub fn display_with_suggestions(&self) -> String {
        match self {
            KlogError::Config(_) => {
                format!(
                    "{}\n\n\
                    The config file needs a [klog] section, e.g.:\n\
                    [klog]\n\
                    cache = \"~/.cache/klog\"\n\
                    repo = \"git@example.org:kitchenlog.git\"",
                    self
                )
            }
            KlogError::InvalidDate(text) => {
                format!(
                    "Invalid date: '{}'\n\n\
                    Dates are written as YYYY-MM-DD (e.g., 2023-05-01)",
                    text
                )
            }
            KlogError::Editor(msg) => {
                format!(
                    "Editor error: {}\n\n\
                    Suggestions:\n\
                    • Check that your editor is installed and in PATH\n\
                    • Set EDITOR environment variable (e.g., export EDITOR=nano)",
                    msg
                )
            }
            KlogError::Sync(msg) => {
                format!(
                    "Sync error: {}\n\n\
                    Suggestions:\n\
                    • Check your network connection and git credentials\n\
                    • Run with --no-sync to work on the local clone only",
                    msg
                )
            }
            _ => self.to_string(),
        }
    }
}

/// Result type using KlogError
pub type Result<T> = std::result::Result<T, KlogError>;
