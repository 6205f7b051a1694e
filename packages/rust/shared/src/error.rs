//! Error types for notecraft.
//!
//! Library crates use [`NotecraftError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all notecraft operations.
///
/// The document engine itself (synthesis, parsing, merging, review) is total and
/// never produces one of these; they surface at the config, session and storage edges.
#[derive(Debug, thiserror::Error)]
pub enum NotecraftError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Malformed input data (transcript JSON and the like).
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Session lookup or lifecycle error.
    #[error("session error: {message}")]
    Session { message: String },

    /// Note store collaborator failure.
    #[error("store error: {0}")]
    Store(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty transcript, blocked save, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, NotecraftError>;

impl NotecraftError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a session error from any displayable message.
    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = NotecraftError::config("unknown save mode");
        assert_eq!(err.to_string(), "config error: unknown save mode");

        let err = NotecraftError::session("no active session for topic");
        assert!(err.to_string().starts_with("session error:"));

        let err = NotecraftError::validation("transcript is empty");
        assert!(err.to_string().contains("transcript is empty"));
    }

    #[test]
    fn io_error_keeps_path() {
        let err = NotecraftError::io(
            "/tmp/notes/java/jvm.md",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("jvm.md"));
    }
}
