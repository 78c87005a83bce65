//! Error types for benchtable.
//!
//! Library crates use [`BenchTableError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all benchtable operations.
#[derive(Debug, thiserror::Error)]
pub enum BenchTableError {
    /// An experiment entry is missing one of its required attributes.
    #[error("Missing '{key}' in experiment '{experiment}'")]
    Validation { experiment: String, key: String },

    /// A required attribute that must be text (`model_name`) holds another JSON type.
    #[error("'{key}' in experiment '{experiment}' must be a string, found {found}")]
    InvalidField {
        experiment: String,
        key: String,
        found: String,
    },

    /// Settings or experiment config loading error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A worker task panicked or was cancelled.
    #[error("worker error: {0}")]
    Worker(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BenchTableError>;

impl BenchTableError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error for a missing experiment attribute.
    pub fn missing(experiment: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Validation {
            experiment: experiment.into(),
            key: key.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from experiment config validation.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidField { .. })
    }
}
