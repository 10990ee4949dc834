//! Error types for AwesomeHub.
//!
//! Library crates use [`HubError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all AwesomeHub operations.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// Application configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// The list definition failed deserialization or validation.
    #[error("invalid list definition: {message}")]
    InvalidDefinition { message: String },

    /// A source option pattern could not be compiled.
    #[error("invalid {role} regex '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        role: &'static str,
        source: regex::Error,
    },

    /// A pipeline phase was called in the wrong order or with empty input.
    #[error("{message}")]
    State { message: String },

    /// A processor reported an action code outside the known set.
    #[error("got an invalid processing action {code} from processor '{processor}'")]
    UnexpectedAction { processor: String, code: u8 },

    /// A processor failed while handling a single source.
    #[error("processor failed: {0}")]
    ProcessorFailed(String),

    /// A resolver could not resolve a single entry.
    #[error("resolve failed: {0}")]
    ResolveFailed(String),

    /// Resolver cache read/write error.
    #[error("cache error: {0}")]
    Cache(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, HubError>;

impl HubError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create an invalid-definition error from any displayable message.
    pub fn definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            message: msg.into(),
        }
    }

    /// Create a phase-ordering / programming error.
    pub fn state(msg: impl Into<String>) -> Self {
        Self::State {
            message: msg.into(),
        }
    }

    /// Create a classified per-entry resolve failure.
    pub fn resolve_failed(msg: impl Into<String>) -> Self {
        Self::ResolveFailed(msg.into())
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error is isolated to a single entry during resolution.
    pub fn is_resolve_failure(&self) -> bool {
        matches!(self, Self::ResolveFailed(_))
    }
}
