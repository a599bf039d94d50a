//! Error types for topicbrief.
//!
//! Library crates use [`TopicBriefError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all topicbrief operations.
///
/// Collaborator failures (source, model, recognizer) are returned as values
/// of this type and recovered by the core components; only configuration and
/// validation errors are expected to reach the caller of the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TopicBriefError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while talking to an external service.
    #[error("network error: {0}")]
    Network(String),

    /// The knowledge source has no page with this exact title.
    #[error("page not found: {title}")]
    NotFound { title: String },

    /// The title resolves to a disambiguation page.
    #[error("ambiguous title: {title}")]
    Disambiguation { title: String },

    /// The title is a redirect and exact lookups do not follow redirects.
    #[error("title is a redirect: {title}")]
    Redirect { title: String },

    /// Response decoding error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Language model call failed (transport, quota, API error).
    #[error("model error: {0}")]
    Model(String),

    /// Entity recognizer call failed.
    #[error("recognizer error: {0}")]
    Recognizer(String),

    /// Document rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (blank keyword, malformed value).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, TopicBriefError>;

impl TopicBriefError {
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

    /// Whether this error describes a page-level lookup miss rather than a
    /// transport problem.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Disambiguation { .. } | Self::Redirect { .. }
        )
    }
}
