//! Error types for view rendering.
//!
//! [`ViewError`] is the error type returned by every fallible operation on a
//! [`View`](crate::View). It hides the underlying template engine's error types
//! behind a stable API.

use std::path::PathBuf;

use thiserror::Error;

use crate::hooks::HookError;

/// Error code carried by [`ViewError::TemplateNotFound`].
pub const TEMPLATE_NOT_FOUND_CODE: u32 = 10700;

/// Error type for view rendering operations.
#[derive(Debug, Error)]
pub enum ViewError {
    /// The resolved template file does not exist.
    ///
    /// This aborts the render before any output is produced.
    #[error("template file not exists: {}", path.display())]
    TemplateNotFound {
        /// The path the template identifier resolved to.
        path: PathBuf,
    },

    /// A configuration key that the view does not know about.
    #[error("unknown view option: {0}")]
    UnknownOption(String),

    /// A known configuration key was given a value of the wrong shape.
    #[error("invalid value for view option '{key}': {message}")]
    InvalidOption { key: String, message: String },

    /// No engine driver is registered under the requested name.
    #[error("unknown template engine: {0}")]
    UnknownEngine(String),

    /// Template compilation or rendering failed inside an engine.
    #[error("template error: {0}")]
    Engine(String),

    /// A view filter hook aborted rendering.
    #[error(transparent)]
    Hook(#[from] HookError),

    /// I/O error (e.g., reading a template from disk).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Variable or configuration (de)serialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ViewError {
    /// Creates a template-not-found error for the given path.
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::TemplateNotFound { path: path.into() }
    }

    /// Creates an invalid-option error.
    pub fn invalid_option(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Numeric error code, if this kind of error has one.
    pub fn code(&self) -> Option<u32> {
        match self {
            ViewError::TemplateNotFound { .. } => Some(TEMPLATE_NOT_FOUND_CODE),
            _ => None,
        }
    }

    /// Returns true if this is a template-not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ViewError::TemplateNotFound { .. })
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for ViewError {
    fn from(err: serde_yaml::Error) -> Self {
        ViewError::Serialization(err.to_string())
    }
}

impl From<minijinja::Error> for ViewError {
    fn from(err: minijinja::Error) -> Self {
        use minijinja::ErrorKind;

        match err.kind() {
            ErrorKind::BadSerialization => ViewError::Serialization(err.to_string()),
            _ => {
                // minijinja keeps the interesting part (line info, undefined name)
                // in the detail/source chain, Display already includes it.
                ViewError::Engine(err.to_string())
            }
        }
    }
}
