//! Output filter hooks.
//!
//! Hooks let an application post-process rendered content before the view's
//! string replacements are applied and the result is returned.
//!
//! # Pipeline Position
//!
//! ```text
//! resolved template + variables
//!   → engine render
//!   → VIEW FILTER HOOKS ← (minification, analytics snippets, rewriting)
//!   → parse_str replacements
//!   → returned content / response emission
//! ```
//!
//! Filters run in registration order. Each one receives the output of the
//! previous filter and may transform it or abort the render with a
//! [`HookError`].
//!
//! # Example
//!
//! ```rust
//! use viewfront::hooks::{HookError, Hooks};
//!
//! let hooks = Hooks::new()
//!     .view_filter(|content| Ok(content.trim().to_string()))
//!     .view_filter(|content| {
//!         if content.contains("<?") {
//!             return Err(HookError::view_filter("raw processing instruction in output"));
//!         }
//!         Ok(content)
//!     });
//!
//! assert_eq!(hooks.run_view_filter("  <p>hi</p>\n".into()).unwrap(), "<p>hi</p>");
//! ```

use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// The hook point at which a hook error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    /// Filtering of rendered view content.
    ViewFilter,
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPoint::ViewFilter => write!(f, "view_filter"),
        }
    }
}

/// Error returned by a hook.
#[derive(Debug, Error)]
#[error("hook error ({point}): {message}")]
pub struct HookError {
    /// Human-readable error message
    pub message: String,
    /// The hook point where the error occurred
    pub point: HookPoint,
    /// The underlying error source, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl HookError {
    /// Creates a new hook error for the view filter point.
    pub fn view_filter(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            point: HookPoint::ViewFilter,
            source: None,
        }
    }

    /// Sets the source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        self.source = Some(source.into());
        self
    }
}

/// Type alias for view filter functions.
pub type ViewFilterFn = Rc<dyn Fn(String) -> Result<String, HookError>>;

/// Registered output hooks.
#[derive(Clone, Default)]
pub struct Hooks {
    view_filter: Vec<ViewFilterFn>,
}

impl Hooks {
    /// Creates a new empty hook set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no hooks are registered.
    pub fn is_empty(&self) -> bool {
        self.view_filter.is_empty()
    }

    /// Adds a view filter.
    pub fn view_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(String) -> Result<String, HookError> + 'static,
    {
        self.push_view_filter(f);
        self
    }

    /// Adds a view filter to an existing hook set.
    pub fn push_view_filter<F>(&mut self, f: F)
    where
        F: Fn(String) -> Result<String, HookError> + 'static,
    {
        self.view_filter.push(Rc::new(f));
    }

    /// Runs all view filters, chaining transformations.
    pub fn run_view_filter(&self, content: String) -> Result<String, HookError> {
        let mut current = content;
        for (index, hook) in self.view_filter.iter().enumerate() {
            tracing::trace!(hook = index, point = %HookPoint::ViewFilter, "running hook");
            current = hook(current)?;
        }
        Ok(current)
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("view_filter_count", &self.view_filter.len())
            .finish()
    }
}
