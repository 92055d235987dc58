//! Template engine abstraction.
//!
//! A [`ViewEngine`] turns a template (a file or literal content) plus the
//! view's variables into output text. Engines are created by name through an
//! [`EngineRegistry`], which ships with two drivers:
//!
//! | Driver | Engine | Syntax |
//! |--------|--------|--------|
//! | `jinja` (default) | [`JinjaEngine`] | Jinja2 via MiniJinja: loops, filters, includes |
//! | `native` | [`NativeEngine`] | Raw output with `{name}` placeholder substitution |
//!
//! Applications add their own drivers with [`EngineRegistry::register`].
//!
//! Engines are constructed from [`EngineOptions`]: the driver options from
//! the `template` config section, with the view's `view_path`, `view_suffix`
//! and `view_depr` laid over them.

mod jinja;
mod native;
mod registry;

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::ViewConfig;
use crate::error::ViewError;

pub use jinja::JinjaEngine;
pub use native::NativeEngine;
pub use registry::{EngineFactory, EngineRegistry, JINJA_ENGINE, NATIVE_ENGINE};

/// Template variables, keyed by name.
pub type Vars = Map<String, Value>;

/// What an engine is asked to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// A resolved template file.
    File(PathBuf),
    /// Literal template content.
    Content(String),
}

impl TemplateSource {
    /// Returns the template text, reading the file if necessary.
    pub fn text(&self) -> Result<Cow<'_, str>, ViewError> {
        match self {
            TemplateSource::File(path) => Ok(Cow::Owned(std::fs::read_to_string(path)?)),
            TemplateSource::Content(content) => Ok(Cow::Borrowed(content)),
        }
    }

    /// Returns the file path, if this source is a file.
    pub fn path(&self) -> Option<&Path> {
        match self {
            TemplateSource::File(path) => Some(path),
            TemplateSource::Content(_) => None,
        }
    }
}

/// Options an engine is constructed with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineOptions {
    /// Base directory of template files.
    pub view_path: String,
    /// Template file suffix.
    pub view_suffix: String,
    /// Separator between controller directory and template name.
    pub view_depr: String,
    /// Driver-specific options from the `template` config section.
    pub extra: Map<String, Value>,
}

impl EngineOptions {
    /// Builds engine options from the view config and driver options.
    ///
    /// The view's path settings win over same-named driver options.
    pub fn from_config(config: &ViewConfig, driver_options: &Map<String, Value>) -> Self {
        let mut extra = driver_options.clone();
        for key in ["view_path", "view_suffix", "view_depr"] {
            extra.remove(key);
        }
        Self {
            view_path: config.view_path.clone(),
            view_suffix: config.view_suffix.clone(),
            view_depr: config.view_depr.clone(),
            extra,
        }
    }

    /// Reads a boolean driver option.
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(Value::as_bool)
    }
}

/// A template engine that renders view templates.
///
/// Engines are constructed once per [`View`](crate::View) and reused for
/// every render.
pub trait ViewEngine: Send + Sync {
    /// Driver name this engine was registered under.
    fn name(&self) -> &str;

    /// Renders a template with the given variables.
    ///
    /// `options` are per-call engine options; engines ignore the ones they
    /// don't understand.
    fn fetch(
        &self,
        source: &TemplateSource,
        vars: &Vars,
        options: &Map<String, Value>,
    ) -> Result<String, ViewError>;
}
