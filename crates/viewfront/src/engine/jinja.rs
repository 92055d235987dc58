//! MiniJinja-based engine.
//!
//! Templates use Jinja2 syntax. When the view path is set, a path loader is
//! rooted there so `{% include %}` and `{% extends %}` resolve relative to
//! the view directory:
//!
//! ```jinja
//! {% extends "layout.html" %}
//! {% block body %}{% include "index/sidebar.html" %}{% endblock %}
//! ```
//!
//! Driver options:
//!
//! | Option | Effect |
//! |--------|--------|
//! | `strict` | Undefined variables are errors instead of rendering empty |
//! | `trim_blocks` | Remove the first newline after a block tag |
//! | `lstrip_blocks` | Strip leading whitespace before a block tag |
//!
//! `strict` may also be passed per call to [`ViewEngine::fetch`].
//!
//! Files ending in `.html`, `.htm` or `.xml` are auto-escaped; literal
//! content passed to [`View::show`](crate::View::show) is not.

use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use serde_json::{Map, Value};

use super::{EngineOptions, TemplateSource, Vars, ViewEngine};
use crate::error::ViewError;

/// Jinja2 template engine.
pub struct JinjaEngine {
    env: Environment<'static>,
    view_path: String,
}

impl JinjaEngine {
    /// Creates an engine without a template loader.
    pub fn new() -> Self {
        Self::from_options(&EngineOptions::default())
    }

    /// Creates an engine configured from driver options.
    pub fn from_options(options: &EngineOptions) -> Self {
        let mut env = Environment::new();

        if !options.view_path.is_empty() {
            env.set_loader(minijinja::path_loader(options.view_path.clone()));
        }
        if options.flag("strict").unwrap_or(false) {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        }
        if let Some(trim) = options.flag("trim_blocks") {
            env.set_trim_blocks(trim);
        }
        if let Some(lstrip) = options.flag("lstrip_blocks") {
            env.set_lstrip_blocks(lstrip);
        }

        Self {
            env,
            view_path: options.view_path.clone(),
        }
    }

    /// Returns a reference to the underlying MiniJinja environment.
    pub fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Use this to register custom filters, functions or globals.
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }

    /// Name a template file is compiled under: relative to the view path
    /// when it lives below it, so error messages and includes line up with
    /// the loader's names.
    fn template_name(&self, path: &Path) -> String {
        if !self.view_path.is_empty() {
            if let Ok(relative) = path.strip_prefix(&self.view_path) {
                return relative.to_string_lossy().replace('\\', "/");
            }
        }
        path.to_string_lossy().into_owned()
    }
}

impl Default for JinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewEngine for JinjaEngine {
    fn name(&self) -> &str {
        super::JINJA_ENGINE
    }

    fn fetch(
        &self,
        source: &TemplateSource,
        vars: &Vars,
        options: &Map<String, Value>,
    ) -> Result<String, ViewError> {
        let per_call;
        let env = match options.get("strict").and_then(Value::as_bool) {
            Some(strict) => {
                let mut env = self.env.clone();
                env.set_undefined_behavior(if strict {
                    UndefinedBehavior::Strict
                } else {
                    UndefinedBehavior::Lenient
                });
                per_call = env;
                &per_call
            }
            None => &self.env,
        };

        let text = source.text()?;
        let output = match source.path() {
            Some(path) => env.render_named_str(&self.template_name(path), &text, vars)?,
            None => env.render_str(&text, vars)?,
        };
        Ok(output)
    }
}
