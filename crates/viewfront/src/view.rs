//! The view façade.
//!
//! [`View`] ties the pieces together: it holds the configuration and the
//! assigned variables, resolves template identifiers to files, lazily creates
//! the configured engine, renders, and post-processes the output.
//!
//! # Render Pipeline
//!
//! ```text
//! fetch("user/list", vars)
//!   → resolve path        <view_path><theme>/user/list.html
//!   → existence check     TemplateNotFound aborts here, nothing is emitted
//!   → engine (lazy)       created from config.template on first use, rooted at <view_path><theme>
//!   → engine.fetch
//!   → view_filter hooks
//!   → parse_str replacements
//!   → responder           only with emit_response = true
//! ```
//!
//! [`show`](View::show) runs the same pipeline on literal template content,
//! skipping resolution and the existence check.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ViewConfig;
use crate::context::RequestContext;
use crate::engine::{EngineOptions, EngineRegistry, TemplateSource, Vars, ViewEngine};
use crate::error::ViewError;
use crate::hooks::{HookError, Hooks};
use crate::resolve::resolve_template;
use crate::response::{content_type_for, Responder};
use crate::theme::{self, ThemeSelection};

/// Renders templates for a request.
///
/// # Example
///
/// ```rust
/// use viewfront::{RequestContext, View, ViewConfig};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::create_dir_all(dir.path().join("user")).unwrap();
/// std::fs::write(dir.path().join("user/list.html"), "{{ count }} users").unwrap();
///
/// let config = ViewConfig {
///     view_path: format!("{}/", dir.path().display()),
///     view_depr: "/".into(),
///     ..ViewConfig::default()
/// };
/// let mut view = View::new(config)
///     .with_context(RequestContext::new().with_controller("user").with_action("list"));
///
/// view.assign("count", 3);
/// assert_eq!(view.render("").unwrap(), "3 users");
/// ```
pub struct View {
    config: ViewConfig,
    data: Vars,
    engine: Option<Box<dyn ViewEngine>>,
    /// Driver and options passed to [`View::engine`], reused on rebuild.
    engine_spec: Option<(String, Map<String, Value>)>,
    /// Theme prefix the current engine's loader is rooted under.
    engine_theme: String,
    theme: Option<String>,
    context: RequestContext,
    hooks: Hooks,
    engines: EngineRegistry,
    responder: Option<Box<dyn Responder>>,
}

impl Default for View {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}

impl View {
    /// Creates a view with the given configuration.
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config,
            data: Vars::new(),
            engine: None,
            engine_spec: None,
            engine_theme: String::new(),
            theme: None,
            context: RequestContext::new(),
            hooks: Hooks::new(),
            engines: EngineRegistry::new(),
            responder: None,
        }
    }

    // =========================================================================
    // Collaborators
    // =========================================================================

    /// Sets the request context used for template resolution.
    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }

    pub fn set_context(&mut self, context: RequestContext) -> &mut Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Replaces the output hooks.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Adds a view filter hook.
    pub fn view_filter<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(String) -> Result<String, HookError> + 'static,
    {
        self.hooks.push_view_filter(f);
        self
    }

    /// Installs the responder used when `emit_response` is on.
    pub fn with_responder(mut self, responder: impl Responder + 'static) -> Self {
        self.responder = Some(Box::new(responder));
        self
    }

    pub fn set_responder(&mut self, responder: impl Responder + 'static) -> &mut Self {
        self.responder = Some(Box::new(responder));
        self
    }

    // =========================================================================
    // Variables
    // =========================================================================

    /// Assigns one template variable, replacing any previous value.
    pub fn assign(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(name.into(), value.into());
        self
    }

    /// Merges variables into the assigned set. Later values win on conflicts.
    pub fn assign_all(&mut self, vars: Vars) -> &mut Self {
        self.data.extend(vars);
        self
    }

    /// Merges the fields of a serializable struct or map into the assigned
    /// variables.
    pub fn assign_data<T: Serialize + ?Sized>(&mut self, data: &T) -> Result<&mut Self, ViewError> {
        match serde_json::to_value(data)? {
            Value::Object(map) => Ok(self.assign_all(map)),
            other => Err(ViewError::Serialization(format!(
                "template data must serialize to a map, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Returns an assigned variable.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Returns true if the variable is assigned.
    pub fn has(&self, name: &str) -> bool {
        self.data.contains_key(name)
    }

    /// All assigned variables.
    pub fn vars(&self) -> &Vars {
        &self.data
    }

    pub fn clear_vars(&mut self) -> &mut Self {
        self.data.clear();
        self
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    /// Shallow-merges known options from `partial` into the config.
    ///
    /// Takes effect for resolution immediately; an engine that already exists
    /// keeps the options it was created with.
    pub fn configure(&mut self, partial: &Value) -> Result<&mut Self, ViewError> {
        self.config.merge(partial)?;
        Ok(self)
    }

    /// Returns one config option by key.
    pub fn config_value(&self, key: &str) -> Result<Value, ViewError> {
        self.config.get(key)
    }

    /// Replaces one config option by key.
    pub fn set_config(&mut self, key: &str, value: Value) -> Result<&mut Self, ViewError> {
        self.config.set(key, value)?;
        Ok(self)
    }

    // =========================================================================
    // Engine
    // =========================================================================

    /// Registers an engine driver on this view.
    pub fn register_engine<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(&EngineOptions) -> Result<Box<dyn ViewEngine>, ViewError> + Send + Sync + 'static,
    {
        self.engines.register(name, factory);
        self
    }

    /// Creates the named engine and uses it for subsequent renders.
    ///
    /// `options` are driver options; the view's path settings are added to
    /// them.
    pub fn engine(&mut self, name: &str, options: Map<String, Value>) -> Result<&mut Self, ViewError> {
        let theme = self.current_theme();
        let engine = self.build_engine(name, &options, &theme)?;
        if let Some(previous) = &self.engine {
            tracing::warn!(
                previous = previous.name(),
                next = engine.name(),
                "replacing template engine"
            );
        }
        self.engine = Some(engine);
        self.engine_spec = Some((name.to_string(), options));
        self.engine_theme = theme;
        Ok(self)
    }

    /// Name of the engine in use, if one has been created.
    pub fn engine_name(&self) -> Option<&str> {
        self.engine.as_deref().map(|e| e.name())
    }

    /// Builds an engine whose base directory is the view path plus `theme`,
    /// so includes and extends resolve inside the active theme.
    fn build_engine(
        &self,
        name: &str,
        options: &Map<String, Value>,
        theme: &str,
    ) -> Result<Box<dyn ViewEngine>, ViewError> {
        let mut options = EngineOptions::from_config(&self.config, options);
        options.view_path.push_str(theme);
        tracing::debug!(engine = name, view_path = %options.view_path, "initializing template engine");
        self.engines.create(name, &options)
    }

    /// Returns the engine, creating it on first use and rebuilding it when
    /// the theme changed since it was created.
    fn ensure_engine(&mut self) -> Result<&dyn ViewEngine, ViewError> {
        let theme = self.current_theme();
        let engine = match self.engine.take() {
            Some(engine) if self.engine_theme == theme => engine,
            previous => {
                let (name, options) = match &self.engine_spec {
                    Some((name, options)) => (name.as_str(), options),
                    None => (self.config.template.kind.as_str(), &self.config.template.options),
                };
                match self.build_engine(name, options, &theme) {
                    Ok(engine) => engine,
                    Err(err) => {
                        self.engine = previous;
                        return Err(err);
                    }
                }
            }
        };
        self.engine_theme = theme;
        Ok(&**self.engine.insert(engine))
    }

    // =========================================================================
    // Themes
    // =========================================================================

    /// Turns theming on or off, or selects a theme.
    ///
    /// Accepts a [`ThemeSelection`], a `bool`, or a theme name.
    pub fn theme(&mut self, selection: impl Into<ThemeSelection>) -> &mut Self {
        theme::apply_selection(&mut self.config, &mut self.theme, selection.into());
        self
    }

    /// Name of the theme in effect, if theming is on.
    pub fn active_theme(&self) -> Option<&str> {
        theme::active_theme(&self.config, self.theme.as_deref())
    }

    /// Path prefix of the theme in effect: the theme name followed by a
    /// separator, or an empty string when theming is off.
    pub fn current_theme(&self) -> String {
        theme::theme_prefix(&self.config, self.theme.as_deref())
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Resolves a template identifier to a file path.
    ///
    /// See [`crate::resolve`] for the identifier forms.
    pub fn parse_template(&self, template: &str) -> PathBuf {
        resolve_template(template, &self.config, self.theme.as_deref(), &self.context)
    }

    /// Renders a template file.
    ///
    /// `vars` replaces the assigned variables for this render when non-empty;
    /// an empty map renders with the assigned variables. `options` are passed
    /// through to the engine.
    ///
    /// # Errors
    ///
    /// [`ViewError::TemplateNotFound`] if the resolved file does not exist. In
    /// that case no engine is created and no hooks or responder run.
    pub fn fetch(
        &mut self,
        template: &str,
        vars: Vars,
        options: Map<String, Value>,
    ) -> Result<String, ViewError> {
        let path = self.parse_template(template);
        self.check_exists(&path)?;

        let vars = self.effective_vars(vars);
        if self.context.debug {
            let names: Vec<&str> = vars.keys().map(String::as_str).collect();
            tracing::debug!(template = %path.display(), vars = ?names, "[ VIEW ]");
        }

        self.render_source(TemplateSource::File(path), vars, options)
    }

    /// Renders a template with the assigned variables and no engine options.
    pub fn render(&mut self, template: &str) -> Result<String, ViewError> {
        self.fetch(template, Vars::new(), Map::new())
    }

    /// Renders literal template content.
    pub fn show(&mut self, content: &str, vars: Vars) -> Result<String, ViewError> {
        let vars = self.effective_vars(vars);
        self.render_source(TemplateSource::Content(content.to_string()), vars, Map::new())
    }

    fn effective_vars(&self, vars: Vars) -> Vars {
        if vars.is_empty() {
            self.data.clone()
        } else {
            vars
        }
    }

    fn check_exists(&self, path: &Path) -> Result<(), ViewError> {
        if !path.is_file() {
            return Err(ViewError::not_found(path));
        }
        if self.context.debug && cfg!(windows) && case_differs(path) {
            return Err(ViewError::not_found(path));
        }
        Ok(())
    }

    fn render_source(
        &mut self,
        source: TemplateSource,
        vars: Vars,
        options: Map<String, Value>,
    ) -> Result<String, ViewError> {
        let content = self.ensure_engine()?.fetch(&source, &vars, &options)?;

        let content = if self.hooks.is_empty() {
            content
        } else {
            self.hooks.run_view_filter(content)?
        };

        let content = if self.config.parse_str.is_empty() {
            content
        } else {
            self.config.parse_str.apply(&content)
        };

        if self.config.emit_response {
            if let Some(responder) = &self.responder {
                responder.send(&content, content_type_for(&self.config.view_suffix))?;
            }
        }

        Ok(content)
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("config", &self.config)
            .field("vars", &self.data.len())
            .field("engine", &self.engine_name())
            .field("theme", &self.theme)
            .field("context", &self.context)
            .field("hooks", &self.hooks)
            .field("engines", &self.engines)
            .field("responder", &self.responder.is_some())
            .finish()
    }
}

/// True if any name in `path` differs in case from the entry on disk.
fn case_differs(path: &Path) -> bool {
    match std::fs::canonicalize(path) {
        Ok(canonical) => names_differ(path, &canonical),
        Err(_) => true,
    }
}

/// Compares the trailing normal components of `requested` against
/// `canonical`, stopping at the first `.`, `..`, root or prefix component.
fn names_differ(requested: &Path, canonical: &Path) -> bool {
    let mut on_disk = canonical.components().rev();
    for component in requested.components().rev() {
        let Component::Normal(name) = component else {
            break;
        };
        match on_disk.next() {
            Some(Component::Normal(actual)) if actual == name => {}
            _ => return true,
        }
    }
    false
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "a map",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: Value) -> Vars {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_assign_and_get() {
        let mut view = View::default();
        view.assign("name", "Alice").assign("age", 30);

        assert_eq!(view.get("name"), Some(&json!("Alice")));
        assert!(view.has("age"));
        assert!(!view.has("missing"));
        assert_eq!(view.vars().len(), 2);
    }

    #[test]
    fn test_assign_all_last_write_wins() {
        let mut view = View::default();
        view.assign("a", 1);
        view.assign_all(vars(json!({"a": 2, "b": 3})));

        assert_eq!(view.get("a"), Some(&json!(2)));
        assert_eq!(view.get("b"), Some(&json!(3)));
    }

    #[test]
    fn test_assign_data_struct() {
        #[derive(Serialize)]
        struct Page {
            title: String,
            items: Vec<u32>,
        }

        let mut view = View::default();
        view.assign_data(&Page {
            title: "Home".into(),
            items: vec![1, 2],
        })
        .unwrap();

        assert_eq!(view.get("title"), Some(&json!("Home")));
        assert_eq!(view.get("items"), Some(&json!([1, 2])));
    }

    #[test]
    fn test_assign_data_rejects_non_map() {
        let mut view = View::default();
        let result = view.assign_data(&vec![1, 2, 3]);
        assert!(matches!(result, Err(ViewError::Serialization(msg)) if msg.contains("an array")));
    }

    #[test]
    fn test_clear_vars() {
        let mut view = View::default();
        view.assign("a", 1).clear_vars();
        assert!(view.vars().is_empty());
    }

    #[test]
    fn test_config_accessors() {
        let mut view = View::default();
        view.set_config("view_suffix", json!(".tpl")).unwrap();
        assert_eq!(view.config_value("view_suffix").unwrap(), json!(".tpl"));
        assert!(view.config_value("nope").is_err());

        view.configure(&json!({"default_theme": "blue", "ignored": true}))
            .unwrap();
        assert_eq!(view.config().default_theme, "blue");
    }

    #[test]
    fn test_theme_selection() {
        let mut view = View::default();
        assert_eq!(view.current_theme(), "");
        assert_eq!(view.active_theme(), None);

        view.theme(true);
        assert_eq!(view.active_theme(), Some("default"));

        view.theme("blue");
        assert_eq!(
            view.current_theme(),
            format!("blue{}", std::path::MAIN_SEPARATOR_STR)
        );

        view.theme(ThemeSelection::Off);
        assert_eq!(view.current_theme(), "");
    }

    #[test]
    fn test_show_uses_assigned_vars_when_none_given() {
        let mut view = View::default();
        view.assign("name", "World");
        assert_eq!(view.show("Hello, {{ name }}!", Vars::new()).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_show_given_vars_replace_assigned() {
        let mut view = View::default();
        view.assign("name", "World").assign("greeting", "Hello");

        let output = view
            .show("{{ greeting }}, {{ name }}!", vars(json!({"name": "Bob"})))
            .unwrap();
        assert_eq!(output, ", Bob!");
    }

    #[test]
    fn test_engine_lazily_created_from_config() {
        let mut view = View::new(ViewConfig {
            template: crate::config::EngineConfig::new("native"),
            ..ViewConfig::default()
        });
        assert_eq!(view.engine_name(), None);

        view.assign("x", 1);
        assert_eq!(view.show("x={x}", Vars::new()).unwrap(), "x=1");
        assert_eq!(view.engine_name(), Some("native"));
    }

    #[test]
    fn test_explicit_engine_selection() {
        let mut view = View::default();
        view.engine("Native", Map::new()).unwrap();
        assert_eq!(view.engine_name(), Some("native"));
        assert!(view.engine("nonexistent", Map::new()).is_err());
        // A failed switch keeps the previous engine.
        assert_eq!(view.engine_name(), Some("native"));
    }

    #[test]
    fn test_unknown_configured_engine() {
        let mut view = View::new(ViewConfig {
            template: crate::config::EngineConfig::new("think"),
            ..ViewConfig::default()
        });
        let result = view.show("x", Vars::new());
        assert!(matches!(result, Err(ViewError::UnknownEngine(_))));
    }

    #[test]
    fn test_custom_engine_registration() {
        struct Upper;
        impl ViewEngine for Upper {
            fn name(&self) -> &str {
                "upper"
            }
            fn fetch(
                &self,
                source: &TemplateSource,
                _vars: &Vars,
                _options: &Map<String, Value>,
            ) -> Result<String, ViewError> {
                Ok(source.text()?.to_uppercase())
            }
        }

        let mut view = View::default();
        view.register_engine("upper", |_opts: &EngineOptions| Ok(Box::new(Upper)));
        view.engine("upper", Map::new()).unwrap();
        assert_eq!(view.show("abc", Vars::new()).unwrap(), "ABC");
    }

    #[test]
    fn test_post_processing_order() {
        let mut view = View::default();
        view.set_config("parse_str", json!({"__A__": "alpha"})).unwrap();
        view.view_filter(|c| Ok(c.replace("x", "__A__")));

        assert_eq!(view.show("x-x", Vars::new()).unwrap(), "alpha-alpha");
    }

    #[test]
    fn test_hook_error_aborts() {
        let mut view = View::default();
        view.view_filter(|_| Err(HookError::view_filter("nope")));
        assert!(matches!(
            view.show("x", Vars::new()),
            Err(ViewError::Hook(_))
        ));
    }

    #[test]
    fn test_fetch_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        let mut view = View::new(ViewConfig {
            view_path: format!("{}/", dir.path().display()),
            ..ViewConfig::default()
        });

        let err = view.render("nowhere").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(view.engine_name(), None);
    }

    #[test]
    fn test_names_differ_checks_directories() {
        let canonical = Path::new("/srv/app/view/User/list.html");

        assert!(!names_differ(Path::new("/srv/app/view/User/list.html"), canonical));
        assert!(!names_differ(Path::new("User/list.html"), canonical));
        assert!(names_differ(Path::new("/srv/app/view/user/list.html"), canonical));
        assert!(names_differ(Path::new("/srv/app/view/User/List.html"), canonical));
        // Components before a `..` are not compared.
        assert!(!names_differ(Path::new("../User/list.html"), canonical));
    }

    #[test]
    fn test_debug_output() {
        let view = View::default();
        let debug = format!("{:?}", view);
        assert!(debug.contains("View"));
        assert!(debug.contains("engines"));
    }
}
