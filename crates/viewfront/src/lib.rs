//! # viewfront - Convention-Based View Rendering
//!
//! `viewfront` is the view layer of an MVC web application. Given a template
//! identifier such as `""`, `"list"` or `"admin@user/list"`, it finds the
//! template file by convention, renders it with a pluggable engine, and
//! post-processes the output.
//!
//! ## Core Concepts
//!
//! - [`View`]: The façade. Holds config and variables, renders templates
//! - [`ViewConfig`]: View path, suffix, separators, themes, replacements, engine
//! - [`RequestContext`]: Current module/controller/action used for resolution
//! - [`ViewEngine`]: Engine contract; [`JinjaEngine`] and [`NativeEngine`] built in
//! - [`Hooks`]: `view_filter` hooks run on rendered output
//! - [`Responder`]: Optional hand-off of rendered content to the response layer
//!
//! ## Template Layout
//!
//! ```text
//! <view_path>/<theme>/<controller>/<action><suffix>
//! ```
//!
//! See [`resolve`] for all identifier forms.
//!
//! ## Quick Start
//!
//! ```rust
//! use viewfront::{Vars, View, ViewConfig};
//!
//! let mut config = ViewConfig::default();
//! config.parse_str.insert("__STATIC__", "/static");
//!
//! let mut view = View::new(config);
//! view.assign("title", "Home");
//!
//! let html = view
//!     .show(r#"<link href="__STATIC__/site.css"><h1>{{ title }}</h1>"#, Vars::new())
//!     .unwrap();
//! assert_eq!(html, r#"<link href="/static/site.css"><h1>Home</h1>"#);
//! ```
//!
//! ## Configuration From YAML
//!
//! ```rust
//! use viewfront::ViewConfig;
//!
//! let config = ViewConfig::from_yaml(r#"
//! theme_on: true
//! default_theme: classic
//! view_path: /srv/app/view/
//! template:
//!   type: native
//! "#).unwrap();
//!
//! assert_eq!(config.template.kind, "native");
//! ```

pub mod config;
pub mod context;
pub mod engine;
mod error;
pub mod hooks;
pub mod resolve;
pub mod response;
pub mod theme;
mod view;

pub use config::{EngineConfig, ReplaceTable, ViewConfig, CONFIG_KEYS, DEFAULT_ENGINE};
pub use context::RequestContext;
pub use engine::{
    EngineOptions, EngineRegistry, JinjaEngine, NativeEngine, TemplateSource, Vars, ViewEngine,
};
pub use error::{ViewError, TEMPLATE_NOT_FOUND_CODE};
pub use hooks::{HookError, HookPoint, Hooks};
pub use resolve::resolve_template;
pub use response::{BufferResponder, Responder};
pub use theme::ThemeSelection;
pub use view::View;
