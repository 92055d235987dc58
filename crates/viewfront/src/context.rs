//! Request routing context for template resolution.
//!
//! Template identifiers are resolved relative to the request being served:
//! an empty identifier means "the template for the current action", and a
//! bare name means "this template in the current controller's directory".
//! [`RequestContext`] carries that routing information explicitly.
//!
//! ```rust
//! use viewfront::RequestContext;
//!
//! let ctx = RequestContext::new()
//!     .with_module("admin")
//!     .with_controller("user.profile")
//!     .with_action("edit")
//!     .with_app_path("/srv/app/");
//!
//! assert_eq!(ctx.controller_dir("/").as_deref(), Some("user/profile"));
//! ```

use std::path::MAIN_SEPARATOR_STR;

/// Routing and environment information for the current request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Current module name.
    pub module: Option<String>,
    /// Current controller name. Dots separate nested controllers.
    pub controller: Option<String>,
    /// Current action name.
    pub action: Option<String>,
    /// Application root, used for `module@template` lookups.
    pub app_path: String,
    /// Whether the application is split into modules.
    pub multi_module: bool,
    /// Debug mode: logs resolved templates and checks path case strictly.
    pub debug: bool,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            multi_module: true,
            ..Self::default()
        }
    }

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_app_path(mut self, app_path: impl Into<String>) -> Self {
        self.app_path = app_path.into();
        self
    }

    pub fn with_multi_module(mut self, multi_module: bool) -> Self {
        self.multi_module = multi_module;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Controller name as a directory path, nested controllers
    /// (`user.profile`) joined with `sep`.
    pub fn controller_dir(&self, sep: &str) -> Option<String> {
        self.controller.as_ref().map(|c| c.replace('.', sep))
    }

    /// Controller directory using the platform separator.
    pub fn controller_path(&self) -> Option<String> {
        self.controller_dir(MAIN_SEPARATOR_STR)
    }

    /// Action name, or an empty string if none is set.
    pub fn action_name(&self) -> &str {
        self.action.as_deref().unwrap_or("")
    }
}
