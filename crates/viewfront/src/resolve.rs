//! Template path resolution.
//!
//! Maps a template identifier to a file path following the view directory
//! conventions:
//!
//! ```text
//! <view_path><theme>/<controller><depr><action><suffix>
//! ```
//!
//! # Identifier Forms
//!
//! | Identifier | Resolves to (controller `user`, action `edit`) |
//! |------------|------------------------------------------------|
//! | `""` | `<view_path>user/edit.html` |
//! | `"list"` | `<view_path>user/list.html` |
//! | `"blog/read"` or `"blog:read"` | `<view_path>blog/read.html` |
//! | `"admin@user/list"` | `<app_path>admin/view/user/list.html` |
//! | an existing file path | that file, canonicalized |
//!
//! `/` and `:` in identifiers are replaced with the `view_depr` separator, so
//! `blog:read` and `blog/read` are the same template. An empty `view_depr`
//! falls back to the platform path separator. Nested controllers
//! (`admin.user`) map to nested directories.
//!
//! Module-qualified identifiers (`module@template`) look in the module's view
//! layer directory under the application root instead of the view path, and
//! do not use themes. An `@` at the very start of the identifier does not
//! name a module.

use std::path::{Path, PathBuf, MAIN_SEPARATOR_STR};

use crate::config::ViewConfig;
use crate::context::RequestContext;
use crate::theme::theme_prefix;

/// Resolves a template identifier to a file path.
///
/// `theme` is the explicitly selected theme, if any. Resolution never fails:
/// whether the resulting file exists is checked by the caller.
pub fn resolve_template(
    template: &str,
    config: &ViewConfig,
    theme: Option<&str>,
    ctx: &RequestContext,
) -> PathBuf {
    if let Some(existing) = existing_file(template) {
        return existing;
    }

    let depr = match config.view_depr.as_str() {
        "" => MAIN_SEPARATOR_STR,
        depr => depr,
    };
    let mut template = template.replace(['/', ':'], depr);

    let base = match module_split(&template) {
        Some((module, rest)) => {
            let base = module_view_dir(module, config, ctx);
            template = rest.to_string();
            base
        }
        None => format!("{}{}", config.view_path, theme_prefix(config, theme)),
    };

    if let Some(controller) = ctx.controller_path() {
        if template.is_empty() {
            template = format!("{}{}{}", controller, depr, ctx.action_name());
        } else if !template.contains(depr) {
            template = format!("{}{}{}", controller, depr, template);
        }
    }

    PathBuf::from(format!("{}{}{}", base, template, config.view_suffix))
}

/// Canonical path of `template` if it names an existing file.
fn existing_file(template: &str) -> Option<PathBuf> {
    if template.is_empty() {
        return None;
    }
    let path = Path::new(template);
    if !path.is_file() {
        return None;
    }
    Some(std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf()))
}

/// Splits `module@template`. Only the first two `@`-separated segments are
/// used; an `@` at position 0 is not a module separator.
fn module_split(template: &str) -> Option<(&str, &str)> {
    match template.find('@') {
        Some(pos) if pos > 0 => {
            let module = &template[..pos];
            let rest = template[pos + 1..].split('@').next().unwrap_or("");
            Some((module, rest))
        }
        _ => None,
    }
}

/// View directory of a module under the application root.
fn module_view_dir(module: &str, config: &ViewConfig, ctx: &RequestContext) -> String {
    let module_dir = if ctx.multi_module {
        format!("{}{}", module, MAIN_SEPARATOR_STR)
    } else {
        String::new()
    };
    format!(
        "{}{}{}{}",
        ctx.app_path, module_dir, config.view_layer, MAIN_SEPARATOR_STR
    )
}
