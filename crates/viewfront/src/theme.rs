//! Template themes.
//!
//! A theme is a named subdirectory of the view path holding an alternate set
//! of templates. With theming on, `index/index` resolves to
//! `<view_path><theme>/index/index<suffix>`; with theming off the theme
//! segment is left out.
//!
//! Which theme is used:
//!
//! 1. Theming off: none.
//! 2. A theme selected with [`ThemeSelection::Named`]: that theme.
//! 3. Otherwise the config's `default_theme`.

use std::path::MAIN_SEPARATOR_STR;

use crate::config::ViewConfig;

/// Argument to [`View::theme`](crate::View::theme).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeSelection {
    /// Turn theming on, keeping the current (or default) theme.
    On,
    /// Turn theming off.
    Off,
    /// Turn theming on and use this theme.
    Named(String),
}

impl From<bool> for ThemeSelection {
    fn from(on: bool) -> Self {
        if on {
            ThemeSelection::On
        } else {
            ThemeSelection::Off
        }
    }
}

impl From<&str> for ThemeSelection {
    fn from(name: &str) -> Self {
        ThemeSelection::Named(name.to_string())
    }
}

impl From<String> for ThemeSelection {
    fn from(name: String) -> Self {
        ThemeSelection::Named(name)
    }
}

/// Applies a selection to the config and the explicitly selected theme.
pub(crate) fn apply_selection(
    config: &mut ViewConfig,
    selected: &mut Option<String>,
    selection: ThemeSelection,
) {
    match selection {
        ThemeSelection::On => config.theme_on = true,
        ThemeSelection::Off => config.theme_on = false,
        ThemeSelection::Named(name) => {
            config.theme_on = true;
            *selected = Some(name);
        }
    }
}

/// Name of the theme in effect, if theming is on.
pub fn active_theme<'a>(config: &'a ViewConfig, selected: Option<&'a str>) -> Option<&'a str> {
    if !config.theme_on {
        return None;
    }
    match selected {
        Some(name) if !name.is_empty() => Some(name),
        _ => Some(config.default_theme.as_str()),
    }
}

/// Path prefix contributed by the active theme: the theme name followed by
/// the platform separator, or an empty string when theming is off.
pub fn theme_prefix(config: &ViewConfig, selected: Option<&str>) -> String {
    match active_theme(config, selected) {
        Some(theme) => format!("{}{}", theme, MAIN_SEPARATOR_STR),
        None => String::new(),
    }
}
