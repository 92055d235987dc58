//! Native engine: raw template output with placeholder substitution.
//!
//! The template text is emitted as-is except for placeholders:
//!
//! - `{name}` - variable substitution
//! - `{user.name}` - nested property access via dot notation
//! - `{items.0}` - array index access
//! - `{{` and `}}` - escaped braces (render as `{` and `}`)
//!
//! Placeholders that name an unknown variable, and brace groups that are not
//! placeholders at all (CSS rules, inline scripts), are copied through
//! unchanged.

use serde_json::{Map, Value};

use super::{EngineOptions, TemplateSource, Vars, ViewEngine};
use crate::error::ViewError;

/// Raw output engine with `{name}` substitution.
#[derive(Debug, Clone, Default)]
pub struct NativeEngine;

impl NativeEngine {
    pub fn new() -> Self {
        Self
    }

    /// Creates the engine from driver options. The native engine takes none.
    pub fn from_options(_options: &EngineOptions) -> Self {
        Self
    }

    /// Resolves a dotted path in the variables.
    fn resolve_path<'a>(vars: &'a Vars, path: &str) -> Option<&'a Value> {
        let mut parts = path.split('.');
        let mut current = vars.get(parts.next()?)?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => {
                    let index: usize = part.parse().ok()?;
                    arr.get(index)?
                }
                _ => return None,
            };
        }

        Some(current)
    }

    fn format_value(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => value.to_string(),
        }
    }

    fn is_placeholder(name: &str) -> bool {
        !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
    }

    /// Renders template text with the given variables.
    pub fn render_str(&self, template: &str, vars: &Vars) -> String {
        let mut result = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find(['{', '}']) {
            result.push_str(&rest[..pos]);
            let tail = &rest[pos..];

            if tail.starts_with("{{") {
                result.push('{');
                rest = &tail[2..];
            } else if tail.starts_with("}}") {
                result.push('}');
                rest = &tail[2..];
            } else if tail.starts_with('}') {
                result.push('}');
                rest = &tail[1..];
            } else {
                match tail[1..].find('}') {
                    Some(end) => {
                        let raw = &tail[1..1 + end];
                        let name = raw.trim();
                        match Self::is_placeholder(name)
                            .then(|| Self::resolve_path(vars, name))
                            .flatten()
                        {
                            Some(value) => result.push_str(&Self::format_value(value)),
                            None => {
                                result.push('{');
                                result.push_str(raw);
                                result.push('}');
                            }
                        }
                        rest = &tail[end + 2..];
                    }
                    None => {
                        result.push_str(tail);
                        rest = "";
                    }
                }
            }
        }
        result.push_str(rest);

        result
    }
}

impl ViewEngine for NativeEngine {
    fn name(&self) -> &str {
        super::NATIVE_ENGINE
    }

    fn fetch(
        &self,
        source: &TemplateSource,
        vars: &Vars,
        _options: &Map<String, Value>,
    ) -> Result<String, ViewError> {
        let text = source.text()?;
        Ok(self.render_str(&text, vars))
    }
}
