//! View configuration.
//!
//! [`ViewConfig`] is the fixed set of options a [`View`](crate::View) works
//! from. It can be built in code, loaded from YAML or JSON, and updated either
//! by shallow merge ([`ViewConfig::merge`]) or one key at a time
//! ([`ViewConfig::set`]).
//!
//! ```yaml
//! theme_on: true
//! default_theme: blue
//! view_path: /srv/app/view/
//! view_suffix: .html
//! parse_str:
//!   __STATIC__: /static
//!   __CDN__: https://cdn.example.com
//! template:
//!   type: jinja
//!   strict: true
//! ```
//!
//! Options are addressed by key in the merge and accessor APIs. Keys that the
//! config does not define are ignored by [`merge`](ViewConfig::merge) and
//! rejected by [`get`](ViewConfig::get) and [`set`](ViewConfig::set).

use std::fmt;
use std::path::Path;

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ViewError;

/// Driver used when the config does not name one.
pub const DEFAULT_ENGINE: &str = "jinja";

/// All option keys understood by [`ViewConfig`].
pub const CONFIG_KEYS: &[&str] = &[
    "theme_on",
    "default_theme",
    "view_path",
    "view_suffix",
    "view_depr",
    "view_layer",
    "parse_str",
    "emit_response",
    "template",
];

/// Options controlling template lookup, engine choice and output processing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Whether theme subdirectories are used.
    pub theme_on: bool,
    /// Theme used when theming is on and no theme was selected explicitly.
    pub default_theme: String,
    /// Base directory of template files. Concatenated as-is, so it normally
    /// ends with a separator.
    pub view_path: String,
    /// Template file suffix, including the dot.
    pub view_suffix: String,
    /// Separator between controller directory and template name.
    pub view_depr: String,
    /// Name of the view directory inside a module.
    pub view_layer: String,
    /// String replacements applied to rendered output.
    pub parse_str: ReplaceTable,
    /// Hand rendered content to the installed responder.
    pub emit_response: bool,
    /// Engine driver and its options.
    pub template: EngineConfig,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            theme_on: false,
            default_theme: "default".to_string(),
            view_path: String::new(),
            view_suffix: ".html".to_string(),
            view_depr: std::path::MAIN_SEPARATOR_STR.to_string(),
            view_layer: "view".to_string(),
            parse_str: ReplaceTable::new(),
            emit_response: false,
            template: EngineConfig::default(),
        }
    }
}

impl ViewConfig {
    /// Creates a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a config from YAML. Missing keys take their default values.
    pub fn from_yaml(yaml: &str) -> Result<Self, ViewError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parses a config from JSON. Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, ViewError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config file, choosing the format by extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ViewError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Returns true if `key` names a known option.
    pub fn is_known_key(key: &str) -> bool {
        CONFIG_KEYS.contains(&key)
    }

    /// Returns one option as a JSON value.
    pub fn get(&self, key: &str) -> Result<Value, ViewError> {
        let mut map = self.to_map()?;
        map.remove(key)
            .ok_or_else(|| ViewError::UnknownOption(key.to_string()))
    }

    /// Replaces one option.
    ///
    /// The config is left untouched if the value does not fit the option.
    pub fn set(&mut self, key: &str, value: Value) -> Result<(), ViewError> {
        if !Self::is_known_key(key) {
            return Err(ViewError::UnknownOption(key.to_string()));
        }
        let mut map = self.to_map()?;
        map.insert(key.to_string(), value);
        *self = serde_json::from_value(Value::Object(map))
            .map_err(|e| ViewError::invalid_option(key, e.to_string()))?;
        Ok(())
    }

    /// Shallow-merges a partial config into this one.
    ///
    /// Only known keys present in `partial` with a non-null value replace
    /// the current values; anything else in `partial` is ignored. Nested values (such as
    /// `template`) are replaced whole, not merged.
    pub fn merge(&mut self, partial: &Value) -> Result<(), ViewError> {
        let Value::Object(partial) = partial else {
            return Err(ViewError::invalid_option(
                "<config>",
                "expected a map of options",
            ));
        };
        for key in CONFIG_KEYS {
            match partial.get(*key) {
                None | Some(Value::Null) => {}
                Some(value) => self.set(key, value.clone())?,
            }
        }
        Ok(())
    }

    fn to_map(&self) -> Result<Map<String, Value>, ViewError> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            _ => Err(ViewError::Serialization(
                "view config did not serialize to a map".to_string(),
            )),
        }
    }
}

/// Engine driver name plus driver-specific options.
///
/// Serialized flat: `{ "type": "jinja", "strict": true }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Registered driver name.
    #[serde(rename = "type", default = "default_engine")]
    pub kind: String,
    /// Options passed to the driver on construction.
    #[serde(flatten)]
    pub options: Map<String, Value>,
}

fn default_engine() -> String {
    DEFAULT_ENGINE.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            kind: default_engine(),
            options: Map::new(),
        }
    }
}

impl EngineConfig {
    /// Creates an engine config for the given driver with no options.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            options: Map::new(),
        }
    }

    /// Adds a driver option.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }
}

/// Ordered search/replace pairs applied to rendered output.
///
/// Pairs are applied in order, each one over the whole content, so a later
/// pair sees the result of earlier ones. Pairs with an empty search string
/// are skipped.
///
/// Deserializes from either a map (`{search: replace}`) or a list of
/// two-element lists; serializes as the list form so order survives a
/// round trip through JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceTable {
    pairs: Vec<(String, String)>,
}

impl ReplaceTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair, replacing the value of an existing pair with the same
    /// search string in place.
    pub fn insert(&mut self, search: impl Into<String>, replace: impl Into<String>) {
        let search = search.into();
        let replace = replace.into();
        match self.pairs.iter_mut().find(|(s, _)| *s == search) {
            Some(pair) => pair.1 = replace,
            None => self.pairs.push((search, replace)),
        }
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, search: impl Into<String>, replace: impl Into<String>) -> Self {
        self.insert(search, replace);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Iterates pairs in application order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(s, r)| (s.as_str(), r.as_str()))
    }

    /// Applies every pair to `content`.
    pub fn apply(&self, content: &str) -> String {
        let mut out = content.to_string();
        for (search, replace) in &self.pairs {
            if search.is_empty() {
                continue;
            }
            out = out.replace(search.as_str(), replace);
        }
        out
    }
}

impl<S: Into<String>, R: Into<String>> FromIterator<(S, R)> for ReplaceTable {
    fn from_iter<I: IntoIterator<Item = (S, R)>>(iter: I) -> Self {
        let mut table = ReplaceTable::new();
        for (s, r) in iter {
            table.insert(s, r);
        }
        table
    }
}

impl Serialize for ReplaceTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.pairs.len()))?;
        for pair in &self.pairs {
            seq.serialize_element(pair)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for ReplaceTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = ReplaceTable;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of replacements or a list of [search, replace] pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<ReplaceTable, A::Error> {
                let mut table = ReplaceTable::new();
                while let Some((search, replace)) = map.next_entry::<String, String>()? {
                    table.insert(search, replace);
                }
                Ok(table)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<ReplaceTable, A::Error> {
                let mut table = ReplaceTable::new();
                while let Some((search, replace)) = seq.next_element::<(String, String)>()? {
                    table.insert(search, replace);
                }
                Ok(table)
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<ReplaceTable, E> {
                Ok(ReplaceTable::new())
            }
        }

        deserializer.deserialize_any(TableVisitor)
    }
}
