//! Engine drivers by name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::{EngineOptions, JinjaEngine, NativeEngine, ViewEngine};
use crate::error::ViewError;

/// Driver name of [`JinjaEngine`].
pub const JINJA_ENGINE: &str = "jinja";

/// Driver name of [`NativeEngine`].
pub const NATIVE_ENGINE: &str = "native";

/// Constructs an engine from its options.
pub type EngineFactory =
    Arc<dyn Fn(&EngineOptions) -> Result<Box<dyn ViewEngine>, ViewError> + Send + Sync>;

/// Maps driver names to engine factories.
///
/// Names are case-insensitive: `Jinja`, `jinja` and `JINJA` select the same
/// driver.
///
/// ```rust
/// use viewfront::engine::{EngineOptions, EngineRegistry, NativeEngine};
///
/// let mut registry = EngineRegistry::new();
/// registry.register("plain", |_opts: &EngineOptions| Ok(Box::new(NativeEngine::new())));
///
/// assert!(registry.contains("Plain"));
/// assert!(registry.create("jinja", &EngineOptions::default()).is_ok());
/// ```
#[derive(Clone)]
pub struct EngineRegistry {
    factories: HashMap<String, EngineFactory>,
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineRegistry {
    /// Creates a registry with the built-in drivers.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(JINJA_ENGINE, |opts: &EngineOptions| {
            Ok(Box::new(JinjaEngine::from_options(opts)))
        });
        registry.register(NATIVE_ENGINE, |opts: &EngineOptions| {
            Ok(Box::new(NativeEngine::from_options(opts)))
        });
        registry
    }

    /// Creates a registry with no drivers.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers a driver, replacing any driver with the same name.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&EngineOptions) -> Result<Box<dyn ViewEngine>, ViewError> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.to_ascii_lowercase(), Arc::new(factory));
    }

    /// Returns true if a driver is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered driver names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Constructs the named driver.
    pub fn create(
        &self,
        name: &str,
        options: &EngineOptions,
    ) -> Result<Box<dyn ViewEngine>, ViewError> {
        let factory = self
            .factories
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| ViewError::UnknownEngine(name.to_string()))?;
        factory(options)
    }
}

impl fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("drivers", &self.names())
            .finish()
    }
}
