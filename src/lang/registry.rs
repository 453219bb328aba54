//! Plugin registry - the dispatch table the pipeline runs.
//!
//! Plugins run in registration order. Because the first plugin to claim a
//! unit wins, order decides precedence between ecosystems.

use crate::lang::plugin::LanguagePlugin;
use crate::lang::python::PythonExecutable;
use crate::util::config::Config;

/// Ordered registry of language plugins.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn LanguagePlugin>>,
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        PluginRegistry::default()
    }

    /// Create a registry with all built-in plugins configured from `config`.
    pub fn with_defaults(config: &Config) -> Self {
        let mut registry = PluginRegistry::new();
        registry.register(Box::new(PythonExecutable::from_config(config)));
        registry
    }

    /// Register a plugin. A plugin with the same name is replaced in place.
    pub fn register(&mut self, plugin: Box<dyn LanguagePlugin>) {
        match self.plugins.iter().position(|p| p.name() == plugin.name()) {
            Some(index) => self.plugins[index] = plugin,
            None => self.plugins.push(plugin),
        }
    }

    /// Get a plugin by name.
    pub fn get(&self, name: &str) -> Option<&dyn LanguagePlugin> {
        self.plugins
            .iter()
            .find(|p| p.name() == name)
            .map(|p| p.as_ref())
    }

    /// Plugins in run order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn LanguagePlugin> + '_ {
        self.plugins.iter().map(|p| p.as_ref())
    }

    /// Plugin names in run order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::{CompilationResult, Dependencies};
    use crate::lang::plugin::PluginError;

    struct Noop(&'static str);

    impl LanguagePlugin for Noop {
        fn name(&self) -> &str {
            self.0
        }

        fn transform(
            &self,
            _result: &mut CompilationResult,
            _dependencies: &mut Dependencies,
        ) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[test]
    fn test_defaults() {
        let registry = PluginRegistry::with_defaults(&Config::default());
        assert_eq!(registry.names(), vec!["python_executable"]);
        assert!(registry.contains("python_executable"));
    }

    #[test]
    fn test_registration_order_and_replacement() {
        let mut registry = PluginRegistry::new();
        assert!(registry.is_empty());

        registry.register(Box::new(Noop("first")));
        registry.register(Box::new(Noop("second")));
        registry.register(Box::new(Noop("first")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["first", "second"]);
        assert!(registry.get("second").is_some());
        assert!(registry.get("third").is_none());
    }
}
