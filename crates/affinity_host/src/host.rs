//! Plugin host
//!
//! Central registry of loaded plugins, keyed by the name in each plugin's
//! declaration.

use crate::error::{HostError, Result};
use crate::library::LoadedPlugin;
use affinity_core::PluginDeclaration;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Central registry for loaded plugins
pub struct PluginHost {
    /// Loaded plugins by name
    plugins: RwLock<HashMap<String, Arc<LoadedPlugin>>>,
}

impl PluginHost {
    /// Create a new empty host
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// Load a plugin from a shared library
    pub fn load_library(&self, path: impl AsRef<Path>) -> Result<Arc<LoadedPlugin>> {
        let path = path.as_ref();

        // Check if already loaded
        if self.plugins.read().values().any(|p| p.path() == Some(path)) {
            return Err(HostError::PluginAlreadyLoaded(path.display().to_string()));
        }

        self.insert(LoadedPlugin::load(path)?)
    }

    /// Register a statically linked plugin
    pub fn register_static(&self, declaration: PluginDeclaration) -> Result<Arc<LoadedPlugin>> {
        if self.is_loaded(declaration.name) {
            return Err(HostError::PluginAlreadyLoaded(declaration.name.to_string()));
        }

        self.insert(LoadedPlugin::from_declaration(declaration)?)
    }

    fn insert(&self, plugin: LoadedPlugin) -> Result<Arc<LoadedPlugin>> {
        let mut plugins = self.plugins.write();
        if plugins.contains_key(plugin.name()) {
            return Err(HostError::PluginAlreadyLoaded(plugin.name().to_string()));
        }

        let plugin = Arc::new(plugin);
        plugins.insert(plugin.name().to_string(), plugin.clone());
        Ok(plugin)
    }

    /// Remove a plugin. Its library stays mapped until the last handle drops.
    pub fn unload(&self, name: &str) -> Result<()> {
        let plugin = self
            .plugins
            .write()
            .remove(name)
            .ok_or_else(|| HostError::PluginNotFound(name.to_string()))?;

        if Arc::strong_count(&plugin) > 1 {
            log::debug!("Plugin '{}' removed but still referenced", name);
        }
        log::info!("Unloaded plugin '{}'", name);
        Ok(())
    }

    /// Get a loaded plugin by name
    pub fn get(&self, name: &str) -> Result<Arc<LoadedPlugin>> {
        self.plugins
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| HostError::PluginNotFound(name.to_string()))
    }

    /// Check if a plugin is loaded
    pub fn is_loaded(&self, name: &str) -> bool {
        self.plugins.read().contains_key(name)
    }

    /// Names of loaded plugins, sorted
    pub fn loaded_plugins(&self) -> Vec<String> {
        let mut names: Vec<_> = self.plugins.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of loaded plugins
    pub fn len(&self) -> usize {
        self.plugins.read().len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.plugins.read().is_empty()
    }
}

impl Default for PluginHost {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use affinity_core::Registrar;

    fn register(_: &mut dyn Registrar) -> affinity_core::Result<()> {
        Ok(())
    }

    #[test]
    fn test_host_registration() {
        let host = PluginHost::new();
        assert!(host.is_empty());

        host.register_static(PluginDeclaration::new("b", register)).unwrap();
        host.register_static(PluginDeclaration::new("a", register)).unwrap();

        assert_eq!(host.len(), 2);
        assert_eq!(host.loaded_plugins(), vec!["a".to_string(), "b".to_string()]);
        assert!(host.get("a").is_ok());
    }

    #[test]
    fn test_unload() {
        let host = PluginHost::new();
        let plugin = host.register_static(PluginDeclaration::new("a", register)).unwrap();

        host.unload("a").unwrap();
        assert!(!host.is_loaded("a"));
        assert_eq!(plugin.name(), "a");
        assert!(matches!(host.unload("a"), Err(HostError::PluginNotFound(_))));
        assert!(matches!(host.get("a"), Err(HostError::PluginNotFound(_))));
    }
}
