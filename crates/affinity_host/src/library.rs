//! Plugin units
//!
//! Opens a shared library, resolves its declaration and collects the
//! exports its register call hands over. Statically linked plugins go
//! through the same validation with no library attached.

use crate::error::{HostError, Result};
use affinity_core::{
    PluginDeclaration, PluginExports, AFFINITY_API_VERSION, CORE_VERSION, DECLARATION_NAME,
    DECLARATION_SYMBOL,
};
use libloading::{Library, Symbol};
use std::path::{Path, PathBuf};

/// Information about a loaded plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Plugin name from its declaration
    pub name: String,
    /// Library file path, `None` for static plugins
    pub path: Option<PathBuf>,
    /// API version
    pub api_version: u32,
    /// Core version the plugin was built against
    pub core_version: String,
    /// Number of exports after registration
    pub export_count: usize,
}

/// A plugin whose exports have been collected
pub struct LoadedPlugin {
    /// Exports may point into the library, so they are declared (and dropped) first
    exports: PluginExports,
    /// Plugin info
    pub info: PluginInfo,
    /// The underlying library handle
    library: Option<Library>,
}

impl LoadedPlugin {
    /// Load a plugin unit from a path
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Load the library
        let library = unsafe {
            Library::new(path).map_err(|e| HostError::load_error(path, e.to_string()))?
        };

        // Read the declaration static
        let declaration = unsafe {
            let symbol: Symbol<*const PluginDeclaration> =
                library.get(DECLARATION_SYMBOL).map_err(|_| {
                    HostError::symbol_not_found(path.display().to_string(), DECLARATION_NAME)
                })?;
            **symbol
        };

        Self::instantiate(declaration, Some(path.to_path_buf()), Some(library))
    }

    /// Register a statically linked plugin
    pub fn from_declaration(declaration: PluginDeclaration) -> Result<Self> {
        Self::instantiate(declaration, None, None)
    }

    fn instantiate(
        declaration: PluginDeclaration,
        path: Option<PathBuf>,
        library: Option<Library>,
    ) -> Result<Self> {
        // Check contract versions before calling into the plugin
        if declaration.api_version != AFFINITY_API_VERSION {
            return Err(HostError::VersionMismatch {
                library_version: declaration.api_version.to_string(),
                expected_version: AFFINITY_API_VERSION.to_string(),
            });
        }
        if declaration.core_version != CORE_VERSION {
            return Err(HostError::VersionMismatch {
                library_version: declaration.core_version.to_string(),
                expected_version: CORE_VERSION.to_string(),
            });
        }

        let mut exports = PluginExports::new(declaration.name);
        (declaration.register)(&mut exports).map_err(|source| HostError::RegistrationFailed {
            plugin: declaration.name.to_string(),
            source,
        })?;

        let info = PluginInfo {
            name: declaration.name.to_string(),
            path,
            api_version: declaration.api_version,
            core_version: declaration.core_version.to_string(),
            export_count: exports.len(),
        };

        log::info!(
            "Loaded plugin '{}' ({}) with {} exports",
            info.name,
            info.path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "static".to_string()),
            info.export_count
        );

        Ok(Self {
            exports,
            info,
            library,
        })
    }

    /// Get the plugin name
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Get the library path
    pub fn path(&self) -> Option<&Path> {
        self.info.path.as_deref()
    }

    /// Whether the plugin came from a shared library
    pub fn is_dynamic(&self) -> bool {
        self.library.is_some()
    }

    /// The plugin's exports
    pub fn exports(&self) -> &PluginExports {
        &self.exports
    }
}

impl Drop for LoadedPlugin {
    fn drop(&mut self) {
        log::debug!("Unloading plugin '{}'", self.info.name);
        // Exports drop before the library handle
    }
}

impl std::fmt::Debug for LoadedPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedPlugin")
            .field("info", &self.info)
            .field("exports", &self.exports)
            .finish()
    }
}
