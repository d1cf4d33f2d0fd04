//! Error types for the plugin host

use std::path::PathBuf;
use thiserror::Error;

/// Result type for host operations
pub type Result<T> = std::result::Result<T, HostError>;

/// Errors that can occur while loading or driving plugins
#[derive(Debug, Error)]
pub enum HostError {
    /// The plugin unit could not be located or opened
    #[error("Failed to load library '{path}': {message}")]
    LoadError {
        path: PathBuf,
        message: String,
    },

    /// The unit does not contain the declaration symbol
    #[error("Symbol '{symbol}' not found in library '{library}'")]
    SymbolNotFound {
        library: String,
        symbol: String,
    },

    /// The plugin was built against a different contract
    #[error("Version mismatch: library version {library_version}, expected {expected_version}")]
    VersionMismatch {
        library_version: String,
        expected_version: String,
    },

    /// A plugin with this name is already loaded
    #[error("Plugin '{0}' is already loaded")]
    PluginAlreadyLoaded(String),

    /// No loaded plugin with this name
    #[error("Plugin '{0}' not loaded")]
    PluginNotFound(String),

    /// The plugin's register call failed
    #[error("Plugin '{plugin}' failed to register: {source}")]
    RegistrationFailed {
        plugin: String,
        #[source]
        source: affinity_core::Error,
    },

    /// Export resolution or CPU set error
    #[error(transparent)]
    Core(#[from] affinity_core::Error),

    /// Malformed configuration file
    #[error("Invalid configuration in '{path}': {message}")]
    Config {
        path: PathBuf,
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// Create a load error
    pub fn load_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        HostError::LoadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a symbol not found error
    pub fn symbol_not_found(library: impl Into<String>, symbol: impl Into<String>) -> Self {
        HostError::SymbolNotFound {
            library: library.into(),
            symbol: symbol.into(),
        }
    }
}

impl From<affinity_core::PluginError> for HostError {
    fn from(e: affinity_core::PluginError) -> Self {
        HostError::Core(e.into())
    }
}

impl From<affinity_core::CpuSetError> for HostError {
    fn from(e: affinity_core::CpuSetError) -> Self {
        HostError::Core(e.into())
    }
}
