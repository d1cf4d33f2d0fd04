//! Error types for the core library

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// The core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// CPU set construction error
    #[error("CPU set error: {0}")]
    CpuSet(#[from] CpuSetError),

    /// Plugin export error
    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),
}

/// CPU set construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CpuSetError {
    /// A wide CPU id does not fit the native integer width
    #[error("CPU id {value} is outside the native integer range")]
    OutOfRange { value: i64 },
}

/// Errors raised while registering or resolving plugin exports
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginError {
    /// No export with this name
    #[error("Symbol '{symbol}' not exported by plugin '{plugin}'")]
    SymbolNotFound { plugin: String, symbol: String },

    /// The export exists but offers a different capability
    #[error("Symbol '{symbol}' in plugin '{plugin}' is {found}, expected {expected}")]
    CapabilityMismatch {
        plugin: String,
        symbol: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The same name was registered twice
    #[error("Plugin '{plugin}' exports '{symbol}' more than once")]
    DuplicateExport { plugin: String, symbol: String },
}

impl PluginError {
    /// Create a symbol not found error
    pub fn symbol_not_found(plugin: impl Into<String>, symbol: impl Into<String>) -> Self {
        PluginError::SymbolNotFound {
            plugin: plugin.into(),
            symbol: symbol.into(),
        }
    }

    /// Create a capability mismatch error
    pub fn capability_mismatch(
        plugin: impl Into<String>,
        symbol: impl Into<String>,
        expected: &'static str,
        found: &'static str,
    ) -> Self {
        PluginError::CapabilityMismatch {
            plugin: plugin.into(),
            symbol: symbol.into(),
            expected,
            found,
        }
    }
}
