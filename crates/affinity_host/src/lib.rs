//! # affinity_host - Plugin Host
//!
//! Loads plugin units and drives the values they export.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  plugin unit    │────▶│   libloading    │
//! │ (libdemo.so)    │     │                 │
//! └─────────────────┘     └────────┬────────┘
//!                                  │ affinity_plugin_declaration
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │   PluginHost    │◀────│  LoadedPlugin   │
//! │ (by name)       │     │ (PluginExports) │
//! └────────┬────────┘     └─────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │  invoke_plugin  │ ◀── HostConfig
//! └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use affinity_host::{HostConfig, PluginHost, load_and_invoke};
//!
//! let config = HostConfig::load()?;
//! let host = PluginHost::new();
//! let (plugin, cpus) = load_and_invoke(&host, &config)?;
//! ```

mod error;
mod library;
mod host;
mod invoke;
pub mod config;

pub use error::{HostError, Result};
pub use library::{LoadedPlugin, PluginInfo};
pub use host::PluginHost;
pub use invoke::{invoke_plugin, load_and_invoke};
pub use config::{HostConfig, SymbolConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{HostConfig, SymbolConfig};
    pub use crate::error::{HostError, Result};
    pub use crate::host::PluginHost;
    pub use crate::invoke::{invoke_plugin, load_and_invoke};
    pub use crate::library::LoadedPlugin;
}
