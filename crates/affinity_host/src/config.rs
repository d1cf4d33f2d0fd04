//! Host Configuration
//!
//! Which plugin to load, which CPU ids to hand it, and under which export
//! names to find its CPU set variable and capabilities.
//!
//! # Configuration Sources (in priority order)
//!
//! 1. First positional command line argument: plugin path
//! 2. Environment variables: `AFFINITY_PLUGIN`, `AFFINITY_CPUS`
//! 3. Config file: `$AFFINITY_CONFIG`, else the first of `affinity.toml`,
//!    `/etc/affinity/host.toml` that exists
//! 4. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! plugin = "target/debug/libaffinity_demo_plugin.so"
//! cpus = [1, 2, 3]
//!
//! [symbols]
//! cpuset = "V"
//! object = "Foo"
//! function = "M"
//! ```

use crate::error::{HostError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config files probed when `AFFINITY_CONFIG` is unset
pub const CONFIG_SEARCH_PATHS: &[&str] = &["affinity.toml", "/etc/affinity/host.toml"];

/// Export names the invocation sequence resolves
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolConfig {
    /// CPU set variable to overwrite
    pub cpuset: String,
    /// Object whose `m1` method is called
    pub object: String,
    /// Zero-argument function to call
    pub function: String,
}

impl Default for SymbolConfig {
    fn default() -> Self {
        Self {
            cpuset: "V".to_string(),
            object: "Foo".to_string(),
            function: "M".to_string(),
        }
    }
}

/// Complete host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Plugin library to load
    pub plugin: Option<PathBuf>,
    /// CPU ids assigned to the plugin's CPU set variable
    pub cpus: Vec<i64>,
    /// Export names
    pub symbols: SymbolConfig,
    /// Config file path, if one was read
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            plugin: None,
            cpus: vec![1, 2, 3],
            symbols: SymbolConfig::default(),
            config_path: None,
        }
    }
}

impl HostConfig {
    /// Load configuration from all sources
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var("AFFINITY_CONFIG") {
            Ok(path) if !path.is_empty() => Self::load_from_file(&path)?,
            _ => Self::load_from_search_paths()?,
        };

        config.apply_overrides(|key| std::env::var(key).ok(), std::env::args().skip(1));
        Ok(config)
    }

    fn load_from_search_paths() -> Result<Self> {
        for path in CONFIG_SEARCH_PATHS {
            if Path::new(path).is_file() {
                return Self::load_from_file(path);
            }
        }
        Ok(Self::default())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let mut config = Self::from_toml_str(&content).map_err(|e| HostError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.config_path = Some(path.to_path_buf());

        log::info!("Loaded host config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment and command line overrides.
    ///
    /// `var` looks up an environment variable; `args` are the command line
    /// arguments without the program name.
    pub fn apply_overrides<F, I>(&mut self, var: F, args: I)
    where
        F: Fn(&str) -> Option<String>,
        I: IntoIterator<Item = String>,
    {
        if let Some(plugin) = var("AFFINITY_PLUGIN").filter(|p| !p.is_empty()) {
            log::info!("Plugin from env: {}", plugin);
            self.plugin = Some(PathBuf::from(plugin));
        }

        if let Some(list) = var("AFFINITY_CPUS") {
            match parse_cpu_list(&list) {
                Some(cpus) => self.cpus = cpus,
                None => log::warn!("Ignoring malformed AFFINITY_CPUS '{}'", list),
            }
        }

        // First non-flag argument is the plugin path
        if let Some(arg) = args.into_iter().find(|a| !a.starts_with("--")) {
            log::info!("Plugin from args: {}", arg);
            self.plugin = Some(PathBuf::from(arg));
        }
    }

    /// The plugin to load, falling back to the demo plugin's build output
    pub fn plugin_path(&self) -> PathBuf {
        self.plugin.clone().unwrap_or_else(default_plugin_path)
    }
}

/// Where `cargo build` places the demo plugin
pub fn default_plugin_path() -> PathBuf {
    Path::new("target")
        .join("debug")
        .join(libloading::library_filename("affinity_demo_plugin"))
}

/// Longest range a cpu-list entry may span
pub const MAX_CPU_RANGE: i64 = 4096;

/// Parse a cpu-list such as `0-2,5,7` into ids.
///
/// Returns `None` on any malformed entry, descending range, or range spanning
/// more than [`MAX_CPU_RANGE`] ids.
pub fn parse_cpu_list(list: &str) -> Option<Vec<i64>> {
    let mut cpus = Vec::new();

    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start: i64 = start.trim().parse().ok()?;
                let end: i64 = end.trim().parse().ok()?;
                let span = end.checked_sub(start)?;
                if !(0..MAX_CPU_RANGE).contains(&span) {
                    return None;
                }
                cpus.extend(start..=end);
            }
            None => cpus.push(part.parse().ok()?),
        }
    }

    Some(cpus)
}
