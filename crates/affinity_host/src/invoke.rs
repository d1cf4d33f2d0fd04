//! Invocation sequence
//!
//! Drives one plugin through its three exports in order:
//!
//! 1. overwrite the CPU set variable with the configured CPU ids
//! 2. call `m1` on the object export
//! 3. call the function export
//!
//! The sequence stops at the first failure. Steps already executed keep
//! their effects.

use crate::config::HostConfig;
use crate::error::Result;
use crate::host::PluginHost;
use crate::library::LoadedPlugin;
use affinity_core::CpuSet;
use std::sync::Arc;

/// Run the invocation sequence against a loaded plugin.
///
/// Returns the CPU set that was assigned.
pub fn invoke_plugin(plugin: &LoadedPlugin, config: &HostConfig) -> Result<CpuSet> {
    run_steps(plugin, config).map_err(|e| {
        log::error!("Invocation of plugin '{}' aborted: {}", plugin.name(), e);
        e
    })
}

fn run_steps(plugin: &LoadedPlugin, config: &HostConfig) -> Result<CpuSet> {
    let exports = plugin.exports();
    let symbols = &config.symbols;

    let cpus = CpuSet::from_i64(config.cpus.iter().copied())?;
    let slot = exports.cpuset(&symbols.cpuset)?;
    let previous = slot.set(cpus.clone());
    log::info!(
        "Assigned {}.{} = [{}] (was [{}])",
        plugin.name(),
        symbols.cpuset,
        cpus,
        previous
    );

    let object = exports.object(&symbols.object)?;
    log::debug!("Calling {}.{}.m1()", plugin.name(), symbols.object);
    object.m1();

    let function = exports.function(&symbols.function)?;
    log::debug!("Calling {}.{}()", plugin.name(), symbols.function);
    function();

    Ok(cpus)
}

/// Load the configured plugin into `host` and run the invocation sequence.
///
/// Failures are logged here with their context before being returned.
pub fn load_and_invoke(
    host: &PluginHost,
    config: &HostConfig,
) -> Result<(Arc<LoadedPlugin>, CpuSet)> {
    let path = config.plugin_path();
    let plugin = host.load_library(&path).map_err(|e| {
        log::error!("Could not load plugin from {}: {}", path.display(), e);
        e
    })?;

    let cpus = invoke_plugin(&plugin, config)?;
    Ok((plugin, cpus))
}
