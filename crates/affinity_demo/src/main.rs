//! Affinity plugin demo
//!
//! Loads one plugin, writes a CPU set into its `V` variable, then calls
//! `Foo.m1()` and `M()`.
//!
//! Run with: cargo build -p affinity_demo_plugin && cargo run -p affinity_demo
//!       or: cargo run -p affinity_demo -- path/to/libplugin.so

use affinity_host::{load_and_invoke, HostConfig, PluginHost};

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    affinity_core::init();

    let config = match HostConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let host = PluginHost::new();
    match load_and_invoke(&host, &config) {
        Ok((plugin, cpus)) => {
            log::info!("Plugin '{}' now holds CPUs [{}]", plugin.name(), cpus);
        }
        // Already logged with context by load_and_invoke
        Err(_) => std::process::exit(1),
    }
}
