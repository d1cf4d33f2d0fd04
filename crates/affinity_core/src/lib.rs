//! # affinity_core - CPU Affinity Sets
//!
//! Immutable sets of CPU identifiers and the contract plugins use to hand
//! values over to a host process.
//!
//! - [`CpuSetBuilder`]: mutable accumulator, frozen exactly once
//! - [`CpuSet`]: frozen, cheaply cloned, readable from any thread
//! - [`Registrar`] / [`PluginDeclaration`]: typed exports for plugins
//!
//! ## Example
//!
//! ```
//! use affinity_core::{CpuSet, CpuSetBuilder};
//!
//! let mut builder = CpuSetBuilder::new();
//! builder.add([1]);
//! builder.add([2, 3]);
//! let cpus = builder.freeze();
//!
//! assert_eq!(cpus.size(), 3);
//! assert_eq!(cpus, CpuSet::new([3, 2, 1]));
//! ```
//!
//! Nothing in this crate runs at load time. Processes that want the startup
//! log line call [`init`] from their entry point.

use std::sync::Once;

pub mod builder;
pub mod cpuset;
pub mod error;
pub mod plugin;

pub use builder::CpuSetBuilder;
pub use cpuset::CpuSet;
pub use error::{CpuSetError, Error, PluginError, Result};
pub use plugin::*;

static INIT: Once = Once::new();

/// One-time process initialization hook.
///
/// Returns `true` for the call that performed the initialization and `false`
/// for every later call.
pub fn init() -> bool {
    let mut first = false;
    INIT.call_once(|| {
        log::info!(
            "affinity_core {} initialized (plugin api v{})",
            CORE_VERSION,
            AFFINITY_API_VERSION
        );
        first = true;
    });
    first
}

/// Re-export commonly used types
pub mod prelude {
    pub use crate::builder::CpuSetBuilder;
    pub use crate::cpuset::CpuSet;
    pub use crate::error::{CpuSetError, Error, PluginError, Result};
    pub use crate::plugin::{
        CpuSetSlot, Export, MethodProvider, PluginDeclaration, PluginExports, Registrar,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_runs_once() {
        init();
        assert!(INIT.is_completed());
        assert!(!init());
    }
}
