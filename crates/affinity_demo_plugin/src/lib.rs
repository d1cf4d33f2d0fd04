//! Demo plugin
//!
//! Exports:
//! - `V`: CPU set variable, empty until the host writes it
//! - `Foo`: object whose `m1` prints the current value of `V`
//! - `M`: function printing how often `Foo.m1` has run
//!
//! The host's logger is not shared across the library boundary, so output
//! goes to stdout.

use affinity_core::{CpuSetSlot, MethodProvider, Registrar, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// The `Foo` export
pub struct Foo {
    v: CpuSetSlot,
    calls: Arc<AtomicUsize>,
}

impl Foo {
    /// Create a `Foo` reading `v`, with its own call counter
    pub fn new(v: CpuSetSlot) -> Self {
        Self {
            v,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// How often `m1` has run
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The line `m1` prints for its `call`-th invocation
    pub fn report(&self, call: usize) -> String {
        format!("Foo.M1 #{}: V = [{}]", call, self.v.get())
    }
}

impl MethodProvider for Foo {
    fn m1(&self) {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        println!("{}", self.report(call));
    }
}

/// Register `V`, `Foo` and `M`
pub fn register(registrar: &mut dyn Registrar) -> Result<()> {
    let v = CpuSetSlot::default();
    let foo = Foo::new(v.clone());
    let calls = foo.calls.clone();

    registrar.register_cpuset("V", v)?;
    registrar.register_object("Foo", Box::new(foo))?;
    registrar.register_function(
        "M",
        Box::new(move || {
            println!("M: Foo.M1 called {} time(s)", calls.load(Ordering::SeqCst));
        }),
    )?;

    Ok(())
}

affinity_core::export_plugin!("affinity_demo_plugin", register);

#[cfg(test)]
mod tests {
    use super::*;
    use affinity_core::{CpuSet, PluginExports};

    #[test]
    fn test_register_exports() {
        let mut exports = PluginExports::new("affinity_demo_plugin");
        register(&mut exports).unwrap();

        assert_eq!(exports.names().collect::<Vec<_>>(), vec!["Foo", "M", "V"]);
        assert!(exports.cpuset("V").unwrap().get().is_empty());
    }

    #[test]
    fn test_foo_reads_shared_slot() {
        let slot = CpuSetSlot::default();
        let foo = Foo::new(slot.clone());
        assert_eq!(foo.report(0), "Foo.M1 #0: V = []");

        slot.set(CpuSet::new([1, 2, 3]));
        foo.m1();

        assert_eq!(foo.calls(), 1);
        assert!(foo.report(1).contains("1-3"));
    }

    #[test]
    fn test_declaration() {
        assert_eq!(affinity_plugin_declaration.name, "affinity_demo_plugin");
        assert_eq!(
            affinity_plugin_declaration.api_version,
            affinity_core::AFFINITY_API_VERSION
        );
    }
}
