//! Plugin export contract
//!
//! A plugin hands values to its host through a [`Registrar`]. Exports are
//! typed at registration time, so the host resolves them with a `match`
//! instead of casting untyped symbols:
//!
//! - [`CpuSetSlot`]: a CPU set variable the host may overwrite
//! - [`MethodProvider`]: an object with a callable `m1` method
//! - [`ExportedFn`]: a zero-argument function
//!
//! A dynamically loaded unit exposes exactly one symbol,
//! [`DECLARATION_SYMBOL`], holding a [`PluginDeclaration`]. Use
//! [`export_plugin!`](crate::export_plugin) to generate it.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cpuset::CpuSet;
use crate::error::{PluginError, Result};

/// Version of the registrar contract. Bumped on any layout change.
pub const AFFINITY_API_VERSION: u32 = 1;

/// Version of this crate, compared against the one a plugin was built with
pub const CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the declaration symbol
pub const DECLARATION_NAME: &str = "affinity_plugin_declaration";

/// [`DECLARATION_NAME`], NUL-terminated for symbol lookup
pub const DECLARATION_SYMBOL: &[u8] = b"affinity_plugin_declaration\0";

/// Capability: an object exposing a callable `m1` method
pub trait MethodProvider: Send + Sync {
    fn m1(&self);
}

/// Capability: a zero-argument callable
pub type ExportedFn = Box<dyn Fn() + Send + Sync>;

/// Shared, writable location holding a [`CpuSet`].
///
/// The lock guards the location only. The set stored in it is immutable and
/// [`CpuSetSlot::get`] hands out a clone that stays valid after later writes.
#[derive(Clone, Default)]
pub struct CpuSetSlot(Arc<RwLock<CpuSet>>);

impl CpuSetSlot {
    /// Create a slot holding `initial`
    pub fn new(initial: CpuSet) -> Self {
        Self(Arc::new(RwLock::new(initial)))
    }

    /// Current value
    pub fn get(&self) -> CpuSet {
        self.0.read().clone()
    }

    /// Overwrite the value, returning the previous one
    pub fn set(&self, cpus: CpuSet) -> CpuSet {
        std::mem::replace(&mut *self.0.write(), cpus)
    }
}

impl fmt::Debug for CpuSetSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CpuSetSlot").field(&*self.0.read()).finish()
    }
}

/// A named value exported by a plugin
pub enum Export {
    CpuSet(CpuSetSlot),
    Object(Box<dyn MethodProvider>),
    Function(ExportedFn),
}

impl Export {
    /// Human-readable capability name, used in mismatch errors
    pub fn kind(&self) -> &'static str {
        match self {
            Export::CpuSet(_) => Export::CPUSET,
            Export::Object(_) => Export::OBJECT,
            Export::Function(_) => Export::FUNCTION,
        }
    }

    const CPUSET: &'static str = "a CPU set variable";
    const OBJECT: &'static str = "an object with method m1";
    const FUNCTION: &'static str = "a zero-argument function";
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Export::CpuSet(slot) => f.debug_tuple("CpuSet").field(slot).finish(),
            Export::Object(_) => f.write_str("Object(..)"),
            Export::Function(_) => f.write_str("Function(..)"),
        }
    }
}

/// Receiver of a plugin's exports.
///
/// Registering a name twice fails with [`PluginError::DuplicateExport`] and
/// leaves the first registration in place.
pub trait Registrar {
    fn register_cpuset(&mut self, name: &str, slot: CpuSetSlot) -> Result<()>;

    fn register_object(&mut self, name: &str, object: Box<dyn MethodProvider>) -> Result<()>;

    fn register_function(&mut self, name: &str, function: ExportedFn) -> Result<()>;
}

/// Registration entry point of a plugin
pub type RegisterFn = fn(&mut dyn Registrar) -> Result<()>;

/// The single well-known value a plugin unit exports
#[derive(Clone, Copy)]
pub struct PluginDeclaration {
    /// Must equal [`AFFINITY_API_VERSION`]
    pub api_version: u32,
    /// Must equal the host's [`CORE_VERSION`]
    pub core_version: &'static str,
    /// Plugin name, unique within a host
    pub name: &'static str,
    /// Called once by the host to collect exports
    pub register: RegisterFn,
}

impl PluginDeclaration {
    /// Declaration stamped with this crate's versions
    pub const fn new(name: &'static str, register: RegisterFn) -> Self {
        Self {
            api_version: AFFINITY_API_VERSION,
            core_version: CORE_VERSION,
            name,
            register,
        }
    }
}

impl fmt::Debug for PluginDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDeclaration")
            .field("name", &self.name)
            .field("api_version", &self.api_version)
            .field("core_version", &self.core_version)
            .finish()
    }
}

/// Exports collected from one plugin, resolvable by name and capability
pub struct PluginExports {
    plugin: String,
    exports: BTreeMap<String, Export>,
}

impl PluginExports {
    /// Create an empty export table for `plugin`
    pub fn new(plugin: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            exports: BTreeMap::new(),
        }
    }

    /// Name of the owning plugin
    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    fn insert(&mut self, name: &str, export: Export) -> Result<()> {
        if self.exports.contains_key(name) {
            return Err(PluginError::DuplicateExport {
                plugin: self.plugin.clone(),
                symbol: name.into(),
            }
            .into());
        }

        log::debug!("Plugin '{}' exports '{}' ({})", self.plugin, name, export.kind());
        self.exports.insert(name.into(), export);
        Ok(())
    }

    /// Look up an export of any capability
    pub fn get(&self, name: &str) -> std::result::Result<&Export, PluginError> {
        self.exports
            .get(name)
            .ok_or_else(|| PluginError::symbol_not_found(&self.plugin, name))
    }

    /// Resolve a CPU set variable
    pub fn cpuset(&self, name: &str) -> std::result::Result<&CpuSetSlot, PluginError> {
        match self.get(name)? {
            Export::CpuSet(slot) => Ok(slot),
            other => Err(self.mismatch(name, Export::CPUSET, other)),
        }
    }

    /// Resolve an object with method `m1`
    pub fn object(&self, name: &str) -> std::result::Result<&dyn MethodProvider, PluginError> {
        match self.get(name)? {
            Export::Object(object) => Ok(object.as_ref()),
            other => Err(self.mismatch(name, Export::OBJECT, other)),
        }
    }

    /// Resolve a zero-argument function
    pub fn function(
        &self,
        name: &str,
    ) -> std::result::Result<&(dyn Fn() + Send + Sync), PluginError> {
        match self.get(name)? {
            Export::Function(function) => Ok(function.as_ref()),
            other => Err(self.mismatch(name, Export::FUNCTION, other)),
        }
    }

    fn mismatch(&self, name: &str, expected: &'static str, found: &Export) -> PluginError {
        PluginError::capability_mismatch(&self.plugin, name, expected, found.kind())
    }

    /// Exported names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(|k| k.as_str())
    }

    /// Number of exports
    pub fn len(&self) -> usize {
        self.exports.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl Registrar for PluginExports {
    fn register_cpuset(&mut self, name: &str, slot: CpuSetSlot) -> Result<()> {
        self.insert(name, Export::CpuSet(slot))
    }

    fn register_object(&mut self, name: &str, object: Box<dyn MethodProvider>) -> Result<()> {
        self.insert(name, Export::Object(object))
    }

    fn register_function(&mut self, name: &str, function: ExportedFn) -> Result<()> {
        self.insert(name, Export::Function(function))
    }
}

impl fmt::Debug for PluginExports {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginExports")
            .field("plugin", &self.plugin)
            .field("exports", &self.exports)
            .finish()
    }
}

/// Define the declaration symbol of a plugin unit.
///
/// ```ignore
/// fn register(registrar: &mut dyn affinity_core::Registrar) -> affinity_core::Result<()> {
///     registrar.register_cpuset("V", affinity_core::CpuSetSlot::default())
/// }
///
/// affinity_core::export_plugin!("my_plugin", register);
/// ```
#[macro_export]
macro_rules! export_plugin {
    ($name:literal, $register:path) => {
        #[doc(hidden)]
        #[no_mangle]
        #[allow(non_upper_case_globals)]
        pub static affinity_plugin_declaration: $crate::PluginDeclaration =
            $crate::PluginDeclaration::new($name, $register);
    };
}
