//! Integration tests for affinity_host

use affinity_core::{
    CpuSet, CpuSetSlot, MethodProvider, PluginDeclaration, PluginError, Registrar,
};
use affinity_host::*;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

// Static plugin that records the order in which its exports run
static CALLS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

struct Recorder;

impl MethodProvider for Recorder {
    fn m1(&self) {
        CALLS.lock().unwrap().push("Foo.m1");
    }
}

fn register_recording(registrar: &mut dyn Registrar) -> affinity_core::Result<()> {
    registrar.register_cpuset("V", CpuSetSlot::new(CpuSet::new([0])))?;
    registrar.register_object("Foo", Box::new(Recorder))?;
    registrar.register_function("M", Box::new(|| CALLS.lock().unwrap().push("M")))?;
    Ok(())
}

fn register_duplicate(registrar: &mut dyn Registrar) -> affinity_core::Result<()> {
    registrar.register_cpuset("V", CpuSetSlot::default())?;
    registrar.register_function("V", Box::new(|| {}))?;
    Ok(())
}

/// Locate the demo plugin's cdylib next to the test binary
fn demo_plugin_library() -> PathBuf {
    let exe = std::env::current_exe().unwrap();
    let prefix = format!("{}affinity_demo_plugin", std::env::consts::DLL_PREFIX);

    // target/<profile>/deps holds the test binary; the profile dir is its parent
    for dir in exe.ancestors().skip(1).take(2) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            continue;
        };
        let found = entries.filter_map(|e| e.ok()).map(|e| e.path()).find(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| {
                    name.starts_with(&prefix) && name.ends_with(std::env::consts::DLL_SUFFIX)
                })
                .unwrap_or(false)
        });
        if let Some(path) = found {
            return path;
        }
    }

    panic!(
        "demo plugin library not found near {}; run `cargo build -p affinity_demo_plugin`",
        exe.display()
    );
}

#[test]
fn test_invocation_sequence_order() {
    let host = PluginHost::new();
    let plugin = host
        .register_static(PluginDeclaration::new("recording", register_recording))
        .unwrap();

    let config = HostConfig::default();
    let cpus = invoke_plugin(&plugin, &config).unwrap();

    assert_eq!(cpus, CpuSet::new([1, 2, 3]));
    assert_eq!(plugin.exports().cpuset("V").unwrap().get(), cpus);
    assert_eq!(*CALLS.lock().unwrap(), vec!["Foo.m1", "M"]);
}

#[test]
fn test_demo_plugin_statically_linked() {
    let host = PluginHost::new();
    let plugin = host
        .register_static(affinity_demo_plugin::affinity_plugin_declaration)
        .unwrap();
    assert_eq!(plugin.info.export_count, 3);

    let mut config = HostConfig::default();
    config.cpus = vec![4, 0, 4, 2];

    invoke_plugin(&plugin, &config).unwrap();
    assert_eq!(
        plugin.exports().cpuset("V").unwrap().get(),
        CpuSet::new([0, 2, 4])
    );
}

#[test]
fn test_missing_symbol_aborts() {
    let host = PluginHost::new();
    let plugin = host
        .register_static(affinity_demo_plugin::affinity_plugin_declaration)
        .unwrap();

    let mut config = HostConfig::default();
    config.symbols.object = "Bar".to_string();

    let err = invoke_plugin(&plugin, &config).unwrap_err();
    match err {
        HostError::Core(affinity_core::Error::Plugin(PluginError::SymbolNotFound {
            plugin,
            symbol,
        })) => {
            assert_eq!(plugin, "affinity_demo_plugin");
            assert_eq!(symbol, "Bar");
        }
        other => panic!("unexpected error: {}", other),
    }

    // The assignment ran before the failing step
    assert_eq!(
        plugin.exports().cpuset("V").unwrap().get(),
        CpuSet::new([1, 2, 3])
    );
}

#[test]
fn test_capability_mismatch_aborts() {
    let host = PluginHost::new();
    let plugin = host
        .register_static(affinity_demo_plugin::affinity_plugin_declaration)
        .unwrap();

    let mut config = HostConfig::default();
    config.symbols.cpuset = "M".to_string();

    let err = invoke_plugin(&plugin, &config).unwrap_err();
    assert!(matches!(
        err,
        HostError::Core(affinity_core::Error::Plugin(
            PluginError::CapabilityMismatch { .. }
        ))
    ));
    assert!(plugin.exports().cpuset("V").unwrap().get().is_empty());
}

#[test]
fn test_duplicate_plugin_rejected() {
    let host = PluginHost::new();
    host.register_static(affinity_demo_plugin::affinity_plugin_declaration)
        .unwrap();

    let err = host
        .register_static(affinity_demo_plugin::affinity_plugin_declaration)
        .unwrap_err();
    assert!(matches!(err, HostError::PluginAlreadyLoaded(name) if name == "affinity_demo_plugin"));
    assert_eq!(host.len(), 1);
}

#[test]
fn test_registration_failure() {
    let host = PluginHost::new();
    let err = host
        .register_static(PluginDeclaration::new("duplicate", register_duplicate))
        .unwrap_err();

    assert!(matches!(
        err,
        HostError::RegistrationFailed {
            source: affinity_core::Error::Plugin(PluginError::DuplicateExport { .. }),
            ..
        }
    ));
    assert!(!host.is_loaded("duplicate"));
}

#[test]
fn test_missing_library_is_load_error() {
    let host = PluginHost::new();
    let mut config = HostConfig::default();
    config.plugin = Some("/nonexistent/libaffinity_missing.so".into());

    let err = load_and_invoke(&host, &config).unwrap_err();
    assert!(matches!(err, HostError::LoadError { .. }));
    assert!(host.is_empty());
}

#[test]
fn test_non_library_file_is_load_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "not a shared library").unwrap();

    let host = PluginHost::new();
    let err = host.load_library(file.path()).unwrap_err();
    assert!(matches!(err, HostError::LoadError { .. }));
}

#[test]
fn test_dynamic_demo_plugin_load_invoke_unload() {
    let path = demo_plugin_library();
    let host = PluginHost::new();
    let mut config = HostConfig::default();
    config.plugin = Some(path.clone());
    config.cpus = vec![3, 1, 2];

    let (plugin, cpus) = load_and_invoke(&host, &config).unwrap();
    assert!(plugin.is_dynamic());
    assert_eq!(plugin.path(), Some(path.as_path()));
    assert_eq!(plugin.name(), "affinity_demo_plugin");
    assert_eq!(plugin.info.export_count, 3);
    assert_eq!(cpus, CpuSet::new([1, 2, 3]));
    assert_eq!(plugin.exports().cpuset("V").unwrap().get(), cpus);

    // Loading the same file again is refused
    let err = host.load_library(&path).unwrap_err();
    assert!(matches!(err, HostError::PluginAlreadyLoaded(_)));

    drop(plugin);
    host.unload("affinity_demo_plugin").unwrap();
    assert!(!host.is_loaded("affinity_demo_plugin"));
    assert!(host.is_empty());
}

#[cfg(all(target_os = "linux", target_env = "gnu"))]
#[test]
fn test_library_without_declaration_is_symbol_not_found() {
    let host = PluginHost::new();
    let err = host.load_library("libm.so.6").unwrap_err();

    match err {
        HostError::SymbolNotFound { library, symbol } => {
            assert_eq!(library, "libm.so.6");
            assert_eq!(symbol, affinity_core::DECLARATION_NAME);
        }
        other => panic!("unexpected error: {}", other),
    }
    assert!(host.is_empty());
}
