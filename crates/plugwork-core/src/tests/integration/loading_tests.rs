#![cfg(test)]

use std::fs::File;

use tempfile::tempdir;

use crate::kernel::Api;
use crate::kernel::error::Error;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::{
    DirectoryPackage, ImportError, PluginModule, PluginPackage, Registry, StaticPackage,
};

use super::common::{PackageFactory, ScenarioApp, command};

fn user_module() -> Result<PluginModule, ImportError> {
    let mut registry = Registry::new();
    registry.register(command("user_show")).map_err(ImportError::failed)?;
    registry.register(command("user_find")).map_err(ImportError::failed)?;
    Ok(PluginModule::new("user", registry))
}

fn user_override_module() -> Result<PluginModule, ImportError> {
    let mut registry = Registry::new();
    registry.register_override(command("user_show")).map_err(ImportError::failed)?;
    Ok(PluginModule::new("user_override", registry))
}

fn optional_module() -> Result<PluginModule, ImportError> {
    Err(ImportError::skip("requires an optional backend"))
}

fn no_registry_module() -> Result<PluginModule, ImportError> {
    Ok(PluginModule::without_registry("helpers"))
}

fn builtin() -> Box<dyn PluginPackage> {
    Box::new(
        StaticPackage::new("builtin")
            .with_module("user", user_module)
            .with_module("optional", optional_module)
            .with_module("user_override", user_override_module),
    )
}

fn broken() -> Box<dyn PluginPackage> {
    Box::new(StaticPackage::new("broken").with_module("helpers", no_registry_module))
}

#[test]
fn test_packages_load_in_order_with_overrides() {
    let mut api = Api::new(ScenarioApp { packages: vec![builtin as PackageFactory] });
    let finalized = api.finalize().unwrap();

    // user_show was replaced and moved behind user_find
    assert_eq!(finalized["Command"].names(), vec!["user_find", "user_show"]);
    assert_eq!(finalized["Command"]["user_show"].class().full_name(), "plugins.user_show");
    assert_eq!(api.ledger().len(), 3);
}

#[test]
fn test_module_without_registry_aborts_loading() {
    let mut api = Api::new(ScenarioApp { packages: vec![broken as PackageFactory] });
    match api.finalize() {
        Err(Error::PluginSystem(PluginSystemError::ModuleRegistration { module })) => assert_eq!(module, "helpers"),
        other => panic!("Expected ModuleRegistration, got {:?}", other),
    }
}

#[test]
fn test_fail_on_skip_aborts_loading() {
    let mut api = Api::new(ScenarioApp { packages: vec![builtin as PackageFactory] });
    api.bootstrap_with_overrides(["fail_on_skip=true"]).unwrap();
    assert!(matches!(
        api.load_plugins(),
        Err(Error::PluginSystem(PluginSystemError::ModuleSkipped { .. }))
    ));
}

#[test]
fn test_directory_package_loaded_by_hand() {
    let temp_dir = tempdir().unwrap();
    File::create(temp_dir.path().join("user.rs")).unwrap();
    File::create(temp_dir.path().join("mod.rs")).unwrap();

    let package = DirectoryPackage::new("site", temp_dir.path()).with_module("user", user_module);
    let mut api = Api::new(ScenarioApp { packages: Vec::new() });
    api.add_package(&package).unwrap();
    let finalized = api.finalize().unwrap();

    assert_eq!(finalized["Command"].names(), vec!["user_show", "user_find"]);
}
