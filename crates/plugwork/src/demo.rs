//! The built-in demo application and its plugins.
use std::path::PathBuf;
use std::sync::Arc;

use plugwork_core::kernel::error::Result;
use plugwork_core::plugin_system::{
    Base, DirectoryPackage, FinalizeAttr, FinalizeContext, ImportError, Plugin, PluginClass, PluginModule,
    PluginPackage, Registry, StaticPackage,
};
use plugwork_core::Application;

type ModuleResult = std::result::Result<PluginModule, ImportError>;

pub const COMMAND: &str = "Command";
pub const OBJECT: &str = "Object";
pub const BACKEND: &str = "Backend";

/// Demo application: three namespaces, a builtin package and an optional
/// directory of site modules
#[derive(Debug, Default)]
pub struct DemoApp {
    plugin_dir: Option<PathBuf>,
}

impl DemoApp {
    pub fn new(plugin_dir: Option<PathBuf>) -> Self {
        Self { plugin_dir }
    }
}

impl Application for DemoApp {
    fn bases(&self) -> Vec<Base> {
        vec![
            Base::new(COMMAND).with_doc("Commands that can be run"),
            Base::new(OBJECT).with_doc("Data objects"),
            Base::new(BACKEND).with_doc("Storage backends"),
        ]
    }

    fn packages(&self) -> Vec<Box<dyn PluginPackage>> {
        let mut packages: Vec<Box<dyn PluginPackage>> = vec![Box::new(
            StaticPackage::new("builtin")
                .with_module("ping", ping_module)
                .with_module("user", user_module)
                .with_module("store", store_module)
                .with_module("ldap", ldap_module)
                .with_module("user_override", user_override_module),
        )];
        if let Some(dir) = &self.plugin_dir {
            packages.push(Box::new(
                DirectoryPackage::new("site", dir)
                    .with_module("hello", hello_module)
                    .with_module("ping_override", ping_override_module),
            ));
        }
        packages
    }
}

/// A command that prints a line of text rendered at finalize time
pub struct TextCommand {
    text: String,
    pub rendered: FinalizeAttr<String>,
}

impl TextCommand {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            rendered: FinalizeAttr::new("rendered", String::new()),
        }
    }
}

impl Plugin for TextCommand {
    fn on_finalize(&self, ctx: &FinalizeContext<'_>) -> Result<()> {
        let mut rendered = self.text.clone();
        if let Some(api) = ctx.api() {
            // Mention the implementation this one replaced
            if let Ok(previous) = api.get_plugin_next(ctx.instance().class()) {
                rendered.push_str(&format!(" (overrides {})", previous));
            }
        }
        ctx.assign(&self.rendered, rendered)
    }
}

/// A data object
#[derive(Default)]
pub struct DataObject;

impl Plugin for DataObject {}

/// A backend whose location comes from the `store_url` env key
pub struct Store {
    pub url: FinalizeAttr<String>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            url: FinalizeAttr::new("url", String::new()),
        }
    }
}

impl Plugin for Store {
    fn on_finalize(&self, ctx: &FinalizeContext<'_>) -> Result<()> {
        let url = ctx
            .env()
            .get::<String>("store_url")
            .unwrap_or_else(|| "memory://".to_string());
        log::debug!("store backend at {}", url);
        ctx.assign(&self.url, url)
    }
}

fn register(registry: &mut Registry, class: Arc<PluginClass>) -> std::result::Result<(), ImportError> {
    registry.register(class).map_err(ImportError::failed)
}

fn text_command(name: &str, module: &str, doc: &str, text: &'static str) -> Arc<PluginClass> {
    PluginClass::builder(name)
        .module(module)
        .doc(doc)
        .base(COMMAND)
        .build(move || TextCommand::new(text))
}

fn ping_module() -> ModuleResult {
    let mut registry = Registry::new();
    register(
        &mut registry,
        text_command("ping", "builtin.ping", "Check that the API answers.", "pong"),
    )?;
    Ok(PluginModule::new("ping", registry))
}

fn user_module() -> ModuleResult {
    let mut registry = Registry::new();
    register(
        &mut registry,
        PluginClass::builder("user")
            .module("builtin.user")
            .doc("A user account.")
            .base(OBJECT)
            .build_default::<DataObject>(),
    )?;
    register(
        &mut registry,
        text_command("user_show", "builtin.user", "Display a user.", "user: admin"),
    )?;
    Ok(PluginModule::new("user", registry))
}

fn store_module() -> ModuleResult {
    let mut registry = Registry::new();
    register(
        &mut registry,
        PluginClass::builder("store")
            .module("builtin.store")
            .doc("Key/value storage backend.")
            .base(BACKEND)
            .finalize_early(false)
            .build_default::<Store>(),
    )?;
    Ok(PluginModule::new("store", registry))
}

fn ldap_module() -> ModuleResult {
    Err(ImportError::skip("no LDAP client library available"))
}

fn user_override_module() -> ModuleResult {
    let mut registry = Registry::new();
    registry
        .register_override(text_command(
            "user_show",
            "builtin.user_override",
            "Display a user, with groups.",
            "user: admin (groups: admins)",
        ))
        .map_err(ImportError::failed)?;
    Ok(PluginModule::new("user_override", registry))
}

fn hello_module() -> ModuleResult {
    let mut registry = Registry::new();
    register(
        &mut registry,
        text_command("hello", "site.hello", "Say hello.", "hello, world"),
    )?;
    Ok(PluginModule::new("hello", registry))
}

fn ping_override_module() -> ModuleResult {
    let mut registry = Registry::new();
    registry
        .register_override(text_command("ping", "site.ping_override", "Check that the site answers.", "PONG"))
        .map_err(ImportError::failed)?;
    Ok(PluginModule::new("ping_override", registry))
}
