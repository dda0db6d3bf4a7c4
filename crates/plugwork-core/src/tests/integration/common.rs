#![cfg(test)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::kernel::error::Result;
use crate::kernel::{Api, Application};
use crate::plugin_system::{Base, FinalizeAttr, FinalizeContext, Plugin, PluginClass, PluginPackage};

pub type PackageFactory = fn() -> Box<dyn PluginPackage>;

/// Application with a fixed base list and caller-supplied packages
pub struct ScenarioApp {
    pub packages: Vec<PackageFactory>,
}

impl Application for ScenarioApp {
    fn bases(&self) -> Vec<Base> {
        vec![
            Base::new("Command").with_doc("Commands run from the front end"),
            Base::new("Object"),
            Base::new("Backend"),
        ]
    }

    fn packages(&self) -> Vec<Box<dyn PluginPackage>> {
        self.packages.iter().map(|make| make()).collect()
    }
}

/// An API over [`ScenarioApp`] with no packages, bootstrapped with `overrides`
pub fn scenario_api(overrides: &[&str]) -> Api<ScenarioApp> {
    let mut api = Api::new(ScenarioApp { packages: Vec::new() });
    api.bootstrap_with_overrides(overrides.iter().copied())
        .expect("bootstrap should succeed");
    api
}

#[derive(Default)]
pub struct Noop;
impl Plugin for Noop {}

pub fn command(name: &str) -> Arc<PluginClass> {
    PluginClass::builder(name).base("Command").build_default::<Noop>()
}

/// A plugin whose hook counts its runs and publishes a greeting
pub struct Greeter {
    pub runs: Arc<AtomicUsize>,
    pub greeting: FinalizeAttr<String>,
}

impl Plugin for Greeter {
    fn on_finalize(&self, ctx: &FinalizeContext<'_>) -> Result<()> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        ctx.assign(&self.greeting, format!("hello from {}", ctx.instance().name()))
    }
}

pub fn greeter_class(name: &str, runs: &Arc<AtomicUsize>, finalize_early: bool) -> Arc<PluginClass> {
    let runs = Arc::clone(runs);
    PluginClass::builder(name)
        .base("Command")
        .finalize_early(finalize_early)
        .build(move || Greeter {
            runs: Arc::clone(&runs),
            greeting: FinalizeAttr::new("greeting", "<pending>".to_string()),
        })
}
