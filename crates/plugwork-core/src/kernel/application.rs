use crate::plugin_system::loader::PluginPackage;
use crate::plugin_system::traits::Base;

/// A concrete application built on the plugin engine.
///
/// It names the bases its plugins may implement (one namespace each, in this
/// order) and the packages loaded during `Api::load_plugins`.
pub trait Application: Send + Sync {
    fn bases(&self) -> Vec<Base>;

    fn packages(&self) -> Vec<Box<dyn PluginPackage>> {
        Vec::new()
    }
}
