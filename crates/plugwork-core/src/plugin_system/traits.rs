use std::any::Any;
use std::fmt;

use crate::kernel::error::Result;
use crate::plugin_system::instance::FinalizeContext;

/// Upcast to [`Any`] so plugin instances can be downcast to their concrete type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Core trait implemented by every plugin type.
///
/// A plugin is constructed by its [`PluginClass`](crate::plugin_system::PluginClass)
/// factory when the API is finalized, one instance per class. Any setup that
/// needs the finished API goes into [`Plugin::on_finalize`], which runs at most
/// once per instance, either eagerly during `Api::finalize` or on first access
/// to one of the plugin's [`FinalizeAttr`](crate::plugin_system::FinalizeAttr)s.
pub trait Plugin: AsAny + Send + Sync {
    /// Custom finalization hook.
    ///
    /// Values computed here are published through
    /// [`FinalizeContext::assign`]. The hook only sees the frozen API, never the
    /// registration state.
    fn on_finalize(&self, ctx: &FinalizeContext<'_>) -> Result<()> {
        let _ = ctx;
        Ok(())
    }
}

/// An abstract base category that plugins declare membership in.
///
/// Each base the application declares becomes one namespace of the finalized API.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Base {
    name: String,
    doc: String,
}

impl Base {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            doc: String::new(),
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
