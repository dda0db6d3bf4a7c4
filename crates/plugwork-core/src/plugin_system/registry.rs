use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::kernel::error::Result;
use crate::plugin_system::class::{ClassId, PluginClass};
use crate::plugin_system::error::PluginSystemError;

/// Registration metadata. Opaque to the engine apart from [`OVERRIDE_KEY`].
pub type Metadata = serde_json::Map<String, Value>;

/// Metadata key carrying the override flag
pub const OVERRIDE_KEY: &str = "override";

/// A registered plugin class together with its metadata
#[derive(Debug, Clone)]
pub struct PluginDeclaration {
    pub class: Arc<PluginClass>,
    pub metadata: Metadata,
}

impl PluginDeclaration {
    pub fn new(class: Arc<PluginClass>, metadata: Metadata) -> Self {
        Self { class, metadata }
    }

    /// Whether the declaration asks to replace an existing plugin of the same name
    pub fn is_override(&self) -> bool {
        self.metadata
            .get(OVERRIDE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Insertion-ordered ledger of plugin declarations.
///
/// Each plugin module hands one of these to the API during loading. The
/// registry only records classes; nothing is instantiated here.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    declarations: IndexMap<ClassId, PluginDeclaration>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class with empty metadata
    pub fn register(&mut self, class: Arc<PluginClass>) -> Result<()> {
        self.register_with(class, Metadata::new())
    }

    /// Register a class replacing an existing plugin of the same name
    pub fn register_override(&mut self, class: Arc<PluginClass>) -> Result<()> {
        let mut metadata = Metadata::new();
        metadata.insert(OVERRIDE_KEY.to_string(), Value::Bool(true));
        self.register_with(class, metadata)
    }

    /// Register a class with arbitrary metadata
    pub fn register_with(&mut self, class: Arc<PluginClass>, metadata: Metadata) -> Result<()> {
        self.insert(PluginDeclaration::new(class, metadata))
    }

    pub(crate) fn insert(&mut self, declaration: PluginDeclaration) -> Result<()> {
        let id = declaration.class.id();
        if self.declarations.contains_key(&id) {
            return Err(PluginSystemError::DuplicateRegistration {
                plugin: declaration.class.full_name(),
            }
            .into());
        }
        log::trace!("Registered plugin class {}", declaration.class);
        self.declarations.insert(id, declaration);
        Ok(())
    }

    /// Declarations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &PluginDeclaration> {
        self.declarations.values()
    }

    pub fn get(&self, class: &PluginClass) -> Option<&PluginDeclaration> {
        self.declarations.get(&class.id())
    }

    pub fn contains(&self, class: &PluginClass) -> bool {
        self.declarations.contains_key(&class.id())
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl IntoIterator for Registry {
    type Item = PluginDeclaration;
    type IntoIter = indexmap::map::IntoValues<ClassId, PluginDeclaration>;

    fn into_iter(self) -> Self::IntoIter {
        self.declarations.into_values()
    }
}
