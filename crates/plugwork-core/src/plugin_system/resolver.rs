use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::kernel::error::Result;
use crate::plugin_system::class::{ClassId, PluginClass};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::PluginDeclaration;
use crate::plugin_system::traits::Base;

/// Resolves same-name override declarations into one active class per name.
///
/// Every class that replaced another keeps a back-link to it, so the
/// replaced implementations form a chain per name that ends at the class
/// registered first.
#[derive(Debug, Default)]
pub struct OverrideResolver {
    active: IndexMap<String, PluginDeclaration>,
    previous: HashMap<ClassId, Arc<PluginClass>>,
}

impl OverrideResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a declaration against the active classes and accept it.
    ///
    /// A rejected declaration leaves the resolver untouched.
    pub fn add_plugin(&mut self, declaration: PluginDeclaration, bases: &[Base]) -> Result<()> {
        let class = Arc::clone(&declaration.class);
        let overriding = declaration.is_override();

        let base = class.first_matching_base(bases).ok_or_else(|| PluginSystemError::Subclass {
            plugin: class.full_name(),
            bases: bases.iter().map(|base| base.name().to_string()).collect(),
        })?;

        let existing = self.active.get(class.name()).map(|declaration| declaration.class.id());
        match existing {
            Some(id) if id == class.id() => {
                Err(PluginSystemError::DuplicateRegistration {
                    plugin: class.full_name(),
                }
                .into())
            }
            Some(_) if !overriding => Err(PluginSystemError::Override {
                base: base.name().to_string(),
                name: class.name().to_string(),
                plugin: class.full_name(),
            }
            .into()),
            Some(_) => {
                if let Some(replaced) = self.active.shift_remove(class.name()) {
                    log::debug!("{} overrides {}", class, replaced.class);
                    self.previous.insert(class.id(), replaced.class);
                }
                self.active.insert(class.name().to_string(), declaration);
                Ok(())
            }
            None if overriding => Err(PluginSystemError::MissingOverride {
                base: base.name().to_string(),
                name: class.name().to_string(),
                plugin: class.full_name(),
            }
            .into()),
            None => {
                self.active.insert(class.name().to_string(), declaration);
                Ok(())
            }
        }
    }

    /// The class `class` replaced
    pub fn get_overridden(&self, class: &PluginClass) -> Result<Arc<PluginClass>> {
        self.previous.get(&class.id()).cloned().ok_or_else(|| {
            PluginSystemError::NotFound {
                plugin: class.full_name(),
            }
            .into()
        })
    }

    /// Every class `class` replaced, newest first
    pub fn chain(&self, class: &PluginClass) -> Vec<Arc<PluginClass>> {
        let mut chain = Vec::new();
        let mut current = self.previous.get(&class.id());
        while let Some(replaced) = current {
            chain.push(Arc::clone(replaced));
            current = self.previous.get(&replaced.id());
        }
        chain
    }

    /// Active declarations in acceptance order
    pub fn active(&self) -> impl Iterator<Item = &PluginDeclaration> {
        self.active.values()
    }

    /// The active declaration for a plugin name
    pub fn get(&self, name: &str) -> Option<&PluginDeclaration> {
        self.active.get(name)
    }

    pub fn is_active(&self, class: &PluginClass) -> bool {
        self.active
            .get(class.name())
            .is_some_and(|declaration| declaration.class.id() == class.id())
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub(crate) fn previous_links(&self) -> &HashMap<ClassId, Arc<PluginClass>> {
        &self.previous
    }
}
