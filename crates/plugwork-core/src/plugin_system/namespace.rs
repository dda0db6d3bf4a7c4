use std::collections::HashMap;
use std::ops::Index;
use std::sync::{Arc, Weak};

use indexmap::IndexMap;

use crate::config::Env;
use crate::kernel::api::FinalizedApi;
use crate::plugin_system::class::{ClassId, PluginClass};
use crate::plugin_system::instance::PluginInstance;
use crate::plugin_system::registry::PluginDeclaration;
use crate::plugin_system::traits::Base;

/// Ordered, read-only collection of the plugin instances implementing one base
#[derive(Debug)]
pub struct Namespace {
    name: String,
    members: Vec<Arc<PluginInstance>>,
    index: HashMap<String, usize>,
}

impl Namespace {
    pub(crate) fn new(name: impl Into<String>, members: Vec<Arc<PluginInstance>>) -> Self {
        let index = members
            .iter()
            .enumerate()
            .map(|(position, member)| (member.name().to_string(), position))
            .collect();
        Self {
            name: name.into(),
            members,
            index,
        }
    }

    /// Name of the base this namespace collects
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<PluginInstance>> {
        self.members.iter()
    }

    /// Member plugin names in order
    pub fn names(&self) -> Vec<&str> {
        self.members.iter().map(|member| member.name()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<PluginInstance>> {
        self.index.get(name).map(|&position| &self.members[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

impl Index<&str> for Namespace {
    type Output = Arc<PluginInstance>;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get(name) {
            Some(member) => member,
            None => panic!("no plugin '{}' in namespace '{}'", name, self.name),
        }
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = &'a Arc<PluginInstance>;
    type IntoIter = std::slice::Iter<'a, Arc<PluginInstance>>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

/// One row of the plugin table: a class and the namespaces it joined
#[derive(Debug, Clone)]
pub struct PluginInfo {
    pub class: Arc<PluginClass>,
    pub namespaces: Vec<String>,
}

impl PluginInfo {
    /// `module.Name`
    pub fn plugin(&self) -> String {
        self.class.full_name()
    }
}

/// Result of building the namespaces of an API
pub(crate) struct NamespaceSet {
    pub namespaces: IndexMap<String, Namespace>,
    pub instances: Vec<Arc<PluginInstance>>,
    pub plugins: Vec<PluginInfo>,
}

/// Instantiate every active class once and group the instances per base.
///
/// Instances are created in acceptance order of their class; a class
/// implementing several bases shares one instance across their namespaces.
pub(crate) fn build_namespaces(
    bases: &[Base],
    active: &[PluginDeclaration],
    api: &Weak<FinalizedApi>,
    env: &Arc<Env>,
) -> NamespaceSet {
    let mut instances: IndexMap<ClassId, Arc<PluginInstance>> = IndexMap::new();
    let mut joined: IndexMap<ClassId, Vec<String>> = IndexMap::new();

    for declaration in active {
        let instance = PluginInstance::new(declaration, Weak::clone(api), Arc::clone(env));
        instances.insert(declaration.class.id(), Arc::new(instance));
        joined.insert(declaration.class.id(), Vec::new());
    }

    let mut namespaces = IndexMap::new();
    for base in bases {
        let mut members = Vec::new();
        for declaration in active.iter().filter(|d| d.class.is_subclass_of(base)) {
            let id = declaration.class.id();
            if let Some(instance) = instances.get(&id) {
                members.push(Arc::clone(instance));
            }
            if let Some(names) = joined.get_mut(&id) {
                names.push(base.name().to_string());
            }
        }
        log::debug!("Namespace {} has {} plugins", base, members.len());
        namespaces.insert(base.name().to_string(), Namespace::new(base.name(), members));
    }

    let plugins = active
        .iter()
        .map(|declaration| PluginInfo {
            class: Arc::clone(&declaration.class),
            namespaces: joined.shift_remove(&declaration.class.id()).unwrap_or_default(),
        })
        .collect();

    NamespaceSet {
        namespaces,
        instances: instances.into_values().collect(),
        plugins,
    }
}
