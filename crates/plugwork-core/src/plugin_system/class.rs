use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::plugin_system::traits::{Base, Plugin};

/// Module name given to classes that do not set one
pub const DEFAULT_MODULE: &str = "plugins";

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`PluginClass`]. Two classes never share an id, even when
/// they share a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn next() -> Self {
        ClassId(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

type Factory = Box<dyn Fn() -> Box<dyn Plugin> + Send + Sync>;

/// A declared plugin class: its identity, the bases it implements and a
/// factory for its single per-API instance.
pub struct PluginClass {
    id: ClassId,
    name: String,
    module: String,
    doc: String,
    bases: Vec<String>,
    finalize_early: bool,
    factory: Factory,
}

impl PluginClass {
    pub fn builder(name: impl Into<String>) -> PluginClassBuilder {
        PluginClassBuilder::new(name)
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Plugin name, the key override chains are formed on
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    /// Names of the bases this class implements
    pub fn bases(&self) -> &[String] {
        &self.bases
    }

    /// Whether the instance is finalized during `Api::finalize` even when
    /// plugins are loaded on demand
    pub fn finalize_early(&self) -> bool {
        self.finalize_early
    }

    /// `module.Name`
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.module, self.name)
    }

    pub fn is_subclass_of(&self, base: &Base) -> bool {
        self.bases.iter().any(|name| name == base.name())
    }

    /// The first of `bases` this class implements
    pub fn first_matching_base<'a>(&self, bases: &'a [Base]) -> Option<&'a Base> {
        bases.iter().find(|base| self.is_subclass_of(base))
    }

    /// Build a fresh plugin value
    pub fn create(&self) -> Box<dyn Plugin> {
        (self.factory)()
    }
}

impl fmt::Display for PluginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

impl fmt::Debug for PluginClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginClass")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("module", &self.module)
            .field("bases", &self.bases)
            .field("finalize_early", &self.finalize_early)
            .finish_non_exhaustive()
    }
}

/// Builder for [`PluginClass`]
#[derive(Debug, Clone)]
pub struct PluginClassBuilder {
    name: String,
    module: String,
    doc: String,
    bases: Vec<String>,
    finalize_early: bool,
}

impl PluginClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: DEFAULT_MODULE.to_string(),
            doc: String::new(),
            bases: Vec::new(),
            finalize_early: true,
        }
    }

    pub fn module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    pub fn doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Declare membership in a base
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.bases.push(base.into());
        self
    }

    pub fn bases<I, S>(mut self, bases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.bases.extend(bases.into_iter().map(Into::into));
        self
    }

    pub fn finalize_early(mut self, finalize_early: bool) -> Self {
        self.finalize_early = finalize_early;
        self
    }

    /// Finish the class with a factory for its plugin value
    pub fn build<F, P>(self, factory: F) -> Arc<PluginClass>
    where
        F: Fn() -> P + Send + Sync + 'static,
        P: Plugin + 'static,
    {
        Arc::new(PluginClass {
            id: ClassId::next(),
            name: self.name,
            module: self.module,
            doc: self.doc,
            bases: self.bases,
            finalize_early: self.finalize_early,
            factory: Box::new(move || Box::new(factory()) as Box<dyn Plugin>),
        })
    }

    pub fn build_default<P>(self) -> Arc<PluginClass>
    where
        P: Plugin + Default + 'static,
    {
        self.build(P::default)
    }
}
