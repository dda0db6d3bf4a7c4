//! The API object: lifecycle coordinator and, once finalized, the frozen
//! view over every namespace.
use std::collections::HashMap;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::config::{ConfigData, Env};
use crate::kernel::application::Application;
use crate::kernel::error::Result;
use crate::plugin_system::class::{ClassId, PluginClass};
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::instance::PluginInstance;
use crate::plugin_system::loader::{PluginModule, PluginPackage, import_package};
use crate::plugin_system::namespace::{Namespace, PluginInfo, build_namespaces};
use crate::plugin_system::registry::{Metadata, OVERRIDE_KEY, PluginDeclaration, Registry};
use crate::plugin_system::resolver::OverrideResolver;
use crate::stage_manager::{Stage, StageTracker};

/// Mutable API object driving `bootstrap -> load_plugins -> finalize`.
///
/// Each stage runs at most once; asking for a later stage runs the earlier
/// ones first. Registration is validated as it happens. `finalize` produces a
/// [`FinalizedApi`] and, outside the test modes, locks this object against
/// further registration.
pub struct Api<A: Application> {
    app: A,
    env: Arc<Env>,
    stages: StageTracker,
    resolver: OverrideResolver,
    ledger: Registry,
    finalized: Option<Arc<FinalizedApi>>,
    locked: bool,
}

impl<A: Application> Api<A> {
    pub fn new(app: A) -> Self {
        Self {
            app,
            env: Arc::new(Env::new()),
            stages: StageTracker::new(),
            resolver: OverrideResolver::new(),
            ledger: Registry::new(),
            finalized: None,
            locked: false,
        }
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Build the environment from `overrides`, the `conf` file they name and
    /// the defaults.
    pub fn bootstrap(&mut self, overrides: ConfigData) -> Result<()> {
        self.stages.begin(Stage::Bootstrap)?;
        self.env = Arc::new(Env::bootstrap(overrides)?);
        log::info!(
            "Bootstrapped {} in {} mode (context: {})",
            crate::kernel::constants::APP_NAME,
            self.env.mode(),
            self.env.context()
        );
        Ok(())
    }

    /// [`Api::bootstrap`] from `KEY=VAL` strings
    pub fn bootstrap_with_overrides<I, S>(&mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let overrides = Env::parse_overrides(items)?;
        self.bootstrap(overrides)
    }

    /// Load every package of the application. Skipped in the test modes.
    pub fn load_plugins(&mut self) -> Result<()> {
        self.stages.begin(Stage::LoadPlugins)?;
        self.ensure_predecessor(Stage::LoadPlugins)?;
        if self.env.mode().is_test() {
            log::debug!("Not loading plugin packages in {} mode", self.env.mode());
            return Ok(());
        }
        for package in self.app.packages() {
            self.add_package(package.as_ref())?;
        }
        log::info!("Loaded {} plugins", self.resolver.len());
        Ok(())
    }

    /// Instantiate the active plugins, build the namespaces and run eager
    /// finalization.
    pub fn finalize(&mut self) -> Result<Arc<FinalizedApi>> {
        self.stages.begin(Stage::Finalize)?;
        self.ensure_predecessor(Stage::Finalize)?;

        let bases = self.app.bases();
        let active: Vec<PluginDeclaration> = self.resolver.active().cloned().collect();
        let previous = self.resolver.previous_links().clone();
        let env = Arc::clone(&self.env);

        let api = Arc::new_cyclic(|weak| {
            let built = build_namespaces(&bases, &active, weak, &env);
            FinalizedApi {
                env: Arc::clone(&env),
                namespaces: built.namespaces,
                instances: built.instances,
                plugins: built.plugins,
                previous,
            }
        });
        debug_assert_eq!(api.instances.len(), active.len());
        debug_assert!(
            api.namespaces
                .values()
                .flat_map(Namespace::iter)
                .all(|member| self.resolver.is_active(member.class()))
        );
        self.finalized = Some(Arc::clone(&api));

        let on_demand = self.env.plugins_on_demand();
        for instance in api.instances() {
            if instance.class().finalize_early() || !on_demand {
                instance.ensure_finalized()?;
            }
        }

        if !self.env.mode().is_test() {
            self.locked = true;
        }
        log::info!(
            "Finalized API with {} namespaces and {} plugins",
            api.len(),
            api.instances().len()
        );
        Ok(api)
    }

    fn ensure_predecessor(&mut self, stage: Stage) -> Result<()> {
        match stage.predecessor() {
            Some(previous) => self.ensure_stage(previous),
            None => Ok(()),
        }
    }

    fn ensure_stage(&mut self, stage: Stage) -> Result<()> {
        if self.stages.is_done(stage) {
            return Ok(());
        }
        match stage {
            Stage::Bootstrap => self.bootstrap(ConfigData::new()),
            Stage::LoadPlugins => self.load_plugins(),
            Stage::Finalize => self.finalize().map(|_| ()),
        }
    }

    fn check_unlocked(&self, operation: &str) -> Result<()> {
        if self.locked {
            return Err(PluginSystemError::ApiLocked {
                operation: operation.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Import every module of a package and add its plugins
    pub fn add_package(&mut self, package: &dyn PluginPackage) -> Result<()> {
        self.check_unlocked("add a package")?;
        log::debug!("Loading plugin package {}", package.name());
        for module in import_package(package, &self.env)? {
            self.add_module(module)?;
        }
        Ok(())
    }

    /// Add every declaration in a module's registry
    pub fn add_module(&mut self, module: PluginModule) -> Result<()> {
        self.check_unlocked("add a module")?;
        let name = module.name().to_string();
        let registry = module
            .into_registry()
            .ok_or(PluginSystemError::ModuleRegistration { module: name })?;
        for declaration in registry {
            self.add_declaration(declaration)?;
        }
        Ok(())
    }

    /// Add one class, replacing the active class of the same name when
    /// `overriding` is set
    pub fn add_plugin(&mut self, class: Arc<PluginClass>, overriding: bool) -> Result<()> {
        let mut metadata = Metadata::new();
        if overriding {
            metadata.insert(OVERRIDE_KEY.to_string(), serde_json::Value::Bool(true));
        }
        self.add_declaration(PluginDeclaration::new(class, metadata))
    }

    /// Validate a declaration and record it.
    ///
    /// Rejected declarations leave no trace.
    pub fn add_declaration(&mut self, declaration: PluginDeclaration) -> Result<()> {
        self.check_unlocked("add a plugin")?;
        if self.ledger.contains(&declaration.class) {
            return Err(PluginSystemError::DuplicateRegistration {
                plugin: declaration.class.full_name(),
            }
            .into());
        }
        let bases = self.app.bases();
        self.resolver.add_plugin(declaration.clone(), &bases)?;
        self.ledger.insert(declaration)
    }

    /// The class `class` replaced
    pub fn get_plugin_next(&self, class: &PluginClass) -> Result<Arc<PluginClass>> {
        self.resolver.get_overridden(class)
    }

    pub fn is_done(&self, stage: Stage) -> bool {
        self.stages.is_done(stage)
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_production_mode(&self) -> bool {
        self.env.is_production_mode()
    }

    /// Every accepted declaration, overridden ones included, in acceptance order
    pub fn ledger(&self) -> &Registry {
        &self.ledger
    }

    pub fn resolver(&self) -> &OverrideResolver {
        &self.resolver
    }

    pub fn finalized(&self) -> Result<Arc<FinalizedApi>> {
        self.finalized
            .clone()
            .ok_or_else(|| PluginSystemError::NotFinalized.into())
    }
}

impl<A: Application> fmt::Debug for Api<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("stages", &self.stages.completed())
            .field("plugins", &self.resolver.len())
            .field("locked", &self.locked)
            .finish_non_exhaustive()
    }
}

/// Read-only view of a finalized API
pub struct FinalizedApi {
    env: Arc<Env>,
    namespaces: IndexMap<String, Namespace>,
    instances: Vec<Arc<PluginInstance>>,
    plugins: Vec<PluginInfo>,
    previous: HashMap<ClassId, Arc<PluginClass>>,
}

impl FinalizedApi {
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Number of namespaces
    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    /// Namespace names in base order
    pub fn names(&self) -> Vec<&str> {
        self.namespaces.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.get(name)
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    /// Every plugin instance, once each
    pub fn instances(&self) -> &[Arc<PluginInstance>] {
        &self.instances
    }

    /// Per class, the namespaces it joined
    pub fn plugins(&self) -> &[PluginInfo] {
        &self.plugins
    }

    /// The class `class` replaced
    pub fn get_plugin_next(&self, class: &PluginClass) -> Result<Arc<PluginClass>> {
        self.previous.get(&class.id()).cloned().ok_or_else(|| {
            PluginSystemError::NotFound {
                plugin: class.full_name(),
            }
            .into()
        })
    }
}

impl Index<&str> for FinalizedApi {
    type Output = Namespace;

    fn index(&self, name: &str) -> &Self::Output {
        match self.namespaces.get(name) {
            Some(namespace) => namespace,
            None => panic!("no namespace '{}'", name),
        }
    }
}

impl fmt::Debug for FinalizedApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizedApi")
            .field("namespaces", &self.names())
            .field("plugins", &self.instances.len())
            .finish_non_exhaustive()
    }
}
