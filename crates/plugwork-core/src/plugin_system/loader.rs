use std::collections::HashMap;
use std::error::Error as StdError;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::Env;
use crate::kernel::error::Result;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::Registry;
use crate::utils::fs::find_modules_in_dir;

/// Default file suffix of plugin modules found on disk
pub const DEFAULT_MODULE_SUFFIX: &str = ".rs";

/// A loaded plugin module and the registry it declares
#[derive(Debug)]
pub struct PluginModule {
    name: String,
    registry: Option<Registry>,
}

impl PluginModule {
    pub fn new(name: impl Into<String>, registry: Registry) -> Self {
        Self {
            name: name.into(),
            registry: Some(registry),
        }
    }

    /// A module that declares no plugins
    pub fn without_registry(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> Option<&Registry> {
        self.registry.as_ref()
    }

    pub fn into_registry(self) -> Option<Registry> {
        self.registry
    }
}

/// Why a module could not be imported
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The module asked to be left out, e.g. an optional backend that is not installed
    #[error("skipped: {0}")]
    Skip(String),
    #[error("{0}")]
    Failed(Box<dyn StdError + Send + Sync>),
}

impl ImportError {
    pub fn skip(reason: impl Into<String>) -> Self {
        ImportError::Skip(reason.into())
    }

    pub fn failed(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        ImportError::Failed(err.into())
    }
}

/// Constructor of a statically linked plugin module
pub type ModuleConstructor = fn() -> std::result::Result<PluginModule, ImportError>;

/// A named collection of plugin modules
pub trait PluginPackage: Send + Sync {
    fn name(&self) -> &str;

    /// Names of the modules in this package, in import order
    fn module_names(&self) -> Result<Vec<String>>;

    fn import(&self, module: &str) -> std::result::Result<PluginModule, ImportError>;
}

fn no_such_module(package: &str, module: &str) -> ImportError {
    ImportError::failed(format!("no module named '{}.{}'", package, module))
}

/// A package whose modules are listed explicitly, in order
#[derive(Debug, Clone)]
pub struct StaticPackage {
    name: String,
    modules: IndexMap<String, ModuleConstructor>,
}

impl StaticPackage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: IndexMap::new(),
        }
    }

    pub fn with_module(mut self, name: impl Into<String>, constructor: ModuleConstructor) -> Self {
        self.modules.insert(name.into(), constructor);
        self
    }
}

impl PluginPackage for StaticPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_names(&self) -> Result<Vec<String>> {
        Ok(self.modules.keys().cloned().collect())
    }

    fn import(&self, module: &str) -> std::result::Result<PluginModule, ImportError> {
        match self.modules.get(module) {
            Some(constructor) => constructor(),
            None => Err(no_such_module(&self.name, module)),
        }
    }
}

/// A package whose module list comes from the files of a directory.
///
/// Every discovered name must resolve to a constructor in the catalog; a
/// file without one fails to import.
#[derive(Debug, Clone)]
pub struct DirectoryPackage {
    name: String,
    dir: PathBuf,
    suffix: String,
    catalog: HashMap<String, ModuleConstructor>,
}

impl DirectoryPackage {
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            suffix: DEFAULT_MODULE_SUFFIX.to_string(),
            catalog: HashMap::new(),
        }
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn with_module(mut self, name: impl Into<String>, constructor: ModuleConstructor) -> Self {
        self.catalog.insert(name.into(), constructor);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl PluginPackage for DirectoryPackage {
    fn name(&self) -> &str {
        &self.name
    }

    fn module_names(&self) -> Result<Vec<String>> {
        Ok(find_modules_in_dir(&self.dir, &self.suffix))
    }

    fn import(&self, module: &str) -> std::result::Result<PluginModule, ImportError> {
        match self.catalog.get(module) {
            Some(constructor) => constructor(),
            None => Err(no_such_module(&self.name, module)),
        }
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str("\n  caused by: ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }
    chain
}

/// Import every module of `package`.
///
/// Skipped modules are dropped, or abort the load when `fail_on_skip` is set.
/// The first failing import aborts the load.
pub(crate) fn import_package(package: &dyn PluginPackage, env: &Env) -> Result<Vec<PluginModule>> {
    let mut modules = Vec::new();
    for name in package.module_names()? {
        let qualified = format!("{}.{}", package.name(), name);
        log::debug!("importing plugin module {}", qualified);
        match package.import(&name) {
            Ok(module) => modules.push(module),
            Err(ImportError::Skip(reason)) => {
                if env.fail_on_skip() {
                    log::error!("plugin module {} was skipped: {}", qualified, reason);
                    return Err(PluginSystemError::ModuleSkipped {
                        module: qualified,
                        reason,
                    }
                    .into());
                }
                log::debug!("skipping plugin module {}: {}", qualified, reason);
            }
            Err(ImportError::Failed(source)) => {
                if env.startup_traceback() {
                    log::error!("could not load plugin module {}\n{}", qualified, error_chain(source.as_ref()));
                } else {
                    log::error!("could not load plugin module {}: {}", qualified, source);
                }
                return Err(PluginSystemError::ModuleImport {
                    module: qualified,
                    source,
                }
                .into());
            }
        }
    }
    Ok(modules)
}
